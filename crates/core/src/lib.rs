pub mod auth;
pub mod config;
pub mod export;
pub mod types;
pub mod validation;
