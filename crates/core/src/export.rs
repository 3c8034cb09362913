use crate::types::Subscription;

pub const CSV_HEADER: &str = "Email,Subscribed Date";
pub const CSV_FILENAME: &str = "subscribers.csv";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Renders subscriptions as CSV, one `<email>,<YYYY-MM-DD>` row each.
/// Rows are newline separated with no trailing newline.
pub fn render_csv(subscriptions: &[Subscription]) -> String {
    let mut out = String::from(CSV_HEADER);
    for subscription in subscriptions {
        out.push('\n');
        out.push_str(&escape_field(&subscription.email));
        out.push(',');
        out.push_str(&subscription.subscribed_at.format(DATE_FORMAT).to_string());
    }
    out
}

/// The dashboard's copy-paste list: emails joined by `", "`.
pub fn render_email_list(subscriptions: &[Subscription]) -> String {
    subscriptions
        .iter()
        .map(|subscription| subscription.email.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
