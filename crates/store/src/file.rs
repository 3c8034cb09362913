use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::warn;

use crate::{Records, StoreResult, SubscriptionStore};
use waitlist_core::types::Subscription;

pub const SUBSCRIBERS_KEY: &str = "coming_soon_subscribers";
pub const COUNT_KEY: &str = "coming_soon_count";

/// Store backed by a directory of named keys: the subscriber list as JSON and a
/// cached count. Both keys are rewritten after every insert.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    records: RwLock<Records>,
}

impl FileStore {
    /// Opens the store, creating the directory if needed. An unreadable
    /// subscriber list is treated as empty.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let list = match tokio::fs::read_to_string(dir.join(SUBSCRIBERS_KEY)).await {
            Ok(raw) => match serde_json::from_str::<Vec<Subscription>>(&raw) {
                Ok(list) => list,
                Err(err) => {
                    warn!(
                        error = %err,
                        dir = %dir.display(),
                        "file store: discarding unreadable subscriber list"
                    );
                    Vec::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            dir,
            records: RwLock::new(Records::from_list(list)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the count first and the subscriber list last; the list is what
    /// `open` reloads, so a failure before it lands leaves disk unchanged.
    async fn persist(&self, records: &Records) -> StoreResult<()> {
        let list = serde_json::to_string(&records.list())?;
        write_key(&self.dir, COUNT_KEY, records.len().to_string().as_bytes()).await?;
        write_key(&self.dir, SUBSCRIBERS_KEY, list.as_bytes()).await?;
        Ok(())
    }

    async fn persist_or_rollback(
        &self,
        records: &mut Records,
        created: Subscription,
    ) -> StoreResult<Subscription> {
        if let Err(err) = self.persist(records).await {
            records.remove(created.id);
            let count = records.len().to_string();
            if let Err(restore) = write_key(&self.dir, COUNT_KEY, count.as_bytes()).await {
                warn!(error = %restore, "file store: could not restore cached count");
            }
            return Err(err);
        }
        Ok(created)
    }
}

async fn write_key(dir: &Path, key: &str, contents: &[u8]) -> std::io::Result<()> {
    let tmp = dir.join(format!("{}.tmp", key));
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, dir.join(key)).await
}

#[async_trait]
impl SubscriptionStore for FileStore {
    async fn insert(&self, email: &str) -> StoreResult<Subscription> {
        let mut records = self.records.write().await;
        let created = records.push(email, Utc::now());
        self.persist_or_rollback(&mut records, created).await
    }

    async fn insert_if_absent(&self, email: &str) -> StoreResult<Subscription> {
        let mut records = self.records.write().await;
        let created = records.push_if_absent(email, Utc::now())?;
        self.persist_or_rollback(&mut records, created).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Subscription>> {
        Ok(self.records.read().await.find(email).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Subscription>> {
        Ok(self.records.read().await.list())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[tokio::test]
    async fn test_open_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_writes_both_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.insert_if_absent("a@x.com").await.unwrap();
        store.insert_if_absent("b@x.com").await.unwrap();

        let count = std::fs::read_to_string(dir.path().join(COUNT_KEY)).unwrap();
        assert_eq!(count, "2");

        let raw = std::fs::read_to_string(dir.path().join(SUBSCRIBERS_KEY)).unwrap();
        let list: Vec<Subscription> = serde_json::from_str(&raw).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].email, "a@x.com");
        assert!(raw.contains("subscribedAt"));
    }

    #[tokio::test]
    async fn test_reopen_keeps_records_and_ids() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).await.unwrap();
            store.insert_if_absent("a@x.com").await.unwrap();
            store.insert_if_absent("b@x.com").await.unwrap();
        }

        let store = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(matches!(
            store.insert_if_absent("a@x.com").await,
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(store.insert_if_absent("c@x.com").await.unwrap().id, 3);
    }

    #[tokio::test]
    async fn test_corrupt_list_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SUBSCRIBERS_KEY), "{not json").unwrap();

        let store = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.insert_if_absent("a@x.com").await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_failed_count_write_leaves_disk_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let blocker = dir.path().join(format!("{}.tmp", COUNT_KEY));
        std::fs::create_dir(&blocker).unwrap();

        assert!(store.insert_if_absent("a@x.com").await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!dir.path().join(SUBSCRIBERS_KEY).exists());

        std::fs::remove_dir(&blocker).unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.insert_if_absent("a@x.com").await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_failed_list_write_restores_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.insert_if_absent("a@x.com").await.unwrap();
        let blocker = dir.path().join(format!("{}.tmp", SUBSCRIBERS_KEY));
        std::fs::create_dir(&blocker).unwrap();

        assert!(store.insert_if_absent("b@x.com").await.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
        let count = std::fs::read_to_string(dir.path().join(COUNT_KEY)).unwrap();
        assert_eq!(count, "1");

        std::fs::remove_dir(&blocker).unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).await.unwrap();
        std::fs::remove_dir_all(store.dir()).unwrap();

        assert!(matches!(
            store.insert_if_absent("a@x.com").await,
            Err(StoreError::Io(_))
        ));
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());
    }
}
