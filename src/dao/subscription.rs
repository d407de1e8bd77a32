use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tokio::{fs, sync::Mutex};
use tracing::warn;

use crate::error::Error;

/// Flat-file store holding a JSON array of opaque subscription documents.
///
/// Records are compared by full value, so two documents that differ in any
/// field (a rotated key, a new `expirationTime`) are distinct subscriptions.
/// Every read-modify-write runs under one lock.
#[derive(Debug)]
pub struct SubscriptionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SubscriptionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        SubscriptionStore {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Result<Vec<Value>, Error> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Returns `true` when the record was not stored yet and has been added.
    pub async fn save(&self, record: Value) -> Result<bool, Error> {
        let _guard = self.lock.lock().await;
        let mut items = self.read().await?;

        if items.contains(&record) {
            return Ok(false);
        }

        items.push(record);
        self.write(&items).await?;

        Ok(true)
    }

    /// Removes the first record equal to `record`.
    pub async fn remove(&self, record: &Value) -> Result<bool, Error> {
        let _guard = self.lock.lock().await;
        let mut items = self.read().await?;

        let Some(index) = items.iter().position(|item| item == record) else {
            return Ok(false);
        };

        items.remove(index);
        self.write(&items).await?;

        Ok(true)
    }

    async fn read(&self) -> Result<Vec<Value>, Error> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(Error::Io(e)),
        };

        match serde_json::from_slice::<Value>(&data) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => {
                warn!(
                    "Subscription file {} is not a JSON array, ignoring it",
                    self.path.display()
                );
                Ok(vec![])
            },
            Err(e) => {
                warn!(
                    "Subscription file {} could not be decoded: {}",
                    self.path.display(),
                    e
                );
                Ok(vec![])
            },
        }
    }

    async fn write(&self, items: &[Value]) -> Result<(), Error> {
        let data = serde_json::to_vec(items)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");

        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}
