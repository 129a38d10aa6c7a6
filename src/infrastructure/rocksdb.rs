use crate::domain::ports::IdentityStore;
use crate::error::{OnboardingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the persisted identity slot.
pub const CF_IDENTITY: &str = "identity";

/// A persistent identity store backed by RocksDB.
///
/// Keys and values are stored as UTF-8 bytes in their own column family.
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBIdentityStore {
    db: Arc<DB>,
}

impl RocksDBIdentityStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_identity = ColumnFamilyDescriptor::new(CF_IDENTITY, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_identity])?;

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl IdentityStore for RocksDBIdentityStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let cf = self.db.cf_handle(CF_IDENTITY).ok_or_else(|| {
            OnboardingError::InternalError(Box::new(std::io::Error::other(
                "Identity column family not found",
            )))
        })?;

        self.db.put_cf(&cf, key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cf = self.db.cf_handle(CF_IDENTITY).ok_or_else(|| {
            OnboardingError::InternalError(Box::new(std::io::Error::other(
                "Identity column family not found",
            )))
        })?;

        match self.db.get_cf(&cf, key.as_bytes())? {
            Some(bytes) => {
                let value = String::from_utf8(bytes).map_err(|e| {
                    OnboardingError::InternalError(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Stored identity is not UTF-8: {}", e),
                    )))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}
