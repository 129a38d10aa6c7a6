use crate::domain::ports::IdentityStore;
use crate::error::{OnboardingError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::warn;

/// A persistent identity store kept in a small JSON file.
///
/// Every `set` rewrites the whole file through a temporary sibling that is
/// renamed into place, so a crash mid-write leaves the previous value intact.
pub struct FileIdentityStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileIdentityStore {
    /// Uses `path` as the backing file. The file is created on first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.is_dir() {
            return Err(OnboardingError::IoError(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            )));
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_all(path: &Path) -> Result<BTreeMap<String, String>> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_all(path: &Path, values: &BTreeMap<String, String>) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    serde_json::to_writer_pretty(&mut tmp, values)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| OnboardingError::IoError(e.error))?;
    Ok(())
}

/// Runs blocking file IO off the async worker threads.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| OnboardingError::InternalError(Box::new(e)))?
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let (key, value) = (key.to_string(), value.to_string());

        blocking(move || {
            // The slot is overwritten either way, so unreadable content is replaced.
            let mut values = match read_all(&path) {
                Ok(values) => values,
                Err(OnboardingError::SerializationError(e)) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "replacing unreadable identity file"
                    );
                    BTreeMap::new()
                }
                Err(e) => return Err(e),
            };
            values.insert(key, value);
            write_all(&path, &values)
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path.clone();
        let values = blocking(move || read_all(&path)).await?;
        Ok(values.get(key).cloned())
    }
}
