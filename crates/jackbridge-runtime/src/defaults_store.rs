//! Access to the managed service's shell defaults file.
//!
//! All reads and writes go through one async mutex. Writes replace the file
//! atomically: the new content is written to a temp file in the same
//! directory, then renamed over the original.

use std::io;
use std::path::PathBuf;

use jackbridge_core::configure::{ConfigureError, read_variable, upsert_variable};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug)]
pub struct DefaultsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DefaultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Current value of `variable`, `None` when unset or the file is missing.
    pub async fn read(&self, variable: &str) -> Result<Option<String>, ConfigureError> {
        let _guard = self.lock.lock().await;
        let content = self.load().await?;
        Ok(read_variable(&content, variable))
    }

    /// Set `variable` to `value`, keeping every other line.
    pub async fn write(&self, variable: &str, value: &str) -> Result<(), ConfigureError> {
        let _guard = self.lock.lock().await;
        let content = self.load().await?;
        let updated = upsert_variable(&content, variable, value);
        self.replace(&updated).await?;
        info!(path = %self.path.display(), variable, value, "Updated defaults file");
        Ok(())
    }

    async fn load(&self) -> Result<String, ConfigureError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Defaults file missing, using built-in defaults");
                Ok(String::new())
            }
            Err(e) => Err(self.storage_error("read", &e)),
        }
    }

    async fn replace(&self, content: &str) -> Result<(), ConfigureError> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        let result = match fs::write(&temp_path, content).await {
            Ok(()) => fs::rename(&temp_path, &self.path)
                .await
                .map_err(|e| self.storage_error("replace", &e)),
            Err(e) => Err(self.storage_error("write", &e)),
        };

        // A partially written or unrenamed temp file must not linger
        if result.is_err() {
            let _ = fs::remove_file(&temp_path).await;
        }
        result
    }

    fn storage_error(&self, op: &str, e: &io::Error) -> ConfigureError {
        ConfigureError::Storage(format!("failed to {op} {}: {e}", self.path.display()))
    }
}
