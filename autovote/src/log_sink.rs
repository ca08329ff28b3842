use snafu::ResultExt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::Result;
use crate::error::{LogReadSnafu, LogWriteSnafu};
use crate::utils::local_timestamp_str;

/// Append-only text log of everything the runner does
pub struct LogSink {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, message: &str) -> Result<()> {
        info!("{}", message);

        let line = format!("{} - {}\n", local_timestamp_str(), message);

        let _guard = self.append_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context(LogWriteSnafu {
                path: self.path.clone(),
            })?;

        file.write_all(line.as_bytes())
            .await
            .context(LogWriteSnafu {
                path: self.path.clone(),
            })?;

        file.flush().await.context(LogWriteSnafu {
            path: self.path.clone(),
        })?;

        Ok(())
    }

    /// Full log contents, or None when nothing was logged yet
    pub async fn read_all(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(LogReadSnafu {
                path: self.path.clone(),
            }),
        }
    }
}
