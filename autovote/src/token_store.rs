use snafu::{OptionExt, ResultExt, ensure};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::Result;
use crate::error::{
    IndexOutOfRangeSnafu, TokenFileWriteSnafu, TokenSerializeSnafu, ValidationSnafu,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub total: usize,
}

/// Appends each non-empty trimmed line not already present, keeping order
pub fn add_tokens(mut existing: Vec<String>, new_lines: &str) -> (Vec<String>, usize) {
    let mut added = 0;
    for line in new_lines.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if existing.iter().any(|t| t == line) {
            continue;
        }
        existing.push(line.to_string());
        added += 1;
    }
    (existing, added)
}

/// Removes the token at `index`, returning the updated list and the removed token
pub fn remove_token(mut existing: Vec<String>, index: usize) -> Result<(Vec<String>, String)> {
    let len = existing.len();
    ensure!(index < len, IndexOutOfRangeSnafu { index, len });

    let removed = existing.remove(index);
    Ok((existing, removed))
}

/// JSON array of tokens persisted in a single file
pub struct TokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield an empty list
    pub async fn load(&self) -> Vec<String> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(val) => val,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Unable to read token file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(
                    "Token file {:?} is not a valid token list, treating it as empty: {}",
                    self.path, e
                );
                self.preserve_corrupt(&contents).await;
                Vec::new()
            }
        }
    }

    pub async fn save(&self, tokens: &[String]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(tokens).await
    }

    /// Adds tokens from free-form text, one per line
    pub async fn add_from_text(&self, text: &str) -> Result<AddOutcome> {
        ensure!(
            text.lines().any(|l| !l.trim().is_empty()),
            ValidationSnafu {
                msg: "No tokens entered.".to_string()
            }
        );

        let _guard = self.write_lock.lock().await;
        let (tokens, added) = add_tokens(self.load().await, text);
        self.write(&tokens).await?;

        Ok(AddOutcome {
            added,
            total: tokens.len(),
        })
    }

    /// Deletes the token at `index` and returns it
    pub async fn delete(&self, index: usize) -> Result<String> {
        let _guard = self.write_lock.lock().await;
        let (tokens, removed) = remove_token(self.load().await, index)?;
        self.write(&tokens).await?;
        Ok(removed)
    }

    pub async fn get(&self, index: usize) -> Result<String> {
        let tokens = self.load().await;
        let len = tokens.len();
        tokens
            .into_iter()
            .nth(index)
            .context(IndexOutOfRangeSnafu { index, len })
    }

    // Callers must hold the write lock
    async fn write(&self, tokens: &[String]) -> Result<()> {
        let contents = serde_json::to_string_pretty(tokens).context(TokenSerializeSnafu)?;

        // Write aside then rename so the file is never half written
        let tmp_path = self.sibling("tmp");
        fs::write(&tmp_path, contents)
            .await
            .context(TokenFileWriteSnafu {
                path: tmp_path.clone(),
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .context(TokenFileWriteSnafu {
                path: self.path.clone(),
            })?;

        Ok(())
    }

    async fn preserve_corrupt(&self, contents: &str) {
        let backup = self.sibling("corrupt");
        if fs::try_exists(&backup).await.unwrap_or(false) {
            return;
        }

        match fs::write(&backup, contents).await {
            Ok(_) => warn!("Corrupt token file copied to {:?}", backup),
            Err(e) => error!("Unable to preserve corrupt token file: {}", e),
        }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }
}
