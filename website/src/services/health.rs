use serde::Serialize;
use std::path::Path;
use std::sync::atomic::Ordering;
use tracing::error;

use autovote::utils::generate_request_id;

use crate::run::AppState;

#[derive(Serialize)]
pub struct LiveStatus {
    pub status: String,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub storage: String,
    pub scheduler: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.checks.is_healthy()
    }
}

impl HealthChecks {
    pub fn new() -> Self {
        Self {
            storage: "DOWN".to_string(),
            scheduler: "DOWN".to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.storage == "UP" && self.scheduler == "UP"
    }
}

pub fn check_liveness() -> LiveStatus {
    // Nothing much to check, if it hits this function, it's alive
    LiveStatus {
        status: "UP".to_string(),
    }
}

pub async fn check_readiness(state: &AppState) -> HealthStatus {
    let checks = perform_checks(state).await;
    let mut status = "DOWN".to_string();
    let mut message = "One or more health checks are failing".to_string();

    if checks.is_healthy() {
        status = "UP".to_string();
        message = "All health checks are passing".to_string();
    }

    HealthStatus {
        status,
        message,
        checks,
    }
}

async fn perform_checks(state: &AppState) -> HealthChecks {
    let mut checks = HealthChecks::new();

    let storage_ok = check_dir(state.store.path()).await && check_dir(state.log.path()).await;
    if storage_ok {
        checks.storage = "UP".to_string();
    }

    if state.scheduler_running.load(Ordering::SeqCst) {
        checks.scheduler = "UP".to_string();
    }

    checks
}

/// The parent directory of a data file must accept a new file
async fn check_dir(file: &Path) -> bool {
    let dir = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    // Mode bits do not tell whether this process may write, so try it
    let probe_file = dir.join(format!(".ready-{}", generate_request_id()));
    if let Err(e) = tokio::fs::write(&probe_file, b"").await {
        error!("Storage check failed for {:?}: {}", dir, e);
        return false;
    }

    if let Err(e) = tokio::fs::remove_file(&probe_file).await {
        error!("Unable to remove {:?}: {}", probe_file, e);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_dir_writable() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        assert!(check_dir(&dir.path().join("tokens.json")).await);

        // Nothing is left behind
        let mut entries = tokio::fs::read_dir(dir.path())
            .await
            .expect("dir must be readable");
        assert!(
            entries
                .next_entry()
                .await
                .expect("dir must be readable")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_check_dir_missing() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let file = dir.path().join("missing").join("tokens.json");
        assert!(!check_dir(&file).await);
    }

    #[tokio::test]
    async fn test_check_dir_not_a_directory() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let blocker = dir.path().join("data");
        tokio::fs::write(&blocker, b"x")
            .await
            .expect("file must be written");

        // Parent is a regular file, no process can create entries under it
        assert!(!check_dir(&blocker.join("tokens.json")).await);
    }
}
