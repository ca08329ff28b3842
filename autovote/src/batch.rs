use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::log_sink::LogSink;
use crate::token_store::TokenStore;
use crate::utils::token_prefix;
use crate::vote::{ResponseBody, VoteSubmitter};
use crate::{Error, Result};

/// Outcome of one token within a batch, safe to display and log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub token_prefix: String,
    pub ok: bool,
    pub status: Option<u16>,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Scheduled,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Manual => write!(f, "manual"),
            Trigger::Scheduled => write!(f, "scheduled"),
        }
    }
}

pub struct BatchRunner {
    store: Arc<TokenStore>,
    client: Arc<dyn VoteSubmitter>,
    log: Arc<LogSink>,
    pub(crate) running: Mutex<()>,
}

impl BatchRunner {
    pub fn new(store: Arc<TokenStore>, client: Arc<dyn VoteSubmitter>, log: Arc<LogSink>) -> Self {
        Self {
            store,
            client,
            log,
            running: Mutex::new(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Runs every stored token, rejecting the call when another run is active.
    /// Log write failures never stop the batch.
    pub async fn run_stored(&self, trigger: Trigger) -> Result<Vec<RunResult>> {
        let Ok(_guard) = self.running.try_lock() else {
            return Err(Error::RunInProgress);
        };

        let message = match trigger {
            Trigger::Scheduled => "JOB_RUN_ALL triggered by scheduler",
            Trigger::Manual => "UI: Run all triggered",
        };
        self.log_line(message.to_string()).await;

        let tokens = self.store.load().await;
        info!("Batch run ({}) for {} tokens", trigger, tokens.len());
        Ok(self.run_all(&tokens).await)
    }

    /// Submits each token in order; a failing token never stops the batch
    pub async fn run_all(&self, tokens: &[String]) -> Vec<RunResult> {
        self.log_line(format!("RUN ALL start tokens_count={}", tokens.len()))
            .await;

        let mut results = Vec::with_capacity(tokens.len());
        for token in tokens {
            let result = match self.client.submit(token).await {
                Ok(outcome) => RunResult {
                    token_prefix: token_prefix(token),
                    ok: outcome.ok,
                    status: outcome.status,
                    body: outcome.body,
                },
                Err(e) => {
                    error!("Vote for {} failed: {}", token_prefix(token), e);
                    self.log_line(format!("token[:8]={} EXCEPTION: {}", token_prefix(token), e))
                        .await;
                    RunResult {
                        token_prefix: token_prefix(token),
                        ok: false,
                        status: None,
                        body: ResponseBody::Text(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        self.log_line("RUN ALL end".to_string()).await;
        results
    }

    async fn log_line(&self, message: String) {
        if let Err(e) = self.log.append(&message).await {
            error!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::StaticVoteClient;
    use crate::vote::tests::{Captured, create_client, spawn_mock_remote};
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_runner(dir: &TempDir, client: Arc<dyn VoteSubmitter>) -> (BatchRunner, Arc<LogSink>) {
        let store = Arc::new(TokenStore::new(dir.path().join("tokens.json")));
        let log = Arc::new(LogSink::new(dir.path().join("run_tokens.log")));
        (BatchRunner::new(store, client, log.clone()), log)
    }

    async fn log_lines(log: &LogSink) -> Vec<String> {
        log.read_all()
            .await
            .expect("read must succeed")
            .unwrap_or_default()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_run_all_keeps_order() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let client = Arc::new(StaticVoteClient::new());
        let (runner, _log) = create_runner(&dir, client.clone());

        let tokens = strings(&["token-one-1", "token-two-2", "token-three-3"]);
        let results = runner.run_all(&tokens).await;

        let prefixes: Vec<&str> = results.iter().map(|r| r.token_prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["token-on...", "token-tw...", "token-th..."]);
        assert_eq!(client.calls(), tokens);
    }

    #[tokio::test]
    async fn test_run_all_isolates_failures() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let client = Arc::new(StaticVoteClient::failing(&["t2"]));
        let (runner, _log) = create_runner(&dir, client);

        let results = runner.run_all(&strings(&["t1", "t2", "t3"])).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].ok);
        assert_eq!(results[0].status, Some(200));
        assert!(!results[1].ok);
        assert_eq!(results[1].status, None);
        assert!(results[2].ok);
        assert_eq!(results[2].status, Some(200));
    }

    #[tokio::test]
    async fn test_run_all_logs_submit_errors() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let client = Arc::new(StaticVoteClient::failing(&["second-token"]));
        let (runner, log) = create_runner(&dir, client);

        runner
            .run_all(&strings(&["first-token", "second-token"]))
            .await;

        // Canned client logs nothing itself, so only the failure has a token line
        let lines = log_lines(&log).await;
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("token[:8]=second-t... EXCEPTION: Vote rejected"));
        assert!(!lines[1].contains("second-token"));
    }

    #[tokio::test]
    async fn test_run_all_against_remote_logs_four_lines() {
        let base_url = spawn_mock_remote(Captured::default()).await;
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let (client, log) = create_client(&dir, format!("{}/vote", base_url));
        let store = Arc::new(TokenStore::new(dir.path().join("tokens.json")));
        let runner = BatchRunner::new(store, Arc::new(client), log.clone());

        let results = runner
            .run_all(&strings(&["abc123def456", "xyz789uvw000"]))
            .await;

        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.ok);
            assert_eq!(result.status, Some(200));
            assert_eq!(
                result.body,
                ResponseBody::Json(serde_json::json!({ "ok": true }))
            );
        }
        assert_eq!(results[0].token_prefix, "abc123de...");
        assert_eq!(results[1].token_prefix, "xyz789uv...");

        let lines = log_lines(&log).await;
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("RUN ALL start tokens_count=2"));
        assert!(lines[1].contains("token[:8]=abc123de... status=200"));
        assert!(lines[2].contains("token[:8]=xyz789uv... status=200"));
        assert!(lines[3].ends_with("RUN ALL end"));
    }

    #[tokio::test]
    async fn test_run_stored_uses_store() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let client = Arc::new(StaticVoteClient::new());
        let (runner, log) = create_runner(&dir, client.clone());
        runner
            .store
            .save(&strings(&["a", "b"]))
            .await
            .expect("save must succeed");

        let results = runner
            .run_stored(Trigger::Scheduled)
            .await
            .expect("run must succeed");
        assert_eq!(results.len(), 2);
        assert_eq!(client.calls(), strings(&["a", "b"]));

        let lines = log_lines(&log).await;
        assert!(lines[0].ends_with("JOB_RUN_ALL triggered by scheduler"));
        assert!(!runner.is_running());
    }

    #[tokio::test]
    async fn test_run_stored_survives_unwritable_log() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let store = Arc::new(TokenStore::new(dir.path().join("tokens.json")));
        store
            .save(&strings(&["a", "b"]))
            .await
            .expect("save must succeed");

        // Parent directory does not exist, every append fails
        let log = Arc::new(LogSink::new(dir.path().join("missing").join("run_tokens.log")));
        let client = Arc::new(StaticVoteClient::new());
        let runner = BatchRunner::new(store, client.clone(), log.clone());

        let results = runner
            .run_stored(Trigger::Scheduled)
            .await
            .expect("run must not fail on log errors");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.ok));
        assert_eq!(client.calls(), strings(&["a", "b"]));
        assert!(log.read_all().await.expect("read must succeed").is_none());
    }

    #[tokio::test]
    async fn test_run_stored_rejects_overlap() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let (runner, _log) = create_runner(&dir, Arc::new(StaticVoteClient::new()));

        let _guard = runner.running.try_lock().expect("lock must be free");
        assert!(runner.is_running());

        let result = runner.run_stored(Trigger::Manual).await;
        assert!(matches!(result, Err(Error::RunInProgress)));
    }
}
