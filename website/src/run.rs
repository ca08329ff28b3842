use axum::Router;
use axum::extract::FromRef;
use snafu::ResultExt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::net::TcpListener;
use tracing::{error, info};

use autovote::batch::{BatchRunner, Trigger};
use autovote::log_sink::LogSink;
use autovote::scheduler::{Scheduler, SchedulerHandle};
use autovote::token_store::TokenStore;
use autovote::vote::{HttpVoteClient, VoteSubmitter};

use crate::Result;
use crate::config::Config;
use crate::error::{BindSnafu, JsonOutputSnafu, ServeSnafu};
use crate::web::all_routes;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<TokenStore>,
    pub log: Arc<LogSink>,
    pub client: Arc<dyn VoteSubmitter>,
    pub runner: Arc<BatchRunner>,
    pub scheduler_running: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: Config, client: Arc<dyn VoteSubmitter>, log: Arc<LogSink>) -> Self {
        let store = Arc::new(TokenStore::new(config.tokens_file.clone()));
        let runner = Arc::new(BatchRunner::new(store.clone(), client.clone(), log.clone()));

        Self {
            config: Arc::new(config),
            store,
            log,
            client,
            runner,
            scheduler_running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn build(config: Config) -> Result<Self> {
        let log = Arc::new(LogSink::new(config.log_file.clone()));
        let client = HttpVoteClient::new(config.vote.clone(), log.clone())?;
        Ok(Self::new(config, Arc::new(client), log))
    }

    fn start_scheduler(&mut self) -> SchedulerHandle {
        let scheduler = Scheduler::new(
            self.config.schedule.at,
            self.config.schedule.poll_interval,
            self.runner.clone(),
            self.log.clone(),
        );
        let handle = scheduler.start();
        self.scheduler_running = handle.status();
        handle
    }
}

pub async fn run(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let mut state = AppState::build(config)?;

    let scheduler = state.start_scheduler();
    state
        .log
        .append("UI: Scheduler auto-started on app start")
        .await?;

    let routes_all = Router::new().merge(all_routes(state));

    // Setup the server
    info!("HTTP Server running on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .context(BindSnafu { addr: addr.clone() })?;
    let served = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeSnafu);

    info!("HTTP Server stopped");
    scheduler.stop().await;

    served
}

/// Runs every stored token once and prints the results as JSON
pub async fn run_once(config: Config) -> Result<()> {
    let state = AppState::build(config)?;
    let results = state.runner.run_stored(Trigger::Manual).await?;

    let failed = results.iter().filter(|r| !r.ok).count();
    info!("Run completed: total={}, failed={}", results.len(), failed);

    let output = serde_json::to_string_pretty(&results).context(JsonOutputSnafu)?;
    println!("{}", output);

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use autovote::vote::StaticVoteClient;
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    pub const TEST_CSRF_SECRET: &str = "test-secret";

    /// State backed by a temp dir and a canned vote client
    pub fn create_test_state(dir: &TempDir, client: Arc<StaticVoteClient>) -> AppState {
        let vars: HashMap<&str, String> = HashMap::from([
            (
                "TOKENS_FILE",
                dir.path().join("tokens.json").display().to_string(),
            ),
            (
                "LOG_FILE",
                dir.path().join("run_tokens.log").display().to_string(),
            ),
            ("CSRF_SECRET", TEST_CSRF_SECRET.to_string()),
        ]);
        let config =
            Config::from_lookup(|key| vars.get(key).cloned()).expect("test config must be valid");

        let log = Arc::new(LogSink::new(config.log_file.clone()));
        AppState::new(config, client, log)
    }

    #[tokio::test]
    async fn test_start_scheduler_tracks_status() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let mut state = create_test_state(&dir, Arc::new(StaticVoteClient::new()));
        assert!(!state.scheduler_running.load(Ordering::SeqCst));

        let handle = state.start_scheduler();
        assert!(state.scheduler_running.load(Ordering::SeqCst));

        handle.stop().await;
        assert!(!state.scheduler_running.load(Ordering::SeqCst));
    }
}
