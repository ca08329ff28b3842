use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::Result;
use crate::error::HttpClientBuildSnafu;
use crate::log_sink::LogSink;
use crate::utils::{generate_request_id, take_chars, token_prefix};

pub const DEFAULT_VOTE_API_URL: &str =
    "https://eventista-platform-api.1vote.vn/v2/web/tenant/nFkFqZ/event/EVENT_FiZrv/voting-free";
pub const DEFAULT_VOTE_ORIGIN: &str = "https://giaithuongngoisaoxanh.1vote.vn";
pub const DEFAULT_VOTE_REFERER: &str = "https://giaithuongngoisaoxanh.1vote.vn/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Characters of the response body kept in the log
const LOGGED_BODY_LEN: usize = 300;

/// Where and how votes are sent
#[derive(Debug, Clone)]
pub struct VoteTarget {
    pub api_url: String,
    pub origin: String,
    pub referer: String,
    pub timeout: Duration,
}

impl Default for VoteTarget {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_VOTE_API_URL.to_string(),
            origin: DEFAULT_VOTE_ORIGIN.to_string(),
            referer: DEFAULT_VOTE_REFERER.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    pub payment_type: String,
    pub point_package_id: String,
    pub product_group_id: String,
    pub product_id: String,
    pub source: VoteSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSource {
    pub screen: String,
    pub point_package: PointPackage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPackage {
    pub amount: u32,
    pub id: String,
    pub point: String,
}

impl VotePayload {
    /// The zero-cost vote for the single supported candidate
    pub fn free_vote() -> Self {
        Self {
            payment_type: "free".to_string(),
            point_package_id: "FREE".to_string(),
            product_group_id: "JPYxH".to_string(),
            product_id: "8FJf".to_string(),
            source: VoteSource {
                screen: "candidate-detail".to_string(),
                point_package: PointPackage {
                    amount: 0,
                    id: "FREE".to_string(),
                    point: "100".to_string(),
                },
            },
        }
    }
}

/// Response body as returned by the remote, JSON when it parses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        }
    }

    /// Human readable rendering, pretty printed for JSON
    pub fn to_display(&self) -> String {
        match self {
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteOutcome {
    pub ok: bool,
    pub status: Option<u16>,
    pub body: ResponseBody,
}

impl VoteOutcome {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: None,
            body: ResponseBody::Text(msg.into()),
        }
    }
}

#[async_trait]
pub trait VoteSubmitter: Send + Sync {
    async fn submit(&self, token: &str) -> Result<VoteOutcome>;
}

pub struct HttpVoteClient {
    client: Client,
    target: VoteTarget,
    payload: VotePayload,
    log: Arc<LogSink>,
}

impl HttpVoteClient {
    pub fn new(target: VoteTarget, log: Arc<LogSink>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(target.timeout)
            .build()
            .context(HttpClientBuildSnafu)?;

        Ok(Self {
            client,
            target,
            payload: VotePayload::free_vote(),
            log,
        })
    }

    async fn send(&self, token: &str) -> reqwest::Result<(u16, String)> {
        let response = self
            .client
            .post(&self.target.api_url)
            .header("apigw-requestid", generate_request_id())
            .header("Origin", &self.target.origin)
            .header("Referer", &self.target.referer)
            .header("x-eventista-check-token", "")
            .bearer_auth(token)
            .json(&self.payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }

    async fn log_line(&self, message: String) {
        if let Err(e) = self.log.append(&message).await {
            error!("{}", e);
        }
    }
}

#[async_trait]
impl VoteSubmitter for HttpVoteClient {
    async fn submit(&self, token: &str) -> Result<VoteOutcome> {
        let prefix = token_prefix(token);

        match self.send(token).await {
            Ok((status, text)) => {
                self.log_line(format!(
                    "token[:8]={} status={} body={}",
                    prefix,
                    status,
                    take_chars(&text, LOGGED_BODY_LEN)
                ))
                .await;

                Ok(VoteOutcome {
                    ok: true,
                    status: Some(status),
                    body: ResponseBody::parse(text),
                })
            }
            Err(e) => {
                self.log_line(format!("token[:8]={} EXCEPTION: {}", prefix, e))
                    .await;
                Ok(VoteOutcome::failed(e.to_string()))
            }
        }
    }
}

/// Canned outcomes keyed by token, for exercising callers without a network
#[cfg(any(test, feature = "test"))]
#[derive(Default)]
pub struct StaticVoteClient {
    pub failing: Vec<String>,
    pub calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test"))]
impl StaticVoteClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(tokens: &[&str]) -> Self {
        Self {
            failing: tokens.iter().map(|t| t.to_string()).collect(),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test"))]
#[async_trait]
impl VoteSubmitter for StaticVoteClient {
    async fn submit(&self, token: &str) -> Result<VoteOutcome> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(token.to_string());
        }

        if self.failing.iter().any(|t| t == token) {
            return Err(format!("Vote rejected for {}", token_prefix(token)).into());
        }

        Ok(VoteOutcome {
            ok: true,
            status: Some(200),
            body: ResponseBody::Json(serde_json::json!({ "ok": true })),
        })
    }
}
