use std::time::Duration;

use tracing::debug;

use super::types::{SubmitRequest, body_snippet, parse_status_response, parse_submit_response, rejected};
use crate::api::generation::models::GenerationJob;

/// Production generations endpoint of the Luma Dream Machine API
pub const DEFAULT_API_URL: &str = "https://api.lumalabs.ai/dream-machine/v1/generations";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced by the remote generation client
#[derive(Debug)]
pub enum LumaError {
    /// The prompt was empty after trimming; no request was sent
    EmptyPrompt,

    /// The service answered with a non-2xx status
    Rejected { status: u16, message: String },

    /// The service answered 2xx but the body was empty, unparseable, or
    /// missing the job identifier
    Protocol(String),

    /// The request never produced a response (connect or timeout failure)
    Transport(reqwest::Error),
}

impl std::fmt::Display for LumaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LumaError::EmptyPrompt => write!(f, "prompt must not be empty"),
            LumaError::Rejected { status, message } => write!(
                f,
                "generation service rejected the request ({}): {}",
                status, message
            ),
            LumaError::Protocol(msg) => {
                write!(f, "invalid response from generation service: {}", msg)
            }
            LumaError::Transport(e) => write!(f, "generation service unreachable: {}", e),
        }
    }
}

impl std::error::Error for LumaError {}

/// Client configuration; `api_url` points at the generations endpoint
#[derive(Clone, Debug)]
pub struct LumaConfig {
    pub api_key: String,
    pub api_url: String,
}

/// HTTP client for the Luma Dream Machine generations API.
///
/// Network I/O only; holds no job state between calls.
#[derive(Clone)]
pub struct LumaClient {
    client: reqwest::Client,
    config: LumaConfig,
}

impl LumaClient {
    pub fn new(config: LumaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }

    /// Submit a prompt for video generation.
    ///
    /// Fails with `EmptyPrompt` before any network I/O when the trimmed
    /// prompt is empty. Generation parameters other than the prompt are
    /// fixed: 16:9 aspect ratio, non-looping.
    pub async fn submit(&self, prompt: &str) -> Result<GenerationJob, LumaError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(LumaError::EmptyPrompt);
        }

        let payload = SubmitRequest {
            prompt,
            aspect_ratio: "16:9",
            loop_video: false,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("accept", "application/json")
            .header("authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(LumaError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LumaError::Transport)?;
        debug!(
            "Generation submit response: status={}, body={}",
            status,
            body_snippet(&body)
        );

        if !status.is_success() {
            return Err(rejected(status.as_u16(), &body));
        }

        parse_submit_response(&body, prompt)
    }

    /// Fetch the current status of a generation
    pub async fn fetch_status(&self, generation_id: &str) -> Result<GenerationJob, LumaError> {
        let url = status_url(&self.config.api_url, generation_id);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .header("authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
            .map_err(LumaError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LumaError::Transport)?;
        debug!(
            "Status check response for {}: status={}, body={}",
            generation_id,
            status,
            body_snippet(&body)
        );

        if !status.is_success() {
            return Err(rejected(status.as_u16(), &body));
        }

        parse_status_response(&body, generation_id)
    }
}

fn status_url(api_url: &str, generation_id: &str) -> String {
    format!("{}/{}", api_url.trim_end_matches('/'), generation_id)
}
