//! Wire shapes of the Luma generations API and the pure parsing functions
//! that turn response bodies into [`GenerationJob`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::LumaError;
use crate::api::generation::models::{GenerationJob, JobState};

/// Longest upstream body fragment carried into error messages and logs
pub(super) const SNIPPET_LEN: usize = 200;

#[derive(Serialize)]
pub(super) struct SubmitRequest<'a> {
    pub prompt: &'a str,
    pub aspect_ratio: &'a str,
    #[serde(rename = "loop")]
    pub loop_video: bool,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    state: Option<String>,
    // Value instead of a typed struct: the service has been observed to
    // send null or odd shapes here, which must not fail the whole parse.
    #[serde(default)]
    assets: Value,
    #[serde(default)]
    request: Value,
    #[serde(default)]
    failure_reason: Option<String>,
}

/// Build a `Rejected` error, preferring a human-readable message from the
/// error body over the raw payload
pub(super) fn rejected(status: u16, body: &str) -> LumaError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(extract_error_message)
        .unwrap_or_else(|| body_snippet(body));
    LumaError::Rejected { status, message }
}

fn extract_error_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

pub(super) fn body_snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= SNIPPET_LEN {
        return trimmed.to_string();
    }
    let mut cut = SNIPPET_LEN;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &trimmed[..cut])
}

/// Parse the body of a successful submit call. The job comes back in the
/// reported state (queued when the service omits one); no asset can exist
/// this early.
pub(super) fn parse_submit_response(body: &str, prompt: &str) -> Result<GenerationJob, LumaError> {
    if body.trim().is_empty() {
        return Err(LumaError::Protocol("empty response body".to_string()));
    }

    let response: SubmitResponse = serde_json::from_str(body)
        .map_err(|e| LumaError::Protocol(format!("unparseable response body: {}", e)))?;

    let generation_id = match response.id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(LumaError::Protocol(
                "no generation id in response".to_string(),
            ));
        }
    };

    let state = response
        .state
        .as_deref()
        .map(JobState::from_remote)
        .unwrap_or(JobState::Queued);

    Ok(GenerationJob {
        generation_id,
        prompt: prompt.to_string(),
        state,
        video_url: None,
        failure_reason: None,
    })
}

/// Parse the body of a successful status call.
///
/// `assets` being absent, null, or some other shape entirely must read as
/// "no asset yet" rather than failing the check; same tolerance for the
/// echoed `request`.
pub(super) fn parse_status_response(
    body: &str,
    generation_id: &str,
) -> Result<GenerationJob, LumaError> {
    if body.trim().is_empty() {
        return Err(LumaError::Protocol("empty response body".to_string()));
    }

    let response: StatusResponse = serde_json::from_str(body)
        .map_err(|e| LumaError::Protocol(format!("unparseable response body: {}", e)))?;

    let state = response
        .state
        .as_deref()
        .map(JobState::from_remote)
        .unwrap_or(JobState::Unknown);

    Ok(GenerationJob {
        generation_id: generation_id.to_string(),
        prompt: echoed_prompt(&response.request),
        state,
        video_url: video_url(&response.assets),
        failure_reason: response.failure_reason,
    })
}

/// A video URL exists only when `assets` is an object carrying a string
/// `video` field
fn video_url(assets: &Value) -> Option<String> {
    assets
        .as_object()
        .and_then(|assets| assets.get("video"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Recover the original prompt from the echoed request when the shape
/// cooperates, otherwise fall back to an empty prompt
fn echoed_prompt(request: &Value) -> String {
    request
        .as_object()
        .and_then(|request| request.get("prompt"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_submit_response() {
        let job =
            parse_submit_response(r#"{"id":"gen_1","state":"queued"}"#, "a cat flying").unwrap();
        assert_eq!(job.generation_id, "gen_1");
        assert_eq!(job.prompt, "a cat flying");
        assert_eq!(job.state, JobState::Queued);
        assert!(job.video_url.is_none());
        assert!(job.failure_reason.is_none());
    }

    #[test]
    fn submit_state_defaults_to_queued() {
        let job = parse_submit_response(r#"{"id":"gen_2"}"#, "p").unwrap();
        assert_eq!(job.state, JobState::Queued);
    }

    #[test]
    fn submit_without_an_id_is_a_protocol_error() {
        for body in [
            r#"{}"#,
            r#"{"id":null}"#,
            r#"{"id":""}"#,
            r#"{"state":"queued"}"#,
        ] {
            assert!(
                matches!(
                    parse_submit_response(body, "p"),
                    Err(LumaError::Protocol(_))
                ),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn empty_or_garbage_bodies_are_protocol_errors() {
        for body in ["", "   ", "not json", "null"] {
            assert!(matches!(
                parse_submit_response(body, "p"),
                Err(LumaError::Protocol(_))
            ));
            assert!(matches!(
                parse_status_response(body, "gen_1"),
                Err(LumaError::Protocol(_))
            ));
        }
    }

    #[test]
    fn parses_completed_status_with_echoed_prompt() {
        let body = r#"{"state":"completed","assets":{"video":"https://cdn/x.mp4"},"request":{"prompt":"a cat flying"}}"#;
        let job = parse_status_response(body, "gen_1").unwrap();
        assert_eq!(job.generation_id, "gen_1");
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.video_url.as_deref(), Some("https://cdn/x.mp4"));
        assert_eq!(job.prompt, "a cat flying");
    }

    #[test]
    fn malformed_assets_never_produce_a_video_url() {
        for body in [
            r#"{"state":"completed"}"#,
            r#"{"state":"completed","assets":null}"#,
            r#"{"state":"completed","assets":"ready"}"#,
            r#"{"state":"completed","assets":[1,2]}"#,
            r#"{"state":"completed","assets":7}"#,
            r#"{"state":"completed","assets":{}}"#,
            r#"{"state":"completed","assets":{"video":null}}"#,
            r#"{"state":"completed","assets":{"video":42}}"#,
        ] {
            let job = parse_status_response(body, "gen_1").unwrap();
            assert_eq!(job.video_url, None, "body: {}", body);
        }
    }

    #[test]
    fn missing_state_reads_as_unknown() {
        let job = parse_status_response(r#"{"assets":null}"#, "gen_1").unwrap();
        assert_eq!(job.state, JobState::Unknown);
    }

    #[test]
    fn missing_request_echo_falls_back_to_an_empty_prompt() {
        for body in [
            r#"{"state":"completed"}"#,
            r#"{"state":"completed","request":"?"}"#,
            r#"{"state":"completed","request":{"prompt":1}}"#,
        ] {
            let job = parse_status_response(body, "gen_1").unwrap();
            assert_eq!(job.prompt, "", "body: {}", body);
        }
    }

    #[test]
    fn failure_reason_is_passed_through() {
        let body = r#"{"state":"failed","failure_reason":"content policy"}"#;
        let job = parse_status_response(body, "gen_1").unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.failure_reason.as_deref(), Some("content policy"));
    }

    #[test]
    fn rejected_prefers_structured_error_detail() {
        match rejected(404, r#"{"detail":"generation not found"}"#) {
            LumaError::Rejected { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "generation not found");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn rejected_falls_back_to_a_truncated_body_snippet() {
        let long_body = "x".repeat(500);
        match rejected(503, &long_body) {
            LumaError::Rejected { status, message } => {
                assert_eq!(status, 503);
                assert!(message.ends_with("..."));
                assert!(message.len() <= SNIPPET_LEN + 3);
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }
}
