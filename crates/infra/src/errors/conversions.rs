//! Conversions from external infrastructure errors into domain errors.

use reqwest::{Error as HttpError, StatusCode};
use serde_json::Value;
use wakelink_domain::constants::HTTP_STATUS_UNREACHABLE;
use wakelink_domain::RemoteError;

/// Longest response body excerpt carried in an error message
const MAX_BODY_EXCERPT: usize = 200;

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RemoteError */
/* -------------------------------------------------------------------------- */

/// Classify a reqwest failure
pub fn remote_from_reqwest(err: &HttpError) -> RemoteError {
    if err.is_decode() {
        return RemoteError::decode(format!("invalid response body: {err}"));
    }
    if let Some(status) = err.status() {
        return map_status_error(status, "");
    }

    let message = if err.is_timeout() {
        format!("HTTP timeout: {err}")
    } else if err.is_connect() {
        format!("HTTP connection failed: {err}")
    } else if err.is_builder() {
        format!("HTTP request invalid: {err}")
    } else {
        format!("HTTP error: {err}")
    };
    RemoteError::transport(message)
}

/* -------------------------------------------------------------------------- */
/* non-success status → RemoteError */
/* -------------------------------------------------------------------------- */

/// Map a non-success status and its body
///
/// 408 means the vehicle could not be reached. The message prefers the
/// `error` field of a JSON body, falling back to a trimmed excerpt.
pub fn map_status_error(status: StatusCode, body: &str) -> RemoteError {
    let detail = error_detail(body);
    let message = match detail {
        Some(detail) => format!("status {status}: {detail}"),
        None => format!("status {status}"),
    };

    if status.as_u16() == HTTP_STATUS_UNREACHABLE {
        RemoteError::unreachable(message)
    } else {
        RemoteError::http(status.as_u16(), message)
    }
}

fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["error_description", "error"] {
            if let Some(text) = map.get(key).and_then(Value::as_str).filter(|t| !t.is_empty()) {
                return Some(text.to_string());
            }
        }
    }

    Some(trimmed.chars().take(MAX_BODY_EXCERPT).collect())
}
