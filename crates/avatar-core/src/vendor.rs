//! Vendor contract: endpoint paths, header names and embedded status sentinels.
//!
//! Every value here is dictated by the external streaming-avatar API, not chosen by
//! this crate. Change them only when the vendor changes its contract.

use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.heygen.com";

pub const AVATAR_LIST_PATH: &str = "/v1/streaming/avatar.list";
pub const CREATE_TOKEN_PATH: &str = "/v1/streaming.create_token";
pub const SESSION_NEW_PATH: &str = "/v1/streaming.new";
pub const SESSION_START_PATH: &str = "/v1/streaming.start";
pub const SESSION_TASK_PATH: &str = "/v1/streaming.task";
pub const SESSION_STOP_PATH: &str = "/v1/streaming.stop";
pub const VOICE_LIST_PATH: &str = "/v2/voices";

/// Header carrying the account-level API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Embedded `code` the vendor returns when a session was created.
pub const SUCCESS_CODE: i64 = 100;

/// Embedded numeric code for an exhausted quota / concurrency allowance.
pub const QUOTA_EXHAUSTED_CODE: i64 = 10007;

/// String codes the vendor uses for the same condition in `error.code`.
pub const QUOTA_EXHAUSTED_NAMES: &[&str] = &["quota_exceeded", "insufficient_quota"];

/// Session parameters the vendor expects on `streaming.new`.
pub const DEFAULT_QUALITY: &str = "high";
pub const DEFAULT_VERSION: &str = "v2";
pub const DEFAULT_ACTIVITY_IDLE_TIMEOUT_SECS: u64 = 120;

/// True when the body carries the vendor's quota-exhaustion sentinel, either as the
/// top-level `code` or nested under `error.code`.
pub fn is_quota_exhausted(body: &Value) -> bool {
    let top = body.get("code");
    let nested = body.get("error").and_then(|e| e.get("code"));
    [top, nested].into_iter().flatten().any(code_means_quota)
}

fn code_means_quota(code: &Value) -> bool {
    match code {
        Value::Number(n) => n.as_i64() == Some(QUOTA_EXHAUSTED_CODE),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok() == Some(QUOTA_EXHAUSTED_CODE)
                || QUOTA_EXHAUSTED_NAMES.iter().any(|n| s.eq_ignore_ascii_case(n))
        }
        _ => false,
    }
}

/// True when the vendor put a non-null `error` member in an otherwise 2xx body.
pub fn reports_error(body: &Value) -> bool {
    body.get("error").is_some_and(|e| !e.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quota_detected_in_top_level_and_nested_code() {
        assert!(is_quota_exhausted(&json!({ "code": 10007, "message": "limit" })));
        assert!(is_quota_exhausted(&json!({ "error": { "code": "quota_exceeded" } })));
        assert!(is_quota_exhausted(&json!({ "error": { "code": "10007" } })));
    }

    #[test]
    fn other_codes_are_not_quota() {
        assert!(!is_quota_exhausted(&json!({ "code": 100 })));
        assert!(!is_quota_exhausted(&json!({ "error": { "code": "invalid_avatar" } })));
        assert!(!is_quota_exhausted(&json!("plain")));
    }

    #[test]
    fn null_error_is_not_reported() {
        assert!(!reports_error(&json!({ "error": null, "data": {} })));
        assert!(reports_error(&json!({ "error": { "message": "nope" } })));
    }
}
