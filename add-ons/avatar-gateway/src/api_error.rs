//! Maps [`AvatarError`] kinds onto stable HTTP statuses and messages. Vendor payloads
//! are logged here and never sent to the caller.

use avatar_core::AvatarError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug)]
pub struct ApiError(pub AvatarError);

impl From<AvatarError> for ApiError {
    fn from(err: AvatarError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AvatarError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AvatarError::NotFound(_) => StatusCode::NOT_FOUND,
            AvatarError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AvatarError::NetworkUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AvatarError::Backend { .. } | AvatarError::Protocol { .. } => StatusCode::BAD_GATEWAY,
            AvatarError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing text. Local validation messages are ours and safe to echo.
    fn message(&self) -> String {
        match &self.0 {
            AvatarError::InvalidArgument(m) => m.clone(),
            AvatarError::NotFound(m) => m.clone(),
            AvatarError::QuotaExceeded(_) => "Avatar quota exhausted; try again later".to_string(),
            AvatarError::NetworkUnavailable(_) => "Avatar service unreachable".to_string(),
            AvatarError::Backend { .. } => "Avatar service reported an error".to_string(),
            AvatarError::Protocol { .. } => "Avatar service returned an unexpected response".to_string(),
            AvatarError::Config(_) => "Gateway misconfigured".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(kind = self.0.kind(), error = %self.0, "[AVATAR GATEWAY] request failed");
        } else {
            tracing::debug!(kind = self.0.kind(), error = %self.0, "[AVATAR GATEWAY] request rejected");
        }
        let body = serde_json::json!({
            "error": self.0.kind(),
            "message": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (AvatarError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (AvatarError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AvatarError::QuotaExceeded("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (AvatarError::NetworkUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AvatarError::Backend { status: 500, body: "x".into() }, StatusCode::BAD_GATEWAY),
            (AvatarError::Protocol { status: 200, detail: "x".into() }, StatusCode::BAD_GATEWAY),
            (AvatarError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn vendor_body_is_not_echoed() {
        let err = ApiError(AvatarError::Backend { status: 500, body: "secret vendor detail".into() });
        assert!(!err.message().contains("secret"));
    }
}
