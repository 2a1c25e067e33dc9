//! Avatar session endpoints: thin pass-throughs to [`AvatarSessions`].

use std::sync::Arc;

use avatar_core::{AvatarDescriptor, AvatarError, AvatarSessions, Overrides, StopOutcome};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api_error::ApiError;

pub type AppState = Arc<AvatarSessions>;

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub livekit_url: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct TalkRequest {
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub session_id: String,
}

/// POST /api/avatar/session. Body is optional; when present it must be a valid
/// override object, so a rejected payload never falls back to the defaults.
pub async fn create_session(
    State(sessions): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let overrides = parse_overrides(&body)?;
    let info = sessions.create(&overrides).await?;
    Ok(Json(CreateSessionResponse {
        session_id: info.session_id,
        livekit_url: info.media_url,
        access_token: info.media_access_token,
    }))
}

fn parse_overrides(body: &[u8]) -> Result<Overrides, AvatarError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Overrides::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AvatarError::InvalidArgument(format!("invalid session request: {}", e)))
}

/// POST /api/avatar/talk. Unknown session ids are 404 without a vendor call.
pub async fn talk(
    State(sessions): State<AppState>,
    Json(req): Json<TalkRequest>,
) -> Result<Json<Value>, ApiError> {
    let ack = sessions.talk(&req.session_id, &req.text).await?;
    Ok(Json(ack))
}

/// POST /api/avatar/stop. Unknown ids report `already_closed`.
pub async fn stop(
    State(sessions): State<AppState>,
    Json(req): Json<StopRequest>,
) -> Result<Json<Value>, ApiError> {
    match sessions.stop(&req.session_id).await? {
        StopOutcome::Stopped(ack) => Ok(Json(ack)),
        StopOutcome::AlreadyClosed => Ok(Json(serde_json::json!({ "status": "already_closed" }))),
    }
}

/// GET /api/avatar/avatars
pub async fn list_avatars(
    State(sessions): State<AppState>,
) -> Result<Json<Vec<AvatarDescriptor>>, ApiError> {
    Ok(Json(sessions.avatars().await?))
}
