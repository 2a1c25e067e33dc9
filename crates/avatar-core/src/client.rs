//! Session client: the vendor operations, one round trip each, on top of a [`Transport`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{AvatarDescriptor, VoiceDescriptor};
use crate::config::{SessionOptions, TimeoutConfig};
use crate::error::{AvatarError, AvatarResult};
use crate::registry::SessionToken;
use crate::transport::{Auth, Transport, VendorRequest, VendorResponse};
use crate::vendor;

/// What the vendor returns when a session is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    /// Real-time media room URL.
    #[serde(rename = "url")]
    pub media_url: String,
    /// Credential for joining the media room from the browser.
    #[serde(rename = "access_token")]
    pub media_access_token: String,
}

/// How the avatar treats task text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Speak the text verbatim.
    #[default]
    Repeat,
    /// Let the vendor generate its own reply.
    Chat,
}

/// Vendor acknowledgement body, returned unchanged.
pub type Ack = Value;

pub struct StreamingClient {
    transport: Arc<dyn Transport>,
    timeouts: TimeoutConfig,
    session: SessionOptions,
}

impl StreamingClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            timeouts: TimeoutConfig::default(),
            session: SessionOptions::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_session_options(mut self, session: SessionOptions) -> Self {
        self.session = session;
        self
    }

    /// Streaming-capable avatars, `data` array verbatim. Not cached.
    pub async fn list_avatars(&self) -> AvatarResult<Vec<AvatarDescriptor>> {
        let res = self
            .transport
            .call(VendorRequest::get(
                vendor::AVATAR_LIST_PATH,
                Auth::ApiKey,
                self.timeouts.account(),
            ))
            .await?;
        reject_embedded_error(&res)?;
        match res.body.get("data") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => decode(res.status, data.clone(), "avatar list"),
        }
    }

    pub async fn list_voices(&self) -> AvatarResult<Vec<VoiceDescriptor>> {
        let res = self
            .transport
            .call(VendorRequest::get(
                vendor::VOICE_LIST_PATH,
                Auth::ApiKey,
                self.timeouts.account(),
            ))
            .await?;
        reject_embedded_error(&res)?;
        match res.body.pointer("/data/voices") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(voices) => decode(res.status, voices.clone(), "voice list"),
        }
    }

    /// Per-session bearer token, minted with the account API key.
    pub async fn mint_session_token(&self) -> AvatarResult<SessionToken> {
        let res = self
            .transport
            .call(VendorRequest::post(
                vendor::CREATE_TOKEN_PATH,
                Auth::ApiKey,
                None,
                self.timeouts.account(),
            ))
            .await?;
        reject_embedded_error(&res)?;
        res.body
            .pointer("/data/token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(SessionToken::new)
            .ok_or_else(|| AvatarError::Protocol {
                status: res.status,
                detail: "create_token returned no token".to_string(),
            })
    }

    pub async fn open_session(
        &self,
        token: &SessionToken,
        avatar_id: &str,
        voice_id: Option<&str>,
    ) -> AvatarResult<SessionInfo> {
        let mut payload = json!({
            "quality": self.session.quality,
            "version": self.session.version,
            "activity_idle_timeout": self.session.activity_idle_timeout_secs,
            "avatar_id": avatar_id,
        });
        if let Some(voice_id) = voice_id.filter(|v| !v.trim().is_empty()) {
            payload["voice"] = json!({ "voice_id": voice_id });
        }

        let res = self
            .transport
            .call(VendorRequest::post(
                vendor::SESSION_NEW_PATH,
                Auth::Bearer(token.clone()),
                Some(payload),
                self.timeouts.open(),
            ))
            .await?;

        if res.body.get("code").and_then(Value::as_i64) != Some(vendor::SUCCESS_CODE) {
            if vendor::is_quota_exhausted(&res.body) {
                return Err(AvatarError::QuotaExceeded(format!(
                    "streaming.new refused: {}",
                    res.body
                )));
            }
            return Err(AvatarError::Backend {
                status: res.status,
                body: format!("streaming.new failed: {}", res.body),
            });
        }
        let data = res.body.get("data").cloned().unwrap_or(Value::Null);
        decode(res.status, data, "session info")
    }

    /// Call once per session; the vendor does not promise idempotence.
    pub async fn start_session(&self, token: &SessionToken, session_id: &str) -> AvatarResult<Ack> {
        self.session_call(
            vendor::SESSION_START_PATH,
            token,
            json!({ "session_id": session_id }),
            self.timeouts.control(),
        )
        .await
    }

    /// Queue `text` for the avatar. Blank text fails before any network call.
    pub async fn send_speech_task(
        &self,
        token: &SessionToken,
        session_id: &str,
        text: &str,
        task_type: TaskType,
    ) -> AvatarResult<Ack> {
        if text.trim().is_empty() {
            return Err(AvatarError::InvalidArgument(
                "speech text must not be empty".to_string(),
            ));
        }
        self.session_call(
            vendor::SESSION_TASK_PATH,
            token,
            json!({
                "session_id": session_id,
                "text": text,
                "task_type": task_type,
                "task_mode": "async",
            }),
            self.timeouts.task(),
        )
        .await
    }

    pub async fn stop_session(&self, token: &SessionToken, session_id: &str) -> AvatarResult<Ack> {
        self.session_call(
            vendor::SESSION_STOP_PATH,
            token,
            json!({ "session_id": session_id }),
            self.timeouts.control(),
        )
        .await
    }

    async fn session_call(
        &self,
        path: &'static str,
        token: &SessionToken,
        body: Value,
        timeout: std::time::Duration,
    ) -> AvatarResult<Ack> {
        let res = self
            .transport
            .call(VendorRequest::post(path, Auth::Bearer(token.clone()), Some(body), timeout))
            .await?;
        reject_embedded_error(&res)?;
        Ok(res.body)
    }
}

fn reject_embedded_error(res: &VendorResponse) -> AvatarResult<()> {
    if vendor::reports_error(&res.body) {
        if vendor::is_quota_exhausted(&res.body) {
            return Err(AvatarError::QuotaExceeded(res.body.to_string()));
        }
        return Err(AvatarError::Backend {
            status: res.status,
            body: res.body.to_string(),
        });
    }
    Ok(())
}

fn decode<T: serde::de::DeserializeOwned>(status: u16, value: Value, what: &str) -> AvatarResult<T> {
    serde_json::from_value(value).map_err(|e| AvatarError::Protocol {
        status,
        detail: format!("malformed {}: {}", what, e),
    })
}
