//! Session lifecycle: resolve, open and start sessions, route speech to them, and stop
//! them with unconditional registry cleanup.

use std::sync::Arc;

use crate::catalog::{AvatarDescriptor, VoiceDescriptor};
use crate::client::{Ack, SessionInfo, StreamingClient, TaskType};
use crate::config::AvatarConfig;
use crate::error::AvatarResult;
use crate::registry::SessionRegistry;
use crate::resolution::{Overrides, ResolutionPolicy};
use crate::transport::{HttpTransport, Transport};

/// Result of a stop request.
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// Vendor acknowledged the stop.
    Stopped(Ack),
    /// No local record for the id; nothing was sent.
    AlreadyClosed,
}

pub struct AvatarSessions {
    client: StreamingClient,
    registry: Arc<SessionRegistry>,
    policy: ResolutionPolicy,
}

impl AvatarSessions {
    pub fn new(client: StreamingClient, registry: Arc<SessionRegistry>, policy: ResolutionPolicy) -> Self {
        Self { client, registry, policy }
    }

    /// Production wiring: reqwest transport, timeouts and session options from `cfg`.
    pub fn from_config(cfg: &AvatarConfig, registry: Arc<SessionRegistry>) -> AvatarResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&cfg.base_url, &cfg.api_key)?);
        Ok(Self::with_transport(cfg, transport, registry))
    }

    pub fn with_transport(
        cfg: &AvatarConfig,
        transport: Arc<dyn Transport>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        let client = StreamingClient::new(transport)
            .with_timeouts(cfg.timeouts.clone())
            .with_session_options(cfg.session.clone());
        Self::new(client, registry, ResolutionPolicy::from_config(cfg))
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn client(&self) -> &StreamingClient {
        &self.client
    }

    /// Resolve, mint, open, start, then record. A failure at any step leaves the
    /// registry untouched.
    pub async fn create(&self, overrides: &Overrides) -> AvatarResult<SessionInfo> {
        let resolved = self.policy.resolve(overrides, &self.client).await?;
        let token = self.client.mint_session_token().await?;
        let info = self
            .client
            .open_session(&token, &resolved.avatar_id, resolved.voice_id.as_deref())
            .await?;
        self.client.start_session(&token, &info.session_id).await?;
        self.registry.put(info.session_id.clone(), token);
        tracing::info!(
            session_id = %info.session_id,
            avatar_id = %resolved.avatar_id,
            voice_id = ?resolved.voice_id,
            "session started"
        );
        Ok(info)
    }

    /// Verbatim speech for an open session. Unknown ids never reach the vendor.
    pub async fn talk(&self, session_id: &str, text: &str) -> AvatarResult<Ack> {
        let token = self.registry.require(session_id)?;
        self.client
            .send_speech_task(&token, session_id, text, TaskType::Repeat)
            .await
    }

    /// Stop a session. The local record is removed whatever the vendor answers.
    pub async fn stop(&self, session_id: &str) -> AvatarResult<StopOutcome> {
        let Some(token) = self.registry.get(session_id) else {
            tracing::debug!(%session_id, "stop for unknown session; treating as closed");
            return Ok(StopOutcome::AlreadyClosed);
        };
        let result = self.client.stop_session(&token, session_id).await;
        self.registry.remove(session_id);
        match result {
            Ok(ack) => {
                tracing::info!(%session_id, "session stopped");
                Ok(StopOutcome::Stopped(ack))
            }
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "vendor stop failed; local record dropped");
                Err(e)
            }
        }
    }

    pub async fn avatars(&self) -> AvatarResult<Vec<AvatarDescriptor>> {
        self.client.list_avatars().await
    }

    pub async fn voices(&self) -> AvatarResult<Vec<VoiceDescriptor>> {
        self.client.list_voices().await
    }
}
