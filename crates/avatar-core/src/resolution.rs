//! Avatar/voice resolution. For each of avatar and voice the first non-empty value
//! wins: explicit override, language table entry, global default. An avatar that is
//! still unresolved falls back to the first entry of a fresh listing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::StreamingClient;
use crate::config::{AvatarConfig, LanguageEntry};
use crate::error::{AvatarError, AvatarResult};

/// Per-request choices. All optional; blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overrides {
    #[serde(default)]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
    /// Table key to use instead of the configured active language.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub avatar_id: String,
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolutionPolicy {
    pub active_language: String,
    pub languages: HashMap<String, LanguageEntry>,
    pub default_avatar_id: Option<String>,
    pub default_voice_id: Option<String>,
}

impl ResolutionPolicy {
    pub fn from_config(cfg: &AvatarConfig) -> Self {
        Self {
            active_language: cfg.default_language.clone(),
            languages: cfg.languages.clone(),
            default_avatar_id: cfg.default_avatar_id.clone(),
            default_voice_id: cfg.default_voice_id.clone(),
        }
    }

    /// Steps 1–3, no network. `None` avatar means the listing fallback is needed.
    pub fn preferred(&self, overrides: &Overrides) -> (Option<String>, Option<String>) {
        let language = first_non_empty([overrides.language.as_deref(), Some(self.active_language.as_str())])
            .map(|l| l.to_lowercase());
        let entry = language.as_deref().and_then(|l| self.languages.get(l));

        let avatar = first_non_empty([
            overrides.avatar_id.as_deref(),
            entry.and_then(|e| e.avatar_id.as_deref()),
            self.default_avatar_id.as_deref(),
        ]);
        let voice = first_non_empty([
            overrides.voice_id.as_deref(),
            entry.and_then(|e| e.voice_id.as_deref()),
            self.default_voice_id.as_deref(),
        ]);
        (avatar.map(str::to_string), voice.map(str::to_string))
    }

    /// Full resolution. Reaching step 4 always performs a new listing call.
    pub async fn resolve(&self, overrides: &Overrides, client: &StreamingClient) -> AvatarResult<Resolved> {
        let (avatar, voice_id) = self.preferred(overrides);
        let avatar_id = match avatar {
            Some(id) => id,
            None => {
                tracing::info!("no avatar configured; picking the first streaming avatar");
                let avatars = client.list_avatars().await?;
                let first = avatars.first().ok_or_else(|| {
                    AvatarError::NotFound("no streaming avatars available".to_string())
                })?;
                first
                    .identifier()
                    .map(str::to_string)
                    .ok_or_else(|| AvatarError::Protocol {
                        status: 200,
                        detail: "first avatar in listing has no avatar_id".to_string(),
                    })?
            }
        };
        tracing::debug!(%avatar_id, voice_id = ?voice_id, "resolved avatar");
        Ok(Resolved { avatar_id, voice_id })
    }
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}
