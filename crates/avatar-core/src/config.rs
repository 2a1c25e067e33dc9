//! Avatar relay configuration.
//!
//! Loaded once at process start. Precedence, lowest first: built-in defaults, TOML file
//! (`AVATAR_CONFIG` path or `config/avatar.toml`), `AVATAR__*` environment, then the flat
//! variable names:
//!
//! | Env | Field |
//! |-----|-------|
//! | HEYGEN_API_KEY | api_key |
//! | HEYGEN_BASE_URL | base_url |
//! | DEFAULT_LANG | default_language |
//! | AVATAR_ID / VOICE_ID | default_avatar_id / default_voice_id |
//! | `<LANG>_AVATAR_ID` / `<LANG>_VOICE_ID` | languages.`<lang>` |

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AvatarError, AvatarResult};
use crate::vendor;

const DEFAULT_CONFIG_PATH: &str = "config/avatar";

/// Avatar and voice preference for one language. Both halves are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    #[serde(default)]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
}

/// Per-endpoint request timeouts in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Token minting and listings.
    #[serde(default = "default_account_secs")]
    pub account_secs: u64,
    #[serde(default = "default_open_secs")]
    pub open_secs: u64,
    /// Start and stop.
    #[serde(default = "default_control_secs")]
    pub control_secs: u64,
    #[serde(default = "default_task_secs")]
    pub task_secs: u64,
}

fn default_account_secs() -> u64 {
    10
}

fn default_open_secs() -> u64 {
    30
}

fn default_control_secs() -> u64 {
    15
}

fn default_task_secs() -> u64 {
    30
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            account_secs: default_account_secs(),
            open_secs: default_open_secs(),
            control_secs: default_control_secs(),
            task_secs: default_task_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn account(&self) -> Duration {
        Duration::from_secs(self.account_secs)
    }

    pub fn open(&self) -> Duration {
        Duration::from_secs(self.open_secs)
    }

    pub fn control(&self) -> Duration {
        Duration::from_secs(self.control_secs)
    }

    pub fn task(&self) -> Duration {
        Duration::from_secs(self.task_secs)
    }
}

/// Parameters sent with every `streaming.new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_idle_timeout")]
    pub activity_idle_timeout_secs: u64,
}

fn default_quality() -> String {
    vendor::DEFAULT_QUALITY.to_string()
}

fn default_version() -> String {
    vendor::DEFAULT_VERSION.to_string()
}

fn default_idle_timeout() -> u64 {
    vendor::DEFAULT_ACTIVITY_IDLE_TIMEOUT_SECS
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            version: default_version(),
            activity_idle_timeout_secs: default_idle_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Language whose table entry is consulted when a request names none.
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default)]
    pub default_avatar_id: Option<String>,
    #[serde(default)]
    pub default_voice_id: Option<String>,
    /// Keyed by lowercase language code.
    #[serde(default)]
    pub languages: HashMap<String, LanguageEntry>,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub session: SessionOptions,
}

fn default_base_url() -> String {
    vendor::DEFAULT_BASE_URL.to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            default_language: default_language(),
            default_avatar_id: None,
            default_voice_id: None,
            languages: HashMap::new(),
            bind_addr: default_bind_addr(),
            timeouts: TimeoutConfig::default(),
            session: SessionOptions::default(),
        }
    }
}

impl AvatarConfig {
    /// Load from file and the process environment, then validate.
    pub fn load() -> AvatarResult<Self> {
        let path = std::env::var("AVATAR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let vars: Vec<(String, String)> = std::env::vars().collect();
        Self::load_from(Path::new(&path), &vars)
    }

    /// Same as [`load`](Self::load) with an explicit file and variable set.
    pub fn load_from(path: &Path, vars: &[(String, String)]) -> AvatarResult<Self> {
        let builder = config::Config::builder();
        let builder = if path.exists() || path.with_extension("toml").exists() {
            builder.add_source(config::File::from(path).required(false))
        } else {
            builder
        };

        let env_source = config::Environment::with_prefix("AVATAR")
            .separator("__")
            .source(Some(vars.iter().cloned().collect()));
        let mut builder = builder.add_source(env_source);

        let lookup = |name: &str| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        builder = builder
            .set_override_option("api_key", lookup("HEYGEN_API_KEY"))?
            .set_override_option("base_url", lookup("HEYGEN_BASE_URL"))?
            .set_override_option("default_language", lookup("DEFAULT_LANG"))?
            .set_override_option("default_avatar_id", lookup("AVATAR_ID"))?
            .set_override_option("default_voice_id", lookup("VOICE_ID"))?;

        for (key, value) in vars {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if let Some((lang, field)) = language_override(key) {
                builder = builder.set_override(format!("languages.{}.{}", lang, field), value)?;
            }
        }

        let mut cfg: AvatarConfig = builder.build()?.try_deserialize()?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AvatarResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(AvatarError::Config(
                "HEYGEN_API_KEY (or api_key) is required".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(AvatarError::Config("base_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// Lowercase language codes and drop blank identifiers so "unset" has one spelling.
    fn normalize(&mut self) {
        self.default_language = self.default_language.trim().to_lowercase();
        self.default_avatar_id = non_blank(self.default_avatar_id.take());
        self.default_voice_id = non_blank(self.default_voice_id.take());
        self.languages = std::mem::take(&mut self.languages)
            .into_iter()
            .map(|(lang, entry)| {
                (
                    lang.trim().to_lowercase(),
                    LanguageEntry {
                        avatar_id: non_blank(entry.avatar_id),
                        voice_id: non_blank(entry.voice_id),
                    },
                )
            })
            .collect();
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// `FA_AVATAR_ID` -> `("fa", "avatar_id")`. Only 2–3 letter prefixes count as languages.
fn language_override(key: &str) -> Option<(String, &'static str)> {
    let (prefix, field) = if let Some(p) = key.strip_suffix("_AVATAR_ID") {
        (p, "avatar_id")
    } else if let Some(p) = key.strip_suffix("_VOICE_ID") {
        (p, "voice_id")
    } else {
        return None;
    };
    let is_lang = (2..=3).contains(&prefix.len()) && prefix.chars().all(|c| c.is_ascii_alphabetic());
    is_lang.then(|| (prefix.to_lowercase(), field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn missing_file() -> &'static Path {
        Path::new("/nonexistent/avatar-config")
    }

    #[test]
    fn flat_env_names_are_honoured() {
        let cfg = AvatarConfig::load_from(
            missing_file(),
            &vars(&[
                ("HEYGEN_API_KEY", "k"),
                ("DEFAULT_LANG", "FA"),
                ("AVATAR_ID", "global-avatar"),
                ("VOICE_ID", " "),
                ("FA_AVATAR_ID", "fa-avatar"),
                ("ZH_VOICE_ID", "zh-voice"),
                ("PATH", "/usr/bin"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.api_key, "k");
        assert_eq!(cfg.default_language, "fa");
        assert_eq!(cfg.default_avatar_id.as_deref(), Some("global-avatar"));
        assert_eq!(cfg.default_voice_id, None);
        assert_eq!(cfg.languages["fa"].avatar_id.as_deref(), Some("fa-avatar"));
        assert_eq!(cfg.languages["zh"].voice_id.as_deref(), Some("zh-voice"));
        assert_eq!(cfg.base_url, vendor::DEFAULT_BASE_URL);
        assert_eq!(cfg.timeouts, TimeoutConfig::default());
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let err = AvatarConfig::load_from(missing_file(), &[]).unwrap_err();
        assert!(matches!(err, AvatarError::Config(_)));
    }

    #[test]
    fn toml_file_and_prefixed_env() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
api_key = "from-file"
default_language = "en"
bind_addr = "0.0.0.0:9000"

[languages.en]
avatar_id = "en-avatar"
voice_id = "en-voice"

[timeouts]
open_secs = 45
"#
        )
        .unwrap();

        let cfg = AvatarConfig::load_from(
            file.path(),
            &vars(&[("AVATAR__DEFAULT_VOICE_ID", "env-voice")]),
        )
        .unwrap();
        assert_eq!(cfg.api_key, "from-file");
        assert_eq!(cfg.bind_addr, "0.0.0.0:9000");
        assert_eq!(cfg.languages["en"].avatar_id.as_deref(), Some("en-avatar"));
        assert_eq!(cfg.default_voice_id.as_deref(), Some("env-voice"));
        assert_eq!(cfg.timeouts.open_secs, 45);
        assert_eq!(cfg.timeouts.task_secs, 30);
    }

    #[test]
    fn language_override_rejects_non_language_prefixes() {
        assert_eq!(language_override("EN_AVATAR_ID"), Some(("en".to_string(), "avatar_id")));
        assert_eq!(language_override("AVATAR_ID"), None);
        assert_eq!(language_override("AVATAR__DEFAULT_AVATAR_ID"), None);
        assert_eq!(language_override("MY_APP_VOICE_ID"), None);
    }
}
