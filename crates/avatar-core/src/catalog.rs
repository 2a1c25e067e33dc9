//! Read-only avatar and voice descriptors as the vendor lists them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A streaming-capable avatar. Fields this crate does not interpret are kept in
/// `extra` so the listing round-trips verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvatarDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    /// Older listing shape names the identifier `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AvatarDescriptor {
    /// `avatar_id`, falling back to `id`. Blank values count as absent.
    pub fn identifier(&self) -> Option<&str> {
        non_blank(self.avatar_id.as_deref()).or_else(|| non_blank(self.id.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    #[serde(default)]
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_locale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_interactive_avatar: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VoiceDescriptor {
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or("N/A")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifier_prefers_avatar_id_then_id() {
        let a: AvatarDescriptor =
            serde_json::from_value(json!({ "avatar_id": "a1", "id": "legacy" })).unwrap();
        assert_eq!(a.identifier(), Some("a1"));

        let b: AvatarDescriptor = serde_json::from_value(json!({ "id": "legacy" })).unwrap();
        assert_eq!(b.identifier(), Some("legacy"));

        let c: AvatarDescriptor = serde_json::from_value(json!({ "avatar_id": "  " })).unwrap();
        assert_eq!(c.identifier(), None);

        let d: AvatarDescriptor =
            serde_json::from_value(json!({ "avatar_id": "", "id": "legacy" })).unwrap();
        assert_eq!(d.identifier(), Some("legacy"));
    }

    #[test]
    fn unknown_fields_are_kept() {
        let a: AvatarDescriptor = serde_json::from_value(json!({
            "avatar_id": "a1",
            "status": "ACTIVE",
            "gender": "female"
        }))
        .unwrap();
        assert_eq!(a.status.as_deref(), Some("ACTIVE"));
        assert_eq!(a.extra.get("gender"), Some(&json!("female")));
        let back = serde_json::to_value(&a).unwrap();
        assert_eq!(back["gender"], "female");
    }

    #[test]
    fn voice_label_falls_back() {
        let v: VoiceDescriptor =
            serde_json::from_value(json!({ "voice_id": "v1", "display_name": "Ana" })).unwrap();
        assert_eq!(v.label(), "Ana");
        let w: VoiceDescriptor = serde_json::from_value(json!({ "voice_id": "v2" })).unwrap();
        assert_eq!(w.label(), "N/A");
    }
}
