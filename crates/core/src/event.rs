//! Registry notification events.
//!
//! The registry posts batches of lifecycle events wrapped in an envelope:
//!
//! ```json
//! {"events": [{"id": "...", "timestamp": "...", "action": "push",
//!   "target": {"mediaType": "...", "repository": "library/app",
//!              "digest": "sha256:...", "url": ".../manifests/latest"}}]}
//! ```
//!
//! Only `action` and `target` drive the index; the request, actor, and source
//! blocks are carried through untouched.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Media type of a schema 1 image manifest.
pub const MANIFEST_MEDIA_TYPE: &str = "application/vnd.docker.distribution.manifest.v1+json";

/// Media type of a signed schema 1 image manifest.
pub const SIGNED_MANIFEST_MEDIA_TYPE: &str =
    "application/vnd.docker.distribution.manifest.v1+prettyjws";

/// Media type of a notification envelope.
pub const EVENTS_MEDIA_TYPE: &str = "application/vnd.docker.distribution.events.v1+json";

/// Lifecycle action carried by an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Push,
    Delete,
    /// Any other action (pulls, mounts, actions added by newer registries).
    #[default]
    #[serde(other)]
    Other,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Delete => "delete",
            Self::Other => "other",
        }
    }
}

/// Descriptor of the artifact an event refers to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<i64>,
}

impl Target {
    /// Whether the target is a top-level manifest rather than a layer blob.
    pub fn is_manifest(&self) -> bool {
        self.media_type == MANIFEST_MEDIA_TYPE || self.media_type == SIGNED_MANIFEST_MEDIA_TYPE
    }

    /// Tag name addressed by this target's URL.
    pub fn tag(&self) -> &str {
        tag_from_url(&self.url)
    }
}

/// A single registry notification.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default)]
    pub action: EventAction,
    #[serde(default)]
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
}

impl Event {
    /// Build a bare event for the given action and target.
    pub fn new(action: EventAction, target: Target) -> Self {
        Self {
            action,
            target,
            ..Default::default()
        }
    }
}

/// Batch of events as delivered by the registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Envelope {
    /// Decode an envelope from a request body.
    pub fn from_json(body: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(body).map_err(|e| crate::Error::InvalidEvent(e.to_string()))
    }
}

/// Derive the tag name from a manifest URL.
///
/// The tag is the final `/`-separated segment; a URL without any `/` yields
/// an empty tag name.
pub fn tag_from_url(url: &str) -> &str {
    match url.rsplit_once('/') {
        Some((_, tag)) => tag,
        None => "",
    }
}
