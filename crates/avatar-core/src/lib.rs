//! avatar-core: client for a streaming-avatar vendor API.
//!
//! Builds API-key and bearer-token requests, classifies vendor failures, picks the
//! avatar/voice for a new session, and keeps the process-local map of open sessions.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod resolution;
pub mod session;
pub mod telemetry;
pub mod transport;
pub mod vendor;

pub use catalog::{AvatarDescriptor, VoiceDescriptor};
pub use client::{Ack, SessionInfo, StreamingClient, TaskType};
pub use config::{AvatarConfig, LanguageEntry, SessionOptions, TimeoutConfig};
pub use error::{AvatarError, AvatarResult};
pub use registry::{SessionRegistry, SessionToken};
pub use resolution::{Overrides, ResolutionPolicy, Resolved};
pub use session::{AvatarSessions, StopOutcome};
pub use transport::{Auth, HttpMethod, HttpTransport, Transport, VendorRequest, VendorResponse};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
