//! Core continuation logic for the CamPort web-to-native bridge.
//!
//! A web-layer client invokes the photo capture capability; fulfillment is
//! handed to an external camera application and the result arrives later
//! through asynchronous host callbacks. This crate owns the pending-call
//! lifecycle, the permission/launch decision tree, and the
//! result-correlation protocol; the host platform and storage collaborator
//! sit behind trait seams.

pub mod capability;
pub mod correlation;
pub mod error;
pub mod gate;
pub mod host;
pub mod launch;
pub mod logging;
pub mod model;
pub mod pending;
pub mod plugin;

pub use capability::{
    capability_descriptor, parse_capability, Capability, CapabilityDescriptor,
    CapabilityParseError, PermissionId,
};
pub use correlation::{
    correlation_descriptor, CallbackKind, CorrelationCode, CorrelationDescriptor,
};
pub use error::{BridgeError, StorageError};
pub use gate::GateOutcome;
pub use host::{ActionDescriptor, FsMediaStorage, HostBridge, MediaStorage};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::call::{CallId, CallState, CapabilityCall, CaptureOutcome, OutcomeSink};
pub use model::options::PhotoOptions;
pub use pending::{PendingEntry, SessionId};
pub use plugin::CameraPlugin;

/// Minimal health-check API for early bridge integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
