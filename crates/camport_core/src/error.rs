//! Client-facing bridge error taxonomy.
//!
//! # Responsibility
//! - Define the terminal error outcomes deliverable to an invocation.
//! - Keep error codes stable for the web-layer client.
//!
//! # Invariants
//! - Every error is terminal: delivered at most once, never retried here.
//! - No error is fatal to the component; later invocations must work.
//! - Stale callbacks are logged, never surfaced through this taxonomy.

use crate::capability::Capability;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Terminal error outcome for one capability invocation.
#[derive(Debug)]
pub enum BridgeError {
    /// Device lacks the requested capability.
    CapabilityUnavailable(Capability),
    /// User declined the underlying OS permission request.
    PermissionDenied,
    /// No external application can service the requested action.
    NoHandler,
    /// Output side-channel (storage) setup failed before dispatch.
    OutputPreparation(StorageError),
    /// User aborted the external flow, or it failed.
    ExternalCancelled,
    /// Another invocation of this capability is already pending.
    CapabilityBusy,
    /// Client option payload was malformed or out of range.
    InvalidOptions(String),
}

impl BridgeError {
    /// Stable error code surfaced to the web-layer client.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CapabilityUnavailable(_) => "capability_unavailable",
            Self::PermissionDenied => "permission_denied",
            Self::NoHandler => "no_handler",
            Self::OutputPreparation(_) => "output_preparation",
            Self::ExternalCancelled => "external_cancelled",
            Self::CapabilityBusy => "capability_busy",
            Self::InvalidOptions(_) => "invalid_options",
        }
    }
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapabilityUnavailable(capability) => {
                write!(f, "device does not provide capability: {capability}")
            }
            Self::PermissionDenied => {
                write!(f, "unable to use capability, user denied permission request")
            }
            Self::NoHandler => write!(f, "no external application can handle the request"),
            Self::OutputPreparation(err) => {
                write!(f, "unable to prepare output location: {err}")
            }
            Self::ExternalCancelled => write!(f, "external application cancelled the request"),
            Self::CapabilityBusy => {
                write!(f, "a capability invocation is already pending")
            }
            Self::InvalidOptions(message) => write!(f, "invalid invocation options: {message}"),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutputPreparation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for BridgeError {
    fn from(value: StorageError) -> Self {
        Self::OutputPreparation(value)
    }
}

/// Storage collaborator errors for output side-channel setup.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage io failure: {err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{BridgeError, StorageError};
    use crate::capability::Capability;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            BridgeError::CapabilityUnavailable(Capability::PhotoCapture).code(),
            "capability_unavailable"
        );
        assert_eq!(BridgeError::PermissionDenied.code(), "permission_denied");
        assert_eq!(BridgeError::NoHandler.code(), "no_handler");
        assert_eq!(
            BridgeError::OutputPreparation(StorageError::Unavailable("full".to_string())).code(),
            "output_preparation"
        );
        assert_eq!(BridgeError::ExternalCancelled.code(), "external_cancelled");
        assert_eq!(BridgeError::CapabilityBusy.code(), "capability_busy");
        assert_eq!(
            BridgeError::InvalidOptions("quality".to_string()).code(),
            "invalid_options"
        );
    }

    #[test]
    fn output_preparation_chains_storage_source() {
        use std::error::Error;

        let err = BridgeError::from(StorageError::Unavailable("no sdcard".to_string()));
        let source = err.source().expect("storage source");
        assert!(source.to_string().contains("no sdcard"));
    }
}
