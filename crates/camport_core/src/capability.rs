//! Device capability declarations for the web-to-native bridge.
//!
//! # Responsibility
//! - Define the capabilities this bridge exposes to the web layer.
//! - Bind each capability to the OS permissions and correlation codes it
//!   may use, as declarative metadata.
//!
//! # Invariants
//! - Capability string ids are stable wire values.
//! - At most one live invocation may use a given correlation code at a
//!   time within a session; descriptors declare ownership of codes.

use crate::correlation::CorrelationCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Device feature exposed to the web-layer client through this bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    PhotoCapture,
}

impl Capability {
    /// Stable string id used in bridge method registration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PhotoCapture => CAPABILITY_PHOTO_CAPTURE,
        }
    }

    /// Client-facing method name bound to this capability.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::PhotoCapture => "camera.getPhoto",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable id value for the photo capture capability.
pub const CAPABILITY_PHOTO_CAPTURE: &str = "photo_capture";

/// OS-level permission underlying a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PermissionId {
    Camera,
}

impl PermissionId {
    /// Stable permission id forwarded to the host.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
        }
    }
}

impl Display for PermissionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative metadata binding one capability to its permissions and the
/// correlation codes its asynchronous flows are allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub capability: Capability,
    pub permissions: &'static [PermissionId],
    pub correlation_codes: &'static [CorrelationCode],
}

impl CapabilityDescriptor {
    /// Primary correlation code tagging this capability's callbacks.
    pub fn primary_code(&self) -> CorrelationCode {
        self.correlation_codes[0]
    }
}

const PHOTO_CAPTURE_DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor {
    capability: Capability::PhotoCapture,
    permissions: &[PermissionId::Camera],
    correlation_codes: &[CorrelationCode::ImageCapture],
};

/// Returns the static descriptor for one capability.
pub fn capability_descriptor(capability: Capability) -> &'static CapabilityDescriptor {
    match capability {
        Capability::PhotoCapture => &PHOTO_CAPTURE_DESCRIPTOR,
    }
}

/// Parses one capability from its stable string id.
pub fn parse_capability(value: &str) -> Result<Capability, CapabilityParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(CapabilityParseError::EmptyCapability);
    }

    match normalized {
        CAPABILITY_PHOTO_CAPTURE => Ok(Capability::PhotoCapture),
        other => Err(CapabilityParseError::UnsupportedCapability(
            other.to_string(),
        )),
    }
}

/// Capability id parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityParseError {
    EmptyCapability,
    UnsupportedCapability(String),
}

impl Display for CapabilityParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCapability => write!(f, "capability id must not be empty"),
            Self::UnsupportedCapability(value) => {
                write!(f, "capability is unsupported: {value}")
            }
        }
    }
}

impl Error for CapabilityParseError {}

#[cfg(test)]
mod tests {
    use super::{
        capability_descriptor, parse_capability, Capability, CapabilityParseError, PermissionId,
    };
    use crate::correlation::CorrelationCode;

    #[test]
    fn parses_photo_capture_capability() {
        assert_eq!(
            parse_capability("photo_capture").expect("photo_capture parse"),
            Capability::PhotoCapture
        );
    }

    #[test]
    fn rejects_empty_capability_id() {
        let err = parse_capability("   ").expect_err("empty capability must fail");
        assert_eq!(err, CapabilityParseError::EmptyCapability);
    }

    #[test]
    fn rejects_unsupported_capability_id() {
        let err = parse_capability("microphone").expect_err("unsupported capability must fail");
        assert_eq!(
            err,
            CapabilityParseError::UnsupportedCapability("microphone".to_string())
        );
    }

    #[test]
    fn photo_capture_descriptor_declares_camera_permission_and_code() {
        let descriptor = capability_descriptor(Capability::PhotoCapture);
        assert_eq!(descriptor.permissions, &[PermissionId::Camera]);
        assert_eq!(descriptor.primary_code(), CorrelationCode::ImageCapture);
    }

    #[test]
    fn capability_binds_client_method_name() {
        assert_eq!(Capability::PhotoCapture.method_name(), "camera.getPhoto");
    }
}
