//! Correlation codes linking host callbacks to capability flows.
//!
//! # Responsibility
//! - Define the discrete tokens tagging asynchronous host callbacks.
//! - Provide the static dispatch table mapping each code to its owning
//!   capability and the callback kinds it may legally carry.
//!
//! # Invariants
//! - Raw wire values are stable; `ImageCapture` keeps the historical 9001.
//! - Unknown raw codes parse to `None` and must be dropped by dispatchers,
//!   never panicked on.

use crate::capability::Capability;
use std::fmt::{Display, Formatter};

/// Token that identifies why an asynchronous host callback is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum CorrelationCode {
    /// Image capture flow: permission request and external camera launch.
    ImageCapture = 9001,
}

impl CorrelationCode {
    /// Raw wire value exchanged with the host.
    pub fn as_raw(self) -> u32 {
        self as u32
    }

    /// Parses one correlation code from its raw wire value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            9001 => Some(Self::ImageCapture),
            _ => None,
        }
    }
}

impl Display for CorrelationCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

/// Kind of asynchronous host callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallbackKind {
    PermissionResult,
    ExternalResult,
}

/// Dispatch table entry for one correlation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationDescriptor {
    pub code: CorrelationCode,
    pub capability: Capability,
    pub expected: &'static [CallbackKind],
}

impl CorrelationDescriptor {
    /// Returns whether `kind` is a legal callback for this code.
    pub fn expects(&self, kind: CallbackKind) -> bool {
        self.expected.contains(&kind)
    }
}

const IMAGE_CAPTURE_DESCRIPTOR: CorrelationDescriptor = CorrelationDescriptor {
    code: CorrelationCode::ImageCapture,
    capability: Capability::PhotoCapture,
    expected: &[CallbackKind::PermissionResult, CallbackKind::ExternalResult],
};

/// Returns the static dispatch entry for one correlation code.
pub fn correlation_descriptor(code: CorrelationCode) -> &'static CorrelationDescriptor {
    match code {
        CorrelationCode::ImageCapture => &IMAGE_CAPTURE_DESCRIPTOR,
    }
}
