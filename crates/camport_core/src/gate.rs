//! Permission gate for capability execution.
//!
//! # Responsibility
//! - Decide whether a capability may proceed synchronously or must first
//!   request OS permissions from the host.
//!
//! # Invariants
//! - All-or-nothing: every permission in the descriptor must be held for
//!   `Granted`; partial grants never unlock partial capability.
//! - Resumption is push-based. After `Requested` the caller suspends and
//!   waits for the host's permission-result callback; no polling.

use crate::capability::CapabilityDescriptor;
use crate::host::HostBridge;
use log::info;

/// Outcome of a permission gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// All permissions held; the caller proceeds synchronously.
    Granted,
    /// One or more permission requests were dispatched; the caller must
    /// suspend until the correlated permission-result callback arrives.
    Requested,
}

/// Checks the descriptor's permissions, requesting any that are missing.
///
/// Missing permissions are requested tagged with the capability's primary
/// correlation code so the result callback can be matched back to the
/// suspended invocation.
pub fn ensure<H: HostBridge>(host: &H, descriptor: &CapabilityDescriptor) -> GateOutcome {
    let missing: Vec<_> = descriptor
        .permissions
        .iter()
        .copied()
        .filter(|permission| !host.has_permission(*permission))
        .collect();

    if missing.is_empty() {
        return GateOutcome::Granted;
    }

    let code = descriptor.primary_code();
    for permission in missing {
        info!(
            "event=permission_requested module=gate status=pending capability={} permission={} code={}",
            descriptor.capability, permission, code
        );
        host.request_permission(permission, code);
    }
    GateOutcome::Requested
}

#[cfg(test)]
mod tests {
    use super::{ensure, GateOutcome};
    use crate::capability::{capability_descriptor, Capability, PermissionId};
    use crate::correlation::CorrelationCode;
    use crate::host::{ActionDescriptor, HostBridge};
    use std::path::Path;
    use std::sync::Mutex;

    struct FakeHost {
        granted: bool,
        requests: Mutex<Vec<(PermissionId, CorrelationCode)>>,
    }

    impl FakeHost {
        fn new(granted: bool) -> Self {
            Self {
                granted,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl HostBridge for FakeHost {
        fn has_capability(&self, _capability: Capability) -> bool {
            true
        }

        fn has_permission(&self, _permission: PermissionId) -> bool {
            self.granted
        }

        fn request_permission(&self, permission: PermissionId, code: CorrelationCode) {
            self.requests
                .lock()
                .expect("requests lock")
                .push((permission, code));
        }

        fn can_resolve(&self, _action: &ActionDescriptor) -> bool {
            true
        }

        fn launch_external(&self, _action: &ActionDescriptor, _output: &Path, _code: CorrelationCode) {
        }
    }

    #[test]
    fn granted_permissions_skip_host_request() {
        let host = FakeHost::new(true);
        let descriptor = capability_descriptor(Capability::PhotoCapture);

        assert_eq!(ensure(&host, descriptor), GateOutcome::Granted);
        assert!(host.requests.lock().expect("requests lock").is_empty());
    }

    #[test]
    fn missing_permission_is_requested_with_capability_code() {
        let host = FakeHost::new(false);
        let descriptor = capability_descriptor(Capability::PhotoCapture);

        assert_eq!(ensure(&host, descriptor), GateOutcome::Requested);
        let requests = host.requests.lock().expect("requests lock");
        assert_eq!(
            requests.as_slice(),
            [(PermissionId::Camera, CorrelationCode::ImageCapture)]
        );
    }
}
