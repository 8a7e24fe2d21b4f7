//! Capability invocation record and completion handle.
//!
//! # Responsibility
//! - Represent one logical client call from creation to resolution.
//! - Enforce the exactly-once terminal outcome contract on the handle.
//!
//! # Invariants
//! - A sink delivers exactly one terminal outcome; later attempts are
//!   logged and dropped, never delivered.
//! - The sink is shareable so a recreated component instance can resolve
//!   a call created by its predecessor.

use crate::capability::Capability;
use crate::error::BridgeError;
use crate::model::options::PhotoOptions;
use log::warn;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Stable identifier for one capability invocation.
pub type CallId = Uuid;

/// Success payload delivered when a capture flow completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureOutcome {
    /// Filesystem location of the captured photo.
    pub path: PathBuf,
    /// `file://` reference handed back to the web layer.
    pub uri: String,
    /// Whether gallery indexing was requested for this capture.
    pub saved_to_gallery: bool,
}

impl CaptureOutcome {
    pub fn new(path: PathBuf, saved_to_gallery: bool) -> Self {
        let uri = format!("file://{}", path.display());
        Self {
            path,
            uri,
            saved_to_gallery,
        }
    }
}

type OutcomeCallback = Box<dyn FnOnce(Result<CaptureOutcome, BridgeError>) + Send>;

enum SinkSlot {
    Pending(OutcomeCallback),
    Resolved,
}

/// Opaque completion handle delivering exactly one terminal outcome.
#[derive(Clone)]
pub struct OutcomeSink {
    call_id: CallId,
    slot: Arc<Mutex<SinkSlot>>,
}

impl OutcomeSink {
    /// Creates a sink wrapping the client delivery callback.
    pub fn new<F>(call_id: CallId, deliver: F) -> Self
    where
        F: FnOnce(Result<CaptureOutcome, BridgeError>) + Send + 'static,
    {
        Self {
            call_id,
            slot: Arc::new(Mutex::new(SinkSlot::Pending(Box::new(deliver)))),
        }
    }

    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    /// Delivers one terminal outcome to the client.
    ///
    /// Returns `true` when this call performed the delivery. A second
    /// resolution attempt is logged and dropped.
    pub fn resolve(&self, outcome: Result<CaptureOutcome, BridgeError>) -> bool {
        let taken = {
            let mut slot = self
                .slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, SinkSlot::Resolved)
        };

        match taken {
            SinkSlot::Pending(deliver) => {
                deliver(outcome);
                true
            }
            SinkSlot::Resolved => {
                warn!(
                    "event=duplicate_resolution module=call status=dropped call_id={}",
                    self.call_id
                );
                false
            }
        }
    }

    /// Shorthand for a successful terminal resolution.
    pub fn resolve_ok(&self, outcome: CaptureOutcome) -> bool {
        self.resolve(Ok(outcome))
    }

    /// Shorthand for an error terminal resolution.
    pub fn resolve_err(&self, error: BridgeError) -> bool {
        self.resolve(Err(error))
    }

    /// Returns whether a terminal outcome has been delivered.
    pub fn is_resolved(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*slot, SinkSlot::Resolved)
    }
}

impl std::fmt::Debug for OutcomeSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeSink")
            .field("call_id", &self.call_id)
            .field(
                "state",
                &if self.is_resolved() { "resolved" } else { "pending" },
            )
            .finish()
    }
}

/// One logical client invocation of a capability.
#[derive(Debug, Clone)]
pub struct CapabilityCall {
    pub id: CallId,
    pub capability: Capability,
    pub options: PhotoOptions,
    pub sink: OutcomeSink,
}

impl CapabilityCall {
    /// Creates a new invocation with a generated id.
    pub fn new<F>(capability: Capability, options: PhotoOptions, deliver: F) -> Self
    where
        F: FnOnce(Result<CaptureOutcome, BridgeError>) + Send + 'static,
    {
        let id = Uuid::new_v4();
        Self {
            id,
            capability,
            options,
            sink: OutcomeSink::new(id, deliver),
        }
    }
}

/// Suspension state of a pending invocation.
///
/// Created and resolved states are not represented: a call enters the
/// pending store only when it first suspends and leaves it on terminal
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    AwaitingPermission,
    AwaitingExternalResult,
}

impl Display for CallState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingPermission => write!(f, "awaiting_permission"),
            Self::AwaitingExternalResult => write!(f, "awaiting_external_result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CapabilityCall, CaptureOutcome, OutcomeSink};
    use crate::capability::Capability;
    use crate::error::BridgeError;
    use crate::model::options::PhotoOptions;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    fn recording_sink() -> (OutcomeSink, Arc<Mutex<Vec<String>>>) {
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&outcomes);
        let sink = OutcomeSink::new(Uuid::new_v4(), move |outcome| {
            let label = match outcome {
                Ok(result) => format!("ok:{}", result.uri),
                Err(err) => format!("err:{}", err.code()),
            };
            recorder.lock().expect("recorder lock").push(label);
        });
        (sink, outcomes)
    }

    #[test]
    fn sink_delivers_first_resolution_only() {
        let (sink, outcomes) = recording_sink();

        assert!(sink.resolve_ok(CaptureOutcome::new(PathBuf::from("/tmp/a.jpg"), true)));
        assert!(!sink.resolve_err(BridgeError::ExternalCancelled));
        assert!(sink.is_resolved());

        let delivered = outcomes.lock().expect("outcomes lock");
        assert_eq!(delivered.as_slice(), ["ok:file:///tmp/a.jpg"]);
    }

    #[test]
    fn cloned_sink_shares_resolution_state() {
        let (sink, outcomes) = recording_sink();
        let twin = sink.clone();

        assert!(twin.resolve_err(BridgeError::PermissionDenied));
        assert!(sink.is_resolved());
        assert!(!sink.resolve_err(BridgeError::NoHandler));

        let delivered = outcomes.lock().expect("outcomes lock");
        assert_eq!(delivered.as_slice(), ["err:permission_denied"]);
    }

    #[test]
    fn capture_outcome_builds_file_uri() {
        let outcome = CaptureOutcome::new(PathBuf::from("/data/pics/x.jpg"), false);
        assert_eq!(outcome.uri, "file:///data/pics/x.jpg");
        assert!(!outcome.saved_to_gallery);
    }

    #[test]
    fn new_call_owns_generated_id() {
        let call = CapabilityCall::new(Capability::PhotoCapture, PhotoOptions::default(), |_| {});
        assert_eq!(call.sink.call_id(), call.id);
        assert!(!call.sink.is_resolved());
    }
}
