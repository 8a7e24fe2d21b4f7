//! External launch adapter for capability hand-off.
//!
//! # Responsibility
//! - Construct and dispatch the external-application request for one
//!   invocation: handler probe, output side-channel setup, dispatch.
//!
//! # Invariants
//! - Synchronous failures (`NoHandler`, `OutputPreparation`) resolve the
//!   invocation immediately and leave the pending slot empty.
//! - On successful dispatch the invocation is stored as
//!   `AwaitingExternalResult` with its output side-effect state before the
//!   host is called, so the result callback always finds it.

use crate::error::BridgeError;
use crate::host::{ActionDescriptor, HostBridge, MediaStorage};
use crate::model::call::{CallState, CapabilityCall};
use crate::pending::{self, PendingEntry, SessionId};
use log::{info, warn};

/// Dispatches the external capture application for one invocation.
///
/// On synchronous failure the call's sink is resolved here and nothing is
/// left pending. On success the call remains pending until the host's
/// external-result callback resumes it.
pub fn dispatch_capture<H, S>(host: &H, storage: &S, session: &SessionId, call: CapabilityCall)
where
    H: HostBridge,
    S: MediaStorage,
{
    let action = ActionDescriptor::for_capability(call.capability);
    let code = crate::capability::capability_descriptor(call.capability).primary_code();

    if !host.can_resolve(&action) {
        warn!(
            "event=launch_rejected module=launch status=error reason=no_handler session={} call_id={} action={}",
            session, call.id, action
        );
        call.sink.resolve_err(BridgeError::NoHandler);
        return;
    }

    let output = match storage.prepare_output_location(call.options.save_to_gallery) {
        Ok(path) => path,
        Err(err) => {
            warn!(
                "event=launch_rejected module=launch status=error reason=output_preparation session={} call_id={} detail={}",
                session, call.id, err
            );
            call.sink.resolve_err(BridgeError::OutputPreparation(err));
            return;
        }
    };

    info!(
        "event=external_dispatched module=launch status=pending session={} call_id={} action={} code={} output={}",
        session,
        call.id,
        action,
        code,
        output.display()
    );

    // Stored before the host call so a prompt callback always correlates.
    pending::put(
        session,
        PendingEntry {
            call: call.clone(),
            state: CallState::AwaitingExternalResult,
            output: Some(output.clone()),
        },
    );
    host.launch_external(&action, &output, code);
}
