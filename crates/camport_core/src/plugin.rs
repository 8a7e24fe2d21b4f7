//! Camera capability plugin: invocation entry and result correlator.
//!
//! # Responsibility
//! - Drive one invocation through the permission gate and external launch.
//! - Match asynchronous host callbacks to the pending invocation by
//!   correlation code and resume it exactly once.
//!
//! # Invariants
//! - State machine per invocation: created, awaiting permission, awaiting
//!   external result, resolved; resolved is terminal.
//! - Stale or mismatched callbacks are logged and dropped; they never
//!   panic and never resolve anything.
//! - A second invocation while one is pending is rejected with
//!   `CapabilityBusy` instead of displacing the first.

use crate::capability::{capability_descriptor, Capability};
use crate::correlation::{correlation_descriptor, CallbackKind, CorrelationCode};
use crate::error::BridgeError;
use crate::gate::{self, GateOutcome};
use crate::host::{HostBridge, MediaStorage};
use crate::launch;
use crate::model::call::{CallState, CapabilityCall, CaptureOutcome};
use crate::model::options::PhotoOptions;
use crate::pending::{self, PendingEntry, SessionId};
use log::{debug, info, warn};

/// Bridge endpoint for the photo capture capability.
///
/// Instances are cheap and disposable: the pending call lives in
/// process-wide session-keyed state, so a recreated plugin constructed
/// with the same session id resumes its predecessor's invocation.
pub struct CameraPlugin<H: HostBridge, S: MediaStorage> {
    session: SessionId,
    host: H,
    storage: S,
}

impl<H: HostBridge, S: MediaStorage> CameraPlugin<H, S> {
    pub fn new(session: SessionId, host: H, storage: S) -> Self {
        Self {
            session,
            host,
            storage,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Host adapter backing this plugin instance.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Client entry point: invoke photo capture with a raw JSON payload.
    ///
    /// The `deliver` callback receives exactly one terminal outcome,
    /// possibly synchronously (option/capability/launch failures) or after
    /// asynchronous resumption.
    pub fn get_photo<F>(&self, options_json: &str, deliver: F)
    where
        F: FnOnce(Result<CaptureOutcome, BridgeError>) + Send + 'static,
    {
        let options = match PhotoOptions::from_json(options_json) {
            Ok(options) => options,
            Err(err) => {
                warn!(
                    "event=capability_rejected module=plugin status=error reason=invalid_options session={} detail={}",
                    self.session, err
                );
                deliver(Err(err));
                return;
            }
        };
        self.get_photo_with_options(options, deliver);
    }

    /// Client entry point with pre-parsed options.
    pub fn get_photo_with_options<F>(&self, options: PhotoOptions, deliver: F)
    where
        F: FnOnce(Result<CaptureOutcome, BridgeError>) + Send + 'static,
    {
        let call = CapabilityCall::new(Capability::PhotoCapture, options, deliver);
        info!(
            "event=capability_invoked module=plugin status=started session={} call_id={} capability={}",
            self.session, call.id, call.capability
        );

        if pending::is_pending(&self.session) {
            warn!(
                "event=capability_rejected module=plugin status=error reason=busy session={} call_id={}",
                self.session, call.id
            );
            call.sink.resolve_err(BridgeError::CapabilityBusy);
            return;
        }

        if !self.host.has_capability(call.capability) {
            call.sink
                .resolve_err(BridgeError::CapabilityUnavailable(call.capability));
            return;
        }

        let descriptor = capability_descriptor(call.capability);
        match gate::ensure(&self.host, descriptor) {
            GateOutcome::Granted => {
                launch::dispatch_capture(&self.host, &self.storage, &self.session, call);
            }
            GateOutcome::Requested => {
                pending::put(
                    &self.session,
                    PendingEntry {
                        call,
                        state: CallState::AwaitingPermission,
                        output: None,
                    },
                );
            }
        }
    }

    /// Host callback: asynchronous permission request result.
    ///
    /// `grants` carries one entry per requested permission. Any denial
    /// resolves the pending invocation with `PermissionDenied`; a fully
    /// granted result re-enters execution at the external launch step.
    pub fn on_permission_result(&self, raw_code: u32, grants: &[bool]) {
        let Some(code) = self.match_callback(raw_code, CallbackKind::PermissionResult) else {
            return;
        };
        match pending::peek_state(&self.session) {
            None => {
                warn!(
                    "event=stale_callback module=plugin status=dropped kind=permission_result session={} code={}",
                    self.session, code
                );
                return;
            }
            Some(CallState::AwaitingPermission) => {}
            Some(state) => {
                warn!(
                    "event=callback_state_mismatch module=plugin status=dropped kind=permission_result session={} state={}",
                    self.session, state
                );
                return;
            }
        }

        let Some(entry) = pending::take(&self.session) else {
            return;
        };

        if grants.iter().any(|granted| !granted) {
            info!(
                "event=permission_denied module=plugin status=error session={} call_id={}",
                self.session, entry.call.id
            );
            entry.call.sink.resolve_err(BridgeError::PermissionDenied);
            return;
        }

        // All granted: resume the same invocation at the launch step.
        launch::dispatch_capture(&self.host, &self.storage, &self.session, entry.call);
    }

    /// Host callback: external application result.
    ///
    /// Consumes the side-effect output state regardless of outcome. On
    /// success the capture is post-processed (gallery indexing when
    /// requested) and the invocation resolves with the output location;
    /// cancel/failure resolves with `ExternalCancelled`. The raw result
    /// payload is not consumed; the capture is delivered through the
    /// output side-channel.
    pub fn on_external_result(&self, raw_code: u32, succeeded: bool, result_data: Option<&str>) {
        let Some(code) = self.match_callback(raw_code, CallbackKind::ExternalResult) else {
            return;
        };
        match pending::peek_state(&self.session) {
            None => {
                warn!(
                    "event=stale_callback module=plugin status=dropped kind=external_result session={} code={}",
                    self.session, code
                );
                return;
            }
            Some(CallState::AwaitingExternalResult) => {}
            Some(state) => {
                warn!(
                    "event=callback_state_mismatch module=plugin status=dropped kind=external_result session={} state={}",
                    self.session, state
                );
                return;
            }
        }

        let Some(entry) = pending::take(&self.session) else {
            return;
        };
        debug!(
            "event=external_result module=plugin status=received session={} call_id={} succeeded={} has_data={}",
            self.session,
            entry.call.id,
            succeeded,
            result_data.is_some()
        );
        let output = entry.output;

        if !succeeded {
            info!(
                "event=external_cancelled module=plugin status=error session={} call_id={}",
                self.session, entry.call.id
            );
            entry.call.sink.resolve_err(BridgeError::ExternalCancelled);
            return;
        }

        let Some(path) = output else {
            // An external-result entry always carries its output target;
            // a missing one means the side-channel was lost.
            entry.call.sink.resolve_err(BridgeError::OutputPreparation(
                crate::error::StorageError::Unavailable(
                    "pending call lost its output location".to_string(),
                ),
            ));
            return;
        };

        if entry.call.options.save_to_gallery {
            if let Err(err) = self.storage.index_new_media(&path) {
                warn!(
                    "event=media_index_failed module=plugin status=ignored session={} call_id={} detail={}",
                    self.session, entry.call.id, err
                );
            }
        }

        info!(
            "event=capture_resolved module=plugin status=ok session={} call_id={} output={}",
            self.session,
            entry.call.id,
            path.display()
        );
        let saved = entry.call.options.save_to_gallery;
        entry
            .call
            .sink
            .resolve_ok(CaptureOutcome::new(path, saved));
    }

    /// Validates a raw callback code against the dispatch table.
    ///
    /// Unknown codes, codes owned by another capability, and unexpected
    /// callback kinds are logged and dropped.
    fn match_callback(&self, raw_code: u32, kind: CallbackKind) -> Option<CorrelationCode> {
        let Some(code) = CorrelationCode::from_raw(raw_code) else {
            warn!(
                "event=stale_callback module=plugin status=dropped reason=unknown_code session={} raw_code={}",
                self.session, raw_code
            );
            return None;
        };

        let descriptor = correlation_descriptor(code);
        if descriptor.capability != Capability::PhotoCapture || !descriptor.expects(kind) {
            warn!(
                "event=callback_mismatch module=plugin status=dropped session={} code={} kind={:?}",
                self.session, code, kind
            );
            return None;
        }
        Some(code)
    }
}
