//! FFI use-case API for app-layer-facing bridge calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the embedding app via FRB.
//! - Relay outbound host requests (permission prompts, external launches)
//!   through a drainable command outbox the embedder executes.
//! - Relay terminal invocation outcomes through a drainable outcome outbox.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Each accepted `get_photo` request produces exactly one outcome DTO.
//! - Host callbacks are fire-and-forget; the embedder expects no result.

use camport_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    parse_capability, ActionDescriptor, CameraPlugin, Capability, CorrelationCode, FsMediaStorage,
    HostBridge, PermissionId, SessionId,
};
use log::warn;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};
use uuid::Uuid;

static BRIDGE: OnceLock<BridgeState> = OnceLock::new();
static HOST_OUTBOX: Mutex<Vec<HostCommandDto>> = Mutex::new(Vec::new());
static OUTCOME_OUTBOX: Mutex<Vec<PhotoOutcomeDto>> = Mutex::new(Vec::new());

struct BridgeState {
    plugin: CameraPlugin<OutboxHost, FsMediaStorage>,
}

/// Host adapter pushing outbound requests into the command outbox.
///
/// The embedder drains the outbox, executes each command natively, and
/// reports back through `on_permission_result` / `on_external_result`.
struct OutboxHost {
    has_camera: bool,
    camera_granted: Mutex<bool>,
}

impl OutboxHost {
    fn push(command: HostCommandDto) {
        HOST_OUTBOX
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }
}

impl HostBridge for OutboxHost {
    fn has_capability(&self, _capability: Capability) -> bool {
        self.has_camera
    }

    fn has_permission(&self, _permission: PermissionId) -> bool {
        *self
            .camera_granted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn request_permission(&self, permission: PermissionId, code: CorrelationCode) {
        Self::push(HostCommandDto {
            kind: "request_permission".to_string(),
            permission: Some(permission.as_str().to_string()),
            action: None,
            output_path: None,
            correlation_code: code.as_raw(),
        });
    }

    fn can_resolve(&self, _action: &ActionDescriptor) -> bool {
        // Resolution is probed by the embedder before init; a device with
        // a camera app keeps this true for the capture action.
        self.has_camera
    }

    fn launch_external(&self, action: &ActionDescriptor, output: &Path, code: CorrelationCode) {
        Self::push(HostCommandDto {
            kind: "launch_external".to_string(),
            permission: None,
            action: Some(action.id().to_string()),
            output_path: Some(output.display().to_string()),
            correlation_code: code.as_raw(),
        });
    }
}

/// Outbound host request for the embedder to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommandDto {
    /// `request_permission` or `launch_external`.
    pub kind: String,
    /// Permission id for `request_permission` commands.
    pub permission: Option<String>,
    /// Action id for `launch_external` commands.
    pub action: Option<String>,
    /// Output target path for `launch_external` commands.
    pub output_path: Option<String>,
    /// Correlation code to echo back in the result callback.
    pub correlation_code: u32,
}

/// Terminal outcome of one photo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoOutcomeDto {
    /// Request id returned by the matching `get_photo` envelope.
    pub request_id: String,
    /// Whether the capture succeeded.
    pub ok: bool,
    /// Stable error code when `ok` is false.
    pub error_code: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
    /// Captured photo path when `ok` is true.
    pub path: Option<String>,
    /// `file://` reference when `ok` is true.
    pub uri: Option<String>,
}

/// Acceptance envelope for one `get_photo` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoActionResponse {
    /// Whether the request was handed to the capture flow.
    pub accepted: bool,
    /// Request id correlating the later outcome DTO.
    pub request_id: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`; conflicts return an error.
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Initializes the bridge session once per process.
///
/// `session_id` identifies this bridge session in the process-wide pending
/// store; a recreated embedder view passing the same id resumes any
/// in-flight capture.
///
/// # FFI contract
/// - First call wins; later calls return an error message.
/// - Never panics; returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn init_bridge(
    session_id: String,
    has_camera: bool,
    camera_granted: bool,
    public_media_dir: String,
    private_media_dir: String,
) -> String {
    let state = BridgeState {
        plugin: CameraPlugin::new(
            SessionId::new(session_id),
            OutboxHost {
                has_camera,
                camera_granted: Mutex::new(camera_granted),
            },
            FsMediaStorage::new(public_media_dir, private_media_dir),
        ),
    };
    match BRIDGE.set(state) {
        Ok(()) => String::new(),
        Err(_) => "bridge already initialized".to_string(),
    }
}

/// Updates the cached camera permission state after a host grant change.
///
/// Returns `false` when the bridge is not initialized.
#[flutter_rust_bridge::frb(sync)]
pub fn set_camera_permission(granted: bool) -> bool {
    let Some(state) = BRIDGE.get() else {
        return false;
    };
    *state
        .plugin
        .host()
        .camera_granted
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = granted;
    true
}

/// Invokes the photo capture capability.
///
/// The terminal outcome arrives later through `drain_photo_outcomes`,
/// correlated by the returned `request_id`. Synchronous failures (invalid
/// options, missing capability, no handler) still surface as outcome DTOs.
#[flutter_rust_bridge::frb(sync)]
pub fn get_photo(options_json: String) -> PhotoActionResponse {
    let Some(state) = BRIDGE.get() else {
        return PhotoActionResponse {
            accepted: false,
            request_id: None,
            message: "bridge not initialized".to_string(),
        };
    };

    let request_id = Uuid::new_v4().to_string();
    let outcome_request_id = request_id.clone();
    state.plugin.get_photo(options_json.as_str(), move |outcome| {
        let dto = match outcome {
            Ok(result) => PhotoOutcomeDto {
                request_id: outcome_request_id,
                ok: true,
                error_code: None,
                message: "photo captured".to_string(),
                path: Some(result.path.display().to_string()),
                uri: Some(result.uri),
            },
            Err(err) => PhotoOutcomeDto {
                request_id: outcome_request_id,
                ok: false,
                error_code: Some(err.code().to_string()),
                message: err.to_string(),
                path: None,
                uri: None,
            },
        };
        OUTCOME_OUTBOX
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dto);
    });

    PhotoActionResponse {
        accepted: true,
        request_id: Some(request_id),
        message: "photo request accepted".to_string(),
    }
}

/// Generic bridge entry: routes an invocation by capability id.
///
/// Today only `photo_capture` exists; unknown ids are rejected in the
/// acceptance envelope without touching the capture flow.
#[flutter_rust_bridge::frb(sync)]
pub fn invoke_capability(capability_id: String, options_json: String) -> PhotoActionResponse {
    match parse_capability(capability_id.as_str()) {
        Ok(Capability::PhotoCapture) => get_photo(options_json),
        Err(err) => PhotoActionResponse {
            accepted: false,
            request_id: None,
            message: err.to_string(),
        },
    }
}

/// Host callback: permission request result.
#[flutter_rust_bridge::frb(sync)]
pub fn on_permission_result(correlation_code: u32, grants: Vec<bool>) {
    let Some(state) = BRIDGE.get() else {
        warn!("event=callback_before_init module=ffi status=dropped kind=permission_result");
        return;
    };
    if grants.iter().all(|granted| *granted) {
        // Keep the cached grant state in step with the host decision.
        set_camera_permission(true);
    }
    state.plugin.on_permission_result(correlation_code, &grants);
}

/// Host callback: external application result.
#[flutter_rust_bridge::frb(sync)]
pub fn on_external_result(correlation_code: u32, succeeded: bool, result_data: Option<String>) {
    let Some(state) = BRIDGE.get() else {
        warn!("event=callback_before_init module=ffi status=dropped kind=external_result");
        return;
    };
    state
        .plugin
        .on_external_result(correlation_code, succeeded, result_data.as_deref());
}

/// Drains pending outbound host commands for the embedder to execute.
#[flutter_rust_bridge::frb(sync)]
pub fn drain_host_commands() -> Vec<HostCommandDto> {
    std::mem::take(
        &mut *HOST_OUTBOX
            .lock()
            .unwrap_or_else(PoisonError::into_inner),
    )
}

/// Drains terminal photo outcomes for delivery to the web layer.
#[flutter_rust_bridge::frb(sync)]
pub fn drain_photo_outcomes() -> Vec<PhotoOutcomeDto> {
    std::mem::take(
        &mut *OUTCOME_OUTBOX
            .lock()
            .unwrap_or_else(PoisonError::into_inner),
    )
}
