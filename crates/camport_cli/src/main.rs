//! CLI smoke entry point.
//!
//! # Responsibility
//! - Drive the three canonical capture scenarios against an in-process
//!   scripted host to verify `camport_core` wiring without an embedder.
//! - Keep output deterministic for quick local sanity checks.

use camport_core::{
    ActionDescriptor, BridgeError, CameraPlugin, Capability, CaptureOutcome, CorrelationCode,
    FsMediaStorage, HostBridge, PermissionId, SessionId,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

const IMAGE_CAPTURE_RAW: u32 = 9001;

struct DemoHost {
    label: &'static str,
    granted: AtomicBool,
    resolvable: bool,
}

impl DemoHost {
    fn new(label: &'static str, granted: bool, resolvable: bool) -> Self {
        Self {
            label,
            granted: AtomicBool::new(granted),
            resolvable,
        }
    }
}

impl HostBridge for DemoHost {
    fn has_capability(&self, _capability: Capability) -> bool {
        true
    }

    fn has_permission(&self, _permission: PermissionId) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_permission(&self, permission: PermissionId, code: CorrelationCode) {
        println!(
            "{}: host <- request_permission {permission} code={code}",
            self.label
        );
    }

    fn can_resolve(&self, _action: &ActionDescriptor) -> bool {
        self.resolvable
    }

    fn launch_external(&self, action: &ActionDescriptor, _output: &Path, code: CorrelationCode) {
        println!(
            "{}: host <- launch_external {action} code={code}",
            self.label
        );
    }
}

fn demo_storage(scenario: &str) -> FsMediaStorage {
    let root = std::env::temp_dir().join(format!("camport-cli-{}-{scenario}", std::process::id()));
    FsMediaStorage::new(root.join("shared"), root.join("scoped"))
}

fn report(
    scenario: &'static str,
) -> impl FnOnce(Result<CaptureOutcome, BridgeError>) + Send + 'static {
    move |outcome| match outcome {
        Ok(result) => println!(
            "{scenario}: resolved ok saved_to_gallery={}",
            result.saved_to_gallery
        ),
        Err(err) => println!("{scenario}: resolved err code={}", err.code()),
    }
}

fn scenario_a() {
    let host = DemoHost::new("A", true, true);
    let plugin = CameraPlugin::new(SessionId::new("cli.scenario-a"), &host, demo_storage("a"));
    plugin.get_photo("{}", report("A"));
    plugin.on_external_result(IMAGE_CAPTURE_RAW, true, None);
}

fn scenario_b() {
    let host = DemoHost::new("B", false, true);
    let plugin = CameraPlugin::new(SessionId::new("cli.scenario-b"), &host, demo_storage("b"));
    plugin.get_photo("{}", report("B"));
    host.granted.store(true, Ordering::SeqCst);
    plugin.on_permission_result(IMAGE_CAPTURE_RAW, &[true]);
    plugin.on_external_result(IMAGE_CAPTURE_RAW, false, None);
}

fn scenario_c() {
    let host = DemoHost::new("C", true, false);
    let plugin = CameraPlugin::new(SessionId::new("cli.scenario-c"), &host, demo_storage("c"));
    plugin.get_photo("{}", report("C"));
}

fn main() {
    println!("camport_core ping={}", camport_core::ping());
    println!("camport_core version={}", camport_core::core_version());
    scenario_a();
    scenario_b();
    scenario_c();
}
