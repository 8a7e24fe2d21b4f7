//! Host and storage collaborator seams.
//!
//! # Responsibility
//! - Define the outbound contracts toward the host platform (permission
//!   requests, external application launches) and the storage collaborator
//!   (output side-channel setup, media indexing).
//! - Provide the filesystem-backed storage implementation.
//!
//! # Invariants
//! - All outbound calls are fire-and-forget from the core's point of view;
//!   results come back only through host callbacks.
//! - `prepare_output_location` must leave a writable target behind on
//!   success, under the public or private root as requested.

use crate::capability::{Capability, PermissionId};
use crate::correlation::CorrelationCode;
use crate::error::StorageError;
use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable action id for an external-application request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionDescriptor {
    id: &'static str,
}

impl ActionDescriptor {
    /// Action serviced by an external camera application.
    pub const IMAGE_CAPTURE: Self = Self {
        id: "media.action.image_capture",
    };

    /// Returns the action for one capability's external hand-off.
    pub fn for_capability(capability: Capability) -> Self {
        match capability {
            Capability::PhotoCapture => Self::IMAGE_CAPTURE,
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }
}

impl Display for ActionDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id)
    }
}

/// Outbound contract toward the host platform.
///
/// The host answers the synchronous probes immediately; the two dispatch
/// calls complete later through `on_permission_result` /
/// `on_external_result` callbacks tagged with the same correlation code.
pub trait HostBridge {
    /// Whether the device provides the capability at all.
    fn has_capability(&self, capability: Capability) -> bool;

    /// Whether the permission is already granted.
    fn has_permission(&self, permission: PermissionId) -> bool;

    /// Issues an asynchronous OS permission request.
    fn request_permission(&self, permission: PermissionId, code: CorrelationCode);

    /// Whether any external application can service the action.
    fn can_resolve(&self, action: &ActionDescriptor) -> bool;

    /// Dispatches the external-application request with its output target.
    fn launch_external(&self, action: &ActionDescriptor, output: &Path, code: CorrelationCode);
}

impl<T: HostBridge + ?Sized> HostBridge for &T {
    fn has_capability(&self, capability: Capability) -> bool {
        (**self).has_capability(capability)
    }

    fn has_permission(&self, permission: PermissionId) -> bool {
        (**self).has_permission(permission)
    }

    fn request_permission(&self, permission: PermissionId, code: CorrelationCode) {
        (**self).request_permission(permission, code);
    }

    fn can_resolve(&self, action: &ActionDescriptor) -> bool {
        (**self).can_resolve(action)
    }

    fn launch_external(&self, action: &ActionDescriptor, output: &Path, code: CorrelationCode) {
        (**self).launch_external(action, output, code);
    }
}

/// Outbound contract toward the storage collaborator.
pub trait MediaStorage {
    /// Establishes a writable output target, shared (`public`) or
    /// app-scoped.
    fn prepare_output_location(&self, public: bool) -> Result<PathBuf, StorageError>;

    /// Requests indexing of newly captured media. Best-effort; callers log
    /// and continue on failure.
    fn index_new_media(&self, location: &Path) -> Result<(), StorageError>;
}

impl<T: MediaStorage + ?Sized> MediaStorage for &T {
    fn prepare_output_location(&self, public: bool) -> Result<PathBuf, StorageError> {
        (**self).prepare_output_location(public)
    }

    fn index_new_media(&self, location: &Path) -> Result<(), StorageError> {
        (**self).index_new_media(location)
    }
}

/// Filesystem-backed media storage.
///
/// Output targets follow the `JPEG_<epoch>_<suffix>.jpg` convention so the
/// external camera application can overwrite them in place.
pub struct FsMediaStorage {
    public_root: PathBuf,
    private_root: PathBuf,
}

impl FsMediaStorage {
    pub fn new(public_root: impl Into<PathBuf>, private_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
            private_root: private_root.into(),
        }
    }

    fn output_file_name() -> String {
        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        let suffix = Uuid::new_v4().simple().to_string();
        format!("JPEG_{epoch_secs}_{}.jpg", &suffix[..8])
    }
}

impl MediaStorage for FsMediaStorage {
    fn prepare_output_location(&self, public: bool) -> Result<PathBuf, StorageError> {
        let root = if public {
            &self.public_root
        } else {
            &self.private_root
        };
        std::fs::create_dir_all(root)?;

        let target = root.join(Self::output_file_name());
        // Touch the target so the delivery handle refers to a real file.
        std::fs::File::create(&target)?;

        debug!(
            "event=output_prepared module=storage status=ok public={} target={}",
            public,
            target.display()
        );
        Ok(target)
    }

    fn index_new_media(&self, location: &Path) -> Result<(), StorageError> {
        if !location.exists() {
            return Err(StorageError::Unavailable(format!(
                "media file missing: {}",
                location.display()
            )));
        }
        if !location.starts_with(&self.public_root) {
            warn!(
                "event=index_skipped module=storage status=ignored reason=private_location location={}",
                location.display()
            );
            return Ok(());
        }

        debug!(
            "event=media_indexed module=storage status=ok location={}",
            location.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionDescriptor, FsMediaStorage, MediaStorage};
    use crate::capability::Capability;
    use crate::error::StorageError;

    #[test]
    fn photo_capture_maps_to_image_capture_action() {
        let action = ActionDescriptor::for_capability(Capability::PhotoCapture);
        assert_eq!(action, ActionDescriptor::IMAGE_CAPTURE);
        assert_eq!(action.id(), "media.action.image_capture");
    }

    #[test]
    fn prepare_creates_jpeg_target_under_requested_root() {
        let public = tempfile::tempdir().expect("public dir");
        let private = tempfile::tempdir().expect("private dir");
        let storage = FsMediaStorage::new(public.path(), private.path());

        let shared = storage
            .prepare_output_location(true)
            .expect("public target");
        assert!(shared.starts_with(public.path()));
        assert!(shared.exists());

        let scoped = storage
            .prepare_output_location(false)
            .expect("private target");
        assert!(scoped.starts_with(private.path()));

        let name = shared
            .file_name()
            .and_then(|name| name.to_str())
            .expect("file name");
        assert!(name.starts_with("JPEG_"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn index_rejects_missing_media_file() {
        let public = tempfile::tempdir().expect("public dir");
        let private = tempfile::tempdir().expect("private dir");
        let storage = FsMediaStorage::new(public.path(), private.path());

        let err = storage
            .index_new_media(public.path().join("gone.jpg").as_path())
            .expect_err("missing file must fail");
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[test]
    fn index_accepts_prepared_public_target() {
        let public = tempfile::tempdir().expect("public dir");
        let private = tempfile::tempdir().expect("private dir");
        let storage = FsMediaStorage::new(public.path(), private.path());

        let target = storage
            .prepare_output_location(true)
            .expect("public target");
        storage
            .index_new_media(&target)
            .expect("prepared target indexes");
    }
}
