//! Client-supplied photo capture options.
//!
//! # Responsibility
//! - Parse the JSON option payload arriving from the web layer.
//! - Apply capability defaults and range validation before any host work.
//!
//! # Invariants
//! - Defaults match the client contract: save to gallery on, quality 100,
//!   in-place editing off.
//! - An invalid payload is rejected before the permission gate is touched.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

const QUALITY_MAX: u8 = 100;

/// Options accepted by the photo capture capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoOptions {
    /// Whether the captured photo is written to shared storage and indexed.
    pub save_to_gallery: bool,
    /// Requested capture quality, 0..=100.
    pub quality: u8,
    /// Whether the external application may offer in-place editing.
    pub allow_editing: bool,
}

impl Default for PhotoOptions {
    fn default() -> Self {
        Self {
            save_to_gallery: true,
            quality: QUALITY_MAX,
            allow_editing: false,
        }
    }
}

impl PhotoOptions {
    /// Parses options from the raw client payload.
    ///
    /// An empty/blank payload means "all defaults". Unknown fields are
    /// ignored to stay lenient toward newer web clients.
    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let options: Self = serde_json::from_str(raw)
            .map_err(|err| BridgeError::InvalidOptions(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Validates option ranges.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.quality > QUALITY_MAX {
            return Err(BridgeError::InvalidOptions(format!(
                "quality must be within 0..=100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PhotoOptions;
    use crate::error::BridgeError;

    #[test]
    fn blank_payload_yields_defaults() {
        let options = PhotoOptions::from_json("  ").expect("blank payload");
        assert!(options.save_to_gallery);
        assert_eq!(options.quality, 100);
        assert!(!options.allow_editing);
    }

    #[test]
    fn empty_object_yields_defaults() {
        let options = PhotoOptions::from_json("{}").expect("empty object");
        assert_eq!(options, PhotoOptions::default());
    }

    #[test]
    fn parses_camel_case_client_fields() {
        let options =
            PhotoOptions::from_json(r#"{"saveToGallery": false, "quality": 80, "allowEditing": true}"#)
                .expect("full payload");
        assert!(!options.save_to_gallery);
        assert_eq!(options.quality, 80);
        assert!(options.allow_editing);
    }

    #[test]
    fn rejects_malformed_payload() {
        let err = PhotoOptions::from_json("{not json").expect_err("malformed payload must fail");
        assert!(matches!(err, BridgeError::InvalidOptions(_)));
        assert_eq!(err.code(), "invalid_options");
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let err =
            PhotoOptions::from_json(r#"{"quality": 150}"#).expect_err("quality 150 must fail");
        assert!(matches!(err, BridgeError::InvalidOptions(_)));
    }
}
