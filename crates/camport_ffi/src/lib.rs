//! FFI surface for the CamPort bridge.

pub mod api;
