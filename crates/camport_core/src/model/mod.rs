//! Invocation domain model.

pub mod call;
pub mod options;
