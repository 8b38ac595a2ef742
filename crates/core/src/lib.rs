//! Core domain model for slipway
//!
//! This crate holds the task data model shared by the provisioner client
//! and the orchestrator, matching the wire names used by the provisioning
//! service.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::CoreError;
