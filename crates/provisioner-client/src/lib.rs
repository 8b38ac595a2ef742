//! Client for the bare-metal provisioning service
//!
//! The service's task API is exposed behind the [`ProvisionerApi`] trait so
//! the orchestrator can be exercised against a fake in tests. The shipped
//! implementation is [`HttpProvisioner`], a thin reqwest wrapper that takes
//! a pre-resolved endpoint and auth token.

pub mod api;
pub mod error;
pub mod http;

pub use api::ProvisionerApi;
pub use error::ClientError;
pub use http::HttpProvisioner;
pub use reqwest::StatusCode;
