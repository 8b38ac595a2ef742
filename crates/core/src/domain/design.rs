use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

/// Reference to the design documents a task operates against.
///
/// The service treats this as an opaque URI; callers usually build it from
/// a design-service endpoint and a committed revision id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DesignRef(String);

impl DesignRef {
    /// Wrap an already-formed design reference. Must be non-empty.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(CoreError::InvalidDesignRef(
                "design reference is empty".to_string(),
            ));
        }
        Ok(Self(uri))
    }

    /// Reference to the rendered documents of a committed design revision.
    pub fn rendered(endpoint: &str, revision: u64) -> Result<Self, CoreError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| CoreError::InvalidDesignRef(format!("{}: {}", endpoint, e)))?;
        Ok(Self(format!(
            "deckhand+{}/revisions/{}/rendered-documents",
            endpoint.as_str().trim_end_matches('/'),
            revision
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DesignRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
