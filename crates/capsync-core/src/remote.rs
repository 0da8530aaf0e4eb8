//! Contracts for the remote policy store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// One policy as reported by the remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePolicy {
    pub id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl RemotePolicy {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: Some(display_name.into()),
            state: None,
        }
    }
}

/// Identifier assigned by the remote service to a new policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPolicy {
    pub id: String,
}

#[async_trait]
pub trait RemoteLister: Send + Sync {
    /// Complete listing of current policies; implementations follow
    /// pagination themselves.
    async fn list_all_policies(&self) -> Result<Vec<RemotePolicy>, TransportError>;
}

#[async_trait]
pub trait RemoteWriter: Send + Sync {
    async fn create_policy(&self, body: &str) -> Result<CreatedPolicy, TransportError>;

    async fn update_policy(&self, id: &str, body: &str) -> Result<(), TransportError>;
}
