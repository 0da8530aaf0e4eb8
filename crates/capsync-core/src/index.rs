use std::collections::HashMap;

use crate::remote::{RemoteLister, RemotePolicy};

/// `displayName` → remote id snapshot, taken once at the start of a run.
///
/// The snapshot is not refreshed: changes made to the remote store by anyone
/// else during the run are not seen.
#[derive(Debug, Clone, Default)]
pub struct ExistingPolicyIndex {
    by_name: HashMap<String, String>,
    degraded: bool,
}

impl ExistingPolicyIndex {
    /// Indexes `policies` in order. Nameless entries are dropped; when two
    /// entries share a name the later one wins.
    pub fn from_policies(policies: impl IntoIterator<Item = RemotePolicy>) -> Self {
        let mut by_name = HashMap::new();
        for policy in policies {
            match policy.display_name {
                Some(name) if !name.is_empty() => {
                    if let Some(previous) = by_name.insert(name.clone(), policy.id) {
                        tracing::debug!(display_name = %name, previous = %previous, "Duplicate remote displayName, keeping the later one");
                    }
                }
                _ => tracing::debug!(id = %policy.id, "Remote policy without displayName not indexed"),
            }
        }
        Self {
            by_name,
            degraded: false,
        }
    }

    /// Empty index standing in for a listing that failed.
    pub fn degraded() -> Self {
        Self {
            by_name: HashMap::new(),
            degraded: true,
        }
    }

    /// True when the listing failed and every document will look new.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn lookup(&self, display_name: &str) -> Option<&str> {
        self.by_name.get(display_name).map(String::as_str)
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.by_name.contains_key(display_name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Lists the remote store once and indexes the result.
///
/// A failed listing is not fatal: the run continues in create-only mode with
/// an empty, degraded index.
pub async fn build_index(lister: &dyn RemoteLister) -> ExistingPolicyIndex {
    match lister.list_all_policies().await {
        Ok(policies) => {
            let index = ExistingPolicyIndex::from_policies(policies);
            tracing::info!(count = index.len(), "Indexed existing policies");
            index
        }
        Err(e) => {
            tracing::warn!(error = %e, "Listing existing policies failed; every template will be treated as new");
            ExistingPolicyIndex::degraded()
        }
    }
}
