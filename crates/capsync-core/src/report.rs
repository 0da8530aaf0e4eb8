use std::collections::BTreeMap;

use serde::Serialize;

use crate::outcome::{OutcomeKind, OutcomeRecord};

/// Aggregate view over every outcome of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub counts: BTreeMap<OutcomeKind, usize>,
    /// Set when the existing-policy listing failed and the run was create-only
    pub index_degraded: bool,
    pub records: Vec<OutcomeRecord>,
}

impl Summary {
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn has_failures(&self) -> bool {
        self.counts
            .iter()
            .any(|(kind, n)| kind.is_problem() && *n > 0)
    }

    pub fn with_index_degraded(mut self, degraded: bool) -> Self {
        self.index_degraded = degraded;
        self
    }
}

/// Counts records per kind and keeps the full list, in processing order.
pub fn summarize(records: Vec<OutcomeRecord>) -> Summary {
    let mut counts = BTreeMap::new();
    for record in &records {
        *counts.entry(record.kind).or_insert(0) += 1;
    }
    Summary {
        total: records.len(),
        counts,
        index_degraded: false,
        records,
    }
}
