//! Per-document outcome records.

use serde::{Deserialize, Serialize};

/// Classification of what happened to one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Created,
    Updated,
    ExistsSkipped,
    Failed,
    InvalidDocument,
    UserSkipped,
    SimulatedCreate,
    SimulatedUpdate,
    SimulatedExistsSkipped,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 9] = [
        Self::Created,
        Self::Updated,
        Self::ExistsSkipped,
        Self::Failed,
        Self::InvalidDocument,
        Self::UserSkipped,
        Self::SimulatedCreate,
        Self::SimulatedUpdate,
        Self::SimulatedExistsSkipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::ExistsSkipped => "exists_skipped",
            Self::Failed => "failed",
            Self::InvalidDocument => "invalid_document",
            Self::UserSkipped => "user_skipped",
            Self::SimulatedCreate => "simulated_create",
            Self::SimulatedUpdate => "simulated_update",
            Self::SimulatedExistsSkipped => "simulated_exists_skipped",
        }
    }

    /// Outcomes the operator has to act on.
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Failed | Self::InvalidDocument)
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Template file the record belongs to
    pub file: String,
    pub kind: OutcomeKind,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Remote id, when known or assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Truncated request body, simulated outcomes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl OutcomeRecord {
    pub fn new(file: impl Into<String>, kind: OutcomeKind) -> Self {
        Self {
            file: file.into(),
            kind,
            display_name: None,
            id: None,
            error: None,
            preview: None,
        }
    }

    pub fn invalid(file: impl Into<String>, error: impl ToString) -> Self {
        Self::new(file, OutcomeKind::InvalidDocument).with_error(error)
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_snake_case() {
        for kind in OutcomeKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn record_omits_unknown_fields() {
        let record = OutcomeRecord::new("01.json", OutcomeKind::Created)
            .with_display_name("Require MFA")
            .with_id("abc-123");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "file": "01.json",
                "kind": "created",
                "displayName": "Require MFA",
                "id": "abc-123"
            })
        );
    }
}
