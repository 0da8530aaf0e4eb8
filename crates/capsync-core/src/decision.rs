use crate::document::PolicyDocument;
use crate::index::ExistingPolicyIndex;

/// What to do with one document. The `Simulate*` variants mirror their
/// real counterparts and never touch the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create,
    SimulateCreate,
    Update(String),
    SimulateUpdate(String),
    Skip(String),
    SimulateSkip(String),
}

impl Action {
    pub fn is_simulated(&self) -> bool {
        matches!(
            self,
            Self::SimulateCreate | Self::SimulateUpdate(_) | Self::SimulateSkip(_)
        )
    }

    /// True for actions that write to the remote store.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Create | Self::Update(_))
    }

    pub fn existing_id(&self) -> Option<&str> {
        match self {
            Self::Create | Self::SimulateCreate => None,
            Self::Update(id) | Self::SimulateUpdate(id) | Self::Skip(id) | Self::SimulateSkip(id) => {
                Some(id)
            }
        }
    }
}

/// Decides the action for `doc` from whether it already exists remotely,
/// `allow_update` and `dry_run`.
pub fn decide(
    doc: &PolicyDocument,
    index: &ExistingPolicyIndex,
    allow_update: bool,
    dry_run: bool,
) -> Action {
    match (index.lookup(doc.display_name()), allow_update, dry_run) {
        (None, _, false) => Action::Create,
        (None, _, true) => Action::SimulateCreate,
        (Some(id), true, false) => Action::Update(id.to_string()),
        (Some(id), true, true) => Action::SimulateUpdate(id.to_string()),
        (Some(id), false, false) => Action::Skip(id.to_string()),
        (Some(id), false, true) => Action::SimulateSkip(id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::validate;
    use crate::remote::RemotePolicy;

    fn doc() -> PolicyDocument {
        validate(r#"{"displayName":"Require MFA-MFA","state":"enabled"}"#).unwrap()
    }

    fn index_with_existing() -> ExistingPolicyIndex {
        ExistingPolicyIndex::from_policies([RemotePolicy::new("xyz-999", "Require MFA-MFA")])
    }

    #[test]
    fn decision_table_is_complete() {
        let empty = ExistingPolicyIndex::default();
        let existing = index_with_existing();
        let id = || "xyz-999".to_string();

        let cases = [
            (&empty, false, false, Action::Create),
            (&empty, true, false, Action::Create),
            (&empty, false, true, Action::SimulateCreate),
            (&empty, true, true, Action::SimulateCreate),
            (&existing, true, false, Action::Update(id())),
            (&existing, true, true, Action::SimulateUpdate(id())),
            (&existing, false, false, Action::Skip(id())),
            (&existing, false, true, Action::SimulateSkip(id())),
        ];

        for (index, allow_update, dry_run, expected) in cases {
            assert_eq!(
                decide(&doc(), index, allow_update, dry_run),
                expected,
                "exists={} allow_update={allow_update} dry_run={dry_run}",
                !index.is_empty()
            );
        }
    }

    #[test]
    fn dry_run_actions_are_simulated_and_never_write() {
        let existing = index_with_existing();
        for allow_update in [false, true] {
            let action = decide(&doc(), &existing, allow_update, true);
            assert!(action.is_simulated());
            assert!(!action.is_write());
        }
    }

    #[test]
    fn degraded_index_always_creates() {
        let index = ExistingPolicyIndex::degraded();
        assert_eq!(decide(&doc(), &index, true, false), Action::Create);
    }

    #[test]
    fn existing_id_is_exposed() {
        assert_eq!(Action::Skip("a".into()).existing_id(), Some("a"));
        assert_eq!(Action::Create.existing_id(), None);
    }
}
