//! End-to-end runs of the reconciliation engine against in-memory stores.

use std::sync::Mutex;

use async_trait::async_trait;
use capsync_core::{
    CreatedPolicy, DirectorySource, JsonSerializer, MemorySource, NoPrompt, OutcomeKind,
    PlaceholderCache, Prompter, Reconciler, RemoteLister, RemotePolicy, RemoteWriter, RunError,
    RunOptions, Summary, Template, TemplateSource, TransportError,
};

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Create(String),
    Update(String, String),
}

/// Remote store that records writes and hands out sequential ids.
#[derive(Default)]
struct FakeStore {
    existing: Vec<RemotePolicy>,
    fail_list: bool,
    /// Bodies containing this text are rejected with HTTP 400
    reject_containing: Option<&'static str>,
    calls: Mutex<Vec<Call>>,
}

impl FakeStore {
    fn with_existing(policies: &[(&str, &str)]) -> Self {
        Self {
            existing: policies
                .iter()
                .map(|(name, id)| RemotePolicy::new(*id, *name))
                .collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteLister for FakeStore {
    async fn list_all_policies(&self) -> Result<Vec<RemotePolicy>, TransportError> {
        if self.fail_list {
            return Err(TransportError::connect("connection refused"));
        }
        Ok(self.existing.clone())
    }
}

#[async_trait]
impl RemoteWriter for FakeStore {
    async fn create_policy(&self, body: &str) -> Result<CreatedPolicy, TransportError> {
        if let Some(needle) = self.reject_containing
            && body.contains(needle)
        {
            return Err(TransportError::status(400, "1040: invalid conditions"));
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(Call::Create(body.to_string()));
        let id = if calls.len() == 1 {
            "abc-123".to_string()
        } else {
            format!("new-{}", calls.len())
        };
        Ok(CreatedPolicy { id })
    }

    async fn update_policy(&self, id: &str, body: &str) -> Result<(), TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Update(id.to_string(), body.to_string()));
        Ok(())
    }
}

/// Writer that fails the test on any call.
struct ForbiddenWriter;

#[async_trait]
impl RemoteWriter for ForbiddenWriter {
    async fn create_policy(&self, body: &str) -> Result<CreatedPolicy, TransportError> {
        panic!("create_policy called in dry run with {body}");
    }

    async fn update_policy(&self, id: &str, _body: &str) -> Result<(), TransportError> {
        panic!("update_policy called in dry run for {id}");
    }
}

/// Answers from a list of (substring, answer) rules and counts questions.
struct ScriptedPrompter {
    rules: Vec<(&'static str, &'static str)>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    fn new(rules: &[(&'static str, &'static str)]) -> Self {
        Self {
            rules: rules.to_vec(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> String {
        self.asked.push(prompt.to_string());
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle))
            .map(|(_, answer)| answer.to_string())
            .unwrap_or_default()
    }
}

const MFA_TEMPLATE: &str = r#"{"displayName":"<NAME>-MFA","state":"<STATE>"}"#;

fn mfa_prompter() -> ScriptedPrompter {
    ScriptedPrompter::new(&[("<NAME>", "Require MFA"), ("<STATE>", "enabled")])
}

async fn run_with(
    options: RunOptions,
    lister: &dyn RemoteLister,
    writer: &dyn RemoteWriter,
    source: &mut dyn TemplateSource,
    prompter: &mut dyn Prompter,
) -> Summary {
    let serializer = JsonSerializer::default();
    let reconciler = Reconciler::new(options, lister, writer, &serializer);
    let mut cache = PlaceholderCache::new();
    reconciler
        .run(source, &mut cache, prompter)
        .await
        .expect("run should start")
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn prompted_template_is_created() {
    let store = FakeStore::default();
    let mut source = MemorySource::new([Template::new("01-mfa.json", MFA_TEMPLATE)]);
    let mut prompter = mfa_prompter();

    let summary = run_with(
        RunOptions::default(),
        &store,
        &store,
        &mut source,
        &mut prompter,
    )
    .await;

    let record = &summary.records[0];
    assert_eq!(record.kind, OutcomeKind::Created);
    assert_eq!(record.display_name.as_deref(), Some("Require MFA-MFA"));
    assert_eq!(record.id.as_deref(), Some("abc-123"));
    assert_eq!(
        store.calls(),
        vec![Call::Create(
            r#"{"displayName":"Require MFA-MFA","state":"enabled"}"#.to_string()
        )]
    );
    assert_eq!(prompter.asked.len(), 2);
}

#[tokio::test]
async fn existing_policy_is_skipped_without_remote_calls() {
    let store = FakeStore::with_existing(&[("Require MFA-MFA", "xyz-999")]);
    let mut source = MemorySource::new([Template::new("01-mfa.json", MFA_TEMPLATE)]);
    let mut prompter = mfa_prompter();

    let summary = run_with(
        RunOptions::default(),
        &store,
        &store,
        &mut source,
        &mut prompter,
    )
    .await;

    let record = &summary.records[0];
    assert_eq!(record.kind, OutcomeKind::ExistsSkipped);
    assert_eq!(record.id.as_deref(), Some("xyz-999"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn existing_policy_is_updated_when_allowed() {
    let store = FakeStore::with_existing(&[("Require MFA-MFA", "xyz-999")]);
    let mut source = MemorySource::new([Template::new("01-mfa.json", MFA_TEMPLATE)]);
    let mut prompter = mfa_prompter();
    let options = RunOptions {
        allow_update: true,
        ..RunOptions::default()
    };

    let summary = run_with(options, &store, &store, &mut source, &mut prompter).await;

    assert_eq!(summary.records[0].kind, OutcomeKind::Updated);
    assert_eq!(summary.records[0].id.as_deref(), Some("xyz-999"));
    assert!(matches!(&store.calls()[..], [Call::Update(id, _)] if id == "xyz-999"));
}

#[tokio::test]
async fn dry_run_never_writes_and_mirrors_classification() {
    let lister = FakeStore::with_existing(&[("Existing A", "id-a"), ("Existing B", "id-b")]);
    let templates = || {
        MemorySource::new([
            Template::new("01.json", r#"{"displayName":"Brand new"}"#),
            Template::new("02.json", r#"{"displayName":"Existing A"}"#),
            Template::new("03.json", r#"{"displayName":"Existing B"}"#),
        ])
    };

    for (allow_update, expected_existing) in [
        (false, OutcomeKind::SimulatedExistsSkipped),
        (true, OutcomeKind::SimulatedUpdate),
    ] {
        let options = RunOptions {
            allow_update,
            dry_run: true,
            ..RunOptions::default()
        };
        let summary = run_with(
            options,
            &lister,
            &ForbiddenWriter,
            &mut templates(),
            &mut NoPrompt,
        )
        .await;

        let kinds: Vec<_> = summary.records.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OutcomeKind::SimulatedCreate,
                expected_existing,
                expected_existing
            ]
        );
        assert_eq!(summary.records[1].id.as_deref(), Some("id-a"));
        assert_eq!(
            summary.records[0].preview.as_deref(),
            Some(r#"{"displayName":"Brand new"}"#)
        );
    }
}

#[tokio::test]
async fn failed_listing_degrades_to_create_only() {
    let store = FakeStore {
        fail_list: true,
        ..FakeStore::with_existing(&[("Require MFA-MFA", "xyz-999")])
    };
    let mut source = MemorySource::new([Template::new("01-mfa.json", MFA_TEMPLATE)]);
    let mut prompter = mfa_prompter();
    let options = RunOptions {
        allow_update: true,
        ..RunOptions::default()
    };

    let summary = run_with(options, &store, &store, &mut source, &mut prompter).await;

    assert!(summary.index_degraded);
    assert_eq!(summary.records[0].kind, OutcomeKind::Created);
}

#[tokio::test]
async fn invalid_document_does_not_stop_the_batch() {
    let store = FakeStore::with_existing(&[("Third", "id-3")]);
    let mut source = MemorySource::new([
        Template::new("01.json", r#"{"displayName":"First"}"#),
        Template::new("02.json", r#"{"displayName":"Second","#),
        Template::new("03.json", r#"{"displayName":"Third"}"#),
    ]);
    let options = RunOptions {
        allow_update: true,
        ..RunOptions::default()
    };

    let summary = run_with(options, &store, &store, &mut source, &mut NoPrompt).await;

    let kinds: Vec<_> = summary.records.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OutcomeKind::Created,
            OutcomeKind::InvalidDocument,
            OutcomeKind::Updated
        ]
    );
    assert_eq!(summary.total, 3);
    assert!(summary.records[1].error.is_some());
    assert!(summary.has_failures());
}

#[tokio::test]
async fn transport_failure_is_recorded_and_run_continues() {
    let store = FakeStore {
        reject_containing: Some("Broken"),
        ..FakeStore::default()
    };
    let mut source = MemorySource::new([
        Template::new("01.json", r#"{"displayName":"Broken policy"}"#),
        Template::new("02.json", r#"{"displayName":"Fine policy"}"#),
    ]);

    let summary = run_with(
        RunOptions::default(),
        &store,
        &store,
        &mut source,
        &mut NoPrompt,
    )
    .await;

    assert_eq!(summary.records[0].kind, OutcomeKind::Failed);
    assert_eq!(
        summary.records[0].error.as_deref(),
        Some("HTTP 400: 1040: invalid conditions")
    );
    assert_eq!(summary.records[1].kind, OutcomeKind::Created);
    assert_eq!(summary.count(OutcomeKind::Failed), 1);
}

#[tokio::test]
async fn placeholder_answers_are_shared_across_documents() {
    let store = FakeStore::default();
    let mut source = MemorySource::new([
        Template::new("01.json", r#"{"displayName":"<PREFIX> admins"}"#),
        Template::new("02.json", r#"{"displayName":"<PREFIX> guests"}"#),
    ]);
    let mut prompter = ScriptedPrompter::new(&[("<PREFIX>", "CA01")]);

    let summary = run_with(
        RunOptions::default(),
        &store,
        &store,
        &mut source,
        &mut prompter,
    )
    .await;

    assert_eq!(prompter.asked.len(), 1);
    assert_eq!(summary.records[1].display_name.as_deref(), Some("CA01 guests"));
}

#[tokio::test]
async fn unresolved_tokens_stay_in_non_interactive_runs() {
    let store = FakeStore::default();
    let mut source = MemorySource::new([Template::new("01-mfa.json", MFA_TEMPLATE)]);
    let options = RunOptions {
        interactive: false,
        ..RunOptions::default()
    };

    let summary = run_with(options, &store, &store, &mut source, &mut NoPrompt).await;

    assert_eq!(summary.records[0].display_name.as_deref(), Some("<NAME>-MFA"));
}

#[tokio::test]
async fn duplicate_display_name_is_rejected() {
    let store = FakeStore::default();
    let mut source = MemorySource::new([
        Template::new("01.json", r#"{"displayName":"Same"}"#),
        Template::new("02.json", r#"{"displayName":"Same","state":"disabled"}"#),
    ]);

    let summary = run_with(
        RunOptions::default(),
        &store,
        &store,
        &mut source,
        &mut NoPrompt,
    )
    .await;

    assert_eq!(summary.records[0].kind, OutcomeKind::Created);
    assert_eq!(summary.records[1].kind, OutcomeKind::InvalidDocument);
    assert!(
        summary.records[1]
            .error
            .as_deref()
            .unwrap()
            .contains("first declared in 01.json")
    );
    assert_eq!(store.calls().len(), 1);
}

#[tokio::test]
async fn declined_confirmation_is_user_skipped() {
    let store = FakeStore::with_existing(&[("Existing", "id-e")]);
    let mut source = MemorySource::new([
        Template::new("01.json", r#"{"displayName":"Existing"}"#),
        Template::new("02.json", r#"{"displayName":"Wanted"}"#),
    ]);
    let mut prompter = ScriptedPrompter::new(&[("'Existing'", "n"), ("'Wanted'", "y")]);
    let options = RunOptions {
        allow_update: true,
        confirm: true,
        ..RunOptions::default()
    };

    let summary = run_with(options, &store, &store, &mut source, &mut prompter).await;

    assert_eq!(summary.records[0].kind, OutcomeKind::UserSkipped);
    assert_eq!(summary.records[0].id.as_deref(), Some("id-e"));
    assert_eq!(summary.records[1].kind, OutcomeKind::Created);
    assert!(!summary.has_failures());
    assert!(matches!(&store.calls()[..], [Call::Create(_)]));
}

#[tokio::test]
async fn empty_source_is_a_configuration_error() {
    let store = FakeStore::default();
    let serializer = JsonSerializer::default();
    let reconciler = Reconciler::new(RunOptions::default(), &store, &store, &serializer);
    let mut source = MemorySource::default();

    let err = reconciler
        .run(&mut source, &mut PlaceholderCache::new(), &mut NoPrompt)
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::NoTemplates(_)));
}

#[tokio::test]
async fn directory_run_records_unreadable_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("01-ok.json"), r#"{"displayName":"Ok"}"#).unwrap();
    std::fs::write(dir.path().join("02-binary.json"), [0xff, 0xfe, 0x00]).unwrap();

    let store = FakeStore::default();
    let mut source = DirectorySource::open(dir.path()).unwrap();

    let summary = run_with(
        RunOptions::default(),
        &store,
        &store,
        &mut source,
        &mut NoPrompt,
    )
    .await;

    assert_eq!(summary.records[0].kind, OutcomeKind::Created);
    assert_eq!(summary.records[1].kind, OutcomeKind::InvalidDocument);
    assert_eq!(summary.records[1].file, "02-binary.json");
}
