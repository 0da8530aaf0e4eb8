//! One reconciliation run over a template source.

use std::collections::HashMap;

use crate::decision::{Action, decide};
use crate::document::{DocumentSerializer, validate};
use crate::error::{InvalidDocumentError, RunError};
use crate::executor::{DEFAULT_PREVIEW_LIMIT, Executor};
use crate::index::{ExistingPolicyIndex, build_index};
use crate::outcome::{OutcomeKind, OutcomeRecord};
use crate::placeholder::{PlaceholderCache, resolve};
use crate::prompt::Prompter;
use crate::remote::{RemoteLister, RemoteWriter};
use crate::report::{Summary, summarize};
use crate::template::{Template, TemplateSource};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Update policies that already exist instead of skipping them
    pub allow_update: bool,
    /// Decide and report, but never write to the remote store
    pub dry_run: bool,
    /// Ask for placeholder values missing from the cache
    pub interactive: bool,
    /// Ask before each create or update; only applies when `interactive`
    pub confirm: bool,
    pub preview_limit: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            allow_update: false,
            dry_run: false,
            interactive: true,
            confirm: false,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

pub struct Reconciler<'a> {
    options: RunOptions,
    lister: &'a dyn RemoteLister,
    writer: &'a dyn RemoteWriter,
    serializer: &'a dyn DocumentSerializer,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        options: RunOptions,
        lister: &'a dyn RemoteLister,
        writer: &'a dyn RemoteWriter,
        serializer: &'a dyn DocumentSerializer,
    ) -> Self {
        Self {
            options,
            lister,
            writer,
            serializer,
        }
    }

    /// Processes every template of `source`, strictly one after another.
    ///
    /// Fails only when the source yields nothing at all; every per-document
    /// problem ends up as an [`OutcomeRecord`] in the returned summary.
    pub async fn run(
        &self,
        source: &mut dyn TemplateSource,
        cache: &mut PlaceholderCache,
        prompter: &mut dyn Prompter,
    ) -> Result<Summary, RunError> {
        let Some(first) = source.next_template() else {
            return Err(RunError::NoTemplates(source.location()));
        };

        let index = build_index(self.lister).await;
        let executor = Executor::new(self.serializer, self.writer)
            .with_preview_limit(self.options.preview_limit);

        // displayName -> file that first declared it
        let mut declared: HashMap<String, String> = HashMap::new();
        let mut records = Vec::new();
        let mut next = Some(first);

        while let Some(item) = next {
            let record = match item {
                Ok(template) => {
                    self.process(&template, cache, prompter, &index, &executor, &mut declared)
                        .await
                }
                Err(e) => {
                    tracing::error!(file = %e.file_name(), error = %e, "Template unreadable");
                    OutcomeRecord::invalid(
                        e.file_name(),
                        InvalidDocumentError::Unreadable(e.to_string()),
                    )
                }
            };
            records.push(record);
            next = source.next_template();
        }

        let summary = summarize(records).with_index_degraded(index.is_degraded());
        tracing::info!(
            total = summary.total,
            failed = summary.count(OutcomeKind::Failed),
            invalid = summary.count(OutcomeKind::InvalidDocument),
            dry_run = self.options.dry_run,
            "Reconciliation finished"
        );
        Ok(summary)
    }

    async fn process(
        &self,
        template: &Template,
        cache: &mut PlaceholderCache,
        prompter: &mut dyn Prompter,
        index: &ExistingPolicyIndex,
        executor: &Executor<'_>,
        declared: &mut HashMap<String, String>,
    ) -> OutcomeRecord {
        let file = template.name();
        let resolved = resolve(template, cache, prompter, self.options.interactive);

        let doc = match validate(&resolved) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(file, error = %e, "Invalid policy document");
                return OutcomeRecord::invalid(file, e);
            }
        };

        if let Some(first_file) = declared.get(doc.display_name()) {
            let e = InvalidDocumentError::duplicate(doc.display_name(), first_file.as_str());
            tracing::warn!(file, error = %e, "Duplicate policy document");
            return OutcomeRecord::invalid(file, e).with_display_name(doc.display_name());
        }
        declared.insert(doc.display_name().to_string(), file.to_string());

        let action = decide(&doc, index, self.options.allow_update, self.options.dry_run);
        tracing::debug!(file, display_name = doc.display_name(), ?action, "Decided");

        if action.is_write() && self.options.interactive && self.options.confirm {
            let verb = match action {
                Action::Update(_) => "Update",
                _ => "Create",
            };
            if !prompter.confirm(&format!("{verb} policy '{}'?", doc.display_name())) {
                tracing::info!(file, display_name = doc.display_name(), "Declined by operator");
                let record = OutcomeRecord::new(file, OutcomeKind::UserSkipped)
                    .with_display_name(doc.display_name());
                return match action.existing_id() {
                    Some(id) => record.with_id(id),
                    None => record,
                };
            }
        }

        executor.execute(file, &doc, action).await
    }
}
