use crate::decision::Action;
use crate::document::{DocumentSerializer, PolicyDocument};
use crate::outcome::{OutcomeKind, OutcomeRecord};
use crate::remote::RemoteWriter;

/// Default number of characters kept in a simulated body preview.
pub const DEFAULT_PREVIEW_LIMIT: usize = 200;

/// Carries out decided actions, one attempt each, no retries.
pub struct Executor<'a> {
    serializer: &'a dyn DocumentSerializer,
    remote: &'a dyn RemoteWriter,
    preview_limit: usize,
}

impl<'a> Executor<'a> {
    pub fn new(serializer: &'a dyn DocumentSerializer, remote: &'a dyn RemoteWriter) -> Self {
        Self {
            serializer,
            remote,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }

    /// `0` disables previews.
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    pub async fn execute(&self, file: &str, doc: &PolicyDocument, action: Action) -> OutcomeRecord {
        let body = self.serializer.serialize(doc);
        let record =
            OutcomeRecord::new(file, OutcomeKind::Created).with_display_name(doc.display_name());

        match action {
            Action::Create => match self.remote.create_policy(&body).await {
                Ok(created) => {
                    tracing::info!(file, display_name = doc.display_name(), id = %created.id, "Created policy");
                    record.with_id(created.id)
                }
                Err(e) => {
                    tracing::error!(file, display_name = doc.display_name(), error = %e, "Create failed");
                    OutcomeRecord { kind: OutcomeKind::Failed, ..record }.with_error(e)
                }
            },
            Action::Update(id) => match self.remote.update_policy(&id, &body).await {
                Ok(()) => {
                    tracing::info!(file, display_name = doc.display_name(), id = %id, "Updated policy");
                    OutcomeRecord { kind: OutcomeKind::Updated, ..record }.with_id(id)
                }
                Err(e) => {
                    tracing::error!(file, display_name = doc.display_name(), id = %id, error = %e, "Update failed");
                    OutcomeRecord { kind: OutcomeKind::Failed, ..record }
                        .with_id(id)
                        .with_error(e)
                }
            },
            Action::Skip(id) => {
                tracing::info!(file, display_name = doc.display_name(), id = %id, "Policy exists, skipped");
                OutcomeRecord { kind: OutcomeKind::ExistsSkipped, ..record }.with_id(id)
            }
            Action::SimulateCreate => {
                self.simulated(record, OutcomeKind::SimulatedCreate, None, &body)
            }
            Action::SimulateUpdate(id) => {
                self.simulated(record, OutcomeKind::SimulatedUpdate, Some(id), &body)
            }
            Action::SimulateSkip(id) => {
                self.simulated(record, OutcomeKind::SimulatedExistsSkipped, Some(id), &body)
            }
        }
    }

    fn simulated(
        &self,
        record: OutcomeRecord,
        kind: OutcomeKind,
        id: Option<String>,
        body: &str,
    ) -> OutcomeRecord {
        tracing::info!(file = %record.file, display_name = ?record.display_name, %kind, "Dry run");
        let record = OutcomeRecord { kind, id, ..record };
        if self.preview_limit == 0 {
            return record;
        }
        record.with_preview(preview(body, self.preview_limit))
    }
}

/// First `limit` characters of `body`, with `…` appended when cut.
pub fn preview(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_bodies() {
        assert_eq!(preview("{}", 10), "{}");
        assert_eq!(preview("abcd", 4), "abcd");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("abcdef", 3), "abc…");
        assert_eq!(preview("ääää", 2), "ää…");
    }
}
