//! Reconciliation engine for declarative conditional access policies.
//!
//! A run reads policy templates, fills in their `<PLACEHOLDER>` tokens,
//! validates the result and compares it by `displayName` against a snapshot
//! of the remote store. Each document is then created, updated, skipped or,
//! in dry-run mode, only simulated. Documents are isolated from each other:
//! a failure is recorded and the run moves on.
//!
//! The remote store, the operator prompt and the template source are
//! abstract ([`RemoteLister`], [`RemoteWriter`], [`Prompter`],
//! [`TemplateSource`]) so the engine can be driven by an HTTP client in the
//! CLI and by in-memory stubs in tests.

pub mod decision;
pub mod document;
pub mod error;
pub mod executor;
pub mod index;
pub mod outcome;
pub mod placeholder;
pub mod prompt;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod template;

pub use decision::{Action, decide};
pub use document::{DocumentSerializer, JsonSerializer, PolicyDocument, validate};
pub use error::{InvalidDocumentError, RunError, SourceError, TransportError};
pub use executor::{DEFAULT_PREVIEW_LIMIT, Executor};
pub use index::{ExistingPolicyIndex, build_index};
pub use outcome::{OutcomeKind, OutcomeRecord};
pub use placeholder::{PlaceholderCache, discover_tokens, resolve};
pub use prompt::{NoPrompt, Prompter};
pub use reconcile::{Reconciler, RunOptions};
pub use remote::{CreatedPolicy, RemoteLister, RemotePolicy, RemoteWriter};
pub use report::{Summary, summarize};
pub use template::{DirectorySource, MemorySource, Template, TemplateSource};
