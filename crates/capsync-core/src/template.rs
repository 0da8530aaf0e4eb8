//! Policy templates and the sources that yield them.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Raw template text as read from its source, before any placeholder is
/// substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    text: String,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// File identity of the template (its file name for directory sources).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A finite, once-only sequence of templates in lexicographic name order.
pub trait TemplateSource {
    /// Human readable location, used in error messages.
    fn location(&self) -> String;

    /// Next template, or `None` when the source is exhausted.
    fn next_template(&mut self) -> Option<Result<Template, SourceError>>;
}

/// Reads `*.json` files from a single directory (not recursive).
///
/// File names are listed and sorted up front; contents are read lazily, one
/// file per call to [`TemplateSource::next_template`].
#[derive(Debug)]
pub struct DirectorySource {
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
}

impl DirectorySource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(SourceError::NotFound { path: dir });
        }

        let entries = fs::read_dir(&dir).map_err(|source| SourceError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SourceError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && is_json(&path) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        tracing::debug!(dir = %dir.display(), count = files.len(), "Listed policy templates");
        Ok(Self {
            dir,
            pending: files.into(),
        })
    }

    /// Number of templates not yet consumed.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

impl TemplateSource for DirectorySource {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn next_template(&mut self) -> Option<Result<Template, SourceError>> {
        let path = self.pending.pop_front()?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Some(
            fs::read_to_string(&path)
                .map(|text| Template::new(name, text))
                .map_err(|source| SourceError::Io { path, source }),
        )
    }
}

/// Templates held in memory, sorted by name on construction.
#[derive(Debug, Default)]
pub struct MemorySource {
    templates: VecDeque<Template>,
}

impl MemorySource {
    pub fn new(templates: impl IntoIterator<Item = Template>) -> Self {
        let mut templates: Vec<Template> = templates.into_iter().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            templates: templates.into(),
        }
    }
}

impl TemplateSource for MemorySource {
    fn location(&self) -> String {
        "<memory>".to_string()
    }

    fn next_template(&mut self) -> Option<Result<Template, SourceError>> {
        self.templates.pop_front().map(Ok)
    }
}
