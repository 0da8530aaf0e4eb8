//! Placeholder discovery and substitution.
//!
//! Tokens are found with a single pattern, `<` + one or more characters other
//! than `<`/`>` + `>`. Substitution never goes through the regex engine: the
//! output is rebuilt from the original text by copying literal slices and
//! literal replacement values, so a value may contain `$`, `\`, `*` or even
//! another token's text without affecting anything else.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::prompt::Prompter;
use crate::template::Template;

static TOKEN_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"<[^<>]+>").expect("Invalid placeholder regex"));

/// Token → replacement values for one run.
///
/// Entries are only ever added; once a token has a value it keeps it for the
/// rest of the run.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderCache {
    values: HashMap<String, String>,
}

impl PlaceholderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for `token` unless the token already has one.
    /// Returns `true` when the entry was added.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) -> bool {
        let token = normalize_token(token.into());
        if self.values.contains_key(&token) {
            return false;
        }
        self.values.insert(token, value.into());
        true
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.values.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `NAME` and `<NAME>` both name the token `<NAME>`.
fn normalize_token(token: String) -> String {
    if token.starts_with('<') && token.ends_with('>') && token.len() > 2 {
        token
    } else {
        format!("<{token}>")
    }
}

/// Distinct tokens in `text`, in order of first occurrence.
pub fn discover_tokens(text: &str) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    for m in TOKEN_REGEX.find_iter(text) {
        if !seen.iter().any(|t| t == m.as_str()) {
            seen.push(m.as_str().to_string());
        }
    }
    seen
}

/// Substitutes every token of `template` that has a value.
///
/// Values come from `cache` first. A token missing from the cache is asked
/// for through `prompter` when `interactive` is set; a non-empty answer is
/// cached for later documents, an empty one leaves the token as is. Without
/// `interactive` unknown tokens stay in the text.
pub fn resolve(
    template: &Template,
    cache: &mut PlaceholderCache,
    prompter: &mut dyn Prompter,
    interactive: bool,
) -> String {
    for token in discover_tokens(template.text()) {
        if cache.contains(&token) || !interactive {
            continue;
        }
        let answer = prompter.ask(&format!(
            "Value for {token} (first seen in {})",
            template.name()
        ));
        if answer.is_empty() {
            tracing::debug!(token = %token, file = template.name(), "Placeholder left unresolved");
            continue;
        }
        cache.insert(token, answer);
    }

    substitute(template.text(), cache)
}

/// Literal single-pass replacement of cached tokens.
fn substitute(text: &str, cache: &PlaceholderCache) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in TOKEN_REGEX.find_iter(text) {
        if let Some(value) = cache.get(m.as_str()) {
            out.push_str(&text[last..m.start()]);
            out.push_str(value);
            last = m.end();
        }
    }
    out.push_str(&text[last..]);
    out
}
