use anyhow::{Context, Result};
use capsync_core::{DirectorySource, TemplateSource, discover_tokens};

use crate::cli::{OutputFormat, PlaceholdersArgs};
use crate::config::{ProfileConfig, resolve_template_dir};
use crate::output::{TemplatePlaceholders, TokenStatus, print_placeholders, print_warning};

pub fn list(args: &PlaceholdersArgs, cfg: &ProfileConfig, format: OutputFormat) -> Result<()> {
    let dir = resolve_template_dir(&args.dir, cfg);
    let mut source = DirectorySource::open(&dir).context("Cannot read policy templates")?;

    let mut items = Vec::new();
    while let Some(next) = source.next_template() {
        let template = match next {
            Ok(t) => t,
            Err(e) => {
                print_warning(&e.to_string());
                continue;
            }
        };
        let tokens = discover_tokens(template.text())
            .into_iter()
            .map(|token| {
                let name = token.trim_start_matches('<').trim_end_matches('>');
                TokenStatus {
                    seeded: cfg.placeholders.contains_key(name),
                    token,
                }
            })
            .collect();
        items.push(TemplatePlaceholders {
            file: template.name().to_string(),
            tokens,
        });
    }

    print_placeholders(&items, format)
}
