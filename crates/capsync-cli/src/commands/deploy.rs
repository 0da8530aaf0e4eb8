use std::collections::BTreeMap;

use anyhow::{Context, Result};
use capsync_core::{
    DirectorySource, JsonSerializer, NoPrompt, PlaceholderCache, Prompter, Reconciler, RunOptions,
    Summary,
};

use crate::cli::{DeployArgs, OutputFormat};
use crate::client::GraphClient;
use crate::config::{ProfileConfig, resolve_template_dir};
use crate::output::{print_summary, print_warning};
use crate::prompt::LinePrompter;

pub async fn deploy(
    client: &GraphClient,
    args: &DeployArgs,
    cfg: &ProfileConfig,
    format: OutputFormat,
) -> Result<Summary> {
    let dir = resolve_template_dir(&args.dir, cfg);
    let mut source = DirectorySource::open(&dir).context("Cannot read policy templates")?;
    let mut cache = seed_cache(&args.set, &cfg.placeholders)?;
    tracing::info!(dir = %dir.display(), templates = source.remaining(), seeded = cache.len(), "Starting deployment");

    let options = RunOptions {
        allow_update: args.allow_update,
        dry_run: args.dry_run,
        interactive: !args.no_prompt,
        confirm: args.confirm,
        preview_limit: args.preview_limit,
    };
    let serializer = JsonSerializer::default();
    let reconciler = Reconciler::new(options, client, client, &serializer);

    let mut prompter: Box<dyn Prompter> = if args.no_prompt {
        Box::new(NoPrompt)
    } else {
        Box::new(LinePrompter::stdio())
    };
    let summary = reconciler
        .run(&mut source, &mut cache, prompter.as_mut())
        .await?;

    if summary.index_degraded {
        print_warning(
            "Existing policies could not be listed; every template was treated as new",
        );
    }
    print_summary(&summary, format, args.dry_run)?;
    Ok(summary)
}

/// Command-line values go in first so they win over profile values.
fn seed_cache(
    cli_values: &[String],
    profile_values: &BTreeMap<String, String>,
) -> Result<PlaceholderCache> {
    let mut cache = PlaceholderCache::new();
    for raw in cli_values {
        let (name, value) = parse_assignment(raw)?;
        cache.insert(name, value);
    }
    for (name, value) in profile_values {
        cache.insert(name.as_str(), value.as_str());
    }
    Ok(cache)
}

fn parse_assignment(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => anyhow::bail!("Invalid placeholder \"{raw}\". Expected format: NAME=VALUE"),
    }
}
