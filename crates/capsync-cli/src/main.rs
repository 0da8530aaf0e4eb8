mod auth;
mod cli;
mod client;
mod commands;
mod config;
mod logging;
mod output;
mod prompt;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, OutputFormat};
use client::GraphClient;
use output::print_error;

/// Batch finished but at least one document failed or was invalid.
const EXIT_DOCUMENT_FAILURES: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_DOCUMENT_FAILURES),
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when a deployment completed with failed documents.
async fn run(cli: Cli) -> Result<bool> {
    let profile = &cli.profile;
    let cfg = config::load_profile(profile)?;
    let format = cli
        .format
        .or_else(|| cfg.format.as_deref().and_then(OutputFormat::parse_config))
        .unwrap_or_default();

    match &cli.command {
        Commands::Deploy(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            let client = make_client(&server, &cli.token, profile)?;
            let summary = commands::deploy::deploy(&client, args, &cfg, format).await?;
            return Ok(!summary.has_failures());
        }
        Commands::Placeholders(args) => {
            commands::placeholders::list(args, &cfg, format)?;
        }
        Commands::Policies => {
            let server = config::resolve_server(&cli.server, profile)?;
            let client = make_client(&server, &cli.token, profile)?;
            commands::policies::list(&client, format).await?;
        }
        Commands::Login(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::auth::login(&server, args, profile).await?;
        }
        Commands::Logout => {
            commands::auth::logout(profile)?;
        }
        Commands::Whoami => {
            commands::auth::whoami(profile)?;
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    cfg.server.as_deref().unwrap_or(config::DEFAULT_SERVER)
                );
                println!(
                    "{}: {}",
                    "Templates".cyan(),
                    cfg.template_dir
                        .as_deref()
                        .unwrap_or(config::DEFAULT_TEMPLATE_DIR)
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    cfg.format.as_deref().unwrap_or("table")
                );
                for (name, value) in &cfg.placeholders {
                    println!("{}: <{}> = {}", "Placeholder".cyan(), name, value);
                }
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = cfg.clone();
                cfg.set(&set_args.key, &set_args.value)?;
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
    }

    Ok(true)
}

fn make_client(server: &str, token: &Option<String>, profile: &str) -> Result<GraphClient> {
    let token = auth::resolve_token(token, profile)?;
    if token.is_none() {
        tracing::warn!(profile, "No credentials; requests will be sent unauthenticated");
    }
    Ok(GraphClient::new(server, token))
}
