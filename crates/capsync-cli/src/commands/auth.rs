use anyhow::Result;
use colored::Colorize;

use crate::auth::{self, StoredCredentials};
use crate::cli::LoginArgs;
use crate::output::{print_error, print_success};

pub async fn login(server: &str, args: &LoginArgs, profile: &str) -> Result<()> {
    println!("Requesting token for {}...", args.client_id.cyan());
    let token_resp = auth::client_credentials(
        &args.authority,
        &args.tenant,
        &args.client_id,
        &args.client_secret,
    )
    .await?;

    let creds = StoredCredentials {
        server: server.to_string(),
        tenant: args.tenant.clone(),
        client_id: args.client_id.clone(),
        access_token: token_resp.access_token,
    };
    auth::save_credentials(profile, &creds)?;
    tracing::info!(profile, tenant = %args.tenant, "Stored credentials");
    print_success(&format!(
        "Logged in to tenant {} (profile: {})",
        args.tenant.cyan(),
        profile
    ));
    Ok(())
}

pub fn logout(profile: &str) -> Result<()> {
    if auth::remove_credentials(profile)? {
        print_success("Logged out (credentials removed)");
    } else {
        println!("No credentials found for profile \"{profile}\"");
    }
    Ok(())
}

pub fn whoami(profile: &str) -> Result<()> {
    match auth::load_credentials(profile)? {
        Some(creds) => {
            println!("{}: {}", "Profile".cyan(), profile);
            println!("{}: {}", "Server".cyan(), creds.server.cyan());
            println!("{}: {}", "Tenant".cyan(), creds.tenant);
            println!("{}: {}", "Client".cyan(), creds.client_id);
            println!(
                "{}: Bearer (token: {})",
                "Auth".cyan(),
                auth::token_preview(&creds.access_token)
            );
        }
        None => {
            print_error(&format!("Not logged in (profile: \"{profile}\")"));
        }
    }
    Ok(())
}
