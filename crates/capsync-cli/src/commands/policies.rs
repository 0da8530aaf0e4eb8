use anyhow::{Context, Result};
use capsync_core::RemoteLister;

use crate::cli::OutputFormat;
use crate::client::GraphClient;
use crate::output::print_policies;

pub async fn list(client: &GraphClient, format: OutputFormat) -> Result<()> {
    let mut policies = client
        .list_all_policies()
        .await
        .context("Failed to list conditional access policies")?;
    policies.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    print_policies(&policies, format)
}
