use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "capsync")]
#[command(about = "capsync: deploy conditional access policy templates")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Graph API base URL (overrides config and CAPSYNC_URL env var)
    #[arg(short, long, global = true, env = "CAPSYNC_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "CAPSYNC_PROFILE", default_value = "default")]
    pub profile: String,

    /// Bearer token to use instead of stored credentials
    #[arg(long, global = true, env = "CAPSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Table,
}

impl OutputFormat {
    pub fn parse_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile policy templates against the tenant
    Deploy(DeployArgs),
    /// List the placeholders used by the templates
    Placeholders(PlaceholdersArgs),
    /// List conditional access policies in the tenant
    Policies,
    /// Obtain and store a token with the client credentials grant
    Login(LoginArgs),
    /// Logout (remove stored credentials)
    Logout,
    /// Show current auth info
    Whoami,
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct DeployArgs {
    /// Template directory (overrides the profile's template_dir)
    #[arg(short, long)]
    pub dir: Option<String>,
    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,
    /// Update policies that already exist instead of skipping them
    #[arg(long)]
    pub allow_update: bool,
    /// Never prompt; unknown placeholders stay unresolved
    #[arg(long)]
    pub no_prompt: bool,
    /// Ask before each create or update
    #[arg(long)]
    pub confirm: bool,
    /// Placeholder value as NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
    /// Characters of the request body shown for dry-run results (0 disables)
    #[arg(long, default_value_t = capsync_core::DEFAULT_PREVIEW_LIMIT)]
    pub preview_limit: usize,
}

#[derive(clap::Args)]
pub struct PlaceholdersArgs {
    /// Template directory (overrides the profile's template_dir)
    #[arg(short, long)]
    pub dir: Option<String>,
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Directory (tenant) ID or domain
    #[arg(long)]
    pub tenant: String,
    /// Application (client) ID
    #[arg(long)]
    pub client_id: String,
    /// Client secret
    #[arg(long, env = "CAPSYNC_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,
    /// Token authority
    #[arg(long, default_value = crate::auth::DEFAULT_AUTHORITY)]
    pub authority: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, template_dir, format, placeholder.<NAME>)
    pub key: String,
    /// Value
    pub value: String,
}
