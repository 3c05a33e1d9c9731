use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use pdns_auth_zone::{
    DesiredSpec, MetadataRegistry, PowerDnsClient, Reconciler, RequestedState, ZoneKind,
    config::{ApiConfig, DEFAULT_API_URL, DEFAULT_SERVER_ID},
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// Zone to manage (e.g. example.com.)
    #[arg(long, value_name = "ZONE")]
    name: String,
    /// Requested state of the zone
    #[arg(long, value_enum, default_value_t = RequestedState::Present)]
    state: RequestedState,
    /// PowerDNS API URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// PowerDNS API key
    #[arg(long, value_name = "KEY", env = "PDNS_API_KEY", hide_env_values = true)]
    api_key: String,
    /// PowerDNS server ID
    #[arg(long, value_name = "ID", default_value = DEFAULT_SERVER_ID)]
    server_id: String,
    /// JSON file with desired `properties` and `metadata`
    #[arg(long, value_name = "PATH")]
    desired: Option<PathBuf>,
    /// Zone kind (overrides the desired file)
    #[arg(long, value_enum, ignore_case = true)]
    kind: Option<ZoneKind>,
    /// Account string (overrides the desired file)
    #[arg(long, value_name = "ACCOUNT")]
    account: Option<String>,
    /// SOA nameserver FQDN (repeat for multiple values)
    #[arg(long = "nameserver", value_name = "FQDN")]
    nameservers: Vec<String>,
    /// Master address for Slave zones (repeat for multiple values)
    #[arg(long = "master", value_name = "ADDR")]
    masters: Vec<String>,
    /// Report what would change without modifying anything
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = build_api_config(&cli)?;
    let registry = MetadataRegistry::standard();
    let desired = build_desired(&cli, registry)?;

    let client = PowerDnsClient::from_config(&config);
    let reconciler = Reconciler::new(&client, registry).dry_run(cli.check);

    info!(zone = %cli.name, state = %cli.state, check = cli.check, "reconciling zone");
    let report = reconciler.run(&cli.name, cli.state, &desired).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to encode report")?
    );
    Ok(())
}

fn build_api_config(cli: &Cli) -> Result<ApiConfig> {
    if cli.api_key.trim().is_empty() {
        bail!("--api-key (or PDNS_API_KEY) must not be empty");
    }
    Ok(ApiConfig::new(&cli.api_url, &cli.api_key, &cli.server_id))
}

fn build_desired(cli: &Cli, registry: &MetadataRegistry) -> Result<DesiredSpec> {
    let mut desired = match &cli.desired {
        Some(path) => DesiredSpec::load(path, registry)?,
        None => DesiredSpec::default(),
    };

    let props = &mut desired.properties;
    if let Some(kind) = cli.kind {
        props.kind = Some(kind);
    }
    if let Some(account) = &cli.account {
        props.account = Some(account.clone());
    }
    if !cli.nameservers.is_empty() {
        props.nameservers = Some(cli.nameservers.clone());
    }
    if !cli.masters.is_empty() {
        props.masters = Some(cli.masters.clone());
    }

    Ok(desired)
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
