use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::{Datelike, Utc};
use clap::Parser;
use legisync_client::LegistarClient;
use legisync_core::SyncConfig;
use legisync_sheets::{SheetGateway, SheetsSession};
use tracing::info;

mod sync;

/// Sync bill metadata from the Legistar API into a Google Sheet.
#[derive(Parser, Debug)]
#[command(name = "legisync", version, about)]
struct Args {
    /// Path to the JSON config file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Legistar API token.
    #[arg(long, env = "LEGISTAR_API_TOKEN", hide_env_values = true)]
    api_token: String,

    /// Pre-provisioned OAuth bearer token for the Sheets API.
    #[arg(long, env = "SHEETS_ACCESS_TOKEN", hide_env_values = true)]
    sheets_token: String,

    /// Session year for the derived tab name; defaults to the current
    /// calendar year. Ignored when the config names a tab explicitly.
    #[arg(long)]
    year: Option<i32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = SyncConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;

    let year = args.year.unwrap_or_else(|| Utc::now().year());
    let sheet_name = config.sheet_name(year);
    info!(sheet = %sheet_name, spreadsheet = %config.spreadsheet_id, "starting sync");

    let timeout = Duration::from_secs(config.timeout_secs);
    let client = LegistarClient::new(&config.legistar, args.api_token, timeout)
        .context("building Legistar client")?;

    // The session owns the spreadsheet credential for the duration of the
    // run and is dropped with the gateway on exit.
    let session =
        SheetsSession::new(args.sheets_token, timeout).context("building Sheets session")?;
    let gateway = SheetGateway::open(
        session,
        config.spreadsheet_id.clone(),
        sheet_name,
        config.header_row,
        &config.columns,
    )
    .await
    .context("opening sheet")?;

    let stats = sync::run_sync(&client, &gateway, config.history_match).await?;
    info!(
        synced = stats.synced,
        not_found = stats.not_found,
        skipped = stats.skipped,
        malformed = stats.malformed,
        "sync complete"
    );
    Ok(())
}
