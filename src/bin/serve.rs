use clap::Parser;
use drivetime_etl::adapters::web;
use drivetime_etl::config::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECONDS};
use drivetime_etl::utils::{logger, validation::Validate};
use drivetime_etl::{DistanceMatrixClient, ProviderSettings};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "serve")]
#[command(about = "Web front-end: upload a CSV, download it with drive times")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8501)]
    port: u16,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    timeout_seconds: u64,

    #[arg(long, default_value = DEFAULT_ENDPOINT, hide = true)]
    endpoint: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    logger::init_server_logger(args.verbose, args.json_logs);

    // 啟動時讀取 API key，缺少就拒絕啟動
    let settings = match ProviderSettings::from_env() {
        Ok(settings) => settings
            .with_endpoint(args.endpoint)
            .with_timeout(Duration::from_secs(args.timeout_seconds)),
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    };
    settings.validate()?;

    let client = DistanceMatrixClient::new(&settings)?;
    web::start_server(args.port, Arc::new(client)).await?;
    Ok(())
}
