use clap::Parser;
use drivetime_etl::domain::ports::ConfigProvider;
use drivetime_etl::utils::{logger, validation::Validate};
use drivetime_etl::{DistanceMatrixClient, DistancePipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Distance lookup driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "drivetime.toml")]
    config: String,

    /// Override `[source] input_path`
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Validate config and input, then stop before any lookup
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based distance lookup");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(input) = args.input {
        tracing::info!("🔧 Input overridden to: {}", input);
        config.source.input_path = input;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    let storage = LocalStorage::default();

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No lookups will be made");
        return perform_dry_run(&config, &storage).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let client = DistanceMatrixClient::new(&config.provider_settings()?)?;
    let pipeline = DistancePipeline::new(storage, config, client);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Distance lookup completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Run failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("   Input: {}", config.input_path());
    tracing::info!("   Endpoint: {}", config.endpoint());
    tracing::info!("   Units: {}", config.units());
    tracing::info!("   Pause: {:?}", config.pause());
    tracing::info!("   Timeout: {}s", config.timeout_seconds());
    tracing::info!(
        "   Output: {}/{}",
        config.output_path(),
        config.output_filename()
    );
}

async fn perform_dry_run(
    config: &TomlConfig,
    storage: &LocalStorage,
) -> Result<(), Box<dyn std::error::Error>> {
    use drivetime_etl::core::loader;
    use drivetime_etl::domain::ports::Storage;

    let bytes = storage.read_file(config.input_path()).await?;
    let table = loader::parse_table(&bytes, config.delimiter())?;

    let estimated = config.pause() * u32::try_from(table.len()).unwrap_or(u32::MAX);
    tracing::info!("🔍 Input is valid: {} rows, columns {:?}", table.len(), table.headers);
    tracing::info!("🔍 Would make {} provider requests (pauses add {:?})", table.len(), estimated);
    Ok(())
}
