use clap::Parser;
use drivetime_etl::utils::{logger, validation::Validate};
use drivetime_etl::{
    CliConfig, DistanceMatrixClient, DistancePipeline, EtlEngine, EtlError, LocalStorage,
};

fn fail(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}

#[tokio::main]
async fn main() {
    // .env 可選
    dotenvy::dotenv().ok();

    let config = CliConfig::parse();
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting drivetime-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 缺少 API key 時在任何請求之前中止
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let client = match config
        .provider_settings()
        .and_then(|settings| DistanceMatrixClient::new(&settings))
    {
        Ok(client) => client,
        Err(e) => fail(&e),
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = DistancePipeline::new(LocalStorage::default(), config, client);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Distance lookup completed successfully!");
            println!("✅ Distance lookup completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => fail(&e),
    }
}
