use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Extract, transform and load once; returns where the output was written.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting distance lookup run...");

        let table = self.pipeline.extract().await?;
        tracing::info!("📥 Loaded {} rows", table.len());
        self.monitor.log_stats("Extract");

        let result = self.pipeline.transform(table).await?;
        tracing::info!(
            "🔄 Looked up {} rows: {} OK, {} failed",
            result.summary.total,
            result.summary.succeeded,
            result.summary.failed
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
