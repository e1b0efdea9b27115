use crate::domain::model::{LookupResult, Table, TransformResult, Units};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> &str;
    fn units(&self) -> Units;
    fn pause(&self) -> Duration;
    fn delimiter(&self) -> u8;
}

/// One provider query per call. Failures come back as [`LookupResult::Failed`],
/// never as an error.
#[async_trait]
pub trait DistanceLookup: Send + Sync {
    async fn lookup(&self, origin: &str, destination: &str, units: Units) -> LookupResult;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Table>;
    async fn transform(&self, table: Table) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
