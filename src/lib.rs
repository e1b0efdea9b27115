pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, ProviderSettings};

pub use adapters::distance_matrix::DistanceMatrixClient;
pub use crate::core::{
    etl::EtlEngine,
    pipeline::{enrich_bytes, DistancePipeline, EnrichedCsv},
};
pub use domain::model::{LookupResult, OutputTable, RunSummary, Table, Units};
pub use utils::error::{EtlError, Result};
