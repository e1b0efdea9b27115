pub mod assembler;
pub mod emitter;
pub mod etl;
pub mod loader;
pub mod pipeline;
pub mod processor;

pub use crate::domain::model::{Table, TransformResult};
pub use crate::domain::ports::{ConfigProvider, DistanceLookup, Pipeline, Storage};
pub use crate::utils::error::Result;
