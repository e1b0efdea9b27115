// Adapters layer: concrete implementations for external systems.

pub mod distance_matrix;

#[cfg(feature = "web")]
pub mod web;
