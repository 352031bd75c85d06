//! Quince Config - config persistence and capacity accounting
//!
//! - `ConfigPersistService`: atomic config write sequences, read paths,
//!   history queries, batch import and namespace metadata
//! - `CapacityService`: per-scope quota lookup, usage counting and the
//!   maintenance sweeps that keep usage equal to the real config count

pub mod model;
pub mod service;

pub use model::*;
pub use quince_persistence::ConfigFilter;
pub use service::capacity::CapacityService;
pub use service::config::ConfigPersistService;
pub use service::import::infer_config_type;
