//! Quince server library
//!
//! Configuration loading and process bootstrap for the config persistence
//! and capacity accounting services.

pub mod model;
pub mod startup;
