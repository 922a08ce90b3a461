//! Local configuration loading.

pub mod config;

pub use config::{Config, ResolvedConfig};
