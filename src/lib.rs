pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::LocalStorage;
pub use config::{EtlConfig, ResolvedConfig, RowErrorPolicy};
pub use core::{etl::EtlEngine, pipeline::CsvPipeline};
pub use utils::error::{EtlError, Result};
