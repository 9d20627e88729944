pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, ReportSettings};

pub use core::report::ReportWriter;
pub use core::{run_pass, Recalculator};
pub use domain::scenario::{Scenario, ScenarioEdit};
pub use utils::error::{Result, RoiError};
