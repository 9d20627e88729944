pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, OutputFormat};
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::utils::error::RoiError;
#[cfg(feature = "cli")]
use crate::utils::validation::validate_non_empty_string;
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// 報表輸出設定；優先順序為命令列、情境檔、預設值
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            output_formats: vec![OutputFormat::Csv],
        }
    }
}

impl ReportSettings {
    pub fn resolve(
        output_path: Option<&str>,
        formats: &[OutputFormat],
        file: Option<&TomlConfig>,
    ) -> Result<Self> {
        let defaults = Self::default();

        let output_path = output_path
            .or_else(|| file.and_then(TomlConfig::output_path))
            .map(str::to_string)
            .unwrap_or(defaults.output_path);

        let output_formats = if !formats.is_empty() {
            formats.to_vec()
        } else {
            match file {
                Some(file) => file.output_formats()?.unwrap_or(defaults.output_formats),
                None => defaults.output_formats,
            }
        };

        Ok(Self {
            output_path,
            output_formats,
        })
    }
}

impl ConfigProvider for ReportSettings {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }
}

impl Validate for ReportSettings {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "thynk-roi")]
#[command(about = "Estimate the impact of care navigation across finding modules")]
pub struct CliConfig {
    #[arg(long, help = "TOML scenario file")]
    pub scenario_file: Option<String>,

    #[arg(long, help = "Encoded scenario string or share URL (#s=...)")]
    pub scenario: Option<String>,

    #[arg(long, help = "Report directory [default: ./output]")]
    pub output_path: Option<String>,

    #[arg(long = "format", value_delimiter = ',', help = "csv, json, zip [default: csv]")]
    pub formats: Vec<OutputFormat>,

    #[arg(long, help = "Print a share URL built on this base address")]
    pub save_url: Option<String>,

    #[arg(long, help = "Calculate and print without writing reports")]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn report_settings(&self, file: Option<&TomlConfig>) -> Result<ReportSettings> {
        ReportSettings::resolve(self.output_path.as_deref(), &self.formats, file)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.output_path {
            validate_path("output_path", path)?;
        }
        if let Some(file) = &self.scenario_file {
            validate_path("scenario_file", file)?;
        }
        if let Some(scenario) = &self.scenario {
            validate_non_empty_string("scenario", scenario)?;
        }
        if let Some(base) = &self.save_url {
            url::Url::parse(base).map_err(|e| RoiError::InvalidConfigValueError {
                field: "save_url".to_string(),
                value: base.clone(),
                reason: format!("Invalid URL format: {}", e),
            })?;
        }
        Ok(())
    }
}
