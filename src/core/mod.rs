pub mod aggregate;
pub mod allocation;
pub mod engine;
pub mod ledger;
pub mod pricing;
pub mod report;

pub use crate::domain::outcome::{ModuleResult, PassOutput, SummaryTable};
pub use crate::domain::ports::{ConfigProvider, OutputFormat, ReportSink, Storage};
pub use crate::utils::error::Result;
pub use engine::{run_pass, Recalculator};
