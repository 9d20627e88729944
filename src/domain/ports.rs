use crate::domain::outcome::PassOutput;
use crate::domain::scenario::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 報表輸出需要的設定
pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// 寫出一次重算的報表，回傳寫入的檔案路徑
    async fn publish(&self, output: &PassOutput, scenario: &Scenario) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Csv,
    Json,
    Zip,
}

impl OutputFormat {
    pub const VALID: [&'static str; 3] = ["csv", "json", "zip"];
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "zip" => Ok(OutputFormat::Zip),
            other => Err(format!(
                "Unsupported format '{}'. Valid formats: {}",
                other,
                OutputFormat::VALID.join(", ")
            )),
        }
    }
}
