use clap::Parser;
use thynk_roi::adapters::scenario_link;
use thynk_roi::core::report::{render_guidelines, render_table};
use thynk_roi::core::ReportSink;
use thynk_roi::utils::error::ErrorSeverity;
use thynk_roi::utils::{logger, validation::Validate};
use thynk_roi::{
    CliConfig, LocalStorage, Recalculator, ReportWriter, Result, Scenario, TomlConfig,
};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting thynk-roi CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Recalculation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<()> {
    let file = config
        .scenario_file
        .as_deref()
        .map(TomlConfig::from_file)
        .transpose()?;

    let mut scenario = match &file {
        Some(file) => {
            file.validate()?;
            tracing::info!(
                "📄 Loaded scenario file{}",
                file.name().map(|n| format!(" '{}'", n)).unwrap_or_default()
            );
            file.into_scenario()?
        }
        None => Scenario::default(),
    };

    // 分享字串載入失敗不中斷，沿用目前情境
    if let Some(text) = &config.scenario {
        let (loaded, warning) = if text.contains('#') {
            scenario_link::load_from_url(text, &scenario)
        } else {
            scenario_link::load_or_keep(text, &scenario)
        };
        if let Some(warning) = warning {
            eprintln!("⚠️ {}", warning.user_friendly_message());
        }
        scenario = loaded;
    }

    let mut recalculator = Recalculator::new();
    let output = recalculator.recalculate(&scenario)?;
    print!("{}", render_table(output));
    if config.verbose {
        print!("\n{}", render_guidelines(output));
    }

    if let Some(base) = &config.save_url {
        let url = scenario_link::to_url(base, &scenario)?;
        println!("🔗 {}", url);
    }

    if config.dry_run {
        tracing::info!("Dry run: no reports written");
        return Ok(());
    }

    let settings = config.report_settings(file.as_ref())?;
    settings.validate()?;

    let storage = LocalStorage::new(settings.output_path.clone());
    let writer = ReportWriter::new(storage, settings);
    let written = writer.publish(output, &scenario).await?;

    for path in &written {
        tracing::info!("📁 Report saved to: {}", path);
        println!("📁 {}", path);
    }

    Ok(())
}
