use crate::adapters::scenario_link;
use crate::core::{ConfigProvider, OutputFormat, ReportSink, Storage};
use crate::domain::outcome::{DeltaRow, ModuleStatus, PassOutput, SummaryTable};
use crate::domain::scenario::Scenario;
use crate::utils::error::{Result, RoiError};
use crate::utils::format::{fmt_int, fmt_money};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CSV_FILENAME: &str = "thynk-roi-summary.csv";
pub const JSON_FILENAME: &str = "thynk-roi-modules.json";

pub const CSV_HEADER: [&str; 7] = [
    "Module",
    "Clinics Δ",
    "Follow-ups Δ",
    "Procedures Δ",
    "da Vinci Δ",
    "ION Δ",
    "Revenue Δ",
];

fn display_cells(label: &str, delta: &DeltaRow) -> [String; 7] {
    [
        label.to_string(),
        fmt_int(delta.clinic_visits),
        fmt_int(delta.followups),
        fmt_int(delta.procedures),
        fmt_int(delta.da_vinci_units),
        fmt_int(delta.ion_units),
        fmt_money(delta.revenue),
    ]
}

/// 摘要表轉 CSV：每欄都加引號，最後一列為 Total
pub fn summary_csv(table: &SummaryTable) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for row in &table.rows {
        writer.write_record(display_cells(row.label, &row.delta))?;
    }
    writer.write_record(display_cells("Total", &table.totals))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| RoiError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| RoiError::ConfigValidationError {
        field: "csv".to_string(),
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    output: &'a PassOutput,
}

pub fn modules_json(output: &PassOutput, generated_at: DateTime<Utc>) -> Result<String> {
    let report = JsonReport {
        generated_at: generated_at.to_rfc3339(),
        output,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

const TABLE_COLUMNS: usize = 9;

/// 終端機用的對齊表格
pub fn render_table(output: &PassOutput) -> String {
    let mut rows: Vec<[String; TABLE_COLUMNS]> = Vec::with_capacity(output.results.len() + 2);
    let [module, clinics, followups, procedures, da_vinci, ion, revenue] = CSV_HEADER;
    rows.push(
        [
            module, "Group", clinics, followups, procedures, da_vinci, ion, revenue, "Status",
        ]
        .map(str::to_string),
    );

    for (row, result) in output.summary.rows.iter().zip(&output.results) {
        let [a, b, c, d, e, f, g] = display_cells(row.label, &row.delta);
        rows.push([
            a,
            result.group.to_string(),
            b,
            c,
            d,
            e,
            f,
            g,
            result.status.to_string(),
        ]);
    }
    let [a, b, c, d, e, f, g] = display_cells("Total", &output.summary.totals);
    rows.push([a, String::new(), b, c, d, e, f, g, String::new()]);

    let mut widths = [0usize; TABLE_COLUMNS];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut text = String::new();
    for (index, row) in rows.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(column, (cell, width))| {
                let pad = width.saturating_sub(cell.chars().count());
                // 文字欄靠左，數字欄靠右
                if column <= 1 || column == TABLE_COLUMNS - 1 {
                    format!("{}{}", cell, " ".repeat(pad))
                } else {
                    format!("{}{}", " ".repeat(pad), cell)
                }
            })
            .collect();
        text.push_str(line.join("  ").trim_end());
        text.push('\n');
        if index == 0 || index == rows.len() - 2 {
            let total_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
            text.push_str(&"-".repeat(total_width));
            text.push('\n');
        }
    }

    let ledger = &output.ledger;
    text.push_str(&format!(
        "ION remaining: {} / {}   da Vinci remaining: {} / {}\n",
        fmt_int(ledger.ion_remaining),
        fmt_int(ledger.ion_initial),
        fmt_int(ledger.da_vinci_remaining),
        fmt_int(ledger.da_vinci_initial)
    ));
    text
}

/// 已啟用模組的說明與臨床指引連結
pub fn render_guidelines(output: &PassOutput) -> String {
    let mut text = String::new();
    for result in output.results.iter().filter(|r| r.status != ModuleStatus::Off) {
        text.push_str(&format!("{} ({})\n  {}\n", result.label, result.group, result.blurb));
        for guideline in result.guidelines {
            text.push_str(&format!("  - {}: {}\n", guideline.label, guideline.url));
        }
    }
    text
}

/// 打包 CSV、JSON 與情境字串為 ZIP
pub fn report_bundle(
    output: &PassOutput,
    scenario: &Scenario,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default();
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file("summary.csv", options)?;
    zip.write_all(summary_csv(&output.summary)?.as_bytes())?;

    zip.start_file("modules.json", options)?;
    zip.write_all(modules_json(output, generated_at)?.as_bytes())?;

    zip.start_file("scenario.txt", options)?;
    zip.write_all(scenario_link::encode(scenario)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

pub struct ReportWriter<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReportWriter<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn full_path(&self, filename: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), filename)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> ReportSink for ReportWriter<S, C> {
    async fn publish(&self, output: &PassOutput, scenario: &Scenario) -> Result<Vec<String>> {
        let generated_at = Utc::now();
        let mut written = Vec::new();

        for format in self.config.output_formats() {
            let (filename, data) = match format {
                OutputFormat::Csv => (
                    CSV_FILENAME.to_string(),
                    summary_csv(&output.summary)?.into_bytes(),
                ),
                OutputFormat::Json => (
                    JSON_FILENAME.to_string(),
                    modules_json(output, generated_at)?.into_bytes(),
                ),
                OutputFormat::Zip => (
                    format!(
                        "thynk-roi-report_{}.zip",
                        generated_at.format("%Y%m%d_%H%M%S")
                    ),
                    report_bundle(output, scenario, generated_at)?,
                ),
            };

            tracing::debug!("Writing {} ({} bytes) to storage", filename, data.len());
            self.storage.write_file(&filename, &data).await?;
            written.push(self.full_path(&filename));
        }

        Ok(written)
    }
}
