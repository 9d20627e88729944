use crate::core::OutputFormat;
use crate::domain::catalog;
use crate::domain::model::{BillableService, CoefficientField, PayerClass, Service};
use crate::domain::scenario::{GlobalField, Scenario, ScenarioEdit};
use crate::utils::error::{Result, RoiError};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 情境設定檔。所有區段皆可省略，省略的欄位沿用預設值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub scenario: Option<ScenarioMeta>,
    pub volumes: Option<VolumesConfig>,
    pub finance: Option<FinanceConfig>,
    pub capacity: Option<CapacityConfig>,
    pub prices: Option<BTreeMap<String, PriceConfig>>,
    pub services: Option<BTreeMap<String, bool>>,
    pub modules: Option<Vec<ModuleConfig>>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMeta {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumesConfig {
    pub annual_cts: Option<f64>,
    pub monthly_lcs: Option<f64>,
    pub annual_prostate_mrs: Option<f64>,
    /// 清除偶發發現模組的檢查量覆寫 (在模組設定之前套用)
    pub redistribute: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinanceConfig {
    pub commercial_pct: Option<f64>,
    pub retained_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub ion_count: Option<f64>,
    pub ion_capacity: Option<f64>,
    pub da_vinci_count: Option<f64>,
    pub da_vinci_capacity: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceConfig {
    pub medicare: Option<f64>,
    pub commercial: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub id: String,
    pub enabled: Option<bool>,
    pub exam_volume_override: Option<f64>,
    pub exam_share_pct: Option<f64>,
    pub detection_pct: Option<f64>,
    pub capture_with_platform_pct: Option<f64>,
    pub capture_baseline_pct: Option<f64>,
    pub conversion_pct: Option<f64>,
    pub ion_share_pct: Option<f64>,
    pub da_vinci_share_pct: Option<f64>,
    pub followups_per_procedure: Option<f64>,
    pub specialists: Option<f64>,
    pub capacity_per_specialist: Option<f64>,
}

impl ModuleConfig {
    fn coefficient_edits(&self) -> Vec<ScenarioEdit> {
        [
            (CoefficientField::ExamVolumeOverride, self.exam_volume_override),
            (CoefficientField::ExamSharePct, self.exam_share_pct),
            (CoefficientField::DetectionPct, self.detection_pct),
            (
                CoefficientField::CaptureWithPlatformPct,
                self.capture_with_platform_pct,
            ),
            (CoefficientField::CaptureBaselinePct, self.capture_baseline_pct),
            (CoefficientField::ConversionPct, self.conversion_pct),
            (CoefficientField::IonSharePct, self.ion_share_pct),
            (CoefficientField::DaVinciSharePct, self.da_vinci_share_pct),
            (
                CoefficientField::FollowupsPerProcedure,
                self.followups_per_procedure,
            ),
            (CoefficientField::Specialists, self.specialists),
            (
                CoefficientField::CapacityPerSpecialist,
                self.capacity_per_specialist,
            ),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value.map(|v| ScenarioEdit::Coefficient {
                id: self.id.clone(),
                field,
                value: Some(v),
            })
        })
        .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: Option<String>,
    pub output_formats: Option<Vec<String>>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RoiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RoiError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ANNUAL_CTS})；未設定的變數原樣保留
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            RoiError::ConfigValidationError {
                field: "environment".to_string(),
                message: format!("Invalid substitution pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn name(&self) -> Option<&str> {
        self.scenario.as_ref().map(|s| s.name.as_str())
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref()?.output_path.as_deref()
    }

    /// 解析輸出格式；未設定時回傳 `None`
    pub fn output_formats(&self) -> Result<Option<Vec<OutputFormat>>> {
        let Some(formats) = self.output.as_ref().and_then(|o| o.output_formats.as_ref()) else {
            return Ok(None);
        };

        formats
            .iter()
            .map(|format| {
                format
                    .parse::<OutputFormat>()
                    .map_err(|reason| RoiError::InvalidConfigValueError {
                        field: "output.output_formats".to_string(),
                        value: format.clone(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(meta) = &self.scenario {
            validate_non_empty_string("scenario.name", &meta.name)?;
        }

        if let Some(path) = self.output_path() {
            validate_path("output.output_path", path)?;
        }
        self.output_formats()?;

        self.edits()?;
        Ok(())
    }

    /// 將設定檔轉為依序套用的編輯
    pub fn edits(&self) -> Result<Vec<ScenarioEdit>> {
        let mut edits = Vec::new();

        if let Some(volumes) = &self.volumes {
            push_globals(
                &mut edits,
                [
                    (GlobalField::AnnualCts, volumes.annual_cts),
                    (GlobalField::MonthlyLcs, volumes.monthly_lcs),
                    (GlobalField::AnnualProstateMrs, volumes.annual_prostate_mrs),
                ],
            );
            if volumes.redistribute.unwrap_or(false) {
                edits.push(ScenarioEdit::RedistributeExamVolume);
            }
        }

        if let Some(finance) = &self.finance {
            push_globals(
                &mut edits,
                [
                    (GlobalField::CommercialPct, finance.commercial_pct),
                    (GlobalField::RetainedPct, finance.retained_pct),
                ],
            );
        }

        if let Some(capacity) = &self.capacity {
            push_globals(
                &mut edits,
                [
                    (GlobalField::IonCount, capacity.ion_count),
                    (GlobalField::IonCapacity, capacity.ion_capacity),
                    (GlobalField::DaVinciCount, capacity.da_vinci_count),
                    (GlobalField::DaVinciCapacity, capacity.da_vinci_capacity),
                ],
            );
        }

        for (name, price) in self.prices.iter().flatten() {
            let service =
                BillableService::parse(name).ok_or_else(|| RoiError::InvalidConfigValueError {
                    field: "prices".to_string(),
                    value: name.clone(),
                    reason: "Unknown billable service. Valid: clinic, imaging, proc, rob"
                        .to_string(),
                })?;
            for (payer, value) in [
                (PayerClass::Medicare, price.medicare),
                (PayerClass::Commercial, price.commercial),
            ] {
                if let Some(value) = value {
                    edits.push(ScenarioEdit::Price {
                        service,
                        payer,
                        value,
                    });
                }
            }
        }

        for (name, available) in self.services.iter().flatten() {
            let service = Service::parse(name).ok_or_else(|| RoiError::InvalidConfigValueError {
                field: "services".to_string(),
                value: name.clone(),
                reason: format!(
                    "Unknown service. Valid: {}",
                    Service::ALL.map(Service::key).join(", ")
                ),
            })?;
            edits.push(ScenarioEdit::Service {
                service,
                available: *available,
            });
        }

        for module in self.modules.iter().flatten() {
            if catalog::find(&module.id).is_none() {
                return Err(RoiError::UnknownModule {
                    id: module.id.clone(),
                });
            }
            if let Some(enabled) = module.enabled {
                edits.push(ScenarioEdit::ModuleEnabled {
                    id: module.id.clone(),
                    enabled,
                });
            }
            edits.extend(module.coefficient_edits());
        }

        Ok(edits)
    }

    /// 以預設情境為底套用設定檔
    pub fn into_scenario(&self) -> Result<Scenario> {
        let edits = self.edits()?;
        tracing::debug!(
            "Applying {} edits from scenario file{}",
            edits.len(),
            self.name().map(|n| format!(" '{}'", n)).unwrap_or_default()
        );
        Scenario::default().apply_all(edits)
    }
}

fn push_globals<const N: usize>(
    edits: &mut Vec<ScenarioEdit>,
    fields: [(GlobalField, Option<f64>); N],
) {
    edits.extend(
        fields
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| ScenarioEdit::Global(field, v))),
    );
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
