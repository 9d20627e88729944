use crate::domain::catalog;
use crate::domain::model::{
    BillableService, CoefficientField, ExamSource, ModuleState, PayerClass, ScenarioConfiguration,
    Service,
};
use crate::utils::error::{Result, RoiError};
use crate::utils::validation::{clamp_count, clamp_non_negative, clamp_pct};

/// 全域設定中可編輯的數值欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalField {
    AnnualCts,
    MonthlyLcs,
    AnnualProstateMrs,
    CommercialPct,
    RetainedPct,
    IonCount,
    IonCapacity,
    DaVinciCount,
    DaVinciCapacity,
}

/// 一次使用者編輯；套用後產生新的情境，不修改原值
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioEdit {
    Global(GlobalField, f64),
    Price {
        service: BillableService,
        payer: PayerClass,
        value: f64,
    },
    Service {
        service: Service,
        available: bool,
    },
    ModuleEnabled {
        id: String,
        enabled: bool,
    },
    Coefficient {
        id: String,
        field: CoefficientField,
        value: Option<f64>,
    },
    ResetModule {
        id: String,
    },
    /// 清除偶發發現模組的檢查量覆寫，改回依全年 CT 量分配
    RedistributeExamVolume,
    ResetAll,
}

/// 全域設定 + 依目錄順序排列的模組狀態
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub config: ScenarioConfiguration,
    pub modules: Vec<ModuleState>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            config: ScenarioConfiguration::default(),
            modules: catalog::default_states(),
        }
    }
}

impl Scenario {
    pub fn module(&self, id: &str) -> Option<&ModuleState> {
        self.modules.iter().find(|m| m.id() == id)
    }

    fn module_mut(&mut self, id: &str) -> Result<&mut ModuleState> {
        self.modules
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| RoiError::UnknownModule { id: id.to_string() })
    }

    pub fn enabled_count(&self) -> usize {
        self.modules.iter().filter(|m| m.enabled).count()
    }

    pub fn apply(&self, edit: ScenarioEdit) -> Result<Scenario> {
        let mut next = self.clone();

        match edit {
            ScenarioEdit::Global(field, value) => {
                let config = &mut next.config;
                match field {
                    GlobalField::AnnualCts => {
                        config.annual_cts = clamp_non_negative("annual_cts", value)
                    }
                    GlobalField::MonthlyLcs => {
                        config.monthly_lcs = clamp_non_negative("monthly_lcs", value)
                    }
                    GlobalField::AnnualProstateMrs => {
                        config.annual_prostate_mrs =
                            clamp_non_negative("annual_prostate_mrs", value)
                    }
                    GlobalField::CommercialPct => {
                        config.commercial_pct = clamp_pct("commercial_pct", value)
                    }
                    GlobalField::RetainedPct => {
                        config.retained_pct = clamp_pct("retained_pct", value)
                    }
                    GlobalField::IonCount => config.ion_count = clamp_count("ion_count", value),
                    GlobalField::IonCapacity => {
                        config.ion_capacity = clamp_non_negative("ion_capacity", value)
                    }
                    GlobalField::DaVinciCount => {
                        config.da_vinci_count = clamp_count("da_vinci_count", value)
                    }
                    GlobalField::DaVinciCapacity => {
                        config.da_vinci_capacity = clamp_non_negative("da_vinci_capacity", value)
                    }
                }
            }
            ScenarioEdit::Price {
                service,
                payer,
                value,
            } => next.config.prices.set(service, payer, value),
            ScenarioEdit::Service { service, available } => {
                next.config.services.insert(service, available);
            }
            ScenarioEdit::ModuleEnabled { id, enabled } => {
                next.module_mut(&id)?.enabled = enabled;
            }
            ScenarioEdit::Coefficient { id, field, value } => {
                let module = next.module_mut(&id)?;
                let defaults = module.definition.defaults;
                field.apply(&mut module.coefficients, &defaults, value);
            }
            ScenarioEdit::ResetModule { id } => next.module_mut(&id)?.reset(),
            ScenarioEdit::RedistributeExamVolume => {
                for module in next
                    .modules
                    .iter_mut()
                    .filter(|m| m.definition.exam_source == ExamSource::IncidentalFinding)
                {
                    module.coefficients.exam_volume_override = None;
                }
            }
            ScenarioEdit::ResetAll => return Ok(Scenario::default()),
        }

        Ok(next)
    }

    /// 依序套用多個編輯；任一失敗則整批放棄
    pub fn apply_all<I>(&self, edits: I) -> Result<Scenario>
    where
        I: IntoIterator<Item = ScenarioEdit>,
    {
        edits
            .into_iter()
            .try_fold(self.clone(), |scenario, edit| scenario.apply(edit))
    }
}
