use crate::core::ledger::CapacityLedger;
use crate::core::pricing::BlendedPrices;
use crate::domain::model::{
    CoefficientSet, ExamSource, ModuleState, ScenarioConfiguration, Service, SharedResource,
};
use crate::domain::outcome::{DeltaRow, ModuleResult, ModuleStatus};
use crate::utils::error::{Result, RoiError};

/// 缺少必要服務時轉換率的折減係數
pub const COVERAGE_GAP_FACTOR: f64 = 0.4;

/// 所有必要服務都可用時回傳 1.0，否則 0.4。
/// 缺服務只降低轉換，不會歸零：診斷仍然發生。
pub fn coverage_factor(required: &[Service], config: &ScenarioConfiguration) -> f64 {
    if required.iter().all(|s| config.is_available(*s)) {
        1.0
    } else {
        COVERAGE_GAP_FACTOR
    }
}

/// 解析模組的原始檢查量；覆寫值優先，否則依來源種類取全域值
pub fn resolve_exposure(
    exam_source: ExamSource,
    coefficients: &CoefficientSet,
    config: &ScenarioConfiguration,
) -> f64 {
    match exam_source {
        ExamSource::RecurringScreening => {
            coefficients.exam_volume_override.unwrap_or(config.monthly_lcs) * 12.0
        }
        ExamSource::DedicatedExam => coefficients
            .exam_volume_override
            .unwrap_or(config.annual_prostate_mrs),
        ExamSource::IncidentalFinding => coefficients.exam_volume_override.unwrap_or_else(|| {
            (config.annual_cts * coefficients.exam_share_pct / 100.0).round()
        }),
    }
}

/// 單一情境臂 (介入或基準) 的數量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Arm {
    clinic_visits: f64,
    procedures: f64,
    followups: f64,
    robotic_units: f64,
}

impl Arm {
    fn standard_units(&self) -> f64 {
        (self.procedures - self.robotic_units).max(0.0)
    }

    fn revenue(&self, prices: &BlendedPrices, retained: f64) -> f64 {
        let procedure_revenue = retained
            * (self.standard_units() * prices.procedure + self.robotic_units * prices.robotic);
        self.clinic_visits * prices.clinic + self.followups * prices.imaging + procedure_revenue
    }
}

/// 將單一模組的漏斗套用到共用帳本上。
///
/// 一個引擎對應一次重算：設定與混合單價在建立時固定。
pub struct AllocationEngine<'a> {
    config: &'a ScenarioConfiguration,
    prices: BlendedPrices,
    retained: f64,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(config: &'a ScenarioConfiguration) -> Self {
        Self {
            config,
            prices: BlendedPrices::from_config(config),
            retained: config.retained_share(),
        }
    }

    pub fn allocate(
        &self,
        module: &ModuleState,
        ledger: &mut CapacityLedger,
    ) -> Result<ModuleResult> {
        let definition = module.definition;

        if !module.enabled {
            tracing::debug!("Module '{}' disabled, skipping", definition.id);
            return Ok(ModuleResult::disabled(definition));
        }

        let coefficients = module.coefficients.sanitized();

        // 漏斗：檢查量 → 可處置發現 → 兩臂的門診量
        let exposure = resolve_exposure(definition.exam_source, &coefficients, self.config);
        let actionable = exposure * coefficients.detection_pct / 100.0;
        let clinics_with = actionable * coefficients.capture_with_platform_pct / 100.0;
        let clinics_baseline = actionable * coefficients.capture_baseline_pct / 100.0;

        let gate = coverage_factor(definition.required_services, self.config);
        let conversion = coefficients.conversion_pct / 100.0 * gate;

        // 專科人力上限各臂獨立套用，不跨模組共用
        let ceiling = coefficients.staffing_ceiling();
        let procedures_with = (clinics_with * conversion).min(ceiling);
        let procedures_baseline = (clinics_baseline * conversion).min(ceiling);

        ensure_finite(definition.id, "exposure", exposure)?;
        ensure_finite(definition.id, "procedures", procedures_with)?;
        ensure_finite(definition.id, "baseline procedures", procedures_baseline)?;

        // 只有介入臂向共用帳本提領
        let da_vinci = ledger.draw(
            SharedResource::DaVinci,
            procedures_with * coefficients.share_pct(SharedResource::DaVinci) / 100.0,
        );
        let ion = ledger.draw(
            SharedResource::Ion,
            procedures_with * coefficients.share_pct(SharedResource::Ion) / 100.0,
        );

        let intervention = Arm {
            clinic_visits: clinics_with,
            procedures: procedures_with,
            followups: procedures_with * coefficients.followups_per_procedure,
            robotic_units: da_vinci.granted,
        };
        // 基準臂不提領，沿用介入臂核給量作近似
        let baseline = Arm {
            clinic_visits: clinics_baseline,
            procedures: procedures_baseline,
            followups: procedures_baseline * coefficients.followups_per_procedure,
            robotic_units: procedures_baseline.min(da_vinci.granted),
        };
        let baseline_ion = procedures_baseline.min(ion.granted);

        let revenue_delta = intervention.revenue(&self.prices, self.retained)
            - baseline.revenue(&self.prices, self.retained);
        ensure_finite(definition.id, "revenue", revenue_delta)?;

        let procedure_delta = intervention.procedures - baseline.procedures;
        let leakage_avoided = (procedure_delta * self.retained).max(0.0);

        let status = ModuleStatus::from_caps(ion.capped, da_vinci.capped);
        if status.is_constrained() {
            tracing::debug!(
                "Module '{}' constrained ({}): ION {:.1}/{:.1}, da Vinci {:.1}/{:.1} remaining",
                definition.id,
                status,
                ion.granted,
                ledger.remaining(SharedResource::Ion),
                da_vinci.granted,
                ledger.remaining(SharedResource::DaVinci)
            );
        }

        Ok(ModuleResult {
            status,
            clinic_visits: intervention.clinic_visits,
            procedures: intervention.procedures,
            ion_units: ion.granted,
            da_vinci_units: da_vinci.granted,
            revenue_delta,
            leakage_avoided,
            delta: DeltaRow {
                clinic_visits: intervention.clinic_visits - baseline.clinic_visits,
                followups: intervention.followups - baseline.followups,
                procedures: procedure_delta,
                ion_units: ion.granted - baseline_ion,
                da_vinci_units: da_vinci.granted - baseline.robotic_units,
                revenue: revenue_delta,
            },
            ..ModuleResult::disabled(definition)
        })
    }
}

fn ensure_finite(module: &str, quantity: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RoiError::CalculationFault {
            module: module.to_string(),
            message: format!("{} evaluated to {}", quantity, value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;

    fn state(id: &str) -> ModuleState {
        ModuleState::new(catalog::find(id).unwrap())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_resolve_exposure_by_source() {
        let config = ScenarioConfiguration::default();

        let lcs = state("lcs");
        assert_eq!(
            resolve_exposure(ExamSource::RecurringScreening, &lcs.coefficients, &config),
            3000.0
        );

        let prostate = state("prostate");
        assert_eq!(
            resolve_exposure(ExamSource::DedicatedExam, &prostate.coefficients, &config),
            500.0
        );

        let pulm = state("pulm");
        assert_eq!(
            resolve_exposure(ExamSource::IncidentalFinding, &pulm.coefficients, &config),
            18000.0
        );

        let mut overridden = pulm.coefficients;
        overridden.exam_volume_override = Some(1234.0);
        assert_eq!(
            resolve_exposure(ExamSource::IncidentalFinding, &overridden, &config),
            1234.0
        );
    }

    #[test]
    fn test_lcs_funnel_with_defaults() {
        let config = ScenarioConfiguration::default();
        let engine = AllocationEngine::new(&config);
        let mut ledger = CapacityLedger::new(&config);

        let result = engine.allocate(&state("lcs"), &mut ledger).unwrap();

        // 3000 次 × 12% = 360 可處置；70% / 30% 捕獲
        assert!(close(result.clinic_visits, 252.0));
        assert!(close(result.delta.clinic_visits, 144.0));
        // 252 × 35% = 88.2 例程序，未達人力上限 640
        assert!(close(result.procedures, 88.2));
        assert!(close(result.ion_units, 88.2 * 0.55));
        assert!(close(result.da_vinci_units, 8.82));
        assert_eq!(result.status, ModuleStatus::Nominal);
        assert!(close(
            ledger.remaining(SharedResource::Ion),
            500.0 - 88.2 * 0.55
        ));
    }

    #[test]
    fn test_disabled_module_leaves_ledger_untouched() {
        let config = ScenarioConfiguration::default();
        let engine = AllocationEngine::new(&config);
        let mut ledger = CapacityLedger::new(&config);
        let before = ledger.clone();

        let mut renal = state("renal");
        renal.enabled = false;
        let result = engine.allocate(&renal, &mut ledger).unwrap();

        assert_eq!(result, ModuleResult::disabled(renal.definition));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_coverage_gap_scales_conversion() {
        let full = ScenarioConfiguration::default();
        let mut gap = ScenarioConfiguration::default();
        gap.services.insert(Service::Urology, false);

        let prostate = state("prostate");
        let covered = AllocationEngine::new(&full)
            .allocate(&prostate, &mut CapacityLedger::new(&full))
            .unwrap();
        let degraded = AllocationEngine::new(&gap)
            .allocate(&prostate, &mut CapacityLedger::new(&gap))
            .unwrap();

        assert_eq!(coverage_factor(prostate.definition.required_services, &gap), 0.4);
        assert!(close(degraded.procedures, covered.procedures * 0.4));
        // 診斷端不受影響
        assert!(close(degraded.clinic_visits, covered.clinic_visits));
    }

    #[test]
    fn test_staffing_cap_applies_per_arm() {
        let config = ScenarioConfiguration::default();
        let engine = AllocationEngine::new(&config);
        let mut ledger = CapacityLedger::new(&config);

        let mut hernia = state("hernia");
        hernia.coefficients.specialists = 1;
        hernia.coefficients.capacity_per_specialist = 50.0;

        let result = engine.allocate(&hernia, &mut ledger).unwrap();
        assert_eq!(result.procedures, 50.0);
        // 兩臂都被封頂時差額為 0
        assert_eq!(result.delta.procedures, 0.0);
        assert_eq!(result.leakage_avoided, 0.0);
    }

    #[test]
    fn test_exhausted_pool_sets_status() {
        let config = ScenarioConfiguration {
            da_vinci_count: 0,
            ..ScenarioConfiguration::default()
        };
        let engine = AllocationEngine::new(&config);
        let mut ledger = CapacityLedger::new(&config);

        let result = engine.allocate(&state("renal"), &mut ledger).unwrap();
        assert_eq!(result.status, ModuleStatus::DaVinciCapped);
        assert_eq!(result.da_vinci_units, 0.0);
        assert_eq!(result.delta.da_vinci_units, 0.0);
    }

    #[test]
    fn test_revenue_delta_matches_hand_calculation() {
        // 單純化：無 ION / da Vinci、無追蹤、全 Medicare、全留存
        let mut config = ScenarioConfiguration {
            commercial_pct: 0.0,
            retained_pct: 100.0,
            ..ScenarioConfiguration::default()
        };
        config.prices.clinic.medicare = 100.0;
        config.prices.procedure.medicare = 1000.0;

        let mut module = state("prostate");
        module.coefficients = CoefficientSet {
            exam_volume_override: Some(1000.0),
            detection_pct: 10.0,
            capture_with_platform_pct: 50.0,
            capture_baseline_pct: 25.0,
            conversion_pct: 50.0,
            ion_share_pct: 0.0,
            da_vinci_share_pct: 0.0,
            followups_per_procedure: 0.0,
            specialists: 10,
            capacity_per_specialist: 100.0,
            ..module.coefficients
        };

        let engine = AllocationEngine::new(&config);
        let result = engine
            .allocate(&module, &mut CapacityLedger::new(&config))
            .unwrap();

        // 介入：50 門診、25 程序；基準：25 門診、12.5 程序
        let expected = (50.0 * 100.0 + 25.0 * 1000.0) - (25.0 * 100.0 + 12.5 * 1000.0);
        assert!(close(result.revenue_delta, expected));
        assert!(close(result.leakage_avoided, 12.5));
    }

    #[test]
    fn test_infinite_ratio_raises_calculation_fault() {
        let config = ScenarioConfiguration::default();
        let engine = AllocationEngine::new(&config);

        let mut module = state("lcs");
        module.coefficients.exam_volume_override = Some(f64::INFINITY);

        let err = engine
            .allocate(&module, &mut CapacityLedger::new(&config))
            .unwrap_err();
        assert!(matches!(err, RoiError::CalculationFault { module, .. } if module == "lcs"));
    }
}
