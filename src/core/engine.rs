use crate::core::aggregate::Aggregator;
use crate::core::allocation::AllocationEngine;
use crate::core::ledger::CapacityLedger;
use crate::domain::outcome::PassOutput;
use crate::domain::scenario::Scenario;
use crate::utils::error::{Result, RoiError};
use std::collections::HashSet;

/// 執行一次完整重算。
///
/// 純函式：相同輸入得到相同輸出。帳本只存在於本次呼叫中，
/// 失敗時連同部分結果一起丟棄。
pub fn run_pass(scenario: &Scenario) -> Result<PassOutput> {
    let mut seen = HashSet::with_capacity(scenario.modules.len());
    for module in &scenario.modules {
        if !seen.insert(module.id()) {
            return Err(RoiError::CalculationFault {
                module: module.id().to_string(),
                message: "module appears more than once in the processing order".to_string(),
            });
        }
    }

    let config = scenario.config.sanitized();
    let engine = AllocationEngine::new(&config);
    let mut ledger = CapacityLedger::new(&config);

    tracing::debug!(
        "Starting pass: {} modules ({} enabled), ION pool {:.1}, da Vinci pool {:.1}",
        scenario.modules.len(),
        scenario.enabled_count(),
        ledger.snapshot().ion_initial,
        ledger.snapshot().da_vinci_initial
    );

    let results = scenario
        .modules
        .iter()
        .map(|module| engine.allocate(module, &mut ledger))
        .collect::<Result<Vec<_>>>()?;

    let summary = Aggregator::summarize(&results);

    Ok(PassOutput {
        results,
        summary,
        ledger: ledger.snapshot(),
    })
}

/// 保留最近一次成功的重算結果。
///
/// 重算失敗時不覆寫既有結果，畫面上維持前一次有效的數字。
#[derive(Debug, Default)]
pub struct Recalculator {
    current: Option<PassOutput>,
    passes: u64,
    faults: u64,
}

impl Recalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recalculate(&mut self, scenario: &Scenario) -> Result<&PassOutput> {
        match run_pass(scenario) {
            Ok(output) => {
                self.passes += 1;
                tracing::info!(
                    "✅ Recalculated {} modules: revenue Δ {:.0}, procedures Δ {:.1}",
                    output.results.len(),
                    output.summary.totals.revenue,
                    output.summary.totals.procedures
                );
                for constrained in output.constrained_modules() {
                    tracing::warn!("⚠️ {}: {}", constrained.label, constrained.status);
                }
                Ok(self.current.insert(output))
            }
            Err(e) => {
                self.faults += 1;
                tracing::error!(
                    "❌ Calculation error: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                Err(e)
            }
        }
    }

    pub fn current(&self) -> Option<&PassOutput> {
        self.current.as_ref()
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn faults(&self) -> u64 {
        self.faults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CoefficientField;
    use crate::domain::scenario::ScenarioEdit;

    #[test]
    fn test_default_scenario_runs() {
        let output = run_pass(&Scenario::default()).unwrap();
        assert_eq!(output.results.len(), 15);
        assert_eq!(output.summary.rows.len(), 15);
        assert!(output.summary.totals.revenue > 0.0);
        assert!(output.ledger.ion_remaining >= 0.0);
        assert!(output.ledger.da_vinci_remaining <= output.ledger.da_vinci_initial);
    }

    #[test]
    fn test_duplicate_module_is_a_fault() {
        let mut scenario = Scenario::default();
        let first = scenario.modules[0].clone();
        scenario.modules.push(first);

        let err = run_pass(&scenario).unwrap_err();
        assert!(matches!(err, RoiError::CalculationFault { .. }));
    }

    #[test]
    fn test_recalculator_keeps_previous_output_after_fault() {
        let mut recalculator = Recalculator::new();
        let good = Scenario::default();
        let expected = recalculator.recalculate(&good).unwrap().clone();

        let bad = good
            .apply(ScenarioEdit::Coefficient {
                id: "renal".to_string(),
                field: CoefficientField::ExamVolumeOverride,
                value: Some(f64::INFINITY),
            })
            .unwrap();

        assert!(recalculator.recalculate(&bad).is_err());
        assert_eq!(recalculator.current(), Some(&expected));
        assert_eq!(recalculator.passes(), 1);
        assert_eq!(recalculator.faults(), 1);
    }
}
