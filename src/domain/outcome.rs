use crate::domain::model::{Guideline, ModuleDefinition};
use serde::Serialize;
use std::fmt;
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Off,
    Nominal,
    IonCapped,
    DaVinciCapped,
    BothCapped,
}

impl ModuleStatus {
    pub fn from_caps(ion_capped: bool, da_vinci_capped: bool) -> Self {
        match (ion_capped, da_vinci_capped) {
            (true, true) => ModuleStatus::BothCapped,
            (true, false) => ModuleStatus::IonCapped,
            (false, true) => ModuleStatus::DaVinciCapped,
            (false, false) => ModuleStatus::Nominal,
        }
    }

    pub fn is_constrained(self) -> bool {
        matches!(
            self,
            ModuleStatus::IonCapped | ModuleStatus::DaVinciCapped | ModuleStatus::BothCapped
        )
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModuleStatus::Off => "Off",
            ModuleStatus::Nominal => "OK",
            ModuleStatus::IonCapped => "ION capped",
            ModuleStatus::DaVinciCapped => "da Vinci capped",
            ModuleStatus::BothCapped => "da Vinci & ION capped",
        };
        f.write_str(label)
    }
}

/// 介入 − 基準 的差額，摘要表與總計列共用
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeltaRow {
    pub clinic_visits: f64,
    pub followups: f64,
    pub procedures: f64,
    pub ion_units: f64,
    pub da_vinci_units: f64,
    pub revenue: f64,
}

impl AddAssign<&DeltaRow> for DeltaRow {
    fn add_assign(&mut self, other: &DeltaRow) {
        self.clinic_visits += other.clinic_visits;
        self.followups += other.followups;
        self.procedures += other.procedures;
        self.ion_units += other.ion_units;
        self.da_vinci_units += other.da_vinci_units;
        self.revenue += other.revenue;
    }
}

impl DeltaRow {
    pub fn is_zero(&self) -> bool {
        *self == DeltaRow::default()
    }
}

/// 單一模組在一次重算中的結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleResult {
    pub id: &'static str,
    pub label: &'static str,
    pub group: &'static str,
    pub blurb: &'static str,
    pub guidelines: &'static [Guideline],
    pub status: ModuleStatus,
    pub clinic_visits: f64,
    pub procedures: f64,
    pub ion_units: f64,
    pub da_vinci_units: f64,
    pub revenue_delta: f64,
    pub leakage_avoided: f64,
    pub delta: DeltaRow,
}

impl ModuleResult {
    pub fn disabled(definition: &'static ModuleDefinition) -> Self {
        Self {
            id: definition.id,
            label: definition.name,
            group: definition.group,
            blurb: definition.blurb,
            guidelines: definition.guidelines,
            status: ModuleStatus::Off,
            clinic_visits: 0.0,
            procedures: 0.0,
            ion_units: 0.0,
            da_vinci_units: 0.0,
            revenue_delta: 0.0,
            leakage_avoided: 0.0,
            delta: DeltaRow::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub id: &'static str,
    pub label: &'static str,
    pub delta: DeltaRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
    pub totals: DeltaRow,
}

/// 一次重算結束時的資源池餘量
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub ion_initial: f64,
    pub ion_remaining: f64,
    pub da_vinci_initial: f64,
    pub da_vinci_remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassOutput {
    pub results: Vec<ModuleResult>,
    pub summary: SummaryTable,
    pub ledger: LedgerSnapshot,
}

impl PassOutput {
    pub fn result(&self, id: &str) -> Option<&ModuleResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn constrained_modules(&self) -> impl Iterator<Item = &ModuleResult> {
        self.results.iter().filter(|r| r.status.is_constrained())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_caps() {
        assert_eq!(ModuleStatus::from_caps(false, false), ModuleStatus::Nominal);
        assert_eq!(ModuleStatus::from_caps(true, false), ModuleStatus::IonCapped);
        assert_eq!(ModuleStatus::from_caps(false, true), ModuleStatus::DaVinciCapped);
        assert_eq!(ModuleStatus::from_caps(true, true), ModuleStatus::BothCapped);
        assert_eq!(ModuleStatus::BothCapped.to_string(), "da Vinci & ION capped");
        assert!(!ModuleStatus::Off.is_constrained());
    }

    #[test]
    fn test_disabled_result_is_all_zero() {
        let definition = crate::domain::catalog::find("renal").unwrap();
        let result = ModuleResult::disabled(definition);
        assert_eq!(result.label, "Renal Mass");
        assert_eq!(result.group, "Urology");
        assert_eq!(result.guidelines, definition.guidelines);
        assert_eq!(result.status, ModuleStatus::Off);
        assert!(result.delta.is_zero());
        assert_eq!(result.revenue_delta, 0.0);
    }
}
