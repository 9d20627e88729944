use crate::domain::outcome::{DeltaRow, ModuleResult, SummaryRow, SummaryTable};

pub struct Aggregator;

impl Aggregator {
    /// 每個模組一列 (停用者為 0)，保持目錄順序，加上總計
    pub fn summarize(results: &[ModuleResult]) -> SummaryTable {
        let mut totals = DeltaRow::default();
        let rows = results
            .iter()
            .map(|result| {
                totals += &result.delta;
                SummaryRow {
                    id: result.id,
                    label: result.label,
                    delta: result.delta,
                }
            })
            .collect();

        SummaryTable { rows, totals }
    }
}

impl SummaryTable {
    /// 由各列重新加總，用於核對總計列
    pub fn column_sums(&self) -> DeltaRow {
        self.rows.iter().fold(DeltaRow::default(), |mut acc, row| {
            acc += &row.delta;
            acc
        })
    }
}
