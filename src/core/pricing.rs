use crate::domain::model::{BillableService, PayerPrices, ScenarioConfiguration};
use crate::utils::validation::clamp_pct;
use serde::Serialize;

/// 依商保比例混合後的單價；每次重算計算一次，所有模組共用
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlendedPrices {
    pub clinic: f64,
    pub imaging: f64,
    pub procedure: f64,
    pub robotic: f64,
}

pub fn blend(prices: &PayerPrices, commercial_share: f64) -> f64 {
    (1.0 - commercial_share) * prices.medicare + commercial_share * prices.commercial
}

impl BlendedPrices {
    pub fn from_config(config: &ScenarioConfiguration) -> Self {
        let share = clamp_pct("commercial_pct", config.commercial_pct) / 100.0;
        let price = |service: BillableService| blend(config.prices.get(service), share);

        Self {
            clinic: price(BillableService::Clinic),
            imaging: price(BillableService::Imaging),
            procedure: price(BillableService::Procedure),
            robotic: price(BillableService::Robotic),
        }
    }

    pub fn get(&self, service: BillableService) -> f64 {
        match service {
            BillableService::Clinic => self.clinic,
            BillableService::Imaging => self.imaging,
            BillableService::Procedure => self.procedure,
            BillableService::Robotic => self.robotic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clinic_price_blend() {
        // 0.9 × 150 + 0.1 × 280
        let prices = BlendedPrices::from_config(&ScenarioConfiguration::default());
        assert!((prices.clinic - 163.0).abs() < 1e-9);
        assert!((prices.get(BillableService::Imaging) - 277.0).abs() < 1e-9);
    }

    #[test]
    fn test_blend_extremes() {
        let prices = PayerPrices::new(5000.0, 11000.0);
        assert_eq!(blend(&prices, 0.0), 5000.0);
        assert_eq!(blend(&prices, 1.0), 11000.0);
    }

    #[test]
    fn test_out_of_range_mix_is_clamped() {
        let config = ScenarioConfiguration {
            commercial_pct: 250.0,
            ..ScenarioConfiguration::default()
        };
        let prices = BlendedPrices::from_config(&config);
        assert_eq!(prices.robotic, 14000.0);
    }
}
