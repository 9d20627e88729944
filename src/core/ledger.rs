use crate::domain::model::{ScenarioConfiguration, SharedResource};
use crate::domain::outcome::LedgerSnapshot;

/// 一次提領的結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grant {
    pub granted: f64,
    pub capped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pool {
    initial: f64,
    remaining: f64,
}

impl Pool {
    fn new(capacity: f64) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            initial: capacity,
            remaining: capacity,
        }
    }
}

/// 兩個共用資源池的帳本。
///
/// 每次重算開始時重設，之後只會減少。模組依目錄順序提領，
/// 先處理的模組先取得容量，沒有公平分配或優先權。
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityLedger {
    ion: Pool,
    da_vinci: Pool,
}

impl CapacityLedger {
    pub fn new(config: &ScenarioConfiguration) -> Self {
        Self {
            ion: Pool::new(config.pool_capacity(SharedResource::Ion)),
            da_vinci: Pool::new(config.pool_capacity(SharedResource::DaVinci)),
        }
    }

    /// 直接指定兩池容量
    pub fn with_capacity(ion: f64, da_vinci: f64) -> Self {
        Self {
            ion: Pool::new(ion),
            da_vinci: Pool::new(da_vinci),
        }
    }

    pub fn reset(&mut self, config: &ScenarioConfiguration) {
        *self = Self::new(config);
    }

    fn pool_mut(&mut self, resource: SharedResource) -> &mut Pool {
        match resource {
            SharedResource::Ion => &mut self.ion,
            SharedResource::DaVinci => &mut self.da_vinci,
        }
    }

    fn pool(&self, resource: SharedResource) -> &Pool {
        match resource {
            SharedResource::Ion => &self.ion,
            SharedResource::DaVinci => &self.da_vinci,
        }
    }

    /// 提領 `min(requested, remaining)`，是唯一會改變餘量的操作
    pub fn draw(&mut self, resource: SharedResource, requested: f64) -> Grant {
        let pool = self.pool_mut(resource);
        // NaN 與負值視為 0
        let requested = requested.max(0.0);
        let capped = requested > pool.remaining;
        let granted = requested.min(pool.remaining);
        pool.remaining = (pool.remaining - granted).max(0.0);

        Grant { granted, capped }
    }

    pub fn remaining(&self, resource: SharedResource) -> f64 {
        self.pool(resource).remaining
    }

    pub fn initial(&self, resource: SharedResource) -> f64 {
        self.pool(resource).initial
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            ion_initial: self.ion.initial,
            ion_remaining: self.ion.remaining,
            da_vinci_initial: self.da_vinci.initial,
            da_vinci_remaining: self.da_vinci.remaining,
        }
    }
}
