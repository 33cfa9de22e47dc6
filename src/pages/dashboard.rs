//! Dashboard page: top vendors by contract value.

use crate::query::QueryKey;

/// Default number of vendors on the market-share chart.
pub const DEFAULT_LIMIT: u32 = 25;

pub struct DashboardPage {
    pub limit: u32,
}

impl DashboardPage {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn market_share_key(&self) -> QueryKey {
        QueryKey::MarketShare { limit: self.limit }
    }
}

impl Default for DashboardPage {
    fn default() -> Self {
        Self::new()
    }
}
