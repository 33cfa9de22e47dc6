//! Risk indicators page: three independent data regions.

use crate::query::QueryKey;

/// Default z-score threshold for award-spike detection.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;
/// Default look-back window for new entrants.
pub const DEFAULT_ENTRANT_DAYS: u32 = 90;

/// Award spikes, new entrants, and sole-source concentration. Each region
/// loads, fails, or populates on its own; one failing does not blank the
/// others.
pub struct RiskPage {
    pub z_threshold: f64,
    pub entrant_days: u32,
}

impl RiskPage {
    pub fn new() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
            entrant_days: DEFAULT_ENTRANT_DAYS,
        }
    }

    pub fn spikes_key(&self) -> QueryKey {
        QueryKey::award_spikes(self.z_threshold)
    }

    pub fn entrants_key(&self) -> QueryKey {
        QueryKey::NewEntrants {
            days: self.entrant_days,
        }
    }

    pub fn sole_source_key(&self) -> QueryKey {
        QueryKey::SoleSource
    }

    /// All three fetches, dispatched together when the page opens.
    pub fn keys(&self) -> [QueryKey; 3] {
        [
            self.spikes_key(),
            self.entrants_key(),
            self.sole_source_key(),
        ]
    }
}

impl Default for RiskPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_match_backend_defaults() {
        let page = RiskPage::new();
        assert_eq!(
            page.spikes_key(),
            QueryKey::AwardSpikes {
                z_threshold_milli: 3000
            }
        );
        assert_eq!(page.entrants_key(), QueryKey::NewEntrants { days: 90 });
    }

    #[test]
    fn regions_have_distinct_keys() {
        let keys = RiskPage::new().keys();
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_ne!(keys[0], keys[2]);
    }
}
