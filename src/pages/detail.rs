//! Entity detail pages: a vendor with its relationship graph, an agency
//! with its spending-over-time chart.

use crate::api::Period;
use crate::query::QueryKey;

/// Vendor detail: the vendor record plus its relationship graph.
pub struct VendorDetailPage {
    pub id: String,
}

impl VendorDetailPage {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    pub fn vendor_key(&self) -> QueryKey {
        QueryKey::Vendor {
            id: self.id.clone(),
        }
    }

    pub fn graph_key(&self) -> QueryKey {
        QueryKey::VendorGraph {
            id: self.id.clone(),
        }
    }
}

/// Agency detail: the agency record plus spending aggregated by period.
pub struct AgencyDetailPage {
    pub id: String,
    pub period: Period,
}

impl AgencyDetailPage {
    pub fn new(id: String) -> Self {
        Self {
            id,
            period: Period::Month,
        }
    }

    pub fn agency_key(&self) -> QueryKey {
        QueryKey::Agency {
            id: self.id.clone(),
        }
    }

    pub fn spending_key(&self) -> QueryKey {
        QueryKey::Spending {
            agency_id: self.id.clone(),
            period: self.period,
        }
    }

    /// Switch the aggregation period. The spending fetch is keyed by
    /// `(id, period)`, so a change refetches; the agency record does not.
    pub fn set_period(&mut self, period: Period) -> QueryKey {
        self.period = period;
        self.spending_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_change_yields_new_spending_key() {
        let mut page = AgencyDetailPage::new("a1".to_string());
        let monthly = page.spending_key();
        let quarterly = page.set_period(Period::Quarter);
        assert_ne!(monthly, quarterly);
        assert_eq!(
            quarterly,
            QueryKey::Spending {
                agency_id: "a1".to_string(),
                period: Period::Quarter,
            }
        );
        // The agency record key is unaffected by the period.
        assert_eq!(
            page.agency_key(),
            QueryKey::Agency {
                id: "a1".to_string()
            }
        );
    }

    #[test]
    fn vendor_detail_pairs_record_and_graph() {
        let page = VendorDetailPage::new("v1".to_string());
        assert_eq!(
            page.vendor_key(),
            QueryKey::Vendor {
                id: "v1".to_string()
            }
        );
        assert_eq!(
            page.graph_key(),
            QueryKey::VendorGraph {
                id: "v1".to_string()
            }
        );
    }
}
