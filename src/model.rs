//! Wire types for the analytics/graph REST API.
//!
//! All of these are immutable value objects deserialized from backend JSON.
//! The client never mutates them — every parameter change discards the old
//! result and refetches.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A resolved vendor entity. Confidence and the LLM flag are provenance
/// metadata from upstream entity resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub canonical_name: String,
    pub uei: Option<String>,
    pub duns: Option<String>,
    pub resolved_by_llm: bool,
    /// Resolution confidence in [0, 1].
    pub resolution_confidence: f64,
    pub created_at: String,
    pub updated_at: String,
    /// Present on list responses (joined from contracts); absent on detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_obligated: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub id: String,
    pub agency_name: String,
    pub agency_code: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub items: Vec<T>,
}

// ---------------------------------------------------------------------------
// Analytics rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketShareEntry {
    pub canonical_name: String,
    pub award_count: u64,
    pub total_obligated: f64,
    pub market_share_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingPoint {
    pub period: String,
    pub contract_count: u64,
    pub total_obligated: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyEntry {
    pub canonical_name: String,
    pub contract_id: String,
    pub obligated_amount: f64,
    pub avg_amount: f64,
    pub z_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntrant {
    pub canonical_name: String,
    pub first_award: String,
    pub award_count: u64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoleSourceFlag {
    pub agency_name: String,
    pub sole_vendor: String,
    pub contracts: u64,
    pub total_spend: f64,
}

/// Pass-through intermediary vendor. Typed for API completeness; the current
/// UI does not exercise it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubVendor {
    pub canonical_name: String,
    pub sub_count: u64,
    pub total_passed_down: f64,
    pub passthrough_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Node type tag. The backend vocabulary is open-ended; unknown tags are
/// preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Vendor,
    Agency,
    Contract,
    Other(String),
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Vendor" => NodeType::Vendor,
            "Agency" => NodeType::Agency,
            "Contract" => NodeType::Contract,
            _ => NodeType::Other(s),
        }
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Vendor => write!(f, "Vendor"),
            NodeType::Agency => write!(f, "Agency"),
            NodeType::Contract => write!(f, "Contract"),
            NodeType::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Free-form property bag; populated for Contract nodes (contract id,
    /// description, obligated amount, signed date).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Directed edge. The relationship label set is open-ended and interpreted
/// by convention (see `EdgeLabelConfig`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Node and edge set returned for one graph query.
///
/// The backend promises every edge endpoint appears in the node set; the
/// client does not enforce this, so a violation renders as dangling edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphResponse {
    /// Node id → display label lookup.
    pub fn label_index(&self) -> HashMap<&str, &str> {
        self.nodes
            .iter()
            .map(|n| (n.id.as_str(), n.label.as_str()))
            .collect()
    }

    /// Legend counts, grouped by node type. Vendor/Agency/Contract first in
    /// fixed order, then any other tags in first-seen order.
    pub fn legend_counts(&self) -> Vec<(NodeType, usize)> {
        let mut order = vec![NodeType::Vendor, NodeType::Agency, NodeType::Contract];
        let mut counts: HashMap<NodeType, usize> = HashMap::new();
        for node in &self.nodes {
            if !order.contains(&node.node_type) {
                order.push(node.node_type.clone());
            }
            *counts.entry(node.node_type.clone()).or_insert(0) += 1;
        }
        order
            .into_iter()
            .filter_map(|t| counts.get(&t).map(|&c| (t, c)))
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, label: &str, node_type: NodeType) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            label: label.to_string(),
            node_type,
            properties: None,
        }
    }

    #[test]
    fn node_type_round_trips_unknown_tags() {
        let t: NodeType = serde_json::from_str("\"Subaward\"").unwrap();
        assert_eq!(t, NodeType::Other("Subaward".to_string()));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"Subaward\"");
    }

    #[test]
    fn legend_counts_group_by_type_in_fixed_order() {
        let graph = GraphResponse {
            nodes: vec![
                node("c1", "C-1", NodeType::Contract),
                node("v1", "Acme", NodeType::Vendor),
                node("c2", "C-2", NodeType::Contract),
                node("a1", "GSA", NodeType::Agency),
            ],
            edges: vec![],
        };
        assert_eq!(
            graph.legend_counts(),
            vec![
                (NodeType::Vendor, 1),
                (NodeType::Agency, 1),
                (NodeType::Contract, 2),
            ]
        );
    }

    #[test]
    fn vendor_detail_payload_without_joined_fields_parses() {
        let v: Vendor = serde_json::from_str(
            r#"{
                "id": "v1",
                "canonical_name": "Acme Corp",
                "uei": null,
                "duns": "123456789",
                "resolved_by_llm": true,
                "resolution_confidence": 0.93,
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-06-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(v.canonical_name, "Acme Corp");
        assert!(v.uei.is_none());
        assert!(v.contract_count.is_none());
    }

    #[test]
    fn label_index_resolves_ids() {
        let graph = GraphResponse {
            nodes: vec![node("v1", "Acme", NodeType::Vendor)],
            edges: vec![],
        };
        assert_eq!(graph.label_index().get("v1"), Some(&"Acme"));
    }
}
