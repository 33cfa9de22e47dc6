//! End-to-end walk of the graph explorer state machine.
//!
//! Exercises the full flow: typing with debounce, suggestion arrival,
//! selection, graph load, node click, related-entity derivation, and
//! layout/mode changes, with the query cache standing in for the backend.

use std::time::{Duration, Instant};

use govgraph::config::EdgeLabelConfig;
use govgraph::explore::{
    EntityRef, ExploreMode, ExploreState, ExploreView, LayoutName, related_entities,
};
use govgraph::model::{GraphEdge, GraphNode, GraphResponse, NodeType, Paginated, Vendor};
use govgraph::query::{QueryCache, QueryKey, QueryResult, QueryStatus};

fn vendor(id: &str, name: &str) -> Vendor {
    Vendor {
        id: id.to_string(),
        canonical_name: name.to_string(),
        uei: None,
        duns: None,
        resolved_by_llm: false,
        resolution_confidence: 0.97,
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
        contract_count: None,
        total_obligated: None,
    }
}

fn node(id: &str, label: &str, node_type: NodeType) -> GraphNode {
    GraphNode {
        id: id.to_string(),
        label: label.to_string(),
        node_type,
        properties: None,
    }
}

fn edge(id: &str, source: &str, target: &str, label: &str) -> GraphEdge {
    GraphEdge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        label: label.to_string(),
    }
}

fn acme_graph() -> GraphResponse {
    let mut props = serde_json::Map::new();
    props.insert("obligated_amount".into(), serde_json::json!(5_000_000.0));
    props.insert("description".into(), serde_json::json!("IT services"));
    let mut contract = node("c1", "C-0042", NodeType::Contract);
    contract.properties = Some(props);
    GraphResponse {
        nodes: vec![
            node("v1", "Acme Corp", NodeType::Vendor),
            node("a1", "GSA", NodeType::Agency),
            node("a2", "DOD", NodeType::Agency),
            contract,
        ],
        edges: vec![
            edge("e1", "v1", "c1", "AWARDED"),
            edge("e2", "a1", "c1", "AWARDED_CONTRACT"),
            edge("e3", "a2", "c1", "FUNDED"),
        ],
    }
}

#[test]
fn search_select_inspect_flow() {
    let mut state = ExploreState::new();
    let mut cache = QueryCache::new();
    let t0 = Instant::now();

    // Type "acme". Nothing fires inside the settle window.
    state.push_char('a', t0);
    state.push_char('c', t0 + Duration::from_millis(50));
    state.push_char('m', t0 + Duration::from_millis(100));
    state.push_char('e', t0 + Duration::from_millis(150));
    assert!(state.tick(t0 + Duration::from_millis(200)).is_none());

    // The settle window elapses: one suggestion fetch.
    let suggest_key = state.tick(t0 + Duration::from_millis(500)).unwrap();
    assert_eq!(
        suggest_key,
        QueryKey::VendorSuggest {
            query: "acme".to_string()
        }
    );
    assert!(cache.begin(suggest_key.clone()));

    // Suggestions arrive and open the list.
    let payload = QueryResult::Vendors(Paginated {
        total: 1,
        page: 1,
        size: 8,
        items: vec![vendor("v1", "Acme Corp")],
    });
    state.apply_suggestions(&suggest_key, &payload);
    cache.complete(suggest_key, Ok(payload));
    assert!(state.suggestions_open);
    assert_eq!(state.suggestions.len(), 1);

    // Select: the name mirrors into the search box and a graph fetch starts.
    let graph_key = state.select_suggestion(state.suggestions[0].clone());
    assert_eq!(
        graph_key,
        QueryKey::VendorGraph {
            id: "v1".to_string()
        }
    );
    assert_eq!(state.search_text, "Acme Corp");
    assert!(!state.suggestions_open);
    assert!(cache.begin(graph_key.clone()));
    assert!(matches!(state.view(&cache), ExploreView::Loading));

    // The graph lands.
    cache.complete(graph_key, Ok(QueryResult::Graph(acme_graph())));
    let ExploreView::Loaded(graph) = state.view(&cache) else {
        panic!("graph should be loaded");
    };
    assert_eq!(graph.nodes.len(), 4);

    // Click the contract node and derive its related entities.
    let contract = graph.node("c1").cloned().unwrap();
    state.click_node(&contract);
    let selected = state.selected_node.as_ref().unwrap();
    assert_eq!(selected.node_type, NodeType::Contract);

    let ExploreView::Loaded(graph) = state.view(&cache) else {
        panic!("graph should still be loaded");
    };
    let related = related_entities(graph, &selected.id, &EdgeLabelConfig::default());
    assert_eq!(related.vendor.as_deref(), Some("Acme Corp"));
    assert_eq!(related.awarding_agency.as_deref(), Some("GSA"));
    assert_eq!(related.funding_agency.as_deref(), Some("DOD"));
}

#[test]
fn mode_switch_keeps_graph_until_next_selection() {
    let mut state = ExploreState::new();
    let mut cache = QueryCache::new();

    let key = state.select_suggestion(EntityRef {
        id: "v1".to_string(),
        name: "Acme Corp".to_string(),
        kind: ExploreMode::Vendor,
    });
    cache.begin(key.clone());
    cache.complete(key, Ok(QueryResult::Graph(acme_graph())));

    state.set_mode(ExploreMode::Agency);
    assert_eq!(state.search_text, "");
    // The vendor graph stays on screen.
    assert!(matches!(state.view(&cache), ExploreView::Loaded(_)));

    // Choosing an agency replaces it.
    let key = state.select_suggestion(EntityRef {
        id: "a1".to_string(),
        name: "GSA".to_string(),
        kind: ExploreMode::Agency,
    });
    assert_eq!(
        key,
        QueryKey::AgencyGraph {
            id: "a1".to_string()
        }
    );
    assert!(matches!(state.view(&cache), ExploreView::Loading));
}

#[test]
fn reselect_does_not_refetch_a_loaded_graph() {
    let mut state = ExploreState::new();
    let mut cache = QueryCache::new();
    let entity = EntityRef {
        id: "v1".to_string(),
        name: "Acme Corp".to_string(),
        kind: ExploreMode::Vendor,
    };

    let key = state.select_suggestion(entity.clone());
    assert!(cache.begin(key.clone()));
    cache.complete(key, Ok(QueryResult::Graph(acme_graph())));

    let key = state.select_suggestion(entity);
    assert!(!cache.begin(key));
    assert!(matches!(state.view(&cache), ExploreView::Loaded(_)));
}

#[test]
fn stale_graph_completion_cannot_shadow_newer_selection() {
    let mut state = ExploreState::new();
    let mut cache = QueryCache::new();

    let first = state.select_suggestion(EntityRef {
        id: "v1".to_string(),
        name: "Acme Corp".to_string(),
        kind: ExploreMode::Vendor,
    });
    cache.begin(first.clone());

    let second = state.select_suggestion(EntityRef {
        id: "v2".to_string(),
        name: "Globex".to_string(),
        kind: ExploreMode::Vendor,
    });
    cache.begin(second.clone());

    // The first fetch finishes late; it lands under its own key and the
    // explorer, now keyed to v2, keeps showing the loading state.
    cache.complete(first.clone(), Ok(QueryResult::Graph(acme_graph())));
    assert!(matches!(state.view(&cache), ExploreView::Loading));
    assert!(matches!(cache.status(&first), Some(QueryStatus::Ready(_))));
    assert!(matches!(cache.status(&second), Some(QueryStatus::Loading)));
}

#[test]
fn failed_graph_shows_error_and_allows_manual_retry() {
    let mut state = ExploreState::new();
    let mut cache = QueryCache::new();
    let entity = EntityRef {
        id: "v1".to_string(),
        name: "Acme Corp".to_string(),
        kind: ExploreMode::Vendor,
    };

    let key = state.select_suggestion(entity.clone());
    cache.begin(key.clone());
    cache.complete(key, Err("502 Bad Gateway".to_string()));
    assert!(matches!(state.view(&cache), ExploreView::Error));

    // Re-selecting the entity is the only way to retry.
    let key = state.select_suggestion(entity);
    assert!(cache.begin(key));
    assert!(matches!(state.view(&cache), ExploreView::Loading));
}

#[test]
fn layout_change_never_touches_the_cache() {
    let mut state = ExploreState::new();
    let mut cache = QueryCache::new();
    let key = state.select_suggestion(EntityRef {
        id: "v1".to_string(),
        name: "Acme Corp".to_string(),
        kind: ExploreMode::Vendor,
    });
    cache.begin(key.clone());
    cache.complete(key.clone(), Ok(QueryResult::Graph(acme_graph())));

    for _ in 0..LayoutName::ALL.len() {
        state.cycle_layout();
        assert!(!cache.begin(key.clone()));
        assert!(matches!(state.view(&cache), ExploreView::Loaded(_)));
    }
}
