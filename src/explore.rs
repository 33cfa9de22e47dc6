//! Graph-exploration state machine.
//!
//! Owns the explorer's view state: which entity type is being searched, the
//! raw and debounced search text, the suggestion list, the active entity
//! whose relationship graph is loaded, the last clicked node, and the canvas
//! layout. All transitions are pure methods over an injected clock; fetches
//! are expressed as [`QueryKey`]s the caller dispatches through the query
//! cache, which also provides the dedup that makes re-selecting the same
//! suggestion side-effect free.

use std::time::Instant;

use crate::config::EdgeLabelConfig;
use crate::debounce::Debouncer;
use crate::model::{GraphNode, GraphResponse, NodeType};
use crate::query::{QueryCache, QueryKey, QueryResult, QueryStatus};

/// Which entity type the explorer searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreMode {
    Vendor,
    Agency,
}

impl ExploreMode {
    pub fn label(&self) -> &'static str {
        match self {
            ExploreMode::Vendor => "Vendor",
            ExploreMode::Agency => "Agency",
        }
    }
}

/// A picked search suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
    pub kind: ExploreMode,
}

/// Canvas layout algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutName {
    Cose,
    Circle,
    Grid,
    BreadthFirst,
    Concentric,
}

impl LayoutName {
    pub const ALL: [LayoutName; 5] = [
        LayoutName::Cose,
        LayoutName::Circle,
        LayoutName::Grid,
        LayoutName::BreadthFirst,
        LayoutName::Concentric,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutName::Cose => "cose",
            LayoutName::Circle => "circle",
            LayoutName::Grid => "grid",
            LayoutName::BreadthFirst => "breadthfirst",
            LayoutName::Concentric => "concentric",
        }
    }

    pub fn next(&self) -> LayoutName {
        let i = Self::ALL.iter().position(|l| l == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// The node most recently clicked on the canvas.
#[derive(Debug, Clone)]
pub struct SelectedNode {
    pub id: String,
    pub label: String,
    pub node_type: NodeType,
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Mutually exclusive render states of the graph area.
#[derive(Debug)]
pub enum ExploreView<'a> {
    /// No active entity yet: idle prompt.
    Prompt,
    Loading,
    Error,
    Loaded(&'a GraphResponse),
}

/// Minimum debounced length before suggestions are queried.
const MIN_SUGGEST_LEN: usize = 2;

pub struct ExploreState {
    pub mode: ExploreMode,
    pub search_text: String,
    pub debounced_search: String,
    pub suggestions: Vec<EntityRef>,
    pub suggestions_open: bool,
    pub active_entity: Option<EntityRef>,
    pub selected_node: Option<SelectedNode>,
    pub layout: LayoutName,
    debouncer: Debouncer,
}

impl ExploreState {
    pub fn new() -> Self {
        Self {
            mode: ExploreMode::Vendor,
            search_text: String::new(),
            debounced_search: String::new(),
            suggestions: Vec::new(),
            suggestions_open: false,
            active_entity: None,
            selected_node: None,
            layout: LayoutName::Cose,
            debouncer: Debouncer::new(Debouncer::SEARCH_SETTLE),
        }
    }

    // -----------------------------------------------------------------------
    // Search input
    // -----------------------------------------------------------------------

    /// Update the raw search text. The debounced copy follows only after the
    /// settle window; each call reschedules it.
    pub fn set_search(&mut self, text: &str, now: Instant) {
        self.search_text = text.to_string();
        self.debouncer.poke(now);
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.search_text.push(c);
        self.debouncer.poke(now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        self.search_text.pop();
        self.debouncer.poke(now);
    }

    /// Advance the debounce clock. When the settle window elapses this
    /// commits the debounced text and, if it is long enough, returns the
    /// suggestions fetch to dispatch.
    pub fn tick(&mut self, now: Instant) -> Option<QueryKey> {
        if !self.debouncer.fire(now) {
            return None;
        }
        self.debounced_search = self.search_text.clone();
        if self.debounced_search.chars().count() < MIN_SUGGEST_LEN {
            self.suggestions.clear();
            self.suggestions_open = false;
            return None;
        }
        Some(self.suggest_key())
    }

    /// The suggestion query for the current mode and debounced text.
    pub fn suggest_key(&self) -> QueryKey {
        match self.mode {
            ExploreMode::Vendor => QueryKey::VendorSuggest {
                query: self.debounced_search.clone(),
            },
            ExploreMode::Agency => QueryKey::AgencySuggest {
                query: self.debounced_search.clone(),
            },
        }
    }

    /// Install fetched suggestions. Ignored when they answer a query that is
    /// no longer the debounced text (stale completion).
    pub fn apply_suggestions(&mut self, key: &QueryKey, result: &QueryResult) {
        if *key != self.suggest_key() {
            return;
        }
        self.suggestions = match result {
            QueryResult::Vendors(page) => page
                .items
                .iter()
                .map(|v| EntityRef {
                    id: v.id.clone(),
                    name: v.canonical_name.clone(),
                    kind: ExploreMode::Vendor,
                })
                .collect(),
            QueryResult::Agencies(page) => page
                .items
                .iter()
                .map(|a| EntityRef {
                    id: a.id.clone(),
                    name: a.agency_name.clone(),
                    kind: ExploreMode::Agency,
                })
                .collect(),
            _ => return,
        };
        self.suggestions_open = !self.suggestions.is_empty();
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Pick a suggestion: it becomes the active entity, its name mirrors
    /// into the search box, the list closes, and any node selection is
    /// cleared. Returns the graph fetch for the entity; the cache dedups
    /// repeats, so re-selecting the same suggestion is idempotent.
    pub fn select_suggestion(&mut self, entity: EntityRef) -> QueryKey {
        self.search_text = entity.name.clone();
        self.suggestions_open = false;
        self.selected_node = None;
        self.debouncer.cancel();
        self.active_entity = Some(entity);
        self.graph_key().expect("active entity was just set")
    }

    /// Switch the searched entity type. Clears search state but keeps the
    /// previously loaded graph visible until a new entity is chosen.
    pub fn set_mode(&mut self, mode: ExploreMode) {
        self.mode = mode;
        self.search_text.clear();
        self.debounced_search.clear();
        self.suggestions.clear();
        self.suggestions_open = false;
        self.debouncer.cancel();
    }

    /// Canvas click callback.
    pub fn click_node(&mut self, node: &GraphNode) {
        self.selected_node = Some(SelectedNode {
            id: node.id.clone(),
            label: node.label.clone(),
            node_type: node.node_type.clone(),
            properties: node.properties.clone(),
        });
    }

    /// Change the canvas layout. Re-layout happens in place at render time;
    /// no refetch, and a no-op until a graph is loaded.
    pub fn set_layout(&mut self, layout: LayoutName) {
        self.layout = layout;
    }

    pub fn cycle_layout(&mut self) {
        self.layout = self.layout.next();
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// The graph fetch for the active entity, if one has been chosen.
    pub fn graph_key(&self) -> Option<QueryKey> {
        self.active_entity.as_ref().map(|e| match e.kind {
            ExploreMode::Vendor => QueryKey::VendorGraph { id: e.id.clone() },
            ExploreMode::Agency => QueryKey::AgencyGraph { id: e.id.clone() },
        })
    }

    /// Resolve the four mutually exclusive render states from the cache.
    pub fn view<'a>(&self, cache: &'a QueryCache) -> ExploreView<'a> {
        let Some(key) = self.graph_key() else {
            return ExploreView::Prompt;
        };
        match cache.status(&key) {
            None | Some(QueryStatus::Loading) => ExploreView::Loading,
            Some(QueryStatus::Failed(_)) => ExploreView::Error,
            Some(QueryStatus::Ready(QueryResult::Graph(graph))) => ExploreView::Loaded(graph),
            // A non-graph payload under a graph key cannot happen; treat as error.
            Some(QueryStatus::Ready(_)) => ExploreView::Error,
        }
    }
}

impl Default for ExploreState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Related entities
// ---------------------------------------------------------------------------

/// Entities related to a selected Contract node, resolved to display labels.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RelatedEntities {
    pub vendor: Option<String>,
    pub awarding_agency: Option<String>,
    pub funding_agency: Option<String>,
}

/// Derive a contract's related entities from the edge set.
///
/// At most one edge per relation is considered: the vendor is the source of
/// the `awarded` edge targeting the contract, the awarding and funding
/// agencies the sources of the `awarded_contract` and `funded` edges. A
/// missing edge means the relation is omitted from display, not an error.
pub fn related_entities(
    graph: &GraphResponse,
    contract_id: &str,
    labels: &EdgeLabelConfig,
) -> RelatedEntities {
    let index = graph.label_index();
    let source_label = |edge_label: &str| -> Option<String> {
        graph
            .edges
            .iter()
            .find(|e| e.target == contract_id && e.label == edge_label)
            .and_then(|e| index.get(e.source.as_str()))
            .map(|label| label.to_string())
    };
    RelatedEntities {
        vendor: source_label(&labels.awarded),
        awarding_agency: source_label(&labels.awarded_contract),
        funding_agency: source_label(&labels.funded),
    }
}
