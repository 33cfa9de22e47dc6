//! Explicit request cache and background fetch pool.
//!
//! Every fetch is keyed by its full parameter tuple ([`QueryKey`]). The
//! cache dedups in-flight and completed requests by key, and a completion
//! is always written under the key it was dispatched with — a superseded
//! request can never overwrite state belonging to a newer parameter tuple.
//! Nothing is retried automatically.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::time::Instant;

use crate::api::{ApiClient, Period};
use crate::error::GovResult;
use crate::model::{
    Agency, AnomalyEntry, GraphResponse, MarketShareEntry, NewEntrant, Paginated,
    SoleSourceFlag, SpendingPoint, Vendor,
};

// ---------------------------------------------------------------------------
// Keys & results
// ---------------------------------------------------------------------------

/// (operation, parameter tuple) identity of one backend request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Vendors { query: Option<String>, page: u32 },
    Agencies { query: Option<String>, page: u32 },
    Vendor { id: String },
    Agency { id: String },
    MarketShare { limit: u32 },
    Spending { agency_id: String, period: Period },
    AwardSpikes { z_threshold_milli: u32 },
    NewEntrants { days: u32 },
    SoleSource,
    VendorGraph { id: String },
    AgencyGraph { id: String },
    ShortestPath { from: String, to: String },
    /// Suggestion lookups are a distinct operation from page listings even
    /// though they hit the same endpoint: their parameter tuple is the
    /// debounced text alone.
    VendorSuggest { query: String },
    AgencySuggest { query: String },
}

impl QueryKey {
    /// z-thresholds are carried in millis so the key stays `Eq + Hash`.
    pub fn award_spikes(z_threshold: f64) -> Self {
        QueryKey::AwardSpikes {
            z_threshold_milli: (z_threshold * 1000.0) as u32,
        }
    }
}

/// Successfully decoded payload for one query.
#[derive(Debug, Clone)]
pub enum QueryResult {
    Vendors(Paginated<Vendor>),
    Agencies(Paginated<Agency>),
    Vendor(Vendor),
    Agency(Agency),
    MarketShare(Vec<MarketShareEntry>),
    Spending(Vec<SpendingPoint>),
    AwardSpikes(Vec<AnomalyEntry>),
    NewEntrants(Vec<NewEntrant>),
    SoleSource(Vec<SoleSourceFlag>),
    Graph(GraphResponse),
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Fetch lifecycle for one key.
#[derive(Debug, Clone)]
pub enum QueryStatus {
    Loading,
    Ready(QueryResult),
    /// Rendered error message, kept for logs; the UI shows a fixed
    /// per-resource message instead.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub status: QueryStatus,
    pub updated_at: Instant,
}

/// In-memory request cache keyed by parameter tuple.
#[derive(Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as loading. Returns false (and changes nothing) when the
    /// key is already loading or ready — the dedup that makes re-selecting
    /// the same suggestion a no-op.
    pub fn begin(&mut self, key: QueryKey) -> bool {
        match self.entries.get(&key) {
            Some(entry) if !matches!(entry.status, QueryStatus::Failed(_)) => false,
            _ => {
                self.entries.insert(
                    key,
                    CacheEntry {
                        status: QueryStatus::Loading,
                        updated_at: Instant::now(),
                    },
                );
                true
            }
        }
    }

    /// Record a completion under the key it was dispatched with.
    pub fn complete(&mut self, key: QueryKey, result: Result<QueryResult, String>) {
        let status = match result {
            Ok(value) => QueryStatus::Ready(value),
            Err(message) => {
                tracing::warn!(?key, %message, "query failed");
                QueryStatus::Failed(message)
            }
        };
        self.entries.insert(
            key,
            CacheEntry {
                status,
                updated_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn status(&self, key: &QueryKey) -> Option<&QueryStatus> {
        self.entries.get(key).map(|e| &e.status)
    }

    /// Drop one key (explicit invalidation on parameter change).
    pub fn invalidate(&mut self, key: &QueryKey) {
        self.entries.remove(key);
    }

    /// Drop every key matching a predicate.
    pub fn invalidate_where(&mut self, pred: impl Fn(&QueryKey) -> bool) {
        self.entries.retain(|key, _| !pred(key));
    }

    /// Drop cached suggestion lookups, keeping at most the current one.
    /// Superseded typeahead tuples are dead the moment the debounced text
    /// or the search mode changes; everything else stays cached.
    pub fn prune_suggestions(&mut self, keep: Option<&QueryKey>) {
        self.invalidate_where(|key| {
            matches!(
                key,
                QueryKey::VendorSuggest { .. } | QueryKey::AgencySuggest { .. }
            ) && Some(key) != keep
        });
    }
}

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// Background fetch pool. One worker thread per dispatch; completions are
/// delivered over an mpsc channel tagged with their dispatch-time key, and
/// the TUI drains them every tick.
pub struct QueryPool {
    client: Arc<ApiClient>,
    page_size: u32,
    tx: Sender<(QueryKey, Result<QueryResult, String>)>,
    rx: Receiver<(QueryKey, Result<QueryResult, String>)>,
}

impl QueryPool {
    pub fn new(client: Arc<ApiClient>, page_size: u32) -> Self {
        let (tx, rx) = channel();
        Self {
            client,
            page_size,
            tx,
            rx,
        }
    }

    /// Start a fetch if the cache does not already hold this key.
    pub fn dispatch(&self, cache: &mut QueryCache, key: QueryKey) {
        if !cache.begin(key.clone()) {
            return;
        }
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let thread_key = key.clone();
        let page_size = self.page_size;
        let spawned = std::thread::Builder::new()
            .name("query-fetch".into())
            .spawn(move || {
                let result =
                    run_query(&client, &thread_key, page_size).map_err(|e| e.to_string());
                let _ = tx.send((thread_key, result));
            });
        if let Err(e) = spawned {
            cache.complete(key, Err(format!("failed to spawn fetch thread: {e}")));
        }
    }

    /// Tick-path dispatch: start a fetch only when the cache holds nothing
    /// for the key. A failed entry stays failed until an explicit user
    /// action goes through [`dispatch`](Self::dispatch); nothing is ever
    /// retried automatically.
    pub fn dispatch_if_missing(&self, cache: &mut QueryCache, key: QueryKey) {
        if cache.status(&key).is_none() {
            self.dispatch(cache, key);
        }
    }

    /// Poll for the next completion (non-blocking).
    pub fn try_recv(&self) -> Option<(QueryKey, Result<QueryResult, String>)> {
        match self.rx.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Execute the API call a key describes.
fn run_query(client: &ApiClient, key: &QueryKey, page_size: u32) -> GovResult<QueryResult> {
    const SUGGEST_SIZE: u32 = 8;
    Ok(match key {
        QueryKey::Vendors { query, page } => {
            QueryResult::Vendors(client.vendors_list(query.as_deref(), *page, page_size)?)
        }
        QueryKey::Agencies { query, page } => {
            QueryResult::Agencies(client.agencies_list(query.as_deref(), *page, page_size)?)
        }
        QueryKey::Vendor { id } => QueryResult::Vendor(client.vendor(id)?),
        QueryKey::Agency { id } => QueryResult::Agency(client.agency(id)?),
        QueryKey::MarketShare { limit } => {
            QueryResult::MarketShare(client.market_share(*limit)?)
        }
        QueryKey::Spending { agency_id, period } => {
            QueryResult::Spending(client.spending_over_time(agency_id, *period)?)
        }
        QueryKey::AwardSpikes { z_threshold_milli } => QueryResult::AwardSpikes(
            client.award_spikes(f64::from(*z_threshold_milli) / 1000.0)?,
        ),
        QueryKey::NewEntrants { days } => {
            QueryResult::NewEntrants(client.new_entrants(*days)?)
        }
        QueryKey::SoleSource => QueryResult::SoleSource(client.sole_source()?),
        QueryKey::VendorGraph { id } => QueryResult::Graph(client.graph_vendor(id)?),
        QueryKey::AgencyGraph { id } => QueryResult::Graph(client.graph_agency(id)?),
        QueryKey::ShortestPath { from, to } => {
            QueryResult::Graph(client.graph_path(from, to)?)
        }
        QueryKey::VendorSuggest { query } => {
            QueryResult::Vendors(client.vendors_list(Some(query), 1, SUGGEST_SIZE)?)
        }
        QueryKey::AgencySuggest { query } => {
            QueryResult::Agencies(client.agencies_list(Some(query), 1, SUGGEST_SIZE)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::model::GraphResponse;
    use crate::session::{Session, SessionProvider};

    struct NoSession;

    impl SessionProvider for NoSession {
        fn resolve(&self) -> GovResult<Session> {
            Ok(Session { tokens: None })
        }
        fn sign_out(&self) -> GovResult<()> {
            Ok(())
        }
    }

    fn test_pool() -> QueryPool {
        let client = ApiClient::new(&AppConfig::default(), Arc::new(NoSession));
        QueryPool::new(Arc::new(client), 20)
    }

    fn graph_key() -> QueryKey {
        QueryKey::VendorGraph { id: "v1".into() }
    }

    fn empty_graph() -> QueryResult {
        QueryResult::Graph(GraphResponse {
            nodes: vec![],
            edges: vec![],
        })
    }

    #[test]
    fn begin_dedups_loading_and_ready() {
        let mut cache = QueryCache::new();
        assert!(cache.begin(graph_key()));
        // In flight: second begin is a no-op.
        assert!(!cache.begin(graph_key()));
        cache.complete(graph_key(), Ok(empty_graph()));
        // Ready: still deduped.
        assert!(!cache.begin(graph_key()));
    }

    #[test]
    fn failed_entries_may_be_retried_explicitly() {
        let mut cache = QueryCache::new();
        cache.begin(graph_key());
        cache.complete(graph_key(), Err("boom".into()));
        assert!(matches!(
            cache.status(&graph_key()),
            Some(QueryStatus::Failed(_))
        ));
        // A fresh begin is allowed after failure (user-driven, never automatic).
        assert!(cache.begin(graph_key()));
    }

    #[test]
    fn completion_lands_under_its_dispatch_key() {
        let mut cache = QueryCache::new();
        let stale = QueryKey::VendorGraph { id: "v1".into() };
        let newer = QueryKey::VendorGraph { id: "v2".into() };
        cache.begin(stale.clone());
        cache.begin(newer.clone());
        // The stale completion arrives after the newer dispatch; it must not
        // touch the newer key.
        cache.complete(stale.clone(), Ok(empty_graph()));
        assert!(matches!(
            cache.status(&stale),
            Some(QueryStatus::Ready(_))
        ));
        assert!(matches!(
            cache.status(&newer),
            Some(QueryStatus::Loading)
        ));
    }

    #[test]
    fn invalidate_where_drops_matching_keys() {
        let mut cache = QueryCache::new();
        cache.begin(QueryKey::Vendors {
            query: None,
            page: 1,
        });
        cache.begin(QueryKey::SoleSource);
        cache.invalidate_where(|k| matches!(k, QueryKey::Vendors { .. }));
        assert!(
            cache
                .status(&QueryKey::Vendors {
                    query: None,
                    page: 1
                })
                .is_none()
        );
        assert!(cache.status(&QueryKey::SoleSource).is_some());
    }

    #[test]
    fn tick_path_never_redispatches_a_failed_fetch() {
        let pool = test_pool();
        let mut cache = QueryCache::new();
        cache.begin(QueryKey::SoleSource);
        cache.complete(QueryKey::SoleSource, Err("503".into()));
        // The event loop polls this every tick; the failure must stick.
        pool.dispatch_if_missing(&mut cache, QueryKey::SoleSource);
        pool.dispatch_if_missing(&mut cache, QueryKey::SoleSource);
        assert!(matches!(
            cache.status(&QueryKey::SoleSource),
            Some(QueryStatus::Failed(_))
        ));
        // An explicit dispatch is the retry path.
        pool.dispatch(&mut cache, QueryKey::SoleSource);
        assert!(matches!(
            cache.status(&QueryKey::SoleSource),
            Some(QueryStatus::Loading)
        ));
    }

    #[test]
    fn prune_keeps_the_current_suggestion_and_everything_else() {
        let mut cache = QueryCache::new();
        let old = QueryKey::VendorSuggest { query: "ac".into() };
        let current = QueryKey::VendorSuggest {
            query: "acme".into(),
        };
        let list = QueryKey::Vendors {
            query: None,
            page: 1,
        };
        cache.begin(old.clone());
        cache.begin(current.clone());
        cache.begin(list.clone());

        cache.prune_suggestions(Some(&current));
        assert!(cache.status(&old).is_none());
        assert!(cache.status(&current).is_some());
        assert!(cache.status(&list).is_some());

        // Mode switch: every suggestion tuple goes.
        cache.prune_suggestions(None);
        assert!(cache.status(&current).is_none());
        assert!(cache.status(&list).is_some());
    }

    #[test]
    fn suggest_keys_are_distinct_from_list_keys() {
        let list = QueryKey::Vendors {
            query: Some("acme".into()),
            page: 1,
        };
        let suggest = QueryKey::VendorSuggest {
            query: "acme".into(),
        };
        assert_ne!(list, suggest);
    }
}
