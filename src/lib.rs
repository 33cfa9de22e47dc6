//! # govgraph
//!
//! Terminal dashboard for federal-contract analytics: browse resolved
//! vendors and agencies, inspect market-share and spending charts, review
//! risk indicators (award spikes, new entrants, sole-source concentration),
//! and explore the Vendor–Agency–Contract relationship graph on an
//! interactive canvas.
//!
//! All analytics, entity resolution, and graph traversal happen in the
//! backend service; this crate is the client: a typed HTTP layer, a
//! parameter-keyed query cache, and the view state machines the TUI renders.
//!
//! ## Architecture
//!
//! - **API client** (`api`): typed, bearer-authenticated GET calls over `ureq`
//! - **Session** (`session`): credential store + one-shot session gate
//! - **Query cache** (`query`): (operation, parameter-tuple) keyed fetch dedup
//! - **Exploration core** (`explore`): the graph-explorer state machine
//! - **Pages** (`pages`): pagination/search/detail/risk view state
//! - **TUI** (`tui`): ratatui rendering, including graph canvas layouts

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod explore;
pub mod format;
pub mod model;
pub mod pages;
pub mod paths;
pub mod query;
pub mod session;
pub mod tui;
