//! Typed HTTP client for the analytics/graph REST API.
//!
//! One method per backend resource. Every call resolves a bearer credential
//! from the session collaborator, issues a GET with JSON headers, maps
//! non-2xx statuses to [`ApiError::Status`], and deserializes the body into
//! the declared response type. Failed calls never yield a parsed body.

use std::sync::Arc;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::config::AppConfig;
use crate::error::{ApiError, GovResult};
use crate::model::{
    Agency, AnomalyEntry, GraphResponse, MarketShareEntry, NewEntrant, Paginated,
    SoleSourceFlag, SpendingPoint, Vendor,
};
use crate::session::SessionProvider;

/// Characters percent-encoded inside query-string values.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'&')
    .add(b'=')
    .add(b'+')
    .add(b'%')
    .add(b'?')
    .add(b'/');

/// Build a query string from (name, optional value) pairs.
///
/// Absent parameters are omitted entirely — `q=` is never sent for an empty
/// search. Returns an empty string when nothing survives, otherwise a
/// leading-`?` string ready to append to a path.
pub fn build_query(params: &[(&str, Option<String>)]) -> String {
    let mut parts = Vec::new();
    for (name, value) in params {
        if let Some(value) = value {
            parts.push(format!(
                "{name}={}",
                utf8_percent_encode(value, QUERY_VALUE)
            ));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

/// Aggregation period for spending-over-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Month,
    Quarter,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }

    pub const ALL: [Period; 3] = [Period::Month, Period::Quarter, Period::Year];
}

/// Bearer-authenticated client over the REST surface.
pub struct ApiClient {
    base_url: String,
    http: ureq::Agent,
    session: Arc<dyn SessionProvider>,
}

impl ApiClient {
    pub fn new(config: &AppConfig, session: Arc<dyn SessionProvider>) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .build();
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http,
            session,
        }
    }

    #[cfg(test)]
    fn with_timeout(base_url: &str, session: Arc<dyn SessionProvider>) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_millis(200))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            session,
        }
    }

    fn bearer_token(&self) -> GovResult<String> {
        let session = self.session.resolve()?;
        match session.tokens {
            Some(credential) => Ok(credential.access_token),
            None => Err(ApiError::Auth.into()),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> GovResult<T> {
        let token = self.bearer_token()?;
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%path, "api get");
        let resp = self
            .http
            .get(&url)
            .set("Authorization", &format!("Bearer {token}"))
            .set("Content-Type", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => ApiError::Status {
                    status,
                    path: path.to_string(),
                },
                ureq::Error::Transport(t) => ApiError::Transport {
                    path: path.to_string(),
                    message: t.to_string(),
                },
            })?;
        resp.into_json().map_err(|e| {
            ApiError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    // -----------------------------------------------------------------------
    // Vendors & agencies
    // -----------------------------------------------------------------------

    pub fn vendors_list(
        &self,
        query: Option<&str>,
        page: u32,
        size: u32,
    ) -> GovResult<Paginated<Vendor>> {
        let qs = build_query(&[
            ("page", Some(page.to_string())),
            ("size", Some(size.to_string())),
            ("q", query.map(str::to_string)),
        ]);
        self.get_json(&format!("/vendors{qs}"))
    }

    pub fn vendor(&self, id: &str) -> GovResult<Vendor> {
        self.get_json(&format!("/vendors/{id}"))
    }

    pub fn agencies_list(
        &self,
        query: Option<&str>,
        page: u32,
        size: u32,
    ) -> GovResult<Paginated<Agency>> {
        let qs = build_query(&[
            ("page", Some(page.to_string())),
            ("size", Some(size.to_string())),
            ("q", query.map(str::to_string)),
        ]);
        self.get_json(&format!("/agencies{qs}"))
    }

    pub fn agency(&self, id: &str) -> GovResult<Agency> {
        self.get_json(&format!("/agencies/{id}"))
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    pub fn market_share(&self, limit: u32) -> GovResult<Vec<MarketShareEntry>> {
        self.get_json(&format!("/analytics/market-share?limit={limit}"))
    }

    pub fn spending_over_time(
        &self,
        agency_id: &str,
        period: Period,
    ) -> GovResult<Vec<SpendingPoint>> {
        self.get_json(&format!(
            "/analytics/agency/{agency_id}/spending-over-time?period={}",
            period.as_str()
        ))
    }

    pub fn award_spikes(&self, z_threshold: f64) -> GovResult<Vec<AnomalyEntry>> {
        self.get_json(&format!(
            "/analytics/risk/award-spikes?z_threshold={z_threshold}"
        ))
    }

    pub fn new_entrants(&self, days: u32) -> GovResult<Vec<NewEntrant>> {
        self.get_json(&format!("/analytics/risk/new-entrants?days={days}"))
    }

    pub fn sole_source(&self) -> GovResult<Vec<SoleSourceFlag>> {
        self.get_json("/analytics/risk/sole-source")
    }

    // -----------------------------------------------------------------------
    // Graph
    // -----------------------------------------------------------------------

    pub fn graph_vendor(&self, id: &str) -> GovResult<GraphResponse> {
        self.get_json(&format!("/graph/vendor/{id}"))
    }

    pub fn graph_agency(&self, id: &str) -> GovResult<GraphResponse> {
        self.get_json(&format!("/graph/agency/{id}"))
    }

    pub fn graph_path(&self, from: &str, to: &str) -> GovResult<GraphResponse> {
        let qs = build_query(&[
            ("from", Some(from.to_string())),
            ("to", Some(to.to_string())),
        ]);
        self.get_json(&format!("/graph/path{qs}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GovError;
    use crate::session::{Credential, Session};

    struct NoSession;

    impl SessionProvider for NoSession {
        fn resolve(&self) -> GovResult<Session> {
            Ok(Session { tokens: None })
        }
        fn sign_out(&self) -> GovResult<()> {
            Ok(())
        }
    }

    struct TokenSession;

    impl SessionProvider for TokenSession {
        fn resolve(&self) -> GovResult<Session> {
            Ok(Session {
                tokens: Some(Credential {
                    access_token: "tok".into(),
                    expires_at: 0,
                }),
            })
        }
        fn sign_out(&self) -> GovResult<()> {
            Ok(())
        }
    }

    #[test]
    fn query_builder_omits_absent_parameters() {
        let qs = build_query(&[
            ("page", Some("1".to_string())),
            ("size", Some("20".to_string())),
            ("q", None),
        ]);
        assert_eq!(qs, "?page=1&size=20");
    }

    #[test]
    fn query_builder_encodes_values() {
        let qs = build_query(&[("q", Some("Acme & Sons".to_string()))]);
        assert_eq!(qs, "?q=Acme%20%26%20Sons");
    }

    #[test]
    fn query_builder_empty_when_nothing_set() {
        assert_eq!(build_query(&[("q", None)]), "");
    }

    #[test]
    fn missing_credential_fails_with_auth_error() {
        let client = ApiClient::with_timeout("http://127.0.0.1:1", Arc::new(NoSession));
        let err = client.vendors_list(None, 1, 20).unwrap_err();
        assert!(matches!(err, GovError::Api(ApiError::Auth)));
    }

    #[test]
    fn unreachable_backend_fails_with_transport_error() {
        // Port 1 is never listening; the call must fail at transport level,
        // not panic, and must carry the request path.
        let client = ApiClient::with_timeout("http://127.0.0.1:1", Arc::new(TokenSession));
        let err = client.sole_source().unwrap_err();
        match err {
            GovError::Api(ApiError::Transport { path, .. }) => {
                assert_eq!(path, "/analytics/risk/sole-source");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
