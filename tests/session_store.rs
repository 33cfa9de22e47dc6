//! File-backed session store and gate behavior against a real directory.

use std::sync::Arc;

use govgraph::api::ApiClient;
use govgraph::config::AppConfig;
use govgraph::error::{ApiError, GovError};
use govgraph::paths::GovPaths;
use govgraph::session::{
    Credential, FileSession, GateState, SessionGate, SessionProvider,
};

fn rooted_store(dir: &std::path::Path) -> FileSession {
    FileSession::new(&GovPaths::rooted(dir))
}

#[test]
fn store_then_resolve_round_trips_the_credential() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = rooted_store(dir.path());

    store
        .store(&Credential {
            access_token: "tok-123".to_string(),
            expires_at: 0,
        })
        .unwrap();

    let session = store.resolve().unwrap();
    assert_eq!(session.tokens.unwrap().access_token, "tok-123");
}

#[test]
fn missing_file_resolves_to_signed_out() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = rooted_store(dir.path());
    assert!(store.resolve().unwrap().tokens.is_none());
}

#[test]
fn expired_credential_resolves_to_signed_out() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = rooted_store(dir.path());
    store
        .store(&Credential {
            access_token: "tok".to_string(),
            expires_at: 1, // 1970
        })
        .unwrap();
    assert!(store.resolve().unwrap().tokens.is_none());
}

#[test]
fn corrupt_file_is_an_error_not_a_session() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = GovPaths::rooted(dir.path());
    let store = FileSession::new(&paths);
    std::fs::create_dir_all(&paths.state_dir).unwrap();
    std::fs::write(paths.session_file(), "{not json").unwrap();
    assert!(store.resolve().is_err());
}

#[test]
fn sign_out_removes_the_file_and_tolerates_absence() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = GovPaths::rooted(dir.path());
    let store = FileSession::new(&paths);

    store
        .store(&Credential {
            access_token: "tok".to_string(),
            expires_at: 0,
        })
        .unwrap();
    assert!(paths.session_file().exists());

    store.sign_out().unwrap();
    assert!(!paths.session_file().exists());
    // A second sign-out is a no-op.
    store.sign_out().unwrap();
}

#[test]
fn gate_redirects_once_when_signed_out() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = rooted_store(dir.path());
    let mut gate = SessionGate::new();

    assert_eq!(gate.resolve(&store), GateState::Unauthenticated);
    assert!(gate.take_redirect());
    assert!(!gate.take_redirect());

    // Logging in afterwards does not flip an already-settled gate.
    store
        .store(&Credential {
            access_token: "tok".to_string(),
            expires_at: 0,
        })
        .unwrap();
    assert_eq!(gate.resolve(&store), GateState::Unauthenticated);

    // A fresh mount sees the credential.
    let mut gate = SessionGate::new();
    assert_eq!(gate.resolve(&store), GateState::Authenticated);
}

#[test]
fn api_calls_without_a_credential_fail_with_auth() {
    let dir = tempfile::TempDir::new().unwrap();
    let session: Arc<dyn SessionProvider> = Arc::new(rooted_store(dir.path()));
    let client = ApiClient::new(&AppConfig::default(), session);

    let err = client.sole_source().unwrap_err();
    assert!(matches!(err, GovError::Api(ApiError::Auth)));
}
