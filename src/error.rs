//! Rich diagnostic error types for govgraph.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong
//! and how to fix it. The TUI never shows these raw to the operator — data
//! regions collapse failures into a fixed per-resource message — but the CLI
//! subcommands and logs surface the full diagnostic chain.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for govgraph.
#[derive(Debug, Error, Diagnostic)]
pub enum GovError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Paths(#[from] PathError),
}

// ---------------------------------------------------------------------------
// API errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    #[error("no valid session credential")]
    #[diagnostic(
        code(gov::api::auth),
        help("Sign in first with `govgraph login`. Expired sessions must be renewed.")
    )]
    Auth,

    #[error("API returned {status} on {path}")]
    #[diagnostic(
        code(gov::api::status),
        help(
            "The backend rejected the request. 401/403 usually means the stored \
             credential is no longer accepted; 404 means the entity id does not exist."
        )
    )]
    Status { status: u16, path: String },

    #[error("request to {path} failed: {message}")]
    #[diagnostic(
        code(gov::api::transport),
        help("Check the API base URL in your config and that the backend is reachable.")
    )]
    Transport { path: String, message: String },

    #[error("unexpected response body from {path}: {message}")]
    #[diagnostic(
        code(gov::api::decode),
        help(
            "The backend answered with a payload this client does not understand. \
             A client/server version mismatch is the usual cause."
        )
    )]
    Decode { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("failed to read session file: {source}")]
    #[diagnostic(
        code(gov::session::io),
        help("Check permissions on the state directory, or sign in again with `govgraph login`.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("session file is corrupt: {message}")]
    #[diagnostic(
        code(gov::session::corrupt),
        help("Remove the session file with `govgraph logout` and sign in again.")
    )]
    Corrupt { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    #[diagnostic(
        code(gov::config::io),
        help("Check that the file exists and is readable, or delete it to use defaults.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    #[diagnostic(
        code(gov::config::parse),
        help("The file must be valid TOML. See the README for the expected keys.")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(gov::config::invalid),
        help("Fix the offending key in the config file or the GOVGRAPH_* environment override.")
    )]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Path errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(gov::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(gov::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning govgraph results.
pub type GovResult<T> = std::result::Result<T, GovError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_converts_to_gov_error() {
        let err = ApiError::Status {
            status: 503,
            path: "/vendors".into(),
        };
        let gov: GovError = err.into();
        assert!(matches!(
            gov,
            GovError::Api(ApiError::Status { status: 503, .. })
        ));
    }

    #[test]
    fn error_display_includes_path_and_status() {
        let err = ApiError::Status {
            status: 404,
            path: "/agencies/a9".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("404"));
        assert!(msg.contains("/agencies/a9"));
    }

    #[test]
    fn session_corrupt_converts() {
        let err = SessionError::Corrupt {
            message: "trailing garbage".into(),
        };
        let gov: GovError = err.into();
        assert!(matches!(
            gov,
            GovError::Session(SessionError::Corrupt { .. })
        ));
    }
}
