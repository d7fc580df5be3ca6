use thiserror::Error;

/// Errors while loading the operator file.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid expiration timestamp `{0}`")]
    InvalidExpiration(String),
    #[error("operator file must be an array of operators or an object of grouping key -> operators")]
    UnexpectedLayout,
    #[error("invalid operators under `{key}`: {source}")]
    Group {
        key: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the external collaborators (chain daemon, REST endpoint).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The command could not be spawned at all.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The command ran but exited unsuccessfully.
    #[error("command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },
    /// Output was not the structured document we expected.
    #[error("malformed output: {0}")]
    MalformedOutput(String),
    /// The HTTP client for the account lookup could not be set up.
    #[error("failed to build http client: {0}")]
    HttpClient(String),
    /// The account could not be fetched or did not exist.
    #[error("account lookup for {address} failed: {reason}")]
    AccountLookup { address: String, reason: String },
}
