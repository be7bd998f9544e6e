// Error types for the token exchange.
//
// Every failure of the authorization flow ends up in `AuthError`. None of
// them is retried: the command that asked for a token decides what to do.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The authz service answered the credential check with a non-"ok" status.
    #[error("no user {0} found in authz service")]
    NoSuchUser(String),

    /// Connection, TLS or HTTP-level failure.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON we expected. The raw body is kept
    /// so it can be shown to the user.
    #[error("malformed {what} response; body: {body}")]
    MalformedResponse {
        what: &'static str,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid token signature")]
    InvalidSignature,

    /// Token could not be parsed, or it parsed but is not valid (e.g. expired).
    #[error("{0}")]
    InvalidToken(String),

    /// Reading the credential from the terminal failed.
    #[error("failed to read credentials: {0}")]
    Prompt(#[from] io::Error),
}
