use thiserror::Error;

/// Top-level error type for the `crmdesk-api` crate.
///
/// Every call either yields a typed record or one of these. The taxonomy is
/// deliberately narrow: no response at all ([`Transport`](Self::Transport)),
/// a response with an error status ([`RequestFailed`](Self::RequestFailed)),
/// or a success response whose body is not the expected JSON
/// ([`Decode`](Self::Decode)). `crmdesk-core` maps these into view-level
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// No response obtained (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server responses ────────────────────────────────────────────
    /// The server answered with a non-success status. The body is never
    /// decoded as a record; its text is kept as a diagnostic only.
    #[error("Request failed (HTTP {status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// A success response carried a body that is not the expected JSON shape.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },

    // ── Session ─────────────────────────────────────────────────────
    /// The durable session store could not be read or written.
    #[error("Session store error: {0}")]
    Session(String),
}

impl Error {
    /// HTTP status of a failed request, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the server rejected the bearer token (or its absence).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if this is a "not found" response.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if no response was obtained from the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
