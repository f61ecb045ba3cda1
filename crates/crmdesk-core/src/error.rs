// ── Core error types ──
//
// User-facing errors from crmdesk-core. The api taxonomy (no response,
// error status, undecodable body) is preserved through the mapping so the
// rendering surface can still tell them apart; view-level refusals are
// added on top.

use thiserror::Error;

use crmdesk_api::RecordId;

use crate::view::ViewState;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API errors (mapped, not exposed raw) ─────────────────────────
    #[error("Cannot reach the CRM API: {reason}")]
    TransportFailed { reason: String },

    #[error("Request failed (HTTP {status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Unexpected response from the CRM API: {message}")]
    DecodeFailed { message: String },

    // ── View refusals ────────────────────────────────────────────────
    #[error("Access denied: {reason}")]
    Forbidden { reason: String },

    #[error("You cannot delete your own account")]
    SelfDeletion,

    #[error("{resource} {id} is not in the loaded list")]
    NotFound { resource: String, id: RecordId },

    #[error("No create or edit in progress")]
    NotEditing,

    #[error("View is not ready (state: {state})")]
    NotReady { state: ViewState },

    #[error("Delete confirmation is stale or was never requested")]
    StaleIntent,

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Environment ──────────────────────────────────────────────────
    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status, when the server answered with an error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server rejected our credentials (or lack of them).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<crmdesk_api::Error> for CoreError {
    fn from(err: crmdesk_api::Error) -> Self {
        match err {
            crmdesk_api::Error::Transport(e) => {
                let reason = if e.is_timeout() {
                    "request timed out".to_owned()
                } else {
                    e.to_string()
                };
                CoreError::TransportFailed { reason }
            }
            crmdesk_api::Error::Tls(reason) => CoreError::TransportFailed { reason },
            crmdesk_api::Error::RequestFailed { status, message } => {
                CoreError::RequestFailed { status, message }
            }
            crmdesk_api::Error::Decode { message, body: _ } => CoreError::DecodeFailed { message },
            crmdesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            crmdesk_api::Error::Session(message) => CoreError::Session { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_keeps_status() {
        let err = CoreError::from(crmdesk_api::Error::RequestFailed {
            status: 403,
            message: "Forbidden".into(),
        });
        assert_eq!(err.status(), Some(403));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn decode_drops_raw_body() {
        let err = CoreError::from(crmdesk_api::Error::Decode {
            message: "expected `[`".into(),
            body: "x".repeat(10_000),
        });
        assert!(matches!(err, CoreError::DecodeFailed { ref message } if message.len() < 100));
    }
}
