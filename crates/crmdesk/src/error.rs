//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use crmdesk_config::ConfigError;
use crmdesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the CRM API: {reason}")]
    #[diagnostic(
        code(crmdesk::connection_failed),
        help(
            "Check your network and the API URL.\n\
             Override it with --api-url or set api_url in your profile.\n\
             The hosted API may take a while to wake up; raise --timeout if needed."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not logged in (profile '{profile}')")]
    #[diagnostic(code(crmdesk::not_logged_in), help("Run: crmdesk login"))]
    NotLoggedIn { profile: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(crmdesk::auth_failed),
        help("Your session may have expired. Run: crmdesk login")
    )]
    AuthFailed { message: String },

    #[error("Permission denied: {reason}")]
    #[diagnostic(code(crmdesk::permission_denied))]
    PermissionDenied { reason: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(crmdesk::not_found),
        help("Run: crmdesk {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(crmdesk::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from the API: {message}")]
    #[diagnostic(
        code(crmdesk::unexpected_response),
        help("Check that --api-url points at the CRM API root (ending in /api).")
    )]
    UnexpectedResponse { message: String },

    #[error("{message}")]
    #[diagnostic(code(crmdesk::internal))]
    Internal { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(crmdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(crmdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: crmdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(crmdesk::config))]
    Config { message: String },

    #[error("Session storage error: {message}")]
    #[diagnostic(
        code(crmdesk::session),
        help("Remove the stored session with: crmdesk logout")
    )]
    Session { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(crmdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotLoggedIn { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ApiError { status: 404, .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TransportFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::RequestFailed { status, message } if matches!(status, 401 | 403) => {
                CliError::AuthFailed { message }
            }

            CoreError::RequestFailed { status, message } => CliError::ApiError { status, message },

            CoreError::DecodeFailed { message } => CliError::UnexpectedResponse { message },

            CoreError::Forbidden { reason } => CliError::PermissionDenied { reason },

            err @ CoreError::SelfDeletion => CliError::PermissionDenied {
                reason: err.to_string(),
            },

            CoreError::NotFound { resource, id } => CliError::NotFound {
                list_command: format!("{resource}s list"),
                resource_type: resource,
                identifier: id.to_string(),
            },

            CoreError::Validation { field, reason } => CliError::Validation { field, reason },

            CoreError::Session { message } => CliError::Session { message },

            CoreError::Config { message } => CliError::Config { message },

            err @ (CoreError::NotEditing | CoreError::NotReady { .. } | CoreError::StaleIntent) => {
                CliError::Internal {
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<crmdesk_core::ApiError> for CliError {
    fn from(err: crmdesk_core::ApiError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProfile { name } => {
                let config = crmdesk_config::load_config_or_default();
                let mut names: Vec<_> = config.profiles.into_keys().collect();
                names.sort();
                CliError::ProfileNotFound {
                    name,
                    available: if names.is_empty() {
                        "(none)".into()
                    } else {
                        names.join(", ")
                    },
                }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let auth = CliError::from(CoreError::RequestFailed {
            status: 401,
            message: "invalid token".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing = CliError::from(CoreError::RequestFailed {
            status: 404,
            message: "Not Found".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let denied = CliError::from(CoreError::SelfDeletion);
        assert_eq!(denied.exit_code(), exit_code::PERMISSION);

        let offline = CliError::from(CoreError::TransportFailed {
            reason: "connection refused".into(),
        });
        assert_eq!(offline.exit_code(), exit_code::CONNECTION);

        let invalid = CliError::from(CoreError::Validation {
            field: "value".into(),
            reason: "must be a number".into(),
        });
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
    }
}
