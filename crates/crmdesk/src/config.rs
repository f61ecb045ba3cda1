//! CLI configuration: thin wrapper around `crmdesk_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--api-url,
//! --insecure, --timeout) and opens the profile's session.

use std::time::Duration;

use crmdesk_core::{CrmClient, TlsMode};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use crmdesk_config::{
    Config, Profile, TokenStorage, config_path, load_config_or_default, save_config, session_path,
};

/// An API client bound to one profile and its stored session.
pub struct Connection {
    pub api: CrmClient,
    pub profile_name: String,
    pub profile: Profile,
}

impl Connection {
    /// Fail early with a login hint when no token is stored.
    pub fn require_login(&self) -> Result<(), CliError> {
        if self.api.session().token().is_some() {
            Ok(())
        } else {
            Err(CliError::NotLoggedIn {
                profile: self.profile_name.clone(),
            })
        }
    }
}

/// Translate the active profile + global flags into a connected client.
///
/// CLI flag overrides take priority over profile values.
pub fn connect(global: &GlobalOpts, cfg: &Config) -> Result<Connection, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());
    let profile = cfg.profile(&profile_name)?;

    let mut client_config = crmdesk_config::profile_to_client_config(&profile)?;

    // 1. Base URL (flag > env > profile)
    if let Some(ref raw) = global.api_url {
        client_config.base_url = raw.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }

    // 2. TLS verification
    if global.insecure {
        client_config.transport.tls = TlsMode::DangerAcceptInvalid;
    }

    // 3. Timeout (flag > profile > defaults)
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);
    client_config.transport.timeout = Duration::from_secs(timeout);

    let store = crmdesk_config::session_store(&profile_name, &profile);
    tracing::debug!(
        profile = %profile_name,
        url = %client_config.base_url,
        storage = ?profile.token_storage,
        "resolved connection"
    );
    let api = CrmClient::new(&client_config, store)?;

    Ok(Connection {
        api,
        profile_name,
        profile,
    })
}
