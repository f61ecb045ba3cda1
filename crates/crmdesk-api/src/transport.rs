// Shared transport configuration for building the reqwest::Client.
//
// TLS and timeout settings live here so every consumer (CLI, tests,
// embedding applications) builds its HTTP client the same way.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use url::Url;

use crate::error::Error;

/// Base URL of the hosted CRM API.
pub const DEFAULT_BASE_URL: &str = "https://api-crm-hugocbb.onrender.com/api";

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (local development servers only).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Every request advertises `Accept: application/json`; bodies are
    /// attached with `RequestBuilder::json`, which sets the content type.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("crmdesk/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Everything needed to construct a [`CrmClient`](crate::CrmClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.example.com/api`.
    pub base_url: Url,
    pub transport: TransportConfig,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            transport: TransportConfig::default(),
        }
    }
}

/// Ensure the base URL ends with `/` so relative joins append rather than
/// replace the last path segment (`.../api` + `user` must yield `.../api/user`).
pub(crate) fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_trailing_slash() {
        let url = normalize_base_url(Url::parse("https://crm.example/api").unwrap());
        assert_eq!(url.as_str(), "https://crm.example/api/");
        assert_eq!(url.join("user/3").unwrap().path(), "/api/user/3");
    }

    #[test]
    fn normalize_keeps_existing_slash() {
        let url = normalize_base_url(Url::parse("https://crm.example/api/").unwrap());
        assert_eq!(url.as_str(), "https://crm.example/api/");
    }

    #[test]
    fn default_base_url_parses() {
        let config = ClientConfig::new(Url::parse(DEFAULT_BASE_URL).unwrap());
        assert_eq!(config.base_url.host_str(), Some("api-crm-hugocbb.onrender.com"));
        assert_eq!(config.transport.tls, TlsMode::System);
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")),
            ..TransportConfig::default()
        };
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }
}
