//! Certificate Check Probe
//!
//! Completes a TLS handshake against the host with webpki roots and
//! reports whether the presented chain verified.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;

use crate::logic::url_input::UrlInput;

/// Tri-state certificate outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertStatus {
    Valid,
    Invalid,
    /// Not HTTPS, unreachable, or the handshake failed for a non-certificate reason
    Undeterminable,
}

impl CertStatus {
    pub fn as_feature(self) -> f32 {
        match self {
            CertStatus::Valid => 1.0,
            CertStatus::Invalid => 0.0,
            CertStatus::Undeterminable => -1.0,
        }
    }
}

static TLS_CONFIG: Lazy<Option<Arc<ClientConfig>>> = Lazy::new(|| {
    let roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    match ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
    {
        Ok(builder) => Some(Arc::new(builder.with_root_certificates(roots).with_no_client_auth())),
        Err(e) => {
            log::error!("TLS client config unavailable: {}", e);
            None
        }
    }
});

/// Validate the certificate served for `input`'s host
pub async fn check(input: &UrlInput, to: Duration) -> CertStatus {
    if !input.is_https() {
        return CertStatus::Undeterminable;
    }
    let host = input.host().trim_matches(|c| c == '[' || c == ']').to_string();
    check_host(&host, input.port_or_default(), to).await
}

pub async fn check_host(host: &str, port: u16, to: Duration) -> CertStatus {
    let Some(config) = TLS_CONFIG.as_ref() else {
        return CertStatus::Undeterminable;
    };

    let server_name = match ServerName::try_from(host.to_string()) {
        Ok(name) => name,
        Err(e) => {
            log::debug!("certificate check: bad server name {}: {}", host, e);
            return CertStatus::Undeterminable;
        }
    };

    let connector = TlsConnector::from(config.clone());
    let handshake = async {
        let tcp = TcpStream::connect((host, port)).await?;
        connector.connect(server_name, tcp).await
    };

    match timeout(to, handshake).await {
        Ok(Ok(_stream)) => CertStatus::Valid,
        Ok(Err(e)) => classify_handshake_error(host, &e),
        Err(_) => {
            log::debug!("certificate check timed out for {}", host);
            CertStatus::Undeterminable
        }
    }
}

fn classify_handshake_error(host: &str, err: &std::io::Error) -> CertStatus {
    let tls_error = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>());

    match tls_error {
        Some(rustls::Error::InvalidCertificate(reason)) => {
            log::debug!("certificate for {} rejected: {:?}", host, reason);
            CertStatus::Invalid
        }
        _ => {
            log::debug!("certificate check failed for {}: {}", host, err);
            CertStatus::Undeterminable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_values() {
        assert_eq!(CertStatus::Valid.as_feature(), 1.0);
        assert_eq!(CertStatus::Invalid.as_feature(), 0.0);
        assert_eq!(CertStatus::Undeterminable.as_feature(), -1.0);
    }

    #[tokio::test]
    async fn test_plain_http_is_undeterminable() {
        let input = UrlInput::parse("http://example.com").unwrap();
        assert_eq!(check(&input, Duration::from_secs(1)).await, CertStatus::Undeterminable);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_undeterminable() {
        let status = check_host("127.0.0.1", 1, Duration::from_secs(2)).await;
        assert_eq!(status, CertStatus::Undeterminable);
    }

    #[test]
    fn test_invalid_certificate_error_maps_to_invalid() {
        let err = std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            rustls::Error::InvalidCertificate(rustls::CertificateError::Expired),
        );
        assert_eq!(classify_handshake_error("example.com", &err), CertStatus::Invalid);

        let other = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert_eq!(classify_handshake_error("example.com", &other), CertStatus::Undeterminable);
    }
}
