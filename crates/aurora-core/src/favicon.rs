//! Favicon reachability checks used to screen generated links

use async_trait::async_trait;
use aurora_common::{AuroraError, Result, endpoints, hostname, timeouts};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Decides whether a site is alive enough to be added
#[async_trait]
pub trait FaviconProbe: Send + Sync {
    async fn is_valid(&self, url: &str) -> bool;
}

/// Asks the public favicon service for the site's icon
#[derive(Debug, Clone)]
pub struct HttpFaviconProbe {
    client: Client,
    service: String,
}

impl HttpFaviconProbe {
    pub fn new() -> Result<Self> {
        Self::with_service(endpoints::FAVICON_SERVICE)
    }

    pub fn with_service(service: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeouts::FAVICON_PROBE_TIMEOUT))
            .build()
            .map_err(|e| AuroraError::Generic(e.to_string()))?;
        Ok(Self {
            client,
            service: service.to_string(),
        })
    }
}

#[async_trait]
impl FaviconProbe for HttpFaviconProbe {
    async fn is_valid(&self, url: &str) -> bool {
        let Some(host) = hostname(url) else {
            return false;
        };
        let result = self
            .client
            .get(&self.service)
            .query(&[("domain", host.as_str()), ("sz", "128")])
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Favicon probe for {} failed: {}", host, e);
                false
            }
        }
    }
}

/// Probe that accepts every URL with a host; for offline runs
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllProbe;

#[async_trait]
impl FaviconProbe for AcceptAllProbe {
    async fn is_valid(&self, url: &str) -> bool {
        hostname(url).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_probe() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("domain", "github.com"))
            .and(query_param("sz", "128"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("domain", "dead.example"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let probe = HttpFaviconProbe::with_service(&server.uri())?;
        assert!(probe.is_valid("https://github.com/rust-lang").await);
        assert!(!probe.is_valid("https://dead.example").await);
        assert!(!probe.is_valid("not a url").await);
        Ok(())
    }

    #[tokio::test]
    async fn test_accept_all_needs_a_host() {
        assert!(AcceptAllProbe.is_valid("https://a.com").await);
        assert!(!AcceptAllProbe.is_valid("garbage").await);
    }
}
