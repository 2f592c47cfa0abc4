//! Content Fetch Probe
//!
//! HTTP GET with a bounded timeout. Network errors, timeouts and
//! non-success statuses all collapse to `None`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpContent {
    pub status: u16,
    /// URL after redirects
    pub final_url: String,
    pub headers: Vec<(String, String)>,
    /// Decoded response text
    pub body: String,
}

impl HttpContent {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// GET `url`, returning the page only on a 2xx answer
pub async fn fetch_content(client: &reqwest::Client, url: &str, timeout: Duration) -> Option<HttpContent> {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            log::debug!("content fetch failed for {}: {}", url, e);
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        log::debug!("content fetch for {} returned {}", url, status);
        return None;
    }

    let final_url = response.url().to_string();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();

    match response.text().await {
        Ok(body) => Some(HttpContent {
            status: status.as_u16(),
            final_url,
            headers,
            body,
        }),
        Err(e) => {
            log::debug!("content body read failed for {}: {}", url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::probes::test_support::{http_response, serve_once};

    #[tokio::test]
    async fn test_fetch_success_returns_body_and_headers() {
        let addr = serve_once(http_response("200 OK", "<html><body>hi</body></html>")).await;
        let client = reqwest::Client::new();

        let content = fetch_content(&client, &format!("http://{}/", addr), Duration::from_secs(5))
            .await
            .expect("content");

        assert_eq!(content.status, 200);
        assert_eq!(content.body, "<html><body>hi</body></html>");
        assert_eq!(content.header("content-type"), Some("text/html"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_none() {
        let addr = serve_once(http_response("404 Not Found", "missing")).await;
        let client = reqwest::Client::new();

        let content = fetch_content(&client, &format!("http://{}/", addr), Duration::from_secs(5)).await;
        assert!(content.is_none());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_none() {
        let client = reqwest::Client::new();
        let content = fetch_content(&client, "http://127.0.0.1:1/", Duration::from_secs(2)).await;
        assert!(content.is_none());
    }
}
