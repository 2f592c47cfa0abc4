//! Reputation Report Probe
//!
//! Fetches the public site report page for the URL. The page is scraped
//! later by the reputation feature; its structure is not a stable contract.

use std::time::Duration;

/// Fetch the report page for `url`, `None` on any failure
pub async fn fetch_report(
    client: &reqwest::Client,
    endpoint: &str,
    url: &str,
    timeout: Duration,
) -> Option<String> {
    let report_url = format!("{}{}", endpoint, url);

    let response = match client.get(&report_url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            log::debug!("reputation report fetch failed for {}: {}", url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        log::debug!("reputation report for {} returned {}", url, response.status());
        return None;
    }

    match response.text().await {
        Ok(body) if !body.trim().is_empty() => Some(body),
        Ok(_) => None,
        Err(e) => {
            log::debug!("reputation report body unreadable for {}: {}", url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::probes::test_support::{http_response, serve_once};

    #[tokio::test]
    async fn test_report_is_fetched_with_url_appended() {
        let addr = serve_once(http_response("200 OK", "<span>a</span>")).await;
        let client = reqwest::Client::new();
        let endpoint = format!("http://{}/sitereport.html?url=", addr);

        let report = fetch_report(&client, &endpoint, "https://example.com", Duration::from_secs(5)).await;
        assert_eq!(report.as_deref(), Some("<span>a</span>"));
    }

    #[tokio::test]
    async fn test_report_error_status_is_none() {
        let addr = serve_once(http_response("503 Service Unavailable", "busy")).await;
        let client = reqwest::Client::new();
        let endpoint = format!("http://{}/?url=", addr);

        assert!(fetch_report(&client, &endpoint, "x", Duration::from_secs(5)).await.is_none());
    }
}
