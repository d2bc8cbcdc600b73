//! Low-level HTTP helper for the locator page.

use crate::error::LocatorError;

const HTML_FETCH_ATTEMPTS: usize = 3;
const HTML_FETCH_BACKOFF_MS: [u64; 3] = [0, 300, 900];

/// Fetch the HTML body of `url`, retrying on network errors and non-2xx
/// responses with a short fixed back-off schedule.
pub(crate) async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, LocatorError> {
    for attempt in 0..HTML_FETCH_ATTEMPTS {
        if let Some(delay_ms) = HTML_FETCH_BACKOFF_MS.get(attempt).copied() {
            if delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }
        }

        let response = match client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!(url, attempt, error = %err, "locator fetch failed; retrying");
                continue;
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response.text().await?);
        }
        tracing::debug!(url, attempt, status = status.as_u16(), "locator page returned non-2xx");
    }

    Err(LocatorError::AllAttemptsFailed {
        url: url.to_owned(),
    })
}
