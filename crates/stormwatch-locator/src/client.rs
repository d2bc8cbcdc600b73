//! HTTP client for the store-locator page.

use std::time::Duration;

use stormwatch_core::Location;

use crate::embed::{extract_props_payload, page_locations};
use crate::error::LocatorError;
use crate::export::StoreRecord;
use crate::fetch::fetch_html;
use crate::parse::parse_locations;

/// Fetches and normalises the full store list from the locator page.
pub struct LocatorClient {
    client: reqwest::Client,
    locations_url: String,
}

impl LocatorClient {
    /// # Errors
    ///
    /// Returns [`LocatorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        locations_url: impl Into<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LocatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            locations_url: locations_url.into(),
        })
    }

    #[must_use]
    pub fn locations_url(&self) -> &str {
        &self.locations_url
    }

    /// Load every store with usable coordinates. `last_changed` is left
    /// unset; see [`crate::StatusHistory::annotate`].
    ///
    /// # Errors
    ///
    /// - [`LocatorError::AllAttemptsFailed`] if the page cannot be fetched.
    /// - [`LocatorError::MissingPayload`] if the page has no embedded
    ///   `props` JSON.
    pub async fn fetch_locations(&self) -> Result<Vec<Location>, LocatorError> {
        let payload = self.fetch_payload().await?;
        let records = page_locations(&payload);
        let locations = parse_locations(records);
        tracing::info!(
            url = %self.locations_url,
            records = records.len(),
            locations = locations.len(),
            "loaded store locations"
        );
        Ok(locations)
    }

    /// Load the full directory listing, one [`StoreRecord`] per feed object.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_locations`].
    pub async fn fetch_store_records(&self) -> Result<Vec<StoreRecord>, LocatorError> {
        let payload = self.fetch_payload().await?;
        let records: Vec<StoreRecord> = page_locations(&payload)
            .iter()
            .filter_map(StoreRecord::from_feed)
            .collect();
        tracing::info!(url = %self.locations_url, records = records.len(), "loaded store directory");
        Ok(records)
    }

    async fn fetch_payload(&self) -> Result<serde_json::Value, LocatorError> {
        let html = fetch_html(&self.client, &self.locations_url).await?;
        extract_props_payload(&html).ok_or_else(|| LocatorError::MissingPayload {
            url: self.locations_url.clone(),
        })
    }
}
