//! Production sources backed by the NWS and store-locator clients.

use std::future::Future;

use chrono::Utc;
use stormwatch_core::Location;
use stormwatch_locator::{LocatorClient, StatusHistoryStore};
use stormwatch_nws::{AlertFeature, NwsClient, NwsError};

use crate::enrich::AlertSource;
use crate::error::LocationSourceError;
use crate::session::LocationSource;

impl AlertSource for NwsClient {
    fn fetch_active_alerts(
        &self,
    ) -> impl Future<Output = Result<Vec<AlertFeature>, NwsError>> + Send {
        NwsClient::fetch_active_alerts(self)
    }

    fn fetch_zone_geometry(
        &self,
        zone_url: &str,
    ) -> impl Future<Output = Result<Option<geojson::Geometry>, NwsError>> + Send {
        NwsClient::fetch_zone_geometry(self, zone_url)
    }
}

/// Locator feed cross-referenced with the persisted status history.
pub struct StoreFeed {
    client: LocatorClient,
    history: StatusHistoryStore,
}

impl StoreFeed {
    #[must_use]
    pub fn new(client: LocatorClient, history: StatusHistoryStore) -> Self {
        Self { client, history }
    }
}

impl LocationSource for StoreFeed {
    /// Fetch the feed, fold it into the status history (saving on change),
    /// and annotate each store with its last status change.
    async fn load_locations(&self) -> Result<Vec<Location>, LocationSourceError> {
        let mut locations = self.client.fetch_locations().await?;
        let history = self.history.reconcile(&locations, Utc::now()).await?;
        history.annotate(&mut locations);
        Ok(locations)
    }
}
