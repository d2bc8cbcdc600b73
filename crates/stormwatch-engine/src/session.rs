//! Dashboard session: one owner for the alert cache, the last classified
//! location set, and the refresh generation.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use stormwatch_core::{AppConfig, Location};

use crate::batch::{BatchDispatcher, Summary, TokioYield, YieldPoint};
use crate::cache::CachedAlerts;
use crate::classify::{Classification, ClosureClassifier, PinGroup};
use crate::enrich::{AlertEnricher, AlertSource};
use crate::error::{ClassifyError, EnrichError, LocationSourceError, RefreshError};

/// Supplies the current store list with `last_changed` filled in.
pub trait LocationSource: Send + Sync {
    fn load_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<Location>, LocationSourceError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedLocation {
    #[serde(flatten)]
    pub location: Location,
    #[serde(flatten)]
    pub classification: Classification,
    pub group: PinGroup,
}

/// Result of the most recent applied refresh.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub locations: Arc<[ClassifiedLocation]>,
    pub summary: Summary,
    pub alerts: CachedAlerts,
    pub refreshed_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn in_group(&self, group: PinGroup) -> impl Iterator<Item = &ClassifiedLocation> {
        self.locations.iter().filter(move |l| l.group == group)
    }
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Applied(Snapshot),
    /// A newer refresh started while this one ran; its results were
    /// discarded.
    Superseded,
}

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    snapshot: Option<Snapshot>,
}

pub struct DashboardSession<Y = TokioYield> {
    enricher: AlertEnricher,
    classifier: ClosureClassifier,
    dispatcher: BatchDispatcher<Y>,
    state: Mutex<SessionState>,
}

impl DashboardSession<TokioYield> {
    #[must_use]
    pub fn new(enricher: AlertEnricher, classifier: ClosureClassifier, batch_size: usize) -> Self {
        Self::with_dispatcher(enricher, classifier, BatchDispatcher::new(batch_size))
    }

    /// Session with the default allow-list and the configured radius,
    /// freshness window and batch size.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidFreshnessWindow`] if the configured
    /// window cannot be represented.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClassifyError> {
        let classifier =
            ClosureClassifier::new(config.proximity_radius_miles, config.freshness_window_hours)?;
        Ok(Self::new(AlertEnricher::new(), classifier, config.batch_size))
    }
}

impl<Y: YieldPoint> DashboardSession<Y> {
    #[must_use]
    pub fn with_dispatcher(
        enricher: AlertEnricher,
        classifier: ClosureClassifier,
        dispatcher: BatchDispatcher<Y>,
    ) -> Self {
        Self {
            enricher,
            classifier,
            dispatcher,
            state: Mutex::new(SessionState::default()),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.lock().snapshot.clone()
    }

    /// Enriched alerts, from cache unless `force_reload` is set.
    ///
    /// # Errors
    ///
    /// See [`AlertEnricher::enrich`].
    pub async fn alerts<A: AlertSource>(
        &self,
        source: &A,
        force_reload: bool,
    ) -> Result<CachedAlerts, EnrichError> {
        self.enricher.enrich(source, force_reload).await
    }

    /// Drop cached alerts so the next refresh fetches them again.
    pub fn invalidate_alerts(&self) {
        self.enricher.invalidate();
    }

    /// Enrich alerts, load locations, and classify every location.
    ///
    /// The snapshot is stored only if no other refresh started after this
    /// one; otherwise [`RefreshOutcome::Superseded`] is returned and the
    /// results are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError`] if the alert list or the locations cannot be
    /// loaded. The previous snapshot is kept.
    pub async fn refresh<A, L>(
        &self,
        alert_source: &A,
        location_source: &L,
        force_reload: bool,
    ) -> Result<RefreshOutcome, RefreshError>
    where
        A: AlertSource,
        L: LocationSource,
    {
        let generation = self.begin_refresh();

        let alerts = self.enricher.enrich(alert_source, force_reload).await?;
        let locations = location_source.load_locations().await?;

        let now = Utc::now();
        let mut classified = Vec::with_capacity(locations.len());
        let summary = self
            .dispatcher
            .process_all(&locations, |location| {
                let classification = self.classifier.classify_at(location, &alerts.areas, now)?;
                let group = PinGroup::of(&location.status, classification);
                classified.push(ClassifiedLocation {
                    location: location.clone(),
                    classification,
                    group,
                });
                Ok::<_, ClassifyError>(group)
            })
            .await;

        let snapshot = Snapshot {
            locations: classified.into(),
            summary,
            alerts,
            refreshed_at: now,
        };

        let mut state = self.lock();
        if state.generation != generation {
            tracing::info!(
                generation,
                current = state.generation,
                "refresh superseded by a newer one; discarding results"
            );
            return Ok(RefreshOutcome::Superseded);
        }
        state.snapshot = Some(snapshot.clone());
        drop(state);

        tracing::info!(
            generation,
            open = summary.open,
            closed = summary.closed,
            storm = summary.storm,
            unknown = summary.unknown,
            failed = summary.failed,
            alerts = snapshot.alerts.len(),
            "refresh applied"
        );
        Ok(RefreshOutcome::Applied(snapshot))
    }

    fn begin_refresh(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.generation
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
