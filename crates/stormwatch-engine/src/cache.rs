//! Single-slot memo of the enriched alert collection.
//!
//! Writes are guarded by a generation counter: every fill, `set` and
//! `invalidate` bumps it, and a fill only lands if nothing newer happened
//! after it began. A refresh that finishes late is discarded instead of
//! overwriting fresher data.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use stormwatch_nws::AlertFeature;

use crate::geometry::{alert_areas, AlertArea};

/// Enriched alerts plus the polygons derived from them.
#[derive(Debug, Clone, Default)]
pub struct CachedAlerts {
    pub features: Arc<[AlertFeature]>,
    pub areas: Arc<[AlertArea]>,
}

impl CachedAlerts {
    #[must_use]
    pub fn new(features: Vec<AlertFeature>) -> Self {
        let areas = alert_areas(&features);
        Self {
            features: features.into(),
            areas: areas.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Handed out by [`AlertCache::begin_fill`]; redeemed by
/// [`AlertCache::complete_fill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FillTicket {
    generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    entry: Option<CachedAlerts>,
}

#[derive(Debug, Default)]
pub struct AlertCache {
    slot: Mutex<Slot>,
}

impl AlertCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<CachedAlerts> {
        self.lock().entry.clone()
    }

    /// Unconditional write.
    pub fn set(&self, features: Vec<AlertFeature>) -> CachedAlerts {
        let cached = CachedAlerts::new(features);
        let mut slot = self.lock();
        slot.generation += 1;
        slot.entry = Some(cached.clone());
        cached
    }

    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.entry = None;
    }

    pub fn begin_fill(&self) -> FillTicket {
        let mut slot = self.lock();
        slot.generation += 1;
        FillTicket {
            generation: slot.generation,
        }
    }

    /// Store `features` if no fill, `set` or `invalidate` happened since
    /// `ticket` was issued. Returns the stored entry, or `None` when the
    /// ticket was superseded and nothing was written.
    pub fn complete_fill(
        &self,
        ticket: FillTicket,
        features: Vec<AlertFeature>,
    ) -> Option<CachedAlerts> {
        let cached = CachedAlerts::new(features);
        let mut slot = self.lock();
        if slot.generation != ticket.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = slot.generation,
                "discarding superseded alert fill"
            );
            return None;
        }
        slot.entry = Some(cached.clone());
        Some(cached)
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
