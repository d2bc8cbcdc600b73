use stormwatch_core::AppConfig;
use stormwatch_engine::{
    AlertEnricher, ClosureClassifier, DashboardSession, PinGroup, RefreshOutcome, StoreFeed,
};
use stormwatch_locator::{LocatorClient, StatusHistoryStore};

/// Run one full refresh and print the tally plus the closed stores.
///
/// # Errors
///
/// Returns an error if the alert feed or the store feed cannot be loaded,
/// or the status history cannot be saved.
pub(crate) async fn run_scan(
    config: &AppConfig,
    batch_size: Option<usize>,
    storm_only: bool,
) -> anyhow::Result<()> {
    let nws = super::nws_client(config)?;
    let locator = LocatorClient::new(
        config.locations_url.clone(),
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let feed = StoreFeed::new(
        locator,
        StatusHistoryStore::new(config.status_history_path.clone()),
    );

    let session = DashboardSession::new(
        AlertEnricher::new(),
        ClosureClassifier::new(config.proximity_radius_miles, config.freshness_window_hours)?,
        batch_size.unwrap_or(config.batch_size),
    );

    let snapshot = match session.refresh(&nws, &feed, true).await? {
        RefreshOutcome::Applied(snapshot) => snapshot,
        RefreshOutcome::Superseded => anyhow::bail!("scan was superseded by another refresh"),
    };

    let s = snapshot.summary;
    println!(
        "{} alerts; {} stores: {} open, {} closed, {} storm-related, {} unknown, {} failed",
        snapshot.alerts.len(),
        s.total(),
        s.open,
        s.closed,
        s.storm,
        s.unknown,
        s.failed
    );

    let groups: &[PinGroup] = if storm_only {
        &[PinGroup::Storm]
    } else {
        &[PinGroup::Storm, PinGroup::Closed]
    };
    let rows: Vec<_> = groups.iter().flat_map(|g| snapshot.in_group(*g)).collect();
    if rows.is_empty() {
        println!("no closed stores");
        return Ok(());
    }

    println!();
    println!(
        "{:<8}{:<8}{:<8}{:<18}{:<24}ADDRESS",
        "STORE", "STATUS", "GROUP", "CHANGED", "CITY"
    );
    for row in rows {
        let loc = &row.location;
        let changed = loc
            .last_changed
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!(
            "{:<8}{:<8}{:<8}{:<18}{:<24}{}",
            loc.store_code,
            loc.status.code(),
            row.group.as_str(),
            changed,
            super::truncate(&format!("{}, {}", loc.city, loc.state), 22),
            loc.address
        );
    }

    Ok(())
}
