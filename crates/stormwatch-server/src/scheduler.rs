//! Background refresh scheduling.

use stormwatch_engine::{AlertSource, LocationSource, RefreshOutcome};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the scheduler with the periodic refresh job.
///
/// The returned handle must be kept alive; dropping it stops the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler fails to start.
pub async fn build_scheduler<A, L>(
    state: AppState<A, L>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError>
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            tracing::info!("scheduler: starting refresh");
            run_refresh(&state, true).await;
        })
    })?;
    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered refresh job");

    scheduler.start().await?;
    Ok(scheduler)
}

/// Run one refresh and log its outcome. Failures keep the previous snapshot.
pub async fn run_refresh<A, L>(state: &AppState<A, L>, force_reload: bool)
where
    A: AlertSource,
    L: LocationSource,
{
    match state
        .session
        .refresh(state.alerts.as_ref(), state.locations.as_ref(), force_reload)
        .await
    {
        Ok(RefreshOutcome::Applied(snapshot)) => tracing::info!(
            locations = snapshot.locations.len(),
            alerts = snapshot.alerts.len(),
            "scheduler: refresh complete"
        ),
        Ok(RefreshOutcome::Superseded) => {
            tracing::info!("scheduler: refresh superseded by a newer run");
        }
        Err(e) => tracing::error!(error = %e, "scheduler: refresh failed"),
    }
}
