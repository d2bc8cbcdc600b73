use stormwatch_core::AppConfig;
use stormwatch_engine::AlertEnricher;

/// Print active, allow-listed alerts with their geometry source resolved.
///
/// # Errors
///
/// Returns an error if the active alert list cannot be fetched.
pub(crate) async fn run_alerts(config: &AppConfig, event_filter: Option<&str>) -> anyhow::Result<()> {
    let nws = super::nws_client(config)?;
    let alerts = AlertEnricher::new().enrich(&nws, true).await?;

    let matching: Vec<_> = alerts
        .features
        .iter()
        .filter(|a| event_filter.is_none_or(|e| a.event().eq_ignore_ascii_case(e)))
        .collect();

    if matching.is_empty() {
        println!(
            "no active alerts{}",
            event_filter
                .map(|e| format!(" for event '{e}'"))
                .unwrap_or_default()
        );
        return Ok(());
    }

    println!("{:<32}{:<10}{:<18}AREA", "EVENT", "SEVERITY", "EXPIRES");
    for alert in matching {
        let props = &alert.properties;
        let expires = props
            .expires
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!(
            "{:<32}{:<10}{:<18}{}",
            super::truncate(&props.event, 30),
            props.severity.as_deref().unwrap_or("-"),
            expires,
            super::truncate(props.area_desc.as_deref().unwrap_or("-"), 60)
        );
    }
    println!("{} alerts with drawable areas", alerts.areas.len());

    Ok(())
}
