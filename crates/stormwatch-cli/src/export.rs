use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::Context;
use stormwatch_core::AppConfig;
use stormwatch_locator::{write_csv, LocatorClient};

/// Dump the full store directory as CSV to `path`, or stdout for `-`.
///
/// # Errors
///
/// Returns an error if the locator page cannot be loaded or the output
/// cannot be written.
pub(crate) async fn run_export(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let locator = LocatorClient::new(
        config.locations_url.clone(),
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let records = locator.fetch_store_records().await?;

    if path == Path::new("-") {
        write_csv(&records, io::stdout().lock())?;
        return Ok(());
    }

    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(&records, BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Saved {} stores to {}", records.len(), path.display());
    Ok(())
}
