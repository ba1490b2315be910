//! Export — CSV snapshots of the live set and JSON run summaries.
//!
//! The CSV carries the blotter's columns: id, flag asset, instrument, status,
//! side, quantity, filled and percentage filled. Summaries carry a
//! `schema_version`; unknown versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tradegen_core::Trade;

use crate::summary::{RunSummary, SCHEMA_VERSION};

pub const SNAPSHOT_FILE: &str = "snapshot.csv";
pub const SUMMARY_FILE: &str = "summary.json";

// ─── CSV export ─────────────────────────────────────────────────────

/// Export trades as CSV.
///
/// Columns: id, flag, instrument, status, side, quantity, filled, fill_pct
pub fn snapshot_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "flag",
        "instrument",
        "status",
        "side",
        "quantity",
        "filled",
        "fill_pct",
    ])?;

    for t in trades {
        wtr.write_record(&[
            t.id.to_string(),
            t.instrument.flag_asset(),
            t.instrument.symbol.clone(),
            t.status.to_string(),
            t.side.label().to_string(),
            t.quantity.to_string(),
            t.filled.to_string(),
            format!("{:.2}", t.fill_ratio() * 100.0),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn summary_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize RunSummary to JSON")
}

/// Deserialize a summary, rejecting newer schema versions.
pub fn import_summary(json: &str) -> Result<RunSummary> {
    let summary: RunSummary =
        serde_json::from_str(json).context("failed to deserialize RunSummary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

// ─── Artifacts ──────────────────────────────────────────────────────

/// Write `snapshot.csv` and `summary.json` into `dir`, creating it if needed.
pub fn save_artifacts(dir: &Path, trades: &[Trade], summary: &RunSummary) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let snapshot = dir.join(SNAPSHOT_FILE);
    std::fs::write(&snapshot, snapshot_csv(trades)?)
        .with_context(|| format!("write {}", snapshot.display()))?;

    let json = dir.join(SUMMARY_FILE);
    std::fs::write(&json, summary_json(summary)?).with_context(|| format!("write {}", json.display()))?;

    log::info!("wrote {} and {}", snapshot.display(), json.display());
    Ok(vec![snapshot, json])
}
