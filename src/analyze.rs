//! Request-scoped analysis flows and the degrade-not-fail policy.
//!
//! Once an upload has been accepted, secondary analysis never hard-fails on
//! I/O: a blob that cannot be re-fetched or re-decoded produces heuristic
//! profiles or a placeholder chart instead of an error. Selection
//! preconditions (`InsufficientColumns`, `ColumnNotFound`) are caller input
//! errors and always surface.

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::{
    dataset::DatasetSummary,
    decode,
    error::PipelineError,
    plan::{self, ChartSpec},
    profile::{self, ColumnProfile},
    store::BlobStore,
};

/// Profiles the dataset's columns from the stored blob, degrading to
/// name-only heuristics when the blob cannot be analyzed. Never fails.
pub fn analyze_columns(summary: &DatasetSummary, store: &dyn BlobStore) -> Vec<ColumnProfile> {
    match observed_profiles(summary, store) {
        Ok(profiles) => profiles,
        Err(err) => {
            warn!(
                "Heuristic column analysis for '{}' after fetch failure: {err:#}",
                summary.name
            );
            profile::fallback_profiles(&summary.columns)
        }
    }
}

/// Plans a chart for the dataset, degrading to a placeholder specification
/// when the blob cannot be analyzed. Selection errors always surface.
pub fn plan_chart(
    summary: &DatasetSummary,
    store: &dyn BlobStore,
    selected: &[String],
) -> Result<ChartSpec, PipelineError> {
    if selected.len() < 2 {
        return Err(PipelineError::InsufficientColumns {
            selected: selected.len(),
        });
    }
    for name in selected {
        if !summary.columns.contains(name) {
            return Err(PipelineError::ColumnNotFound { name: name.clone() });
        }
    }

    match observed_chart(summary, store, selected) {
        Ok(spec) => Ok(spec),
        Err(err) => {
            warn!(
                "Placeholder chart for '{}' after fetch failure: {err:#}",
                summary.name
            );
            plan::placeholder_spec(selected, &summary.name, summary.rows)
        }
    }
}

fn observed_profiles(
    summary: &DatasetSummary,
    store: &dyn BlobStore,
) -> Result<Vec<ColumnProfile>> {
    let table = fetch_table(summary, store)?;
    Ok(profile::profile(&summary.columns, Some(&table)))
}

fn observed_chart(
    summary: &DatasetSummary,
    store: &dyn BlobStore,
    selected: &[String],
) -> Result<ChartSpec> {
    let table = fetch_table(summary, store)?;
    let spec = plan::plan(&table, selected, &summary.name)?;
    Ok(spec)
}

fn fetch_table(summary: &DatasetSummary, store: &dyn BlobStore) -> Result<decode::Table> {
    let bytes = store
        .fetch(&summary.blob_key)
        .with_context(|| format!("Fetching blob '{}'", summary.blob_key))?;
    let table = decode::decode_as(&bytes, summary.file_type)?;
    debug!(
        "Re-decoded '{}': {} column(s), {} row(s)",
        summary.name,
        table.columns().len(),
        table.row_count()
    );
    Ok(table)
}
