//! Cleanup of the raw JHU CSSE tables before aggregation.

use tracing::debug;

use crate::analyzers::types::TimeSeriesTable;
use crate::constants::{COUNTRY_COLUMN, NON_STATES, PROVINCE_COLUMN, RENAME};
use crate::error::Result;

/// Maps a source alias onto the canonical country name. Names that are not
/// aliases come back unchanged, so applying it twice changes nothing.
pub fn canonical_name(name: &str) -> &str {
    RENAME
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Canonicalizes country names, blanks missing subdivision labels and drops
/// rows that do not describe a place.
///
/// # Errors
///
/// Returns [`DataError::MissingColumn`](crate::error::DataError::MissingColumn)
/// if the table lacks the country or subdivision column.
pub fn normalize(mut table: TimeSeriesTable) -> Result<TimeSeriesTable> {
    let country = table.label_index(COUNTRY_COLUMN)?;
    let province = table.label_index(PROVINCE_COLUMN)?;

    let before = table.rows.len();
    table.rows.retain(|row| {
        let subdivision = row.labels[province].trim();
        !NON_STATES.contains(&subdivision)
    });

    for row in &mut table.rows {
        let renamed = canonical_name(row.labels[country].trim()).to_string();
        row.labels[country] = renamed;
        let subdivision = row.labels[province].trim().to_string();
        row.labels[province] = subdivision;
    }

    debug!(
        rows = table.rows.len(),
        dropped = before - table.rows.len(),
        "Table normalized"
    );

    Ok(table)
}
