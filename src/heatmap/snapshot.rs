//! Snapshot building: one batch of counter rows to display records.

use serde::Serialize;

use crate::heatmap::color::ColorMapper;
use crate::heatmap::normalize::Normalizer;
use crate::store::KeyCount;

/// Suffix appended to each key to form the client-side element id.
pub const CELL_ID_SUFFIX: &str = "-inner";

/// One display-ready heatmap cell.
///
/// Field names on the wire (`id`, `fill`, `count`) are fixed for client
/// compatibility: the page applies `fill` directly to the element with the
/// matching `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    /// Client-side element identifier, `<key>-inner`.
    pub id: String,
    /// CSS color literal applied as the element's fill.
    #[serde(rename = "fill")]
    pub color: String,
    /// Raw count, passed through unchanged for the hover readout.
    pub count: i64,
}

/// Render one batch of counter rows with the configured strategy pair.
///
/// Pure: the ratio closure is built once from this batch's counts, then each
/// row maps to a cell in input order. Output cardinality always equals input
/// cardinality.
pub fn build_snapshot(
    batch: &[KeyCount],
    normalizer: &dyn Normalizer,
    palette: &dyn ColorMapper,
) -> Vec<HeatCell> {
    let counts: Vec<i64> = batch.iter().map(|row| row.count).collect();
    let ratio = normalizer.build(&counts);

    batch
        .iter()
        .map(|row| HeatCell {
            id: format!("{}{}", row.key, CELL_ID_SUFFIX),
            color: palette.map(ratio(row.count)),
            count: row.count,
        })
        .collect()
}
