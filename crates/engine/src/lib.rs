//! The analytics capability behind the façade.
//!
//! The rest of the workspace talks to loss-development triangles exclusively
//! through the [`Engine`] and [`Triangle`] traits defined here. An engine
//! loads named sample datasets and revives triangles from their serialized
//! payloads; a triangle exposes the transform set and read-only projections
//! the mutation surface needs. Payloads are opaque to every other crate —
//! only an engine may produce or interpret them.
//!
//! The [`mem`] module ships a self-contained implementation with bundled
//! datasets so the service runs without any external process.

pub mod error;
pub mod mem;
pub mod types;

use chrono::NaiveDate;

pub use {
    error::{EngineError, Result},
    types::{Aggregation, Comparator, Grain, TrendAxis},
};

/// Loads triangles by dataset name and revives them from payloads.
pub trait Engine: Send + Sync {
    /// Load a bundled sample dataset. Unknown names fail with
    /// [`EngineError::DatasetNotFound`].
    fn load_dataset(&self, name: &str) -> Result<Box<dyn Triangle>>;

    /// Revive a triangle from a payload previously produced by
    /// [`Triangle::to_payload`].
    fn from_payload(&self, payload: &str) -> Result<Box<dyn Triangle>>;
}

/// A loss-development triangle: transforms plus read-only projections.
///
/// Transforms never mutate in place; each returns a fresh triangle so a
/// failed chain leaves its input untouched. Serializing and reviving a
/// triangle is lossless: `from_payload(to_payload(t))` re-serializes to the
/// identical payload.
pub trait Triangle: Send + Sync {
    /// Serialize to the engine's payload format.
    fn to_payload(&self) -> Result<String>;

    // ── Transforms ──────────────────────────────────────────────────────

    /// Change origin/development grain, e.g. `"OQDQ"` or a bare `"Y"`.
    fn grain(&self, grain: &str, trailing: bool) -> Result<Box<dyn Triangle>>;
    /// Re-index a valuation triangle onto development ages.
    fn val_to_dev(&self) -> Result<Box<dyn Triangle>>;
    /// Re-index a development triangle onto valuation dates.
    fn dev_to_val(&self) -> Result<Box<dyn Triangle>>;
    /// Convert incremental values to cumulative. No-op when already cumulative.
    fn incr_to_cum(&self) -> Result<Box<dyn Triangle>>;
    /// Convert cumulative values to incremental. No-op when already incremental.
    fn cum_to_incr(&self) -> Result<Box<dyn Triangle>>;
    /// Keep each origin period's most recent populated cell.
    fn latest_diagonal(&self) -> Result<Box<dyn Triangle>>;
    /// Age-to-age factors of a cumulative triangle.
    fn link_ratio(&self) -> Result<Box<dyn Triangle>>;
    /// Apply an annual trend rate along the origin or valuation axis.
    fn trend(
        &self,
        rate: f64,
        axis: TrendAxis,
        valuation_date: Option<NaiveDate>,
        ultimate_lag: Option<i32>,
    ) -> Result<Box<dyn Triangle>>;
    /// Reduce index rows sharing the named key columns.
    fn group_by(&self, by: &[String], aggregation: Aggregation) -> Result<Box<dyn Triangle>>;
    /// Drop origin rows and development columns that hold no data at all.
    fn drop_na(&self) -> Result<Box<dyn Triangle>>;

    // ── Selection & filtering ───────────────────────────────────────────

    /// Keep index rows whose first key column matches one of `labels`.
    fn select_index(&self, labels: &[String]) -> Result<Box<dyn Triangle>>;
    /// Keep index rows where `key`'s value satisfies the comparison.
    fn filter_index(&self, key: &str, cmp: Comparator, value: &str) -> Result<Box<dyn Triangle>>;
    /// Keep the named value columns, in the given order.
    fn select_columns(&self, names: &[String]) -> Result<Box<dyn Triangle>>;
    /// Keep origin periods satisfying the comparison.
    fn filter_origin(&self, cmp: Comparator, value: &str) -> Result<Box<dyn Triangle>>;
    /// Keep development points satisfying the comparison.
    fn filter_development(&self, cmp: Comparator, value: &str) -> Result<Box<dyn Triangle>>;
    /// Mask cells whose valuation date fails the comparison.
    fn filter_valuation(&self, cmp: Comparator, value: &str) -> Result<Box<dyn Triangle>>;

    // ── Projections ─────────────────────────────────────────────────────

    /// `[index, columns, origin, development]` extents.
    fn shape(&self) -> [usize; 4];
    fn origin_grain(&self) -> Grain;
    fn development_grain(&self) -> Grain;
    /// Origin period labels, formatted per grain (`"1988"`, `"1990Q2"`).
    fn origin(&self) -> Vec<String>;
    /// Development labels: ages in months, or valuation dates for a
    /// valuation triangle.
    fn development(&self) -> Vec<String>;
    fn columns(&self) -> Vec<String>;
    fn key_labels(&self) -> Vec<String>;
    /// One row of key values per index entry.
    fn index(&self) -> Vec<Vec<String>>;
    fn valuation_date(&self) -> NaiveDate;
    fn is_cumulative(&self) -> bool;
    fn is_val_tri(&self) -> bool;
    /// True when no cell is missing.
    fn is_full(&self) -> bool;
    fn is_ultimate(&self) -> bool;
    /// The full value grid, `[index][column][origin][development]`,
    /// `None` for missing cells.
    fn values(&self) -> Vec<Vec<Vec<Vec<Option<f64>>>>>;
}
