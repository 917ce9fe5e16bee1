//! GraphQL input and output types.
//!
//! Output types are projections computed on demand from the revived
//! triangle; nothing here is persisted. Input enums mirror the engine's
//! vocabulary so the engine crate stays free of GraphQL derives.

use async_graphql::{Enum, InputObject, Json, SimpleObject};

use {
    ladder_engine::{Aggregation, Comparator, Triangle, TrendAxis},
    ladder_ops::{AxisFilter, IndexFilter},
    ladder_store::Artifact,
};

/// Generic result for mutations that only succeed or fail.
#[derive(Debug, SimpleObject)]
pub struct BoolResult {
    pub ok: bool,
}

/// A stored triangle with its summary projections.
#[derive(Debug, SimpleObject)]
#[graphql(name = "Triangle")]
pub struct TriangleSummary {
    /// Unique artifact name.
    pub name: String,
    /// Record creation time, epoch milliseconds.
    pub created_ms: i64,
    /// Last successful mutation time, epoch milliseconds.
    pub edited_ms: i64,
    /// `[index, columns, origin, development]` extents.
    pub shape: Vec<u64>,
    pub origin_grain: String,
    pub development_grain: String,
    pub origin: Vec<String>,
    pub development: Vec<String>,
    pub columns: Vec<String>,
    pub key_labels: Vec<String>,
    pub index: Vec<Vec<String>>,
    /// Latest valuation date, `YYYY-MM-DD`.
    pub valuation_date: String,
    pub is_cumulative: bool,
    pub is_val_tri: bool,
    pub is_full: bool,
    pub is_ultimate: bool,
    /// The 4-D value grid, `[index][column][origin][development]`, with
    /// `null` for missing cells.
    pub values: Json<serde_json::Value>,
}

impl TriangleSummary {
    /// Project a stored artifact through its revived triangle.
    pub(crate) fn project(artifact: &Artifact, tri: &dyn Triangle) -> Self {
        Self {
            name: artifact.name.clone(),
            created_ms: artifact.created_ms,
            edited_ms: artifact.edited_ms,
            shape: tri.shape().iter().map(|&n| n as u64).collect(),
            origin_grain: tri.origin_grain().to_string(),
            development_grain: tri.development_grain().to_string(),
            origin: tri.origin(),
            development: tri.development(),
            columns: tri.columns(),
            key_labels: tri.key_labels(),
            index: tri.index(),
            valuation_date: tri.valuation_date().format("%Y-%m-%d").to_string(),
            is_cumulative: tri.is_cumulative(),
            is_val_tri: tri.is_val_tri(),
            is_full: tri.is_full(),
            is_ultimate: tri.is_ultimate(),
            values: Json(serde_json::json!(tri.values())),
        }
    }
}

/// One raw step of an `applyChain` mutation.
#[derive(Debug, InputObject)]
pub struct ChainStepInput {
    /// Operation name, e.g. `"cumToIncr"`.
    pub op: String,
    /// Raw arguments: a JSON object of named arguments, a JSON array for
    /// list-valued operations, or a bare literal.
    pub args: Option<String>,
}

/// Comparison operator for filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(name = "Comparator")]
pub enum ComparatorInput {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl From<ComparatorInput> for Comparator {
    fn from(value: ComparatorInput) -> Self {
        match value {
            ComparatorInput::Eq => Self::Eq,
            ComparatorInput::Ne => Self::Ne,
            ComparatorInput::Gt => Self::Gt,
            ComparatorInput::Ge => Self::Ge,
            ComparatorInput::Lt => Self::Lt,
            ComparatorInput::Le => Self::Le,
        }
    }
}

/// Group-by reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(name = "AggregationMethod")]
pub enum AggregationInput {
    Sum,
    Mean,
    Std,
    Var,
    Median,
    Min,
    Max,
    Prod,
}

impl From<AggregationInput> for Aggregation {
    fn from(value: AggregationInput) -> Self {
        match value {
            AggregationInput::Sum => Self::Sum,
            AggregationInput::Mean => Self::Mean,
            AggregationInput::Std => Self::Std,
            AggregationInput::Var => Self::Var,
            AggregationInput::Median => Self::Median,
            AggregationInput::Min => Self::Min,
            AggregationInput::Max => Self::Max,
            AggregationInput::Prod => Self::Prod,
        }
    }
}

/// Axis a trend rate runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(name = "TrendAxis")]
pub enum TrendAxisInput {
    Origin,
    Valuation,
}

impl From<TrendAxisInput> for TrendAxis {
    fn from(value: TrendAxisInput) -> Self {
        match value {
            TrendAxisInput::Origin => Self::Origin,
            TrendAxisInput::Valuation => Self::Valuation,
        }
    }
}

/// Filter on a named index column.
#[derive(Debug, InputObject)]
#[graphql(name = "IndexFilter")]
pub struct IndexFilterInput {
    /// Index column to filter on.
    pub key: String,
    pub operator: ComparatorInput,
    pub value: String,
}

impl From<IndexFilterInput> for IndexFilter {
    fn from(value: IndexFilterInput) -> Self {
        Self {
            key: value.key,
            operator: value.operator.into(),
            value: value.value,
        }
    }
}

/// Filter on one of the triangle's built-in axes.
#[derive(Debug, InputObject)]
#[graphql(name = "AxisFilter")]
pub struct AxisFilterInput {
    pub operator: ComparatorInput,
    pub value: String,
}

impl From<AxisFilterInput> for AxisFilter {
    fn from(value: AxisFilterInput) -> Self {
        Self {
            operator: value.operator.into(),
            value: value.value,
        }
    }
}
