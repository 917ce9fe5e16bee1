//! The closed set of triangle operations and their argument schemas.

use {chrono::NaiveDate, serde::Deserialize};

use {
    ladder_common::{Error, Result},
    ladder_engine::{Aggregation, Comparator, EngineError, Triangle, TrendAxis},
};

/// Arguments for a grain change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GrainArgs {
    /// Grain spec, e.g. `"OQDY"` or a bare `"Y"`.
    pub grain: String,
    /// Anchor buckets to the valuation month instead of the calendar year.
    #[serde(default)]
    pub trailing: bool,
}

/// Arguments for a trend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrendArgs {
    /// Annual trend rate, e.g. `0.05`.
    pub trend: f64,
    #[serde(default)]
    pub axis: Option<TrendAxis>,
    #[serde(default)]
    pub valuation_date: Option<NaiveDate>,
    #[serde(default)]
    pub ultimate_lag: Option<i32>,
}

/// Arguments for a group-by.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupByArgs {
    /// Index columns to group on.
    pub by: Vec<String>,
    #[serde(default = "default_aggregation")]
    pub aggregation: Aggregation,
}

fn default_aggregation() -> Aggregation {
    Aggregation::Sum
}

/// Filter on a named index column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IndexFilter {
    pub key: String,
    pub operator: Comparator,
    pub value: String,
}

/// Filter on one of the triangle's built-in axes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AxisFilter {
    pub operator: Comparator,
    pub value: String,
}

/// Arguments for a `loc` selection. Every clause is optional; they apply
/// in a fixed order (see [`Operation::apply`]).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocArgs {
    #[serde(default)]
    pub index: Option<Vec<String>>,
    #[serde(default)]
    pub where_index: Option<IndexFilter>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub where_origin: Option<AxisFilter>,
    #[serde(default)]
    pub where_development: Option<AxisFilter>,
    #[serde(default)]
    pub where_valuation: Option<AxisFilter>,
}

/// One registered operation with validated arguments.
///
/// The set is closed: adding an operation means adding a variant, its
/// argument schema, and its `apply` arm. There is no name-based dispatch
/// anywhere downstream of this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Grain(GrainArgs),
    ValToDev,
    DevToVal,
    IncrToCum,
    CumToIncr,
    LatestDiagonal,
    LinkRatio,
    Trend(TrendArgs),
    GroupBy(GroupByArgs),
    Loc(LocArgs),
    DropNa,
    Copy,
}

impl Operation {
    /// Wire name of the operation.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Grain(_) => "grain",
            Self::ValToDev => "valToDev",
            Self::DevToVal => "devToVal",
            Self::IncrToCum => "incrToCum",
            Self::CumToIncr => "cumToIncr",
            Self::LatestDiagonal => "latestDiagonal",
            Self::LinkRatio => "linkRatio",
            Self::Trend(_) => "trend",
            Self::GroupBy(_) => "groupBy",
            Self::Loc(_) => "loc",
            Self::DropNa => "dropNa",
            Self::Copy => "copy",
        }
    }

    /// Run the transform. The input is consumed; on failure the caller
    /// still holds the stored payload, so nothing is half-applied.
    pub fn apply(&self, tri: Box<dyn Triangle>) -> Result<Box<dyn Triangle>> {
        match self {
            Self::Grain(args) => tri.grain(&args.grain, args.trailing),
            Self::ValToDev => tri.val_to_dev(),
            Self::DevToVal => tri.dev_to_val(),
            Self::IncrToCum => tri.incr_to_cum(),
            Self::CumToIncr => tri.cum_to_incr(),
            Self::LatestDiagonal => tri.latest_diagonal(),
            Self::LinkRatio => tri.link_ratio(),
            Self::Trend(args) => tri.trend(
                args.trend,
                args.axis.unwrap_or(TrendAxis::Origin),
                args.valuation_date,
                args.ultimate_lag,
            ),
            Self::GroupBy(args) => tri.group_by(&args.by, args.aggregation),
            Self::Loc(args) => apply_loc(tri, args),
            Self::DropNa => tri.drop_na(),
            Self::Copy => Ok(tri),
        }
        .map_err(engine_err)
    }
}

/// Clause order is fixed: index-select, index-filter, column-select, then
/// origin, development, valuation filters. Not commutative when labels are
/// ambiguous, so the order is part of the contract.
fn apply_loc(
    tri: Box<dyn Triangle>,
    args: &LocArgs,
) -> std::result::Result<Box<dyn Triangle>, EngineError> {
    let mut tri = tri;
    if let Some(labels) = &args.index {
        tri = tri.select_index(labels)?;
    }
    if let Some(f) = &args.where_index {
        tri = tri.filter_index(&f.key, f.operator, &f.value)?;
    }
    if let Some(columns) = &args.columns {
        tri = tri.select_columns(columns)?;
    }
    if let Some(f) = &args.where_origin {
        tri = tri.filter_origin(f.operator, &f.value)?;
    }
    if let Some(f) = &args.where_development {
        tri = tri.filter_development(f.operator, &f.value)?;
    }
    if let Some(f) = &args.where_valuation {
        tri = tri.filter_valuation(f.operator, &f.value)?;
    }
    Ok(tri)
}

/// Engine failures surface as the façade's taxonomy: a missing dataset is
/// `NotFound`, everything else the engine rejects is a transform failure.
pub(crate) fn engine_err(e: EngineError) -> Error {
    match e {
        EngineError::DatasetNotFound { name } => Error::not_found(name),
        other => Error::transform(other.to_string()),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use ladder_engine::{Engine, mem::MemEngine};

    #[test]
    fn loc_applies_clauses_in_declared_order() {
        let q = MemEngine::new().load_dataset("quarterly").unwrap();
        let args = LocArgs {
            index: Some(vec!["auto".into(), "home".into()]),
            where_index: Some(IndexFilter {
                key: "lob".into(),
                operator: Comparator::Eq,
                value: "auto".into(),
            }),
            where_origin: Some(AxisFilter {
                operator: Comparator::Ge,
                value: "1990-04-01".into(),
            }),
            ..LocArgs::default()
        };
        let out = Operation::Loc(args.clone()).apply(q).unwrap();
        assert_eq!(out.shape()[0], 1);
        assert_eq!(out.shape()[2], 3);

        // same result as applying the clauses one at a time, in order
        let q = MemEngine::new().load_dataset("quarterly").unwrap();
        let stepwise = Operation::Loc(LocArgs {
            index: args.index,
            ..LocArgs::default()
        })
        .apply(q)
        .and_then(|t| {
            Operation::Loc(LocArgs {
                where_index: args.where_index,
                ..LocArgs::default()
            })
            .apply(t)
        })
        .and_then(|t| {
            Operation::Loc(LocArgs {
                where_origin: args.where_origin,
                ..LocArgs::default()
            })
            .apply(t)
        })
        .unwrap();
        assert_eq!(
            stepwise.to_payload().unwrap(),
            out.to_payload().unwrap()
        );
    }

    #[test]
    fn copy_is_identity() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let before = raa.to_payload().unwrap();
        let after = Operation::Copy.apply(raa).unwrap();
        assert_eq!(after.to_payload().unwrap(), before);
    }

    #[test]
    fn transform_failures_map_to_the_taxonomy() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let err = Operation::GroupBy(GroupByArgs {
            by: vec!["state".into()],
            aggregation: Aggregation::Sum,
        })
        .apply(raa)
        .err()
        .unwrap();
        assert!(matches!(err, Error::Transform { .. }));
    }
}
