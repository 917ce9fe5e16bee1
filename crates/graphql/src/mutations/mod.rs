//! GraphQL mutation resolvers.
//!
//! One typed mutation per registered operation, plus `applyChain` for raw
//! client-assembled chains. Every transform mutation takes the artifact
//! `name` and an optional `assignTo` destination; with `assignTo` the
//! result lands under the destination name and the source stays untouched.

use async_graphql::{Context, Object, Result};

use {
    chrono::NaiveDate,
    ladder_ops::{GrainArgs, GroupByArgs, LocArgs, Operation, TrendArgs, parse_chain},
};

use crate::{
    error::{from_service, gql_err},
    schema::service,
    types::{
        AggregationInput, AxisFilterInput, BoolResult, ChainStepInput, IndexFilterInput,
        TrendAxisInput, TriangleSummary,
    },
};

/// Root mutation type.
#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Load a bundled sample dataset and store it under its own name.
    async fn load_dataset(&self, ctx: &Context<'_>, name: String) -> Result<TriangleSummary> {
        let svc = service(ctx)?;
        let artifact = from_service(svc.load_dataset(&name).await)?;
        let tri = svc.revive(&artifact).map_err(gql_err)?;
        Ok(TriangleSummary::project(&artifact, tri.as_ref()))
    }

    /// Delete a stored triangle.
    async fn delete_triangle(&self, ctx: &Context<'_>, name: String) -> Result<BoolResult> {
        let svc = service(ctx)?;
        from_service(svc.delete(&name).await)?;
        Ok(BoolResult { ok: true })
    }

    /// Copy a triangle's payload under a new name. The source stays; an
    /// existing destination is overwritten.
    async fn rename_triangle(
        &self,
        ctx: &Context<'_>,
        name: String,
        new_name: String,
    ) -> Result<TriangleSummary> {
        let svc = service(ctx)?;
        let artifact = from_service(svc.rename(&name, &new_name).await)?;
        let tri = svc.revive(&artifact).map_err(gql_err)?;
        Ok(TriangleSummary::project(&artifact, tri.as_ref()))
    }

    /// Apply a raw ordered chain of `(op, args)` steps.
    async fn apply_chain(
        &self,
        ctx: &Context<'_>,
        name: String,
        chain: Vec<ChainStepInput>,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        let steps: Vec<(String, Option<String>)> =
            chain.into_iter().map(|s| (s.op, s.args)).collect();
        let ops = parse_chain(&steps).map_err(gql_err)?;
        run(ctx, &name, ops, assign_to).await
    }

    /// Change origin/development grain, e.g. `"OQDQ"` or a bare `"Y"`.
    async fn grain(
        &self,
        ctx: &Context<'_>,
        name: String,
        grain: String,
        trailing: Option<bool>,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        let op = Operation::Grain(GrainArgs {
            grain,
            trailing: trailing.unwrap_or(false),
        });
        run(ctx, &name, vec![op], assign_to).await
    }

    /// Re-index a valuation triangle onto development ages.
    async fn val_to_dev(
        &self,
        ctx: &Context<'_>,
        name: String,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        run(ctx, &name, vec![Operation::ValToDev], assign_to).await
    }

    /// Re-index a development triangle onto valuation dates.
    async fn dev_to_val(
        &self,
        ctx: &Context<'_>,
        name: String,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        run(ctx, &name, vec![Operation::DevToVal], assign_to).await
    }

    /// Convert incremental values to cumulative.
    async fn incr_to_cum(
        &self,
        ctx: &Context<'_>,
        name: String,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        run(ctx, &name, vec![Operation::IncrToCum], assign_to).await
    }

    /// Convert cumulative values to incremental.
    async fn cum_to_incr(
        &self,
        ctx: &Context<'_>,
        name: String,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        run(ctx, &name, vec![Operation::CumToIncr], assign_to).await
    }

    /// Keep each origin period's most recent populated cell.
    async fn latest_diagonal(
        &self,
        ctx: &Context<'_>,
        name: String,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        run(ctx, &name, vec![Operation::LatestDiagonal], assign_to).await
    }

    /// Age-to-age factors of a cumulative triangle.
    async fn link_ratio(
        &self,
        ctx: &Context<'_>,
        name: String,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        run(ctx, &name, vec![Operation::LinkRatio], assign_to).await
    }

    /// Apply an annual trend rate along the origin or valuation axis.
    #[allow(clippy::too_many_arguments)]
    async fn trend(
        &self,
        ctx: &Context<'_>,
        name: String,
        trend: f64,
        axis: Option<TrendAxisInput>,
        valuation_date: Option<String>,
        ultimate_lag: Option<i32>,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        let valuation_date = valuation_date
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                    gql_err(ladder_common::Error::invalid_argument(format!(
                        "valuationDate expects YYYY-MM-DD, got '{s}'"
                    )))
                })
            })
            .transpose()?;
        let op = Operation::Trend(TrendArgs {
            trend,
            axis: axis.map(Into::into),
            valuation_date,
            ultimate_lag,
        });
        run(ctx, &name, vec![op], assign_to).await
    }

    /// Reduce index rows sharing the named key columns.
    async fn group_by(
        &self,
        ctx: &Context<'_>,
        name: String,
        by: Vec<String>,
        aggregation: Option<AggregationInput>,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        let op = Operation::GroupBy(GroupByArgs {
            by,
            aggregation: aggregation
                .map(Into::into)
                .unwrap_or(ladder_engine::Aggregation::Sum),
        });
        run(ctx, &name, vec![op], assign_to).await
    }

    /// Select and filter along the index, column, and coordinate axes.
    /// Clauses apply in a fixed order: index selection, index filter,
    /// column selection, then origin, development, and valuation filters.
    #[allow(clippy::too_many_arguments)]
    async fn loc(
        &self,
        ctx: &Context<'_>,
        name: String,
        index: Option<Vec<String>>,
        where_index: Option<IndexFilterInput>,
        columns: Option<Vec<String>>,
        where_origin: Option<AxisFilterInput>,
        where_development: Option<AxisFilterInput>,
        where_valuation: Option<AxisFilterInput>,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        let op = Operation::Loc(LocArgs {
            index,
            where_index: where_index.map(Into::into),
            columns,
            where_origin: where_origin.map(Into::into),
            where_development: where_development.map(Into::into),
            where_valuation: where_valuation.map(Into::into),
        });
        run(ctx, &name, vec![op], assign_to).await
    }

    /// Drop origin rows and development columns holding no data at all.
    async fn drop_na(
        &self,
        ctx: &Context<'_>,
        name: String,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        run(ctx, &name, vec![Operation::DropNa], assign_to).await
    }

    /// Write the triangle unchanged, usually with `assignTo` to duplicate
    /// it under a new name.
    async fn copy_triangle(
        &self,
        ctx: &Context<'_>,
        name: String,
        assign_to: Option<String>,
    ) -> Result<TriangleSummary> {
        run(ctx, &name, vec![Operation::Copy], assign_to).await
    }
}

/// Apply `ops` to `name` via the service and project the result.
async fn run(
    ctx: &Context<'_>,
    name: &str,
    ops: Vec<Operation>,
    assign_to: Option<String>,
) -> Result<TriangleSummary> {
    let svc = service(ctx)?;
    let artifact = from_service(svc.apply_chain(name, &ops, assign_to.as_deref()).await)?;
    let tri = svc.revive(&artifact).map_err(gql_err)?;
    Ok(TriangleSummary::project(&artifact, tri.as_ref()))
}
