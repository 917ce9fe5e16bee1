//! GraphQL query resolvers.

use async_graphql::{Context, Object, Result};

use crate::{
    error::{from_service, gql_err},
    schema::service,
    types::TriangleSummary,
};

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 200;

/// Root query type.
#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Fetch one stored triangle by name, or null when absent.
    async fn triangle(&self, ctx: &Context<'_>, name: String) -> Result<Option<TriangleSummary>> {
        let svc = service(ctx)?;
        match svc.get(&name).await {
            Ok(artifact) => {
                let tri = svc.revive(&artifact).map_err(gql_err)?;
                Ok(Some(TriangleSummary::project(&artifact, tri.as_ref())))
            },
            Err(ladder_common::Error::NotFound { .. }) => Ok(None),
            Err(err) => Err(gql_err(err)),
        }
    }

    /// Page through stored triangles, ordered by name.
    async fn triangles(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<TriangleSummary>> {
        let svc = service(ctx)?;
        let limit = limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
        let offset = offset.unwrap_or(0).max(0);
        let artifacts = from_service(svc.list(limit, offset).await)?;
        let mut out = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            let tri = svc.revive(artifact).map_err(gql_err)?;
            out.push(TriangleSummary::project(artifact, tri.as_ref()));
        }
        Ok(out)
    }
}
