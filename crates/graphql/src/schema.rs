//! Schema construction and type alias.

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Schema};

use ladder_ops::TriangleService;

use crate::{mutations::MutationRoot, queries::QueryRoot};

/// The full ladder GraphQL schema type.
pub type LadderSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema over a triangle service.
///
/// The service is injected as schema data; every resolver reaches it via
/// [`service`]. There is no other shared state.
pub fn build_schema(service: Arc<TriangleService>) -> LadderSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}

/// The triangle service injected at schema build time.
pub(crate) fn service<'a>(
    ctx: &'a Context<'_>,
) -> async_graphql::Result<&'a Arc<TriangleService>> {
    ctx.data::<Arc<TriangleService>>()
}
