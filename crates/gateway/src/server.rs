//! Router construction and server startup.

use std::sync::Arc;

use {
    async_graphql::http::GraphiQLSource,
    async_graphql_axum::{GraphQLRequest, GraphQLResponse},
    axum::{
        Json, Router,
        extract::State,
        response::{Html, IntoResponse},
        routing::get,
    },
    tracing::info,
};

use {
    ladder_engine::mem::MemEngine,
    ladder_graphql::{LadderSchema, build_schema},
    ladder_ops::TriangleService,
    ladder_store::SqliteStore,
};

use crate::{config::ServerConfig, error::Result};

/// Build the triangle service over a SQLite store at the configured URL.
pub async fn build_service(config: &ServerConfig) -> Result<Arc<TriangleService>> {
    let store = SqliteStore::new(&config.database_url).await?;
    Ok(Arc::new(TriangleService::new(
        Arc::new(MemEngine::new()),
        Arc::new(store),
    )))
}

/// The gateway router: GraphiQL + query execution on `/graphql`,
/// liveness on `/healthz`.
pub fn router(schema: LadderSchema) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/healthz", get(healthz))
        .with_state(schema)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &ServerConfig, service: Arc<TriangleService>) -> Result<()> {
    let schema = build_schema(service);
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "gateway listening");
    axum::serve(listener, router(schema)).await?;
    Ok(())
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn graphql_handler(State(schema): State<LadderSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
