//! Integration tests for the ladder-graphql crate.
//!
//! Each test builds a real schema over the in-memory engine and store and
//! executes GraphQL documents end to end.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use {
    ladder_engine::mem::MemEngine,
    ladder_graphql::{LadderSchema, build_schema},
    ladder_ops::TriangleService,
    ladder_store::MemoryStore,
    serde_json::Value,
};

fn schema_and_service() -> (LadderSchema, Arc<TriangleService>) {
    let service = Arc::new(TriangleService::new(
        Arc::new(MemEngine::new()),
        Arc::new(MemoryStore::new()),
    ));
    (build_schema(service.clone()), service)
}

async fn execute(schema: &LadderSchema, query: &str) -> async_graphql::Response {
    schema.execute(query).await
}

fn data(resp: &async_graphql::Response) -> Value {
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    serde_json::to_value(&resp.data).unwrap()
}

fn error_kind(resp: &async_graphql::Response) -> String {
    assert!(!resp.errors.is_empty(), "expected an error");
    format!("{:?}", resp.errors[0].extensions)
}

#[tokio::test]
async fn load_dataset_persists_and_projects() {
    let (schema, svc) = schema_and_service();
    let resp = execute(
        &schema,
        r#"mutation {
            loadDataset(name: "raa") {
                name shape originGrain isCumulative isValTri origin
            }
        }"#,
    )
    .await;
    let d = data(&resp);
    assert_eq!(d["loadDataset"]["name"], "raa");
    assert_eq!(d["loadDataset"]["shape"], serde_json::json!([1, 1, 10, 10]));
    assert_eq!(d["loadDataset"]["originGrain"], "Y");
    assert_eq!(d["loadDataset"]["isCumulative"], true);
    assert_eq!(d["loadDataset"]["isValTri"], false);
    assert_eq!(d["loadDataset"]["origin"][0], "1981");

    assert!(svc.get("raa").await.is_ok());
}

#[tokio::test]
async fn load_unknown_dataset_is_not_found() {
    let (schema, _svc) = schema_and_service();
    let resp = execute(&schema, r#"mutation { loadDataset(name: "genins") { name } }"#).await;
    assert!(error_kind(&resp).contains("NOT_FOUND"));
}

#[tokio::test]
async fn triangle_query_returns_null_when_absent() {
    let (schema, _svc) = schema_and_service();
    let resp = execute(&schema, r#"{ triangle(name: "raa") { name } }"#).await;
    assert_eq!(data(&resp)["triangle"], Value::Null);
}

#[tokio::test]
async fn triangle_query_projects_values_grid() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("raa").await.unwrap();
    let resp = execute(
        &schema,
        r#"{ triangle(name: "raa") { name values developmentGrain valuationDate } }"#,
    )
    .await;
    let d = data(&resp);
    assert_eq!(d["triangle"]["valuationDate"], "1990-12-31");
    assert_eq!(d["triangle"]["values"][0][0][0][0], 5012.0);
    assert_eq!(d["triangle"]["values"][0][0][9][1], Value::Null);
}

#[tokio::test]
async fn triangles_query_pages_by_name() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("raa").await.unwrap();
    svc.load_dataset("quarterly").await.unwrap();
    let resp = execute(&schema, r#"{ triangles(limit: 1) { name } }"#).await;
    let d = data(&resp);
    assert_eq!(d["triangles"][0]["name"], "quarterly");
    assert_eq!(d["triangles"].as_array().unwrap().len(), 1);

    let resp = execute(&schema, r#"{ triangles(limit: 1, offset: 1) { name } }"#).await;
    assert_eq!(data(&resp)["triangles"][0]["name"], "raa");
}

#[tokio::test]
async fn apply_chain_round_trips_conversion_pair() {
    let (schema, svc) = schema_and_service();
    let before = svc.load_dataset("raa").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation {
            applyChain(name: "raa", chain: [{op: "cumToIncr"}, {op: "incrToCum"}]) {
                name isCumulative
            }
        }"#,
    )
    .await;
    assert_eq!(data(&resp)["applyChain"]["isCumulative"], true);
    assert_eq!(svc.get("raa").await.unwrap().payload, before.payload);
}

#[tokio::test]
async fn apply_chain_bad_method_is_invalid_argument() {
    let (schema, svc) = schema_and_service();
    let before = svc.load_dataset("raa").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation { applyChain(name: "raa", chain: [{op: "badMethod"}]) { name } }"#,
    )
    .await;
    assert!(error_kind(&resp).contains("INVALID_ARGUMENT"));
    // the stored artifact is byte-identical to its pre-call state
    assert_eq!(svc.get("raa").await.unwrap(), before);
}

#[tokio::test]
async fn apply_chain_rejects_malformed_json_args() {
    let (schema, svc) = schema_and_service();
    let before = svc.load_dataset("raa").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation {
            applyChain(name: "raa", chain: [{op: "grain", args: "{\"grain\": "}]) { name }
        }"#,
    )
    .await;
    assert!(error_kind(&resp).contains("INVALID_ARGUMENT"));
    assert_eq!(svc.get("raa").await.unwrap(), before);
}

#[tokio::test]
async fn apply_chain_with_assign_to_leaves_source_untouched() {
    let (schema, svc) = schema_and_service();
    let before = svc.load_dataset("quarterly").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation {
            applyChain(
                name: "quarterly",
                chain: [{op: "grain", args: "{\"grain\": \"OYDY\"}"}],
                assignTo: "quarterly_y"
            ) { name originGrain shape }
        }"#,
    )
    .await;
    let d = data(&resp);
    assert_eq!(d["applyChain"]["name"], "quarterly_y");
    assert_eq!(d["applyChain"]["originGrain"], "Y");
    assert_eq!(svc.get("quarterly").await.unwrap().payload, before.payload);
    assert!(svc.get("quarterly_y").await.is_ok());
}

#[tokio::test]
async fn delete_triangle_missing_is_not_found() {
    let (schema, _svc) = schema_and_service();
    let resp = execute(
        &schema,
        r#"mutation { deleteTriangle(name: "nonexistent") { ok } }"#,
    )
    .await;
    assert!(error_kind(&resp).contains("NOT_FOUND"));
}

#[tokio::test]
async fn delete_triangle_removes_the_artifact() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("raa").await.unwrap();
    let resp = execute(&schema, r#"mutation { deleteTriangle(name: "raa") { ok } }"#).await;
    assert_eq!(data(&resp)["deleteTriangle"]["ok"], true);
    assert!(svc.get("raa").await.is_err());
}

#[tokio::test]
async fn typed_grain_mutation_with_assign_to() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("quarterly").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation {
            grain(name: "quarterly", grain: "OYDY", assignTo: "quarterly_y") {
                name originGrain developmentGrain
            }
        }"#,
    )
    .await;
    let d = data(&resp);
    assert_eq!(d["grain"]["name"], "quarterly_y");
    assert_eq!(d["grain"]["originGrain"], "Y");
    assert_eq!(d["grain"]["developmentGrain"], "Y");
}

#[tokio::test]
async fn typed_mutations_compose_with_queries() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("raa").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation { latestDiagonal(name: "raa", assignTo: "raa_diag") { shape isValTri } }"#,
    )
    .await;
    let d = data(&resp);
    assert_eq!(d["latestDiagonal"]["shape"], serde_json::json!([1, 1, 10, 1]));
    assert_eq!(d["latestDiagonal"]["isValTri"], true);

    let resp = execute(&schema, r#"{ triangle(name: "raa_diag") { values } }"#).await;
    assert_eq!(data(&resp)["triangle"]["values"][0][0][0][0], 18834.0);
}

#[tokio::test]
async fn loc_mutation_filters_in_declared_order() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("quarterly").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation {
            loc(
                name: "quarterly",
                whereIndex: {key: "lob", operator: EQ, value: "auto"},
                whereOrigin: {operator: GE, value: "1990-04-01"},
                assignTo: "auto_late"
            ) { shape index origin }
        }"#,
    )
    .await;
    let d = data(&resp);
    assert_eq!(d["loc"]["shape"], serde_json::json!([1, 1, 3, 4]));
    assert_eq!(d["loc"]["index"], serde_json::json!([["auto"]]));
    assert_eq!(d["loc"]["origin"][0], "1990Q2");
}

#[tokio::test]
async fn group_by_mutation_reduces_index() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("quarterly").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation {
            groupBy(name: "quarterly", by: ["lob"], aggregation: SUM) { keyLabels shape }
        }"#,
    )
    .await;
    let d = data(&resp);
    assert_eq!(d["groupBy"]["keyLabels"], serde_json::json!(["lob"]));
}

#[tokio::test]
async fn trend_mutation_rejects_bad_date() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("raa").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation {
            trend(name: "raa", trend: 0.05, axis: VALUATION, valuationDate: "soon") { name }
        }"#,
    )
    .await;
    assert!(error_kind(&resp).contains("INVALID_ARGUMENT"));
}

#[tokio::test]
async fn rename_triangle_copies_and_keeps_source() {
    let (schema, svc) = schema_and_service();
    svc.load_dataset("raa").await.unwrap();
    let resp = execute(
        &schema,
        r#"mutation { renameTriangle(name: "raa", newName: "raa_backup") { name } }"#,
    )
    .await;
    assert_eq!(data(&resp)["renameTriangle"]["name"], "raa_backup");
    assert!(svc.get("raa").await.is_ok());
    assert!(svc.get("raa_backup").await.is_ok());
}

#[tokio::test]
async fn grain_failure_does_not_commit() {
    let (schema, svc) = schema_and_service();
    let before = svc.load_dataset("raa").await.unwrap();
    // yearly to quarterly is a refinement, which the engine rejects
    let resp = execute(
        &schema,
        r#"mutation { grain(name: "raa", grain: "OQDQ") { name } }"#,
    )
    .await;
    assert!(error_kind(&resp).contains("TRANSFORM_FAILURE"));
    assert_eq!(svc.get("raa").await.unwrap(), before);
}
