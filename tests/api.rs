// tests/api.rs

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{seed_cost_center, seed_employee, seed_tool, tool_status};
use rateio::{config::AppState, db::memory::MemoryDatabase, models::catalog::ToolStatus, routes};

async fn app_with_catalog() -> (Router, MemoryDatabase) {
    let db = MemoryDatabase::new();
    seed_tool(&db, "Furadeira").await;
    seed_cost_center(&db, "Obra Centro").await;
    seed_employee(&db, "João Silva").await;
    (routes::app(AppState::from_memory(db.clone())), db)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn allocation_body(start: &str, planned: Option<&str>) -> Value {
    let mut body = json!({
        "ferramentaId": 1,
        "centroCustoId": 1,
        "funcionarioId": 1,
        "dataInicio": start,
    });
    if let Some(planned) = planned {
        body["dataPrevisaoDesalocacao"] = json!(planned);
    }
    body
}

#[tokio::test]
async fn health_check() {
    let (app, _) = app_with_catalog().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn allocation_lifecycle_over_http() {
    let (app, db) = app_with_catalog().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/alocacoes",
        Some(allocation_body("2025-01-01", Some("2025-06-30"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ativo"], json!(true));
    assert_eq!(created["dataInicio"], json!("2025-01-01"));
    assert_eq!(tool_status(&db, 1).await, ToolStatus::Allocated);

    let (status, conflict) = send(
        &app,
        Method::POST,
        "/api/alocacoes",
        Some(allocation_body("2025-03-01", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(conflict["error"].as_str().unwrap().contains("2025-06-30"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/alocacoes",
        Some(allocation_body("2025-07-01", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_i64().unwrap();
    let (status, detail) = send(&app, Method::GET, &format!("/api/alocacoes/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["ferramenta"]["nome"], json!("Furadeira"));
    assert_eq!(detail["funcionario"]["id"], json!(1));

    let (status, _) = send(&app, Method::DELETE, &format!("/api/alocacoes/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, Method::GET, "/api/alocacoes", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, with_closed) = send(&app, Method::GET, "/api/alocacoes?ativo=false", None).await;
    assert_eq!(with_closed.as_array().unwrap().len(), 1);
    assert_eq!(with_closed[0]["id"], json!(id));
}

#[tokio::test]
async fn end_before_start_is_bad_request() {
    let (app, _) = app_with_catalog().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/alocacoes",
        Some(allocation_body("2025-06-30", Some("2025-01-01"))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_tool_is_not_found_with_entity_and_id() {
    let (app, _) = app_with_catalog().await;
    let mut body = allocation_body("2025-01-01", None);
    body["ferramentaId"] = json!(999);

    let (status, body) = send(&app, Method::POST, "/api/alocacoes", Some(body)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Ferramenta"));
    assert!(message.contains("999"));
}

#[tokio::test]
async fn malformed_dates_come_back_with_field_details() {
    let (app, _) = app_with_catalog().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/alocacoes",
        Some(allocation_body("01/01/2025", None)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].is_object());
    assert!(!body["details"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn wrongly_typed_body_is_a_localized_bad_request() {
    let (app, db) = app_with_catalog().await;
    let mut body = allocation_body("2025-01-01", None);
    body["ferramentaId"] = json!("abc");

    let (status, body) = send(&app, Method::POST, "/api/alocacoes", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("JSON"));
    assert!(body["details"]["body"].is_array());
    assert_eq!(tool_status(&db, 1).await, ToolStatus::Available);

    // Mesmo tratamento no corpo opcional da desalocação.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/alocacoes/1/desalocar",
        Some(json!({ "dataDesalocacao": 20250101 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn errors_follow_accept_language() {
    let (app, _) = app_with_catalog().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/alocacoes/321")
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn patch_and_deallocate() {
    let (app, db) = app_with_catalog().await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/alocacoes",
        Some(allocation_body("2025-01-01", Some("2025-06-30"))),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, patched) = send(
        &app,
        Method::PATCH,
        &format!("/api/alocacoes/{}", id),
        Some(json!({ "observacoes": "obra prorrogada", "dataPrevisaoDesalocacao": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["observacoes"], json!("obra prorrogada"));
    assert_eq!(patched["dataPrevisaoDesalocacao"], Value::Null);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/alocacoes/{}/desalocar", id),
        Some(json!({ "dataDesalocacao": "2024-12-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, closed) = send(
        &app,
        Method::POST,
        &format!("/api/alocacoes/{}/desalocar", id),
        Some(json!({ "dataDesalocacao": "2025-05-20" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["ativo"], json!(false));
    assert_eq!(closed["dataDesalocacao"], json!("2025-05-20"));
    assert_eq!(tool_status(&db, 1).await, ToolStatus::Available);
}

#[tokio::test]
async fn period_and_relation_queries() {
    let (app, _) = app_with_catalog().await;
    send(
        &app,
        Method::POST,
        "/api/alocacoes",
        Some(allocation_body("2025-01-01", Some("2025-01-31"))),
    )
    .await;

    let (status, in_range) =
        send(&app, Method::GET, "/api/alocacoes/periodo?inicio=2025-01-15&fim=2025-02-15", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(in_range.as_array().unwrap().len(), 1);

    let (status, _) =
        send(&app, Method::GET, "/api/alocacoes/periodo?inicio=2025-03-01&fim=2025-02-01", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, by_employee) = send(&app, Method::GET, "/api/alocacoes/funcionario/1", None).await;
    assert_eq!(by_employee.as_array().unwrap().len(), 1);

    let (_, by_tool) = send(&app, Method::GET, "/api/alocacoes/ferramenta/2", None).await;
    assert!(by_tool.as_array().unwrap().is_empty());

    let (_, by_cost_center) = send(&app, Method::GET, "/api/alocacoes/centro-custo/1", None).await;
    assert_eq!(by_cost_center.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn catalog_crud_over_http() {
    let (app, _) = app_with_catalog().await;

    let (status, tool) = send(
        &app,
        Method::POST,
        "/api/ferramentas",
        Some(json!({ "nome": "Serra Circular", "marca": "Makita", "valor": 899.9 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tool["status"], json!("disponivel"));
    assert_eq!(tool["ativo"], json!(true));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ferramentas",
        Some(json!({ "nome": "Serra", "valor": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, "/api/funcionarios/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Funcionário inativo não recebe alocação.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/alocacoes",
        Some(allocation_body("2025-01-01", None)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Funcionário"));

    let (status, _) = send(&app, Method::GET, "/api/centros-custo/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, cost_centers) = send(&app, Method::GET, "/api/centros-custo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cost_centers.as_array().unwrap().len(), 1);
}
