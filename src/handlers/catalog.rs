// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, json::AppJson},
    models::catalog::{CostCenter, Employee, NewCostCenter, NewEmployee, NewTool, Tool, ToolStatus},
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("not_negative".into());
        return Err(err);
    }
    Ok(())
}

// Um nome só de espaços conta como vazio.
fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("length");
        err.message = Some("name_required".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateToolPayload {
    #[serde(rename = "nome")]
    #[validate(custom(function = "validate_not_blank"), length(max = 100, message = "name_too_long"))]
    #[schema(example = "Martelo")]
    pub name: String,

    #[serde(rename = "marca", default)]
    #[schema(example = "Bosch")]
    pub brand: String,

    #[serde(rename = "categoria", default)]
    #[schema(example = "Ferramentas Manuais")]
    pub category: String,

    #[serde(rename = "valor", default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 99.99)]
    pub value: Decimal,

    #[serde(default)]
    pub status: ToolStatus,

    #[serde(rename = "descricao", default)]
    pub description: String,

    #[serde(rename = "ativo")]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCostCenterPayload {
    #[serde(rename = "nome")]
    #[validate(custom(function = "validate_not_blank"), length(max = 100, message = "name_too_long"))]
    #[schema(example = "Financeiro")]
    pub name: String,

    #[serde(rename = "valor", default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 1500.50)]
    pub value: Decimal,

    #[serde(rename = "atividade")]
    pub activity: Option<String>,

    #[serde(rename = "tipoDeUnidade")]
    pub unit_type: Option<String>,

    #[serde(rename = "empresaId")]
    #[validate(required(message = "required"), range(min = 1, message = "positive_id"))]
    #[schema(example = 1)]
    pub company_id: Option<i32>,

    #[serde(rename = "ativo")]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmployeePayload {
    #[serde(rename = "nome")]
    #[validate(custom(function = "validate_not_blank"), length(max = 100, message = "name_too_long"))]
    #[schema(example = "João Silva")]
    pub name: String,

    #[serde(rename = "ativo")]
    pub active: Option<bool>,
}

// =========================================================================
//  FERRAMENTAS
// =========================================================================

// POST /api/ferramentas
#[utoipa::path(
    post,
    path = "/api/ferramentas",
    tag = "Catálogo",
    request_body = CreateToolPayload,
    responses(
        (status = 201, description = "Ferramenta cadastrada", body = Tool),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_tool(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateToolPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tool = app_state
        .catalog_service
        .create_tool(NewTool {
            name: payload.name.trim().to_string(),
            brand: payload.brand,
            category: payload.category,
            value: payload.value,
            status: payload.status,
            description: payload.description,
            active: payload.active.unwrap_or(true),
        })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tool)))
}

// GET /api/ferramentas
#[utoipa::path(
    get,
    path = "/api/ferramentas",
    tag = "Catálogo",
    responses((status = 200, description = "Ferramentas por nome", body = [Tool]))
)]
pub async fn list_tools(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let tools = app_state
        .catalog_service
        .list_tools()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tools)))
}

// GET /api/ferramentas/{id}
#[utoipa::path(
    get,
    path = "/api/ferramentas/{id}",
    tag = "Catálogo",
    params(("id" = i32, Path, description = "ID da ferramenta")),
    responses(
        (status = 200, description = "Ferramenta", body = Tool),
        (status = 404, description = "Ferramenta não encontrada")
    )
)]
pub async fn get_tool(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let tool = app_state
        .catalog_service
        .get_tool(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tool)))
}

// DELETE /api/ferramentas/{id}
#[utoipa::path(
    delete,
    path = "/api/ferramentas/{id}",
    tag = "Catálogo",
    params(("id" = i32, Path, description = "ID da ferramenta")),
    responses(
        (status = 204, description = "Ferramenta desativada"),
        (status = 404, description = "Ferramenta não encontrada")
    )
)]
pub async fn delete_tool(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .deactivate_tool(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
//  CENTROS DE CUSTO
// =========================================================================

// POST /api/centros-custo
#[utoipa::path(
    post,
    path = "/api/centros-custo",
    tag = "Catálogo",
    request_body = CreateCostCenterPayload,
    responses(
        (status = 201, description = "Centro de custo cadastrado", body = CostCenter),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_cost_center(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateCostCenterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    // validate() já garantiu o required
    let company_id = payload.company_id.unwrap_or_default();

    let cost_center = app_state
        .catalog_service
        .create_cost_center(NewCostCenter {
            name: payload.name.trim().to_string(),
            value: payload.value,
            activity: payload.activity,
            unit_type: payload.unit_type,
            company_id,
            active: payload.active.unwrap_or(true),
        })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(cost_center)))
}

// GET /api/centros-custo
#[utoipa::path(
    get,
    path = "/api/centros-custo",
    tag = "Catálogo",
    responses((status = 200, description = "Centros de custo por nome", body = [CostCenter]))
)]
pub async fn list_cost_centers(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let cost_centers = app_state
        .catalog_service
        .list_cost_centers()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(cost_centers)))
}

// GET /api/centros-custo/{id}
#[utoipa::path(
    get,
    path = "/api/centros-custo/{id}",
    tag = "Catálogo",
    params(("id" = i32, Path, description = "ID do centro de custo")),
    responses(
        (status = 200, description = "Centro de custo", body = CostCenter),
        (status = 404, description = "Centro de custo não encontrado")
    )
)]
pub async fn get_cost_center(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let cost_center = app_state
        .catalog_service
        .get_cost_center(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(cost_center)))
}

// DELETE /api/centros-custo/{id}
#[utoipa::path(
    delete,
    path = "/api/centros-custo/{id}",
    tag = "Catálogo",
    params(("id" = i32, Path, description = "ID do centro de custo")),
    responses(
        (status = 204, description = "Centro de custo desativado"),
        (status = 404, description = "Centro de custo não encontrado")
    )
)]
pub async fn delete_cost_center(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .deactivate_cost_center(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
//  FUNCIONÁRIOS
// =========================================================================

// POST /api/funcionarios
#[utoipa::path(
    post,
    path = "/api/funcionarios",
    tag = "Catálogo",
    request_body = CreateEmployeePayload,
    responses(
        (status = 201, description = "Funcionário cadastrado", body = Employee),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateEmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let employee = app_state
        .catalog_service
        .create_employee(NewEmployee {
            name: payload.name.trim().to_string(),
            active: payload.active.unwrap_or(true),
        })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(employee)))
}

// GET /api/funcionarios
#[utoipa::path(
    get,
    path = "/api/funcionarios",
    tag = "Catálogo",
    responses((status = 200, description = "Funcionários por nome", body = [Employee]))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let employees = app_state
        .catalog_service
        .list_employees()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(employees)))
}

// GET /api/funcionarios/{id}
#[utoipa::path(
    get,
    path = "/api/funcionarios/{id}",
    tag = "Catálogo",
    params(("id" = i32, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Funcionário", body = Employee),
        (status = 404, description = "Funcionário não encontrado")
    )
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let employee = app_state
        .catalog_service
        .get_employee(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(employee)))
}

// DELETE /api/funcionarios/{id}
#[utoipa::path(
    delete,
    path = "/api/funcionarios/{id}",
    tag = "Catálogo",
    params(("id" = i32, Path, description = "ID do funcionário")),
    responses(
        (status = 204, description = "Funcionário desativado"),
        (status = 404, description = "Funcionário não encontrado")
    )
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .deactivate_employee(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_value_is_rejected() {
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
    }

    #[test]
    fn blank_and_long_names_are_rejected() {
        let blank: CreateEmployeePayload = serde_json::from_str(r#"{"nome": "   "}"#).unwrap();
        assert!(blank.validate().is_err());

        let long = CreateEmployeePayload { name: "x".repeat(101), active: None };
        assert!(long.validate().is_err());
    }

    #[test]
    fn cost_center_needs_a_company() {
        let payload: CreateCostCenterPayload =
            serde_json::from_str(r#"{"nome": "Obra", "valor": 10.5}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors
            .field_errors()
            .keys()
            .any(|k| k.to_string() == "empresaId" || k.to_string() == "company_id"));
    }
}
