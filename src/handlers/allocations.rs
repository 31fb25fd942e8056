// src/handlers/allocations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, json::AppJson},
    models::allocation::{
        Allocation, AllocationChanges, AllocationDetail, AllocationFilter, DatePeriod,
        NewAllocation,
    },
};

// ---
// Validação Customizada
// ---

// Aceita só o formato estrito YYYY-MM-DD (sem hora, sem fuso).
pub(crate) fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-';
    if shape_ok && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return Ok(());
    }
    let mut err = ValidationError::new("date_format");
    err.message = Some("date_format".into());
    Err(err)
}

fn field_error(field: &'static str, code: &'static str) -> ValidationErrors {
    let mut err = ValidationError::new(code);
    err.message = Some(code.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    errors
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationErrors> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| field_error(field, "date_format"))
}

fn parse_optional_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationErrors> {
    value.map(|v| parse_date(field, v)).transpose()
}

// Distingue "campo ausente" (None) de "campo null" (Some(None)) no PATCH.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validation_error(errors: ValidationErrors, locale: &Locale, app_state: &AppState) -> ApiError {
    AppError::ValidationError(errors).to_api_error(locale, &app_state.i18n_store)
}

// ---
// Payload: CreateAllocation
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAllocationPayload {
    #[serde(rename = "ferramentaId")]
    #[validate(required(message = "required"), range(min = 1, message = "positive_id"))]
    #[schema(example = 1)]
    pub tool_id: Option<i32>,

    #[serde(rename = "centroCustoId")]
    #[validate(required(message = "required"), range(min = 1, message = "positive_id"))]
    #[schema(example = 1)]
    pub cost_center_id: Option<i32>,

    #[serde(rename = "funcionarioId")]
    #[validate(required(message = "required"), range(min = 1, message = "positive_id"))]
    #[schema(example = 1)]
    pub employee_id: Option<i32>,

    #[serde(rename = "dataInicio")]
    #[validate(required(message = "required"), custom(function = "validate_iso_date"))]
    #[schema(example = "2025-01-01")]
    pub start_date: Option<String>,

    #[serde(rename = "dataPrevisaoDesalocacao")]
    #[validate(custom(function = "validate_iso_date"))]
    #[schema(example = "2025-06-30")]
    pub planned_end_date: Option<String>,

    #[serde(rename = "observacoes")]
    #[validate(length(max = 500, message = "notes_too_long"))]
    pub notes: Option<String>,

    #[serde(rename = "ativo")]
    pub active: Option<bool>,
}

impl CreateAllocationPayload {
    // Chamado depois do validate(): os obrigatórios já estão presentes.
    fn into_new_allocation(self) -> Result<NewAllocation, ValidationErrors> {
        let tool_id = self.tool_id.ok_or_else(|| field_error("ferramentaId", "required"))?;
        let cost_center_id = self.cost_center_id.ok_or_else(|| field_error("centroCustoId", "required"))?;
        let employee_id = self.employee_id.ok_or_else(|| field_error("funcionarioId", "required"))?;
        let start_date = self
            .start_date
            .as_deref()
            .ok_or_else(|| field_error("dataInicio", "required"))
            .and_then(|v| parse_date("dataInicio", v))?;
        let planned_end_date = parse_optional_date("dataPrevisaoDesalocacao", self.planned_end_date.as_deref())?;

        Ok(NewAllocation {
            tool_id,
            cost_center_id,
            employee_id,
            start_date,
            planned_end_date,
            notes: self.notes,
            active: self.active.unwrap_or(true),
        })
    }
}

// ---
// Payload: UpdateAllocation (PATCH, todos os campos opcionais)
// ---
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAllocationPayload {
    #[serde(rename = "ferramentaId")]
    #[validate(range(min = 1, message = "positive_id"))]
    pub tool_id: Option<i32>,

    #[serde(rename = "centroCustoId")]
    #[validate(range(min = 1, message = "positive_id"))]
    pub cost_center_id: Option<i32>,

    #[serde(rename = "funcionarioId")]
    #[validate(range(min = 1, message = "positive_id"))]
    pub employee_id: Option<i32>,

    #[serde(rename = "dataInicio")]
    #[validate(custom(function = "validate_iso_date"))]
    pub start_date: Option<String>,

    #[serde(rename = "dataPrevisaoDesalocacao", default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub planned_end_date: Option<Option<String>>,

    #[serde(rename = "dataDesalocacao", default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub actual_end_date: Option<Option<String>>,

    #[serde(rename = "observacoes", default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,

    #[serde(rename = "ativo")]
    pub active: Option<bool>,
}

impl UpdateAllocationPayload {
    // Os campos anuláveis ficam fora do derive; validados aqui, campo a campo.
    fn validate_nullable_fields(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(Some(date)) = &self.planned_end_date {
            if let Err(e) = validate_iso_date(date) {
                errors.add("dataPrevisaoDesalocacao", e);
            }
        }
        if let Some(Some(date)) = &self.actual_end_date {
            if let Err(e) = validate_iso_date(date) {
                errors.add("dataDesalocacao", e);
            }
        }
        if let Some(Some(notes)) = &self.notes {
            if notes.chars().count() > 500 {
                let mut err = ValidationError::new("length");
                err.message = Some("notes_too_long".into());
                errors.add("observacoes", err);
            }
        }

        if errors.errors().is_empty() { Ok(()) } else { Err(errors) }
    }

    fn into_changes(self) -> Result<AllocationChanges, ValidationErrors> {
        let start_date = parse_optional_date("dataInicio", self.start_date.as_deref())?;
        let planned_end_date = self
            .planned_end_date
            .map(|v| parse_optional_date("dataPrevisaoDesalocacao", v.as_deref()))
            .transpose()?;
        let actual_end_date = self
            .actual_end_date
            .map(|v| parse_optional_date("dataDesalocacao", v.as_deref()))
            .transpose()?;

        Ok(AllocationChanges {
            tool_id: self.tool_id,
            cost_center_id: self.cost_center_id,
            employee_id: self.employee_id,
            start_date,
            planned_end_date,
            actual_end_date,
            notes: self.notes,
            active: self.active,
        })
    }
}

// ---
// Payload: Deallocate (corpo opcional)
// ---
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct DeallocatePayload {
    #[serde(rename = "dataDesalocacao")]
    #[validate(custom(function = "validate_iso_date"))]
    #[schema(example = "2025-06-30")]
    pub returned_on: Option<String>,
}

// ---
// Query strings
// ---
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AllocationQuery {
    #[serde(rename = "ferramentaId")]
    pub tool_id: Option<i32>,
    #[serde(rename = "centroCustoId")]
    pub cost_center_id: Option<i32>,
    #[serde(rename = "funcionarioId")]
    pub employee_id: Option<i32>,
    /// Padrão: só as ativas.
    #[serde(rename = "ativo")]
    pub active: Option<bool>,
    #[serde(rename = "dataInicio")]
    #[validate(custom(function = "validate_iso_date"))]
    pub start: Option<String>,
    #[serde(rename = "dataFim")]
    #[validate(custom(function = "validate_iso_date"))]
    pub end: Option<String>,
}

impl AllocationQuery {
    fn into_filter(self) -> Result<AllocationFilter, ValidationErrors> {
        let start = parse_optional_date("dataInicio", self.start.as_deref())?;
        let end = parse_optional_date("dataFim", self.end.as_deref())?;
        let period = (start.is_some() || end.is_some()).then_some(DatePeriod { start, end });

        Ok(AllocationFilter {
            tool_id: self.tool_id,
            cost_center_id: self.cost_center_id,
            employee_id: self.employee_id,
            active: Some(self.active.unwrap_or(true)),
            period,
        })
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    #[validate(required(message = "required"), custom(function = "validate_iso_date"))]
    pub inicio: Option<String>,
    #[validate(required(message = "required"), custom(function = "validate_iso_date"))]
    pub fim: Option<String>,
}

// =========================================================================
//  HANDLERS
// =========================================================================

// POST /api/alocacoes
#[utoipa::path(
    post,
    path = "/api/alocacoes",
    tag = "Alocações",
    request_body = CreateAllocationPayload,
    responses(
        (status = 201, description = "Alocação criada; ferramenta marcada como alocada", body = Allocation),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Ferramenta, centro de custo ou funcionário inexistente/inativo"),
        (status = 409, description = "Período conflita com outra alocação ativa")
    )
)]
pub async fn create_allocation(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateAllocationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let request = payload
        .into_new_allocation()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let allocation = app_state
        .allocation_manager
        .create(request)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(allocation)))
}

// GET /api/alocacoes
#[utoipa::path(
    get,
    path = "/api/alocacoes",
    tag = "Alocações",
    params(AllocationQuery),
    responses(
        (status = 200, description = "Alocações (mais recentes primeiro)", body = [AllocationDetail]),
        (status = 400, description = "Filtro de datas inválido")
    )
)]
pub async fn list_allocations(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<AllocationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query
        .validate()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let filter = query
        .into_filter()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let allocations = app_state
        .allocation_manager
        .find_all(&filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(allocations)))
}

// GET /api/alocacoes/{id}
#[utoipa::path(
    get,
    path = "/api/alocacoes/{id}",
    tag = "Alocações",
    params(("id" = i32, Path, description = "ID da alocação")),
    responses(
        (status = 200, description = "Alocação com as referências", body = AllocationDetail),
        (status = 404, description = "Alocação não encontrada")
    )
)]
pub async fn get_allocation(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let allocation = app_state
        .allocation_manager
        .find_one(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(allocation)))
}

// PATCH /api/alocacoes/{id}
#[utoipa::path(
    patch,
    path = "/api/alocacoes/{id}",
    tag = "Alocações",
    request_body = UpdateAllocationPayload,
    params(("id" = i32, Path, description = "ID da alocação")),
    responses(
        (status = 200, description = "Alocação atualizada", body = Allocation),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Alocação ou referência não encontrada"),
        (status = 409, description = "Período conflita com outra alocação ativa")
    )
)]
pub async fn update_allocation(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateAllocationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    payload
        .validate_nullable_fields()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let changes = payload
        .into_changes()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let allocation = app_state
        .allocation_manager
        .update(id, changes)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(allocation)))
}

// DELETE /api/alocacoes/{id}
#[utoipa::path(
    delete,
    path = "/api/alocacoes/{id}",
    tag = "Alocações",
    params(("id" = i32, Path, description = "ID da alocação")),
    responses(
        (status = 204, description = "Alocação encerrada (soft delete)"),
        (status = 404, description = "Alocação não encontrada")
    )
)]
pub async fn delete_allocation(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .allocation_manager
        .remove(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/alocacoes/{id}/desalocar
#[utoipa::path(
    post,
    path = "/api/alocacoes/{id}/desalocar",
    tag = "Alocações",
    request_body(content = DeallocatePayload, description = "Data de devolução (padrão: hoje)"),
    params(("id" = i32, Path, description = "ID da alocação")),
    responses(
        (status = 200, description = "Alocação encerrada", body = Allocation),
        (status = 400, description = "Data inválida"),
        (status = 404, description = "Alocação não encontrada")
    )
)]
pub async fn deallocate(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
    payload: Option<AppJson<DeallocatePayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|AppJson(p)| p).unwrap_or_default();

    payload
        .validate()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let returned_on = parse_optional_date("dataDesalocacao", payload.returned_on.as_deref())
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let allocation = app_state
        .allocation_manager
        .deallocate(id, returned_on)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(allocation)))
}

// GET /api/alocacoes/funcionario/{id}
#[utoipa::path(
    get,
    path = "/api/alocacoes/funcionario/{id}",
    tag = "Alocações",
    params(("id" = i32, Path, description = "ID do funcionário")),
    responses((status = 200, description = "Alocações ativas do funcionário", body = [AllocationDetail]))
)]
pub async fn list_by_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let allocations = app_state
        .allocation_manager
        .find_by_employee(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(allocations)))
}

// GET /api/alocacoes/ferramenta/{id}
#[utoipa::path(
    get,
    path = "/api/alocacoes/ferramenta/{id}",
    tag = "Alocações",
    params(("id" = i32, Path, description = "ID da ferramenta")),
    responses((status = 200, description = "Alocações ativas da ferramenta", body = [AllocationDetail]))
)]
pub async fn list_by_tool(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let allocations = app_state
        .allocation_manager
        .find_by_tool(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(allocations)))
}

// GET /api/alocacoes/centro-custo/{id}
#[utoipa::path(
    get,
    path = "/api/alocacoes/centro-custo/{id}",
    tag = "Alocações",
    params(("id" = i32, Path, description = "ID do centro de custo")),
    responses((status = 200, description = "Alocações ativas do centro de custo", body = [AllocationDetail]))
)]
pub async fn list_by_cost_center(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let allocations = app_state
        .allocation_manager
        .find_by_cost_center(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(allocations)))
}

// GET /api/alocacoes/periodo?inicio=&fim=
#[utoipa::path(
    get,
    path = "/api/alocacoes/periodo",
    tag = "Alocações",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Alocações ativas que cruzam o período", body = [AllocationDetail]),
        (status = 400, description = "Período inválido")
    )
)]
pub async fn list_by_period(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query
        .validate()
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let start = query
        .inicio
        .as_deref()
        .ok_or_else(|| field_error("inicio", "required"))
        .and_then(|v| parse_date("inicio", v))
        .map_err(|e| validation_error(e, &locale, &app_state))?;
    let end = query
        .fim
        .as_deref()
        .ok_or_else(|| field_error("fim", "required"))
        .and_then(|v| parse_date("fim", v))
        .map_err(|e| validation_error(e, &locale, &app_state))?;

    let allocations = app_state
        .allocation_manager
        .find_by_period(start, end)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(allocations)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_date_rejects_loose_formats() {
        assert!(validate_iso_date("2025-01-31").is_ok());
        assert!(validate_iso_date("2025-1-31").is_err());
        assert!(validate_iso_date("2025-02-30").is_err());
        assert!(validate_iso_date("31/01/2025").is_err());
        assert!(validate_iso_date("2025-01-31T00:00:00Z").is_err());
    }

    #[test]
    fn create_payload_requires_references_and_start() {
        let payload: CreateAllocationPayload = serde_json::from_str(r#"{"ferramentaId": 0}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();

        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn create_payload_defaults_to_active() {
        let payload: CreateAllocationPayload = serde_json::from_str(
            r#"{"ferramentaId":1,"centroCustoId":2,"funcionarioId":3,"dataInicio":"2025-01-01"}"#,
        )
        .unwrap();
        assert!(payload.validate().is_ok());

        let request = payload.into_new_allocation().unwrap();
        assert!(request.active);
        assert_eq!(request.planned_end_date, None);
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn update_payload_tells_null_from_absent() {
        let payload: UpdateAllocationPayload =
            serde_json::from_str(r#"{"dataPrevisaoDesalocacao": null, "observacoes": "ok"}"#).unwrap();
        let changes = payload.into_changes().unwrap();

        assert_eq!(changes.planned_end_date, Some(None));
        assert_eq!(changes.actual_end_date, None);
        assert_eq!(changes.notes, Some(Some("ok".to_string())));
    }

    #[test]
    fn update_payload_checks_nullable_dates() {
        let payload: UpdateAllocationPayload =
            serde_json::from_str(r#"{"dataDesalocacao": "30-06-2025"}"#).unwrap();
        assert!(payload.validate_nullable_fields().is_err());
    }

    #[test]
    fn query_defaults_to_active_allocations() {
        let filter = AllocationQuery::default().into_filter().unwrap();
        assert_eq!(filter, AllocationFilter::default());
    }
}
