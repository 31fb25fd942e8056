// src/common/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// ---
// Recursos que aparecem nas mensagens de "não encontrado"
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Tool,
    CostCenter,
    Employee,
    Allocation,
}

impl Resource {
    /// Sufixo usado nas chaves do catálogo de mensagens.
    pub fn key(self) -> &'static str {
        match self {
            Resource::Tool => "tool",
            Resource::CostCenter => "cost_center",
            Resource::Employee => "employee",
            Resource::Allocation => "allocation",
        }
    }
}

// ---
// Regras de datas de uma alocação (cada uma vira uma mensagem própria)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    PlannedEndBeforeStart,
    ActualEndBeforeStart,
    ActualEndBeforePlannedEnd,
    RangeStartAfterEnd,
}

impl DateRule {
    pub fn key(self) -> &'static str {
        match self {
            DateRule::PlannedEndBeforeStart => "date_rule.planned_end_before_start",
            DateRule::ActualEndBeforeStart => "date_rule.actual_end_before_start",
            DateRule::ActualEndBeforePlannedEnd => "date_rule.actual_end_before_planned_end",
            DateRule::RangeStartAfterEnd => "date_rule.range_start_after_end",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Corpo que nem chega a ser o JSON esperado (sintaxe, tipos, content-type)
    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error("Datas inconsistentes: {0:?}")]
    InvalidArgument(DateRule),

    // Referência inexistente OU inativa (validação de create/update)
    #[error("{resource:?} com ID {id} não encontrado(a) ou inativo(a)")]
    ReferenceNotFound { resource: Resource, id: i32 },

    #[error("{resource:?} com ID {id} não encontrado(a)")]
    ResourceNotFound { resource: Resource, id: i32 },

    #[error("Conflito de alocação no período {start} a {end:?}")]
    AllocationConflict {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// ---
// A resposta de erro que sai para o cliente (já traduzida)
// ---
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::MalformedBody(_) | AppError::InvalidArgument(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ReferenceNotFound { .. } | AppError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AllocationConflict { .. } => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converte o erro de domínio na resposta HTTP, no idioma pedido.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        let (error, details) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(&*e.code);
                            Value::String(store.translate(lang, key))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                (store.translate(lang, "validation.failed"), Some(Value::Object(details)))
            }
            AppError::MalformedBody(rejection) => {
                tracing::debug!("Corpo rejeitado: {}", rejection.body_text());
                let details = json!({ "body": [rejection.body_text()] });
                (store.translate(lang, "validation.malformed_body"), Some(details))
            }
            AppError::InvalidArgument(rule) => (store.translate(lang, rule.key()), None),
            AppError::ReferenceNotFound { resource, id } => {
                let key = format!("reference_not_found.{}", resource.key());
                (store.format(lang, &key, &[("id", id.to_string())]), None)
            }
            AppError::ResourceNotFound { resource, id } => {
                let key = format!("not_found.{}", resource.key());
                (store.format(lang, &key, &[("id", id.to_string())]), None)
            }
            AppError::AllocationConflict { start, end } => {
                let end = match end {
                    Some(date) => date.to_string(),
                    None => store.translate(lang, "period.open_end"),
                };
                let message = store.format(
                    lang,
                    "allocation.conflict",
                    &[("start", start.to_string()), ("end", end)],
                );
                (message, None)
            }
            // Os detalhes internos ficam no log, nunca na resposta.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (store.translate(lang, "internal.unexpected"), None)
            }
        };

        ApiError { status, error, details }
    }
}
