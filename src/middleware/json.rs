// src/middleware/json.rs

use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::common::error::{ApiError, AppError};
use crate::config::AppState;
use crate::middleware::i18n::Locale;

// Extrator de corpo JSON cuja rejeição (sintaxe, tipo errado, content-type)
// sai como ApiError traduzido, igual aos demais erros da API.
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

// O idioma vem dos headers, antes de consumir o corpo.
async fn split_locale(req: Request, state: &AppState) -> (Locale, Request) {
    let (mut parts, body) = req.into_parts();
    let locale = Locale::from_request_parts(&mut parts, state)
        .await
        .unwrap_or_default();
    (locale, Request::from_parts(parts, body))
}

impl<T> FromRequest<AppState> for AppJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (locale, req) = split_locale(req, state).await;

        match <Json<T> as FromRequest<AppState>>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                Err(AppError::from(rejection).to_api_error(&locale, &state.i18n_store))
            }
        }
    }
}

// Corpo opcional: sem content-type JSON vira None; JSON quebrado continua erro.
impl<T> OptionalFromRequest<AppState> for AppJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Option<Self>, Self::Rejection> {
        let (locale, req) = split_locale(req, state).await;

        match <Json<T> as OptionalFromRequest<AppState>>::from_request(req, state).await {
            Ok(value) => Ok(value.map(|Json(value)| AppJson(value))),
            Err(rejection) => {
                Err(AppError::from(rejection).to_api_error(&locale, &state.i18n_store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    use crate::db::memory::MemoryDatabase;

    #[derive(Debug, Deserialize)]
    struct Payload {
        id: i32,
    }

    fn json_request(body: &str, lang: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT_LANGUAGE, lang)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn wrong_type_becomes_a_translated_bad_request() {
        let state = AppState::from_memory(MemoryDatabase::new());

        let err = <AppJson<Payload> as FromRequest<AppState>>::from_request(
            json_request(r#"{"id":"abc"}"#, "en"),
            &state,
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "The request body is not valid JSON for this resource.");
        assert!(err.details.is_some());
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let state = AppState::from_memory(MemoryDatabase::new());

        let AppJson(payload) = <AppJson<Payload> as FromRequest<AppState>>::from_request(
            json_request(r#"{"id":7}"#, "pt"),
            &state,
        )
        .await
        .unwrap();

        assert_eq!(payload.id, 7);
    }

    #[tokio::test]
    async fn missing_optional_body_is_none() {
        let state = AppState::from_memory(MemoryDatabase::new());
        let req = Request::builder().method("POST").uri("/").body(Body::empty()).unwrap();

        let extracted = <AppJson<Payload> as OptionalFromRequest<AppState>>::from_request(req, &state)
            .await
            .unwrap();

        assert!(extracted.is_none());
    }
}
