use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::Form;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Corpo della richiesta, in JSON oppure form urlencoded.
///
/// Con un altro content type (o senza) il corpo viene ignorato e si ottiene
/// `T::default()`: la validazione dei campi resta compito del controller.
/// Anche un corpo JSON vuoto vale come oggetto vuoto.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::MalformedBody(e.body_text()))?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Payload(T::default()));
            }
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::MalformedBody(e.to_string()))?;
            Ok(Payload(value))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::MalformedBody(e.body_text()))?;
            Ok(Payload(value))
        } else {
            Ok(Payload(T::default()))
        }
    }
}

/// Parametri di path come `axum::extract::Path`, ma un segmento che non si
/// decodifica (es. `%FF`) diventa un 400 JSON tramite `ApiError`.
#[derive(Debug, Clone)]
pub struct PathParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidPath(e.body_text()))?;
        Ok(PathParams(value))
    }
}
