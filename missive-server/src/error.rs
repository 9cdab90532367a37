use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use missive_core::{ErrorBody, Notice};
use thiserror::Error;

use crate::store::StoreError;

pub const VALIDATION_MESSAGE: &str = "All fields are required: senderID, receiverID, content.";
pub const MALFORMED_BODY_MESSAGE: &str = "Malformed request body.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed.";
pub const INVALID_PATH_MESSAGE: &str = "Invalid request path.";
pub const CONTENT_REQUIRED_MESSAGE: &str = "Content must not be empty.";

pub const MESSAGE_NOT_FOUND: &str = "Message not found";
pub const MESSAGE_DELETED: &str = "Message deleted";
pub const CONVERSATION_NOT_FOUND: &str =
    "No messages found for this sender and receiver combination";
pub const RECEIVER_NOT_FOUND: &str = "No messages found for this receiver";
pub const ROUTE_NOT_FOUND: &str = "Route not found";

/// Operazioni esposte dalle route; ognuna ha il suo messaggio di errore 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListAll,
    Create,
    GetBySenderAndId,
    Update,
    Delete,
    GetBySenderAndReceiver,
    GetByReceiver,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::ListAll => "list_all",
            Operation::Create => "create",
            Operation::GetBySenderAndId => "get_by_sender_and_id",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::GetBySenderAndReceiver => "get_by_sender_and_receiver",
            Operation::GetByReceiver => "get_by_receiver",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::ListAll | Operation::GetBySenderAndReceiver => "Failed to retrieve messages.",
            Operation::Create => "Failed to create message.",
            Operation::GetBySenderAndId => "Failed to retrieve message.",
            Operation::Update => "Failed to update message.",
            Operation::Delete => "Failed to delete message.",
            Operation::GetByReceiver => "Failed to retrieve messages for receiver.",
        }
    }
}

/// Errore restituito dagli handler. L'unico punto che decide status e corpo
/// della risposta è `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(&'static str),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("{operation:?} failed: {source}")]
    Storage {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn storage(operation: Operation) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Storage { operation, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) | ApiError::InvalidPath(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation(msg) => (status, Json(ErrorBody::new(msg))).into_response(),
            ApiError::MalformedBody(detail) => {
                tracing::debug!(%detail, "rejected request body");
                (status, Json(ErrorBody::new(MALFORMED_BODY_MESSAGE))).into_response()
            }
            ApiError::InvalidPath(detail) => {
                tracing::debug!(%detail, "rejected path parameters");
                (status, Json(ErrorBody::new(INVALID_PATH_MESSAGE))).into_response()
            }
            ApiError::NotFound(msg) => (status, Json(Notice::new(msg))).into_response(),
            ApiError::Storage { operation, source } => {
                // il dettaglio resta nei log, al client solo il messaggio dell'operazione
                tracing::error!(operation = operation.name(), error = %source, "storage operation failed");
                (status, Json(ErrorBody::new(operation.failure_message()))).into_response()
            }
        }
    }
}
