use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put, MethodRouter},
    Extension, Json, Router,
};
use missive_core::{ErrorBody, Notice};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

use crate::controllers;
use crate::error::{INTERNAL_ERROR_MESSAGE, METHOD_NOT_ALLOWED_MESSAGE, ROUTE_NOT_FOUND};
use crate::{health_with_store, AppState};

pub const MESSAGES_PREFIX: &str = "/api/messages";
pub const WELCOME_TEXT: &str = "Welcome to the Messages API! Use /api/messages to get messages.";

/// Il router completo, con lo slash finale tolto prima del routing
/// ("/api/messages/" equivale a "/api/messages").
pub type App = NormalizePath<Router>;

pub fn app(state: Arc<AppState>) -> App {
    // deve avvolgere il Router dall'esterno: Router::layer agisce dopo il matching
    NormalizePath::trim_trailing_slash(router(state))
}

// metodo non previsto su un path esistente: 405 in JSON
fn json_405(methods: MethodRouter) -> MethodRouter {
    methods.fallback(method_not_allowed)
}

/// Rotte dei messaggi, relative a [`MESSAGES_PREFIX`].
pub fn message_routes() -> Router {
    Router::new()
        .route(
            "/",
            json_405(get(controllers::list_messages).post(controllers::create_message)),
        )
        .route(
            "/sender/:senderID/message/:messageID",
            json_405(get(controllers::get_message_by_sender_and_id)),
        )
        .route(
            "/sender/:senderID/receiver/:receiverID/message/:messageID",
            json_405(put(controllers::update_message).delete(controllers::delete_message)),
        )
        .route(
            "/sender/:senderID/receiver/:receiverID",
            json_405(get(controllers::get_messages_by_sender_and_receiver)),
        )
        .route(
            "/receiver/:receiverID",
            json_405(get(controllers::get_messages_for_receiver)),
        )
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", json_405(get(|| async { WELCOME_TEXT })))
        .route("/health", json_405(get(|Extension(state): Extension<Arc<AppState>>| async move {
            health_with_store(state.store.as_ref()).await
        })))
        .nest(MESSAGES_PREFIX, message_routes())
        .fallback(route_not_found)
        .layer(Extension(state))
        // un panic in un handler diventa un 500 JSON invece di chiudere la connessione
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn method_not_allowed() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new(METHOD_NOT_ALLOWED_MESSAGE)),
    )
}

async fn route_not_found() -> (StatusCode, Json<Notice>) {
    (StatusCode::NOT_FOUND, Json(Notice::new(ROUTE_NOT_FOUND)))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}
