use axum::{extract::Extension, http::StatusCode, Json};
use missive_core::{CreateMessageRequest, Message, Notice, UpdateMessageRequest};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{
    ApiError, Operation, CONTENT_REQUIRED_MESSAGE, CONVERSATION_NOT_FOUND, MESSAGE_DELETED,
    MESSAGE_NOT_FOUND, RECEIVER_NOT_FOUND, VALIDATION_MESSAGE,
};
use crate::extract::{PathParams, Payload};
use crate::store::{MessageKey, NewMessage};
use crate::AppState;

// parametri di path, con i nomi usati nelle route
#[derive(Debug, Deserialize)]
pub struct SenderMessagePath {
    #[serde(rename = "senderID")]
    pub sender_id: String,
    #[serde(rename = "messageID")]
    pub message_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageKeyPath {
    #[serde(rename = "senderID")]
    pub sender_id: String,
    #[serde(rename = "receiverID")]
    pub receiver_id: String,
    #[serde(rename = "messageID")]
    pub message_id: String,
}

impl From<MessageKeyPath> for MessageKey {
    fn from(p: MessageKeyPath) -> Self {
        MessageKey {
            sender_id: p.sender_id,
            receiver_id: p.receiver_id,
            message_id: p.message_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConversationPath {
    #[serde(rename = "senderID")]
    pub sender_id: String,
    #[serde(rename = "receiverID")]
    pub receiver_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReceiverPath {
    #[serde(rename = "receiverID")]
    pub receiver_id: String,
}

// campo obbligatorio: presente e non vuoto
fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

/// Handler per GET /api/messages
pub async fn list_messages(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state
        .store
        .list_all()
        .await
        .map_err(ApiError::storage(Operation::ListAll))?;
    Ok(Json(messages))
}

/// Handler per POST /api/messages
pub async fn create_message(
    Extension(state): Extension<Arc<AppState>>,
    Payload(req): Payload<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    // senderID, receiverID e content sono obbligatori, messageID no
    let (Some(sender_id), Some(receiver_id), Some(content)) = (
        required(req.sender_id),
        required(req.receiver_id),
        required(req.content),
    ) else {
        return Err(ApiError::Validation(VALIDATION_MESSAGE));
    };

    let new_message = NewMessage {
        sender_id,
        receiver_id,
        message_id: req.message_id,
        content,
    };
    let saved = state
        .store
        .insert(new_message)
        .await
        .map_err(ApiError::storage(Operation::Create))?;
    tracing::debug!(id = %saved.id, sender = %saved.sender_id, "message created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Handler per GET /api/messages/sender/:senderID/message/:messageID
pub async fn get_message_by_sender_and_id(
    Extension(state): Extension<Arc<AppState>>,
    PathParams(p): PathParams<SenderMessagePath>,
) -> Result<Json<Message>, ApiError> {
    state
        .store
        .find_by_sender_and_message_id(&p.sender_id, &p.message_id)
        .await
        .map_err(ApiError::storage(Operation::GetBySenderAndId))?
        .map(Json)
        .ok_or(ApiError::NotFound(MESSAGE_NOT_FOUND))
}

/// Handler per PUT /api/messages/sender/:senderID/receiver/:receiverID/message/:messageID
///
/// Cambia solo `content`. Se `content` manca dal corpo non scrive nulla e
/// restituisce il messaggio così com'è; `null` o stringa vuota sono un 400.
pub async fn update_message(
    Extension(state): Extension<Arc<AppState>>,
    PathParams(p): PathParams<MessageKeyPath>,
    Payload(req): Payload<UpdateMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let key = MessageKey::from(p);
    let result = match req.content {
        None => state.store.find_by_key(&key).await,
        Some(content) => {
            let Some(content) = required(content) else {
                return Err(ApiError::Validation(CONTENT_REQUIRED_MESSAGE));
            };
            state.store.update_content(&key, &content).await
        }
    };
    result
        .map_err(ApiError::storage(Operation::Update))?
        .map(Json)
        .ok_or(ApiError::NotFound(MESSAGE_NOT_FOUND))
}

/// Handler per DELETE /api/messages/sender/:senderID/receiver/:receiverID/message/:messageID
pub async fn delete_message(
    Extension(state): Extension<Arc<AppState>>,
    PathParams(p): PathParams<MessageKeyPath>,
) -> Result<Json<Notice>, ApiError> {
    let key = MessageKey::from(p);
    match state
        .store
        .delete(&key)
        .await
        .map_err(ApiError::storage(Operation::Delete))?
    {
        Some(deleted) => {
            tracing::debug!(id = %deleted.id, "message deleted");
            Ok(Json(Notice::new(MESSAGE_DELETED)))
        }
        None => Err(ApiError::NotFound(MESSAGE_NOT_FOUND)),
    }
}

/// Handler per GET /api/messages/sender/:senderID/receiver/:receiverID
///
/// La coppia vale in entrambe le direzioni: (A,B) e (B,A) danno lo stesso risultato.
pub async fn get_messages_by_sender_and_receiver(
    Extension(state): Extension<Arc<AppState>>,
    PathParams(p): PathParams<ConversationPath>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state
        .store
        .find_conversation(&p.sender_id, &p.receiver_id)
        .await
        .map_err(ApiError::storage(Operation::GetBySenderAndReceiver))?;
    if messages.is_empty() {
        return Err(ApiError::NotFound(CONVERSATION_NOT_FOUND));
    }
    Ok(Json(messages))
}

/// Handler per GET /api/messages/receiver/:receiverID
pub async fn get_messages_for_receiver(
    Extension(state): Extension<Arc<AppState>>,
    PathParams(p): PathParams<ReceiverPath>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state
        .store
        .find_by_receiver(&p.receiver_id)
        .await
        .map_err(ApiError::storage(Operation::GetByReceiver))?;
    if messages.is_empty() {
        return Err(ApiError::NotFound(RECEIVER_NOT_FOUND));
    }
    Ok(Json(messages))
}
