//! Accesso allo storage dei messaggi.
//!
//! Ogni handler chiama esattamente una operazione di [`MessageStore`]. Due
//! implementazioni: MongoDB ([`mongo::MongoMessageStore`]) e un documento per
//! riga su SQLite ([`sqlite::SqliteMessageStore`]).

use async_trait::async_trait;
use missive_core::Message;
use thiserror::Error;

pub mod mongo;
pub mod sqlite;

pub use mongo::MongoMessageStore;
pub use sqlite::SqliteMessageStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("unexpected inserted id: {0}")]
    InsertedId(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Dati di un nuovo messaggio, già validati dal controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_id: String,
    pub receiver_id: String,
    pub message_id: Option<String>,
    pub content: String,
}

/// Chiave (mittente, destinatario, messageID) usata da update e delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageKey {
    pub sender_id: String,
    pub receiver_id: String,
    pub message_id: String,
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Tutti i messaggi, in ordine di inserimento.
    async fn list_all(&self) -> StoreResult<Vec<Message>>;

    async fn insert(&self, message: NewMessage) -> StoreResult<Message>;

    /// Primo messaggio con questo mittente e messageID.
    async fn find_by_sender_and_message_id(
        &self,
        sender_id: &str,
        message_id: &str,
    ) -> StoreResult<Option<Message>>;

    /// Primo messaggio che corrisponde alla chiave.
    async fn find_by_key(&self, key: &MessageKey) -> StoreResult<Option<Message>>;

    /// Sostituisce il contenuto del primo messaggio che corrisponde alla chiave
    /// e lo restituisce aggiornato.
    async fn update_content(&self, key: &MessageKey, content: &str)
        -> StoreResult<Option<Message>>;

    /// Rimuove il primo messaggio che corrisponde alla chiave e lo restituisce.
    async fn delete(&self, key: &MessageKey) -> StoreResult<Option<Message>>;

    /// Messaggi scambiati tra `a` e `b`, in entrambe le direzioni.
    async fn find_conversation(&self, a: &str, b: &str) -> StoreResult<Vec<Message>>;

    async fn find_by_receiver(&self, receiver_id: &str) -> StoreResult<Vec<Message>>;

    /// Verifica che il backend risponda.
    async fn ping(&self) -> StoreResult<()>;
}
