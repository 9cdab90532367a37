//! missive-core: tipi condivisi tra server e client (modello Message, DTO HTTP, corpi di risposta).
//! Niente I/O: solo serde e qualche utilità.

pub mod models;
pub mod protocol;
pub mod error;
pub mod utils;

// Re-export utili per ridurre i percorsi nel crate server
pub use error::ErrorBody;
pub use models::message::Message;
pub use protocol::http::{CreateMessageRequest, Notice, UpdateMessageRequest};
pub use utils::{new_document_id, now_timestamp};
