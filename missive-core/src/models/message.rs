use serde::{Deserialize, Serialize};

/// Messaggio persistito dal server, così come viaggia sul wire.
///
/// I nomi dei campi JSON (`senderID`, `receiverID`, `messageID`) non seguono
/// il camelCase standard, quindi sono rinominati uno per uno.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Id assegnato dallo storage all'inserimento, distinto da `message_id`.
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "senderID")]
    pub sender_id: String,
    #[serde(rename = "receiverID")]
    pub receiver_id: String,
    /// Id scelto dal client; opzionale e non univoco.
    #[serde(rename = "messageID", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: String, // RFC3339 UTC
    #[serde(rename = "updatedAt")]
    pub updated_at: String, // RFC3339 UTC
}
