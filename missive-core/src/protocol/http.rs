use serde::{Deserialize, Deserializer, Serialize};

/*
    http dto for http requests
    I campi sono tutti opzionali: la presenza viene controllata dal server, che
    risponde 400 con un messaggio preciso invece di un errore di deserializzazione.
*/

// Create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(rename = "senderID", default, deserialize_with = "string_like")]
    pub sender_id: Option<String>,
    #[serde(rename = "receiverID", default, deserialize_with = "string_like")]
    pub receiver_id: Option<String>,
    #[serde(rename = "messageID", default, deserialize_with = "string_like")]
    pub message_id: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    pub content: Option<String>,
}

// Update: solo il contenuto è modificabile.
// `None` = campo assente, `Some(None)` = `"content": null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMessageRequest {
    #[serde(
        default,
        deserialize_with = "present_string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Option<String>>,
}

/// Risposta informativa `{"message": "..."}` (es. "Message deleted", "Message not found").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringLike {
    Text(String),
    UInt(u64),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<StringLike> for String {
    fn from(v: StringLike) -> Self {
        match v {
            StringLike::Text(s) => s,
            StringLike::UInt(n) => n.to_string(),
            StringLike::Int(n) => n.to_string(),
            StringLike::Float(n) => n.to_string(),
            StringLike::Bool(b) => b.to_string(),
        }
    }
}

/// Accetta stringhe, numeri e booleani (convertiti in stringa); `null` equivale
/// a campo assente. Oggetti e array sono un errore.
fn string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringLike>::deserialize(deserializer)?;
    Ok(value.map(String::from))
}

// chiamata solo se il campo è presente: distingue `null` dall'assenza
fn present_string_like<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    string_like(deserializer).map(Some)
}
