use serde::{Deserialize, Serialize};

/// Corpo JSON degli errori: `{"error": "..."}`.
///
/// Usato per validazione (400) e fallimenti dello storage (500). I "non trovato"
/// usano invece [`crate::Notice`], con la chiave `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
