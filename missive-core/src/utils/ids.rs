use uuid::Uuid;

/// Genera un nuovo id di documento (UUIDv4 in forma esadecimale compatta, 32 caratteri).
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}
