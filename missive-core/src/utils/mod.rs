pub mod ids;
pub mod time;

pub use ids::new_document_id;
pub use self::time::now_timestamp;
