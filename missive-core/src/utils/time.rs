use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

// Precisione al millisecondo, es. "2025-11-02T12:34:56.789Z"
const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Restituisce l'istante corrente in UTC formattato come RFC3339 con millisecondi.
pub fn now_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(TIMESTAMP_FORMAT).expect("error formatting timestamp")
}
