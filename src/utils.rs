use chrono::{NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Serializer;

use crate::types::ApiError;

/// Timestamps are stored without a zone and always mean UTC.
pub fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = Utc
        .from_utc_datetime(date)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

/// Turns a raw `<id>` path segment into an id, rejecting anything that is not
/// an integer with a 400.
pub fn parse_id(raw: Result<i32, &str>) -> Result<i32, ApiError> {
    raw.map_err(|_| ApiError::bad_request())
}
