use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;

pub fn chrono_to_bson(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

/// Round a percentage figure to 2 decimal places at the aggregation output
/// boundary.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
