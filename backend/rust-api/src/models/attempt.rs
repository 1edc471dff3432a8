use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed quiz submission, stored in the "quiz_attempts" collection.
/// Immutable once written by the grading subsystem; a user may have any
/// number of attempts per quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "quizId")]
    pub quiz_id: String,
    pub score: f64,
    #[serde(rename = "maxScore")]
    pub max_score: f64,
    /// 0-100; legacy records may omit it, which counts as 0 everywhere.
    #[serde(
        rename = "percentageScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub percentage_score: Option<f64>,
    /// Elapsed minutes, fractional.
    #[serde(rename = "timeTaken", default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<f64>,
    #[serde(rename = "dateTaken", with = "bson_datetime_as_chrono")]
    pub date_taken: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn percentage_or_zero(&self) -> f64 {
        self.percentage_score.unwrap_or(0.0)
    }

    pub fn time_or_zero(&self) -> f64 {
        self.time_taken.unwrap_or(0.0)
    }
}

// Serde converter for chrono::DateTime <-> mongodb::bson::DateTime
pub(crate) mod bson_datetime_as_chrono {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bson_dt = bson::DateTime::from_millis(date.timestamp_millis());
        bson_dt.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bson_dt = bson::DateTime::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(bson_dt.timestamp_millis())
            .ok_or_else(|| serde::de::Error::custom("dateTaken out of range"))
    }
}
