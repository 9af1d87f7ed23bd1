//! Records written by the lightweight function endpoints.
//!
//! Keys follow `schedule:{userId}:{date}`, `workout:{userId}:{millis}` and
//! `session_card:{userId}:{date}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trainer_hub_data::repository::Record;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// One schedule per user and day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub exercises: Value,
    #[serde(default)]
    pub trainer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for DaySchedule {
    const NAMESPACE: &'static str = "schedule";

    fn owner(&self) -> &str {
        &self.user_id
    }

    fn id(&self) -> &str {
        &self.date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    /// Creation time in epoch milliseconds, also the key suffix
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub exercises: Value,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for WorkoutLog {
    const NAMESPACE: &'static str = "workout";

    fn owner(&self) -> &str {
        &self.user_id
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Daily session summary, one per user and day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub achievements: Value,
    pub created_at: DateTime<Utc>,
}

impl Record for SessionSummary {
    const NAMESPACE: &'static str = "session_card";

    fn owner(&self) -> &str {
        &self.user_id
    }

    fn id(&self) -> &str {
        &self.date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewDaySchedule {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub exercises: Value,
    #[serde(default)]
    pub trainer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[serde(default)]
    pub exercises: Value,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewSessionSummary {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub achievements: Value,
}
