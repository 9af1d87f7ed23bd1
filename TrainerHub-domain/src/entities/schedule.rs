use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use trainer_hub_data::repository::Record;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::{IntoParams, ToSchema};

use super::validate_time_of_day;

/// Lifecycle of a scheduled session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::Confirmed => "confirmed",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Cancelled => "cancelled",
            ScheduleStatus::NoShow => "no_show",
        }
    }

    /// Scheduled or confirmed, i.e. still expected to happen
    pub fn is_open(&self) -> bool {
        matches!(self, ScheduleStatus::Scheduled | ScheduleStatus::Confirmed)
    }

    /// Whether a session may move from `self` to `next`
    ///
    /// Closed statuses are final, including a move to the same status.
    pub fn can_transition_to(&self, next: ScheduleStatus) -> bool {
        match self {
            ScheduleStatus::Scheduled => true,
            ScheduleStatus::Confirmed => next != ScheduleStatus::Scheduled,
            ScheduleStatus::Completed | ScheduleStatus::Cancelled | ScheduleStatus::NoShow => false,
        }
    }
}

/// A training session booked by a trainer for one trainee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub trainer_id: String,
    pub trainee_id: String,
    pub date: NaiveDate,
    /// Start time, `HH:MM`
    pub time: String,
    /// Length in minutes
    pub duration: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<String>,
    #[serde(default)]
    pub planned_exercises: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_card_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Sort key combining date and start time
    pub fn starts_at(&self) -> (NaiveDate, &str) {
        (self.date, self.time.as_str())
    }
}

impl Record for Schedule {
    const NAMESPACE: &'static str = "schedules";

    fn owner(&self) -> &str {
        &self.trainee_id
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, message = "Trainee is required"))]
    pub trainee_id: String,
    pub date: NaiveDate,
    #[validate(custom = "validate_time_of_day")]
    pub time: String,
    #[validate(range(min = 15, max = 480, message = "Duration must be between 15 and 480 minutes"))]
    pub duration: u32,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub session_type: Option<String>,
    #[serde(default)]
    pub planned_exercises: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub date: Option<NaiveDate>,
    #[validate(custom = "validate_time_of_day")]
    pub time: Option<String>,
    #[validate(range(min = 15, max = 480, message = "Duration must be between 15 and 480 minutes"))]
    pub duration: Option<u32>,
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub session_type: Option<String>,
    pub planned_exercises: Option<Vec<String>>,
    pub location: Option<String>,
    pub status: Option<ScheduleStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CancelScheduleRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Filters accepted by schedule listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(IntoParams))]
#[cfg_attr(feature = "with-api", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFilter {
    /// Earliest date, inclusive
    pub start_date: Option<NaiveDate>,
    /// Latest date, inclusive
    pub end_date: Option<NaiveDate>,
    pub status: Option<ScheduleStatus>,
    pub trainer_id: Option<String>,
    pub trainee_id: Option<String>,
}

impl ScheduleFilter {
    pub fn matches(&self, schedule: &Schedule) -> bool {
        self.start_date.map_or(true, |start| schedule.date >= start)
            && self.end_date.map_or(true, |end| schedule.date <= end)
            && self.status.map_or(true, |status| schedule.status == status)
            && self.trainer_id.as_deref().map_or(true, |id| schedule.trainer_id == id)
            && self.trainee_id.as_deref().map_or(true, |id| schedule.trainee_id == id)
    }
}
