use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use trainer_hub_data::repository::Record;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
}

/// Trainer to trainee relationship, stored under the trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ClientLink {
    pub trainer_id: String,
    pub trainee_id: String,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Record for ClientLink {
    const NAMESPACE: &'static str = "clients";

    fn owner(&self) -> &str {
        &self.trainer_id
    }

    fn id(&self) -> &str {
        &self.trainee_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AddClientRequest {
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
}

/// Client profile with training history figures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub profile: User,
    pub link: ClientLink,
    pub total_sessions: usize,
    pub completed_sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_session_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_program: Option<String>,
}

/// Exercise in a trainer's personal library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LibraryExercise {
    pub id: String,
    pub trainer_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for LibraryExercise {
    const NAMESPACE: &'static str = "exercises";

    fn owner(&self) -> &str {
        &self.trainer_id
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRequest {
    #[validate(length(min = 1, max = 100, message = "Exercise name is required"))]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
}
