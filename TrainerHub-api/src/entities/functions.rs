//! Bodies of the function endpoints
//!
//! These keep the flat shapes the function clients expect instead of the REST envelope.

use serde::{Deserialize, Serialize};
use trainer_hub_domain::entities::{DaySchedule, SessionSummary, User, WorkoutLog};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchedulesResponse {
    pub schedules: Vec<DaySchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkoutsResponse {
    pub workouts: Vec<WorkoutLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionCardsResponse {
    pub cards: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponse {
    pub user: User,
}

/// Acknowledgement of a write
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FunctionSuccess {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FunctionStatus {
    pub status: String,
}

/// Failure body of every function endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FunctionErrorBody {
    pub error: String,
}
