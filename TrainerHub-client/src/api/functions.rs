use serde::Deserialize;
use trainer_hub_domain::entities::{
    DaySchedule, NewDaySchedule, NewSessionSummary, NewWorkout, SessionSummary, SignUpRequest, User, WorkoutLog,
};

use crate::client::ApiClient;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct Schedules {
    schedules: Vec<DaySchedule>,
}

#[derive(Debug, Deserialize)]
struct Workouts {
    workouts: Vec<WorkoutLog>,
}

#[derive(Debug, Deserialize)]
struct Cards {
    cards: Vec<SessionSummary>,
}

#[derive(Debug, Deserialize)]
struct SignedUp {
    user: User,
}

#[derive(Debug, Deserialize)]
struct Stored {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct Status {
    status: String,
}

/// Serverless function endpoints; bodies are not wrapped in the REST envelope
///
/// The client must point at the function mount, e.g. `http://localhost:8080/functions`.
#[derive(Clone)]
pub struct FunctionsApi {
    client: ApiClient,
}

impl FunctionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `"ok"` when the surface is up
    pub async fn health(&self) -> ApiResult<String> {
        let status: Status = self.client.get_plain("/health").await?;
        Ok(status.status)
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> ApiResult<User> {
        let created: SignedUp = self.client.post_plain("/signup", request).await?;
        Ok(created.user)
    }

    pub async fn schedules(&self, user_id: &str) -> ApiResult<Vec<DaySchedule>> {
        let list: Schedules = self.client.get_plain(&format!("/schedule/{}", user_id)).await?;
        Ok(list.schedules)
    }

    pub async fn create_schedule(&self, request: &NewDaySchedule) -> ApiResult<bool> {
        let stored: Stored = self.client.post_plain("/schedule", request).await?;
        Ok(stored.success)
    }

    pub async fn workouts(&self, user_id: &str) -> ApiResult<Vec<WorkoutLog>> {
        let list: Workouts = self.client.get_plain(&format!("/workouts/{}", user_id)).await?;
        Ok(list.workouts)
    }

    pub async fn create_workout(&self, request: &NewWorkout) -> ApiResult<bool> {
        let stored: Stored = self.client.post_plain("/workouts", request).await?;
        Ok(stored.success)
    }

    pub async fn session_cards(&self, user_id: &str) -> ApiResult<Vec<SessionSummary>> {
        let list: Cards = self.client.get_plain(&format!("/session-cards/{}", user_id)).await?;
        Ok(list.cards)
    }

    pub async fn create_session_card(&self, request: &NewSessionSummary) -> ApiResult<bool> {
        let stored: Stored = self.client.post_plain("/session-cards", request).await?;
        Ok(stored.success)
    }
}
