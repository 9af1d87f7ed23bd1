use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::logging::log_registration;
use crate::auth::{SharedIdentityProvider, UserInfo};
use crate::entities::{
    DaySchedule, NewDaySchedule, NewSessionSummary, NewWorkout, Role, SessionSummary, SignUpRequest, User,
    WorkoutLog,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::Repositories;

/// Per-user records behind the function endpoints
#[async_trait]
pub trait RecordsServiceTrait: Send + Sync {
    async fn list_schedules(&self, caller: &UserInfo, user_id: &str) -> ServiceResult<Vec<DaySchedule>>;

    async fn list_workouts(&self, caller: &UserInfo, user_id: &str) -> ServiceResult<Vec<WorkoutLog>>;

    async fn list_session_cards(&self, caller: &UserInfo, user_id: &str) -> ServiceResult<Vec<SessionSummary>>;

    /// Write the schedule for a day, replacing any earlier one
    async fn create_schedule(&self, caller: &UserInfo, request: NewDaySchedule) -> ServiceResult<DaySchedule>;

    async fn create_workout(&self, caller: &UserInfo, request: NewWorkout) -> ServiceResult<WorkoutLog>;

    async fn create_session_card(
        &self,
        caller: &UserInfo,
        request: NewSessionSummary,
    ) -> ServiceResult<SessionSummary>;

    /// Create an account through the identity provider and store its profile
    async fn sign_up(&self, request: SignUpRequest) -> ServiceResult<User>;
}

pub struct RecordsService {
    repos: Repositories,
    identity: SharedIdentityProvider,
}

impl RecordsService {
    pub fn new(repos: Repositories, identity: SharedIdentityProvider) -> Self {
        Self { repos, identity }
    }
}

/// Users reach their own records; trainers may reach anyone's
fn ensure_access(caller: &UserInfo, user_id: &str) -> ServiceResult<()> {
    if caller.user_id == user_id || caller.role == Role::Trainer {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("Forbidden".to_string()))
    }
}

#[async_trait]
impl RecordsServiceTrait for RecordsService {
    async fn list_schedules(&self, caller: &UserInfo, user_id: &str) -> ServiceResult<Vec<DaySchedule>> {
        ensure_access(caller, user_id)?;
        Ok(self.repos.day_schedules.list(user_id).await?)
    }

    async fn list_workouts(&self, caller: &UserInfo, user_id: &str) -> ServiceResult<Vec<WorkoutLog>> {
        ensure_access(caller, user_id)?;
        Ok(self.repos.workouts.list(user_id).await?)
    }

    async fn list_session_cards(&self, caller: &UserInfo, user_id: &str) -> ServiceResult<Vec<SessionSummary>> {
        ensure_access(caller, user_id)?;
        Ok(self.repos.session_summaries.list(user_id).await?)
    }

    #[instrument(skip(self, caller, request), fields(user_id = %request.user_id))]
    async fn create_schedule(&self, caller: &UserInfo, request: NewDaySchedule) -> ServiceResult<DaySchedule> {
        request.validate()?;
        ensure_access(caller, &request.user_id)?;

        let schedule = DaySchedule {
            user_id: request.user_id,
            date: request.date,
            time: request.time,
            exercises: request.exercises,
            trainer_id: request.trainer_id,
            created_at: Utc::now(),
        };
        self.repos.day_schedules.put(&schedule).await?;
        Ok(schedule)
    }

    #[instrument(skip(self, caller, request), fields(user_id = %request.user_id))]
    async fn create_workout(&self, caller: &UserInfo, request: NewWorkout) -> ServiceResult<WorkoutLog> {
        request.validate()?;
        ensure_access(caller, &request.user_id)?;

        let now = Utc::now();
        let mut millis = now.timestamp_millis();
        // Two logs in the same millisecond get consecutive keys
        while self
            .repos
            .workouts
            .get(&request.user_id, &millis.to_string())
            .await?
            .is_some()
        {
            millis += 1;
        }

        let workout = WorkoutLog {
            id: millis.to_string(),
            user_id: request.user_id,
            date: request.date,
            exercises: request.exercises,
            notes: request.notes,
            created_at: now,
        };
        self.repos.workouts.put(&workout).await?;
        Ok(workout)
    }

    #[instrument(skip(self, caller, request), fields(user_id = %request.user_id))]
    async fn create_session_card(
        &self,
        caller: &UserInfo,
        request: NewSessionSummary,
    ) -> ServiceResult<SessionSummary> {
        request.validate()?;
        ensure_access(caller, &request.user_id)?;

        let card = SessionSummary {
            user_id: request.user_id,
            date: request.date,
            summary: request.summary,
            achievements: request.achievements,
            created_at: Utc::now(),
        };
        self.repos.session_summaries.put(&card).await?;
        Ok(card)
    }

    async fn sign_up(&self, request: SignUpRequest) -> ServiceResult<User> {
        if let Err(errors) = request.validate() {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errors| errors.iter())
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .next()
                .unwrap_or_else(|| "Invalid sign-up request".to_string());
            return Err(ServiceError::InvalidInput(message));
        }
        if request.password.is_empty() {
            return Err(ServiceError::InvalidInput("Password is required".to_string()));
        }

        let user = self.identity.sign_up(&request).await?;
        if self.repos.users.get("", &user.id).await?.is_none() {
            self.repos.users.put(&user).await?;
        }

        info!("Account {} created through sign-up function", user.id);
        log_registration(&user.id, self.identity.name());
        Ok(user)
    }
}

pub fn create_records_service(repos: Repositories, identity: SharedIdentityProvider) -> impl RecordsServiceTrait {
    RecordsService::new(repos, identity)
}
