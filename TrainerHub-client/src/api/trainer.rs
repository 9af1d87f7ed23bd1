use serde::Deserialize;
use trainer_hub_domain::entities::{
    AddClientRequest, AssignProgramRequest, CancelScheduleRequest, ClientSummary, CreateProgramRequest,
    CreateScheduleRequest, CreateSessionCardRequest, DashboardStats, ExerciseRequest, LibraryExercise, Metric,
    MetricFilter, Program, ProgramAssignment, RecordMetricRequest, Schedule, ScheduleFilter, SessionCard,
    SessionFilter, UpdateClientRequest, UpdateProgramRequest, UpdateScheduleRequest, UpdateSessionCardRequest,
};

use crate::client::ApiClient;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct CategoryList {
    categories: Vec<String>,
}

/// Roster, scheduling, programs and exercise library of the signed-in trainer
#[derive(Clone)]
pub struct TrainerApi {
    client: ApiClient,
}

impl TrainerApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.client.get("/trainer/dashboard/stats").await
    }

    // Clients

    pub async fn clients(&self) -> ApiResult<Vec<ClientSummary>> {
        self.client.get("/trainer/clients").await
    }

    pub async fn client(&self, trainee_id: &str) -> ApiResult<ClientSummary> {
        self.client.get(&format!("/trainer/clients/{}", trainee_id)).await
    }

    pub async fn add_client(&self, request: &AddClientRequest) -> ApiResult<ClientSummary> {
        self.client.post("/trainer/clients", request).await
    }

    pub async fn update_client(&self, trainee_id: &str, request: &UpdateClientRequest) -> ApiResult<ClientSummary> {
        self.client
            .patch(&format!("/trainer/clients/{}", trainee_id), request)
            .await
    }

    pub async fn remove_client(&self, trainee_id: &str) -> ApiResult<()> {
        self.client.delete(&format!("/trainer/clients/{}", trainee_id)).await
    }

    pub async fn client_metrics(&self, trainee_id: &str, filter: &MetricFilter) -> ApiResult<Vec<Metric>> {
        self.client
            .get_with_query(&format!("/trainer/clients/{}/metrics", trainee_id), filter)
            .await
    }

    pub async fn record_client_metric(&self, trainee_id: &str, request: &RecordMetricRequest) -> ApiResult<Metric> {
        self.client
            .post(&format!("/trainer/clients/{}/metrics", trainee_id), request)
            .await
    }

    pub async fn client_sessions(&self, trainee_id: &str) -> ApiResult<Vec<SessionCard>> {
        self.client
            .get(&format!("/trainer/clients/{}/sessions", trainee_id))
            .await
    }

    // Schedules

    pub async fn schedules(&self, filter: &ScheduleFilter) -> ApiResult<Vec<Schedule>> {
        self.client.get_with_query("/trainer/schedules", filter).await
    }

    pub async fn schedule(&self, id: &str) -> ApiResult<Schedule> {
        self.client.get(&format!("/trainer/schedules/{}", id)).await
    }

    pub async fn create_schedule(&self, request: &CreateScheduleRequest) -> ApiResult<Schedule> {
        self.client.post("/trainer/schedules", request).await
    }

    pub async fn update_schedule(&self, id: &str, request: &UpdateScheduleRequest) -> ApiResult<Schedule> {
        self.client.patch(&format!("/trainer/schedules/{}", id), request).await
    }

    pub async fn cancel_schedule(&self, id: &str, reason: Option<String>) -> ApiResult<Schedule> {
        self.client
            .delete_with_body(&format!("/trainer/schedules/{}", id), &CancelScheduleRequest { reason })
            .await
    }

    // Session cards

    pub async fn sessions(&self, filter: &SessionFilter) -> ApiResult<Vec<SessionCard>> {
        self.client.get_with_query("/trainer/sessions", filter).await
    }

    pub async fn session(&self, id: &str) -> ApiResult<SessionCard> {
        self.client.get(&format!("/trainer/sessions/{}", id)).await
    }

    pub async fn create_session(&self, request: &CreateSessionCardRequest) -> ApiResult<SessionCard> {
        self.client.post("/trainer/sessions", request).await
    }

    pub async fn update_session(&self, id: &str, request: &UpdateSessionCardRequest) -> ApiResult<SessionCard> {
        self.client.patch(&format!("/trainer/sessions/{}", id), request).await
    }

    pub async fn delete_session(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&format!("/trainer/sessions/{}", id)).await
    }

    // Programs

    pub async fn programs(&self) -> ApiResult<Vec<Program>> {
        self.client.get("/trainer/programs").await
    }

    pub async fn program(&self, id: &str) -> ApiResult<Program> {
        self.client.get(&format!("/trainer/programs/{}", id)).await
    }

    pub async fn create_program(&self, request: &CreateProgramRequest) -> ApiResult<Program> {
        self.client.post("/trainer/programs", request).await
    }

    pub async fn update_program(&self, id: &str, request: &UpdateProgramRequest) -> ApiResult<Program> {
        self.client.patch(&format!("/trainer/programs/{}", id), request).await
    }

    pub async fn delete_program(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&format!("/trainer/programs/{}", id)).await
    }

    pub async fn assign_program(&self, id: &str, request: &AssignProgramRequest) -> ApiResult<ProgramAssignment> {
        self.client
            .post(&format!("/trainer/programs/{}/assign", id), request)
            .await
    }

    // Exercise library

    pub async fn exercises(&self) -> ApiResult<Vec<LibraryExercise>> {
        self.client.get("/trainer/exercises").await
    }

    pub async fn create_exercise(&self, request: &ExerciseRequest) -> ApiResult<LibraryExercise> {
        self.client.post("/trainer/exercises", request).await
    }

    pub async fn update_exercise(&self, id: &str, request: &ExerciseRequest) -> ApiResult<LibraryExercise> {
        self.client.patch(&format!("/trainer/exercises/{}", id), request).await
    }

    pub async fn delete_exercise(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&format!("/trainer/exercises/{}", id)).await
    }

    /// Categories across every library, from `/common`
    pub async fn exercise_categories(&self) -> ApiResult<Vec<String>> {
        let list: CategoryList = self.client.get("/common/exercises/categories").await?;
        Ok(list.categories)
    }
}
