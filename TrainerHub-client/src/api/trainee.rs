use serde_json::json;
use trainer_hub_domain::entities::{
    AssignedProgram, CurrentProgram, MarkAllReadResult, Metric, MetricFilter, Notification, NotificationFilter,
    NotificationPage, Schedule, ScheduleFilter, SearchQuery, SessionCard, SessionFilter, TraineeStats,
    UpcomingQuery, UpcomingSchedules, User,
};

use crate::client::ApiClient;
use crate::error::ApiResult;

/// Read-only views of the signed-in trainee
#[derive(Clone)]
pub struct TraineeApi {
    client: ApiClient,
}

impl TraineeApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn upcoming_schedules(&self, days: Option<u32>) -> ApiResult<UpcomingSchedules> {
        self.client
            .get_with_query("/trainee/schedules/upcoming", &UpcomingQuery { days })
            .await
    }

    pub async fn schedules(&self, filter: &ScheduleFilter) -> ApiResult<Vec<Schedule>> {
        self.client.get_with_query("/trainee/schedules", filter).await
    }

    pub async fn schedule(&self, id: &str) -> ApiResult<Schedule> {
        self.client.get(&format!("/trainee/schedules/{}", id)).await
    }

    pub async fn current_program(&self) -> ApiResult<CurrentProgram> {
        self.client.get("/trainee/programs/current").await
    }

    pub async fn programs(&self) -> ApiResult<Vec<AssignedProgram>> {
        self.client.get("/trainee/programs").await
    }

    pub async fn program(&self, assignment_id: &str) -> ApiResult<AssignedProgram> {
        self.client.get(&format!("/trainee/programs/{}", assignment_id)).await
    }

    pub async fn stats(&self) -> ApiResult<TraineeStats> {
        self.client.get("/trainee/stats").await
    }

    pub async fn notifications(&self, filter: &NotificationFilter) -> ApiResult<NotificationPage> {
        self.client.get_with_query("/trainee/notifications", filter).await
    }

    pub async fn mark_notification_read(&self, id: &str) -> ApiResult<Notification> {
        self.client
            .put(&format!("/trainee/notifications/{}/read", id), &json!({}))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> ApiResult<MarkAllReadResult> {
        self.client.put("/trainee/notifications/read-all", &json!({})).await
    }

    pub async fn sessions(&self, filter: &SessionFilter) -> ApiResult<Vec<SessionCard>> {
        self.client.get_with_query("/trainee/sessions", filter).await
    }

    pub async fn search_sessions(&self, query: &str) -> ApiResult<Vec<SessionCard>> {
        self.client
            .get_with_query("/trainee/sessions/search", &SearchQuery { q: query.to_string() })
            .await
    }

    pub async fn session(&self, id: &str) -> ApiResult<SessionCard> {
        self.client.get(&format!("/trainee/sessions/{}", id)).await
    }

    pub async fn metrics(&self, filter: &MetricFilter) -> ApiResult<Vec<Metric>> {
        self.client.get_with_query("/trainee/metrics", filter).await
    }

    pub async fn profile(&self) -> ApiResult<User> {
        self.client.get("/trainee/me").await
    }
}
