//! Trainer workspace: roster, scheduling, session cards, programs and the exercise library
//!
//! Schedules, session cards, assignments and metrics are stored under the trainee, so
//! trainer-side lookups go through the whole namespace and check `trainer_id`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::auth::identity::normalize_email;
use crate::entities::{
    new_id, round1, AddClientRequest, AssignProgramRequest, AssignmentStatus, CancelScheduleRequest, ClientLink,
    ClientSummary, CreateProgramRequest, CreateScheduleRequest, CreateSessionCardRequest, DashboardStats,
    ExerciseRequest, LibraryExercise, Metric, MetricFilter, Notification, NotificationPriority, NotificationType,
    Program, ProgramAssignment, RecordMetricRequest, Role, Schedule, ScheduleFilter, ScheduleStatus, SessionCard,
    SessionFilter, SessionTotals, UpdateClientRequest, UpdateProgramRequest, UpdateScheduleRequest,
    UpdateSessionCardRequest,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::Repositories;
use crate::services::notifications::{notify, session_cancelled, session_scheduled, session_updated};

const DASHBOARD_UPCOMING: usize = 5;

#[async_trait]
pub trait TrainerServiceTrait: Send + Sync {
    async fn dashboard_stats(&self, trainer_id: &str, today: NaiveDate) -> ServiceResult<DashboardStats>;

    // Clients
    async fn list_clients(&self, trainer_id: &str) -> ServiceResult<Vec<ClientSummary>>;
    async fn client_detail(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<ClientSummary>;
    async fn add_client(&self, trainer_id: &str, request: AddClientRequest) -> ServiceResult<ClientSummary>;
    async fn update_client(
        &self,
        trainer_id: &str,
        trainee_id: &str,
        request: UpdateClientRequest,
    ) -> ServiceResult<ClientSummary>;
    async fn remove_client(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<()>;
    async fn client_metrics(&self, trainer_id: &str, trainee_id: &str, filter: MetricFilter)
        -> ServiceResult<Vec<Metric>>;
    async fn client_sessions(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<Vec<SessionCard>>;
    async fn record_client_metric(
        &self,
        trainer_id: &str,
        trainee_id: &str,
        request: RecordMetricRequest,
    ) -> ServiceResult<Metric>;

    // Schedules
    async fn list_schedules(&self, trainer_id: &str, filter: ScheduleFilter) -> ServiceResult<Vec<Schedule>>;
    async fn schedule_detail(&self, trainer_id: &str, id: &str) -> ServiceResult<Schedule>;
    async fn create_schedule(&self, trainer_id: &str, request: CreateScheduleRequest) -> ServiceResult<Schedule>;
    async fn update_schedule(
        &self,
        trainer_id: &str,
        id: &str,
        request: UpdateScheduleRequest,
    ) -> ServiceResult<Schedule>;
    async fn cancel_schedule(
        &self,
        trainer_id: &str,
        id: &str,
        request: CancelScheduleRequest,
    ) -> ServiceResult<Schedule>;

    // Session cards
    async fn list_sessions(&self, trainer_id: &str, filter: SessionFilter) -> ServiceResult<Vec<SessionCard>>;
    async fn session_detail(&self, trainer_id: &str, id: &str) -> ServiceResult<SessionCard>;
    async fn create_session(&self, trainer_id: &str, request: CreateSessionCardRequest)
        -> ServiceResult<SessionCard>;
    async fn update_session(
        &self,
        trainer_id: &str,
        id: &str,
        request: UpdateSessionCardRequest,
    ) -> ServiceResult<SessionCard>;
    async fn delete_session(&self, trainer_id: &str, id: &str) -> ServiceResult<()>;

    // Programs
    async fn list_programs(&self, trainer_id: &str) -> ServiceResult<Vec<Program>>;
    async fn program_detail(&self, trainer_id: &str, id: &str) -> ServiceResult<Program>;
    async fn create_program(&self, trainer_id: &str, request: CreateProgramRequest) -> ServiceResult<Program>;
    async fn update_program(&self, trainer_id: &str, id: &str, request: UpdateProgramRequest)
        -> ServiceResult<Program>;
    async fn delete_program(&self, trainer_id: &str, id: &str) -> ServiceResult<()>;
    async fn assign_program(
        &self,
        trainer_id: &str,
        program_id: &str,
        request: AssignProgramRequest,
    ) -> ServiceResult<ProgramAssignment>;

    // Exercise library
    async fn list_exercises(&self, trainer_id: &str) -> ServiceResult<Vec<LibraryExercise>>;
    async fn create_exercise(&self, trainer_id: &str, request: ExerciseRequest) -> ServiceResult<LibraryExercise>;
    async fn update_exercise(
        &self,
        trainer_id: &str,
        id: &str,
        request: ExerciseRequest,
    ) -> ServiceResult<LibraryExercise>;
    async fn delete_exercise(&self, trainer_id: &str, id: &str) -> ServiceResult<()>;

    /// Distinct categories used across the exercise library, sorted
    async fn exercise_categories(&self) -> ServiceResult<Vec<String>>;
}

pub struct TrainerService {
    repos: Repositories,
}

impl TrainerService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn client_link(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<ClientLink> {
        self.repos
            .clients
            .get(trainer_id, trainee_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client"))
    }

    async fn trainer_schedules(&self, trainer_id: &str) -> ServiceResult<Vec<Schedule>> {
        let mut schedules: Vec<Schedule> = self
            .repos
            .schedules
            .list_all()
            .await?
            .into_iter()
            .filter(|s| s.trainer_id == trainer_id)
            .collect();
        schedules.sort_by(|a, b| a.starts_at().cmp(&b.starts_at()));
        Ok(schedules)
    }

    async fn owned_schedule(&self, trainer_id: &str, id: &str) -> ServiceResult<Schedule> {
        match self.repos.schedules.find(id).await? {
            Some(schedule) if schedule.trainer_id == trainer_id => Ok(schedule),
            _ => Err(ServiceError::not_found("Schedule")),
        }
    }

    async fn owned_session(&self, trainer_id: &str, id: &str) -> ServiceResult<SessionCard> {
        match self.repos.session_cards.find(id).await? {
            Some(card) if card.trainer_id == trainer_id => Ok(card),
            _ => Err(ServiceError::not_found("Session")),
        }
    }

    async fn owned_program(&self, trainer_id: &str, id: &str) -> ServiceResult<Program> {
        self.repos
            .programs
            .get(trainer_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Program"))
    }

    async fn owned_exercise(&self, trainer_id: &str, id: &str) -> ServiceResult<LibraryExercise> {
        self.repos
            .exercises
            .get(trainer_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Exercise"))
    }

    /// Most recently started active assignment this trainer gave the trainee
    async fn active_assignment(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<Option<ProgramAssignment>> {
        Ok(self
            .repos
            .assignments
            .list(trainee_id)
            .await?
            .into_iter()
            .filter(|a| a.trainer_id == trainer_id && a.status == AssignmentStatus::Active)
            .max_by_key(|a| a.start_date))
    }

    async fn summarize(&self, link: ClientLink) -> ServiceResult<Option<ClientSummary>> {
        let Some(profile) = self.repos.users.get("", &link.trainee_id).await? else {
            debug!("Client {} has no profile", link.trainee_id);
            return Ok(None);
        };

        let schedules: Vec<Schedule> = self
            .repos
            .schedules
            .list(&link.trainee_id)
            .await?
            .into_iter()
            .filter(|s| s.trainer_id == link.trainer_id)
            .collect();
        let completed: Vec<&Schedule> = schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Completed)
            .collect();

        let last_session_date = self
            .repos
            .session_cards
            .list(&link.trainee_id)
            .await?
            .iter()
            .filter(|c| c.trainer_id == link.trainer_id)
            .map(|c| c.date)
            .chain(completed.iter().map(|s| s.date))
            .max();

        let current_program = match self.active_assignment(&link.trainer_id, &link.trainee_id).await? {
            Some(assignment) => self
                .repos
                .programs
                .get(&link.trainer_id, &assignment.program_id)
                .await?
                .map(|p| p.name),
            None => None,
        };

        Ok(Some(ClientSummary {
            total_sessions: schedules.len(),
            completed_sessions: completed.len(),
            last_session_date,
            current_program,
            profile,
            link,
        }))
    }

    /// Count one more completed session on the trainee's active program
    async fn record_progress(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<()> {
        let Some(mut assignment) = self.active_assignment(trainer_id, trainee_id).await? else {
            return Ok(());
        };

        assignment.sessions_completed += 1;
        assignment.updated_at = Utc::now();
        if assignment.total_sessions > 0 && assignment.sessions_completed >= assignment.total_sessions {
            assignment.status = AssignmentStatus::Completed;
        }
        self.repos.assignments.put(&assignment).await?;

        if assignment.status == AssignmentStatus::Completed {
            info!("Trainee {} completed assignment {}", trainee_id, assignment.id);
            notify(
                &self.repos,
                Notification::new(
                    trainee_id,
                    NotificationType::Achievement,
                    "Program completed",
                    format!("You finished all {} sessions of your program", assignment.total_sessions),
                )
                .with_related("assignment", &assignment.id)
                .with_priority(NotificationPriority::High),
            )
            .await;
        }
        Ok(())
    }

    /// Take back one completed session after its card is deleted
    ///
    /// Falls back to the most recently finished assignment when none is active.
    async fn revert_progress(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<()> {
        let assignment = match self.active_assignment(trainer_id, trainee_id).await? {
            Some(active) => Some(active),
            None => self
                .repos
                .assignments
                .list(trainee_id)
                .await?
                .into_iter()
                .filter(|a| a.trainer_id == trainer_id && a.status == AssignmentStatus::Completed)
                .max_by_key(|a| a.updated_at),
        };
        let Some(mut assignment) = assignment else {
            return Ok(());
        };

        assignment.sessions_completed = assignment.sessions_completed.saturating_sub(1);
        if assignment.status == AssignmentStatus::Completed && assignment.sessions_completed < assignment.total_sessions {
            assignment.status = AssignmentStatus::Active;
        }
        assignment.updated_at = Utc::now();
        self.repos.assignments.put(&assignment).await?;
        Ok(())
    }
}

#[async_trait]
impl TrainerServiceTrait for TrainerService {
    #[instrument(skip(self))]
    async fn dashboard_stats(&self, trainer_id: &str, today: NaiveDate) -> ServiceResult<DashboardStats> {
        let total_clients = self.repos.clients.list(trainer_id).await?.len();
        let active_programs = self
            .repos
            .assignments
            .list_all()
            .await?
            .iter()
            .filter(|a| a.trainer_id == trainer_id && a.status == AssignmentStatus::Active)
            .count();

        let schedules = self.trainer_schedules(trainer_id).await?;

        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let week_end = week_start + Duration::days(6);
        let not_cancelled = |s: &&Schedule| s.status != ScheduleStatus::Cancelled;

        let today_sessions = schedules.iter().filter(not_cancelled).filter(|s| s.date == today).count();
        let this_week_sessions = schedules
            .iter()
            .filter(not_cancelled)
            .filter(|s| s.date >= week_start && s.date <= week_end)
            .count();

        let completed = schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Completed)
            .count();
        let closed = schedules
            .iter()
            .filter(|s| {
                matches!(
                    s.status,
                    ScheduleStatus::Completed | ScheduleStatus::Cancelled | ScheduleStatus::NoShow
                )
            })
            .count();
        let completion_rate = if closed == 0 {
            0.0
        } else {
            round1(completed as f64 / closed as f64 * 100.0)
        };

        let upcoming_sessions = schedules
            .into_iter()
            .filter(|s| s.status.is_open() && s.date >= today)
            .take(DASHBOARD_UPCOMING)
            .collect();

        Ok(DashboardStats {
            total_clients,
            active_programs,
            today_sessions,
            this_week_sessions,
            completion_rate,
            upcoming_sessions,
        })
    }

    async fn list_clients(&self, trainer_id: &str) -> ServiceResult<Vec<ClientSummary>> {
        let links = self.repos.clients.list(trainer_id).await?;
        let mut clients = Vec::with_capacity(links.len());
        for link in links {
            if let Some(summary) = self.summarize(link).await? {
                clients.push(summary);
            }
        }
        clients.sort_by(|a, b| a.profile.name.to_lowercase().cmp(&b.profile.name.to_lowercase()));
        Ok(clients)
    }

    async fn client_detail(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<ClientSummary> {
        let link = self.client_link(trainer_id, trainee_id).await?;
        self.summarize(link)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client"))
    }

    #[instrument(skip(self, request))]
    async fn add_client(&self, trainer_id: &str, request: AddClientRequest) -> ServiceResult<ClientSummary> {
        request.validate()?;
        let email = normalize_email(&request.email);

        let trainee = self
            .repos
            .users
            .list_all()
            .await?
            .into_iter()
            .find(|u| normalize_email(&u.email) == email)
            .ok_or_else(|| ServiceError::NotFound(format!("No user registered with email {}", email)))?;

        if trainee.role != Role::Trainee {
            return Err(ServiceError::InvalidInput("Only trainees can be added as clients".to_string()));
        }
        if self.repos.clients.get(trainer_id, &trainee.id).await?.is_some() {
            return Err(ServiceError::Conflict("Trainee is already your client".to_string()));
        }

        let link = ClientLink {
            trainer_id: trainer_id.to_string(),
            trainee_id: trainee.id.clone(),
            joined_at: Utc::now(),
            status: Default::default(),
            notes: request.notes,
        };
        self.repos.clients.put(&link).await?;
        info!("Trainer {} added client {}", trainer_id, trainee.id);

        notify(
            &self.repos,
            Notification::new(
                &trainee.id,
                NotificationType::System,
                "New trainer",
                "A trainer added you as a client",
            ),
        )
        .await;

        self.summarize(link)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client"))
    }

    async fn update_client(
        &self,
        trainer_id: &str,
        trainee_id: &str,
        request: UpdateClientRequest,
    ) -> ServiceResult<ClientSummary> {
        let mut link = self.client_link(trainer_id, trainee_id).await?;
        if let Some(status) = request.status {
            link.status = status;
        }
        if let Some(notes) = request.notes {
            link.notes = Some(notes);
        }
        self.repos.clients.put(&link).await?;

        self.summarize(link)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client"))
    }

    async fn remove_client(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<()> {
        self.client_link(trainer_id, trainee_id).await?;
        self.repos.clients.remove(trainer_id, trainee_id).await?;
        info!("Trainer {} removed client {}", trainer_id, trainee_id);
        Ok(())
    }

    async fn client_metrics(
        &self,
        trainer_id: &str,
        trainee_id: &str,
        filter: MetricFilter,
    ) -> ServiceResult<Vec<Metric>> {
        self.client_link(trainer_id, trainee_id).await?;
        let mut metrics: Vec<Metric> = self
            .repos
            .metrics
            .list(trainee_id)
            .await?
            .into_iter()
            .filter(|m| filter.metric_type.map_or(true, |t| m.metric_type == t))
            .collect();
        metrics.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(metrics)
    }

    async fn client_sessions(&self, trainer_id: &str, trainee_id: &str) -> ServiceResult<Vec<SessionCard>> {
        self.client_link(trainer_id, trainee_id).await?;
        let mut cards: Vec<SessionCard> = self
            .repos
            .session_cards
            .list(trainee_id)
            .await?
            .into_iter()
            .filter(|c| c.trainer_id == trainer_id)
            .collect();
        cards.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(cards)
    }

    async fn record_client_metric(
        &self,
        trainer_id: &str,
        trainee_id: &str,
        request: RecordMetricRequest,
    ) -> ServiceResult<Metric> {
        request.validate()?;
        self.client_link(trainer_id, trainee_id).await?;

        let metric = Metric {
            id: new_id(),
            trainee_id: trainee_id.to_string(),
            date: request.date,
            metric_type: request.metric_type,
            value: request.value,
            unit: request.unit,
            notes: request.notes,
            recorded_by: Some(trainer_id.to_string()),
            created_at: Utc::now(),
        };
        self.repos.metrics.put(&metric).await?;
        Ok(metric)
    }

    async fn list_schedules(&self, trainer_id: &str, filter: ScheduleFilter) -> ServiceResult<Vec<Schedule>> {
        let filter = ScheduleFilter {
            trainer_id: None,
            ..filter
        };
        Ok(self
            .trainer_schedules(trainer_id)
            .await?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect())
    }

    async fn schedule_detail(&self, trainer_id: &str, id: &str) -> ServiceResult<Schedule> {
        self.owned_schedule(trainer_id, id).await
    }

    #[instrument(skip(self, request))]
    async fn create_schedule(&self, trainer_id: &str, request: CreateScheduleRequest) -> ServiceResult<Schedule> {
        request.validate()?;
        self.client_link(trainer_id, &request.trainee_id).await?;

        let now = Utc::now();
        let schedule = Schedule {
            id: new_id(),
            trainer_id: trainer_id.to_string(),
            trainee_id: request.trainee_id,
            date: request.date,
            time: request.time,
            duration: request.duration,
            title: request.title.trim().to_string(),
            description: request.description,
            session_type: request.session_type,
            planned_exercises: request.planned_exercises,
            location: request.location,
            status: ScheduleStatus::Scheduled,
            notes: request.notes,
            cancellation_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            session_card_id: None,
            created_at: now,
            updated_at: now,
        };
        self.repos.schedules.put(&schedule).await?;
        info!("Schedule {} created for trainee {}", schedule.id, schedule.trainee_id);

        notify(&self.repos, session_scheduled(&schedule)).await;
        Ok(schedule)
    }

    #[instrument(skip(self, request))]
    async fn update_schedule(
        &self,
        trainer_id: &str,
        id: &str,
        request: UpdateScheduleRequest,
    ) -> ServiceResult<Schedule> {
        request.validate()?;
        let mut schedule = self.owned_schedule(trainer_id, id).await?;
        if !schedule.status.is_open() {
            return Err(ServiceError::InvalidInput(format!(
                "Cannot edit a {} session",
                schedule.status.as_str()
            )));
        }
        let before = schedule.clone();

        if let Some(status) = request.status {
            if !schedule.status.can_transition_to(status) {
                return Err(ServiceError::InvalidInput(format!(
                    "Cannot change a {} session to {}",
                    schedule.status.as_str(),
                    status.as_str()
                )));
            }
            if status == ScheduleStatus::Cancelled {
                schedule.cancelled_at = Some(Utc::now());
                schedule.cancelled_by = Some(trainer_id.to_string());
            }
            schedule.status = status;
        }

        if let Some(date) = request.date {
            schedule.date = date;
        }
        if let Some(time) = request.time {
            schedule.time = time;
        }
        if let Some(duration) = request.duration {
            schedule.duration = duration;
        }
        if let Some(title) = request.title {
            schedule.title = title.trim().to_string();
        }
        if request.description.is_some() {
            schedule.description = request.description;
        }
        if request.session_type.is_some() {
            schedule.session_type = request.session_type;
        }
        if let Some(planned) = request.planned_exercises {
            schedule.planned_exercises = planned;
        }
        if request.location.is_some() {
            schedule.location = request.location;
        }
        if request.notes.is_some() {
            schedule.notes = request.notes;
        }
        if schedule == before {
            return Ok(schedule);
        }
        schedule.updated_at = Utc::now();

        self.repos.schedules.put(&schedule).await?;

        let notification = if schedule.status == ScheduleStatus::Cancelled {
            session_cancelled(&schedule)
        } else {
            session_updated(&schedule)
        };
        notify(&self.repos, notification).await;

        Ok(schedule)
    }

    #[instrument(skip(self, request))]
    async fn cancel_schedule(
        &self,
        trainer_id: &str,
        id: &str,
        request: CancelScheduleRequest,
    ) -> ServiceResult<Schedule> {
        let mut schedule = self.owned_schedule(trainer_id, id).await?;
        if schedule.status == ScheduleStatus::Cancelled {
            return Ok(schedule);
        }
        if !schedule.status.can_transition_to(ScheduleStatus::Cancelled) {
            return Err(ServiceError::InvalidInput(format!(
                "Cannot cancel a {} session",
                schedule.status.as_str()
            )));
        }

        let now = Utc::now();
        schedule.status = ScheduleStatus::Cancelled;
        schedule.cancellation_reason = request.reason;
        schedule.cancelled_at = Some(now);
        schedule.cancelled_by = Some(trainer_id.to_string());
        schedule.updated_at = now;
        self.repos.schedules.put(&schedule).await?;

        notify(&self.repos, session_cancelled(&schedule)).await;
        Ok(schedule)
    }

    async fn list_sessions(&self, trainer_id: &str, filter: SessionFilter) -> ServiceResult<Vec<SessionCard>> {
        let mut cards: Vec<SessionCard> = self
            .repos
            .session_cards
            .list_all()
            .await?
            .into_iter()
            .filter(|c| c.trainer_id == trainer_id && filter.matches(c))
            .collect();
        cards.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(cards)
    }

    async fn session_detail(&self, trainer_id: &str, id: &str) -> ServiceResult<SessionCard> {
        self.owned_session(trainer_id, id).await
    }

    #[instrument(skip(self, request))]
    async fn create_session(
        &self,
        trainer_id: &str,
        request: CreateSessionCardRequest,
    ) -> ServiceResult<SessionCard> {
        request.validate()?;
        self.client_link(trainer_id, &request.trainee_id).await?;

        let linked = match &request.schedule_id {
            Some(schedule_id) => {
                let schedule = self.owned_schedule(trainer_id, schedule_id).await?;
                if schedule.trainee_id != request.trainee_id {
                    return Err(ServiceError::InvalidInput(
                        "Schedule belongs to another trainee".to_string(),
                    ));
                }
                if schedule.session_card_id.is_some() {
                    return Err(ServiceError::InvalidInput(
                        "Schedule already has a session card".to_string(),
                    ));
                }
                if !schedule.status.can_transition_to(ScheduleStatus::Completed) {
                    return Err(ServiceError::InvalidInput(format!(
                        "Cannot complete a {} session",
                        schedule.status.as_str()
                    )));
                }
                Some(schedule)
            }
            None => None,
        };

        let now = Utc::now();
        let card = SessionCard {
            id: new_id(),
            schedule_id: request.schedule_id,
            trainer_id: trainer_id.to_string(),
            trainee_id: request.trainee_id,
            date: request.date,
            title: request.title.trim().to_string(),
            duration: request.duration,
            totals: SessionTotals::from_exercises(&request.exercises),
            exercises: request.exercises,
            overall_feedback: request.overall_feedback,
            next_session_goals: request.next_session_goals,
            trainer_rating: request.trainer_rating,
            created_at: now,
            updated_at: now,
        };
        self.repos.session_cards.put(&card).await?;

        if let Some(mut schedule) = linked {
            schedule.status = ScheduleStatus::Completed;
            schedule.session_card_id = Some(card.id.clone());
            schedule.updated_at = now;
            self.repos.schedules.put(&schedule).await?;
        }

        self.record_progress(trainer_id, &card.trainee_id).await?;

        notify(
            &self.repos,
            Notification::new(
                &card.trainee_id,
                NotificationType::Progress,
                "Session summary available",
                format!("Your trainer wrote up {} from {}", card.title, card.date),
            )
            .with_related("session_card", &card.id)
            .with_action_url(format!("/trainee/sessions/{}", card.id)),
        )
        .await;

        info!("Session card {} created for trainee {}", card.id, card.trainee_id);
        Ok(card)
    }

    async fn update_session(
        &self,
        trainer_id: &str,
        id: &str,
        request: UpdateSessionCardRequest,
    ) -> ServiceResult<SessionCard> {
        request.validate()?;
        let mut card = self.owned_session(trainer_id, id).await?;

        if let Some(title) = request.title {
            card.title = title.trim().to_string();
        }
        if let Some(duration) = request.duration {
            card.duration = duration;
        }
        if let Some(exercises) = request.exercises {
            card.totals = SessionTotals::from_exercises(&exercises);
            card.exercises = exercises;
        }
        if request.overall_feedback.is_some() {
            card.overall_feedback = request.overall_feedback;
        }
        if let Some(goals) = request.next_session_goals {
            card.next_session_goals = goals;
        }
        if request.trainer_rating.is_some() {
            card.trainer_rating = request.trainer_rating;
        }
        card.updated_at = Utc::now();

        self.repos.session_cards.put(&card).await?;
        Ok(card)
    }

    async fn delete_session(&self, trainer_id: &str, id: &str) -> ServiceResult<()> {
        let card = self.owned_session(trainer_id, id).await?;
        self.repos.session_cards.remove(&card.trainee_id, &card.id).await?;

        if let Some(schedule_id) = &card.schedule_id {
            if let Some(mut schedule) = self.repos.schedules.get(&card.trainee_id, schedule_id).await? {
                if schedule.session_card_id.as_deref() == Some(card.id.as_str()) {
                    schedule.session_card_id = None;
                    if schedule.status == ScheduleStatus::Completed {
                        schedule.status = ScheduleStatus::Scheduled;
                    }
                    schedule.updated_at = Utc::now();
                    self.repos.schedules.put(&schedule).await?;
                }
            }
        }

        self.revert_progress(trainer_id, &card.trainee_id).await?;
        info!("Session card {} deleted for trainee {}", card.id, card.trainee_id);
        Ok(())
    }

    async fn list_programs(&self, trainer_id: &str) -> ServiceResult<Vec<Program>> {
        let mut programs = self.repos.programs.list(trainer_id).await?;
        programs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(programs)
    }

    async fn program_detail(&self, trainer_id: &str, id: &str) -> ServiceResult<Program> {
        self.owned_program(trainer_id, id).await
    }

    async fn create_program(&self, trainer_id: &str, request: CreateProgramRequest) -> ServiceResult<Program> {
        request.validate()?;

        let now = Utc::now();
        let program = Program {
            id: new_id(),
            trainer_id: trainer_id.to_string(),
            name: request.name.trim().to_string(),
            description: request.description,
            total_weeks: request.total_weeks,
            sessions_per_week: request.sessions_per_week,
            goals: request.goals,
            target_fitness_level: request.target_fitness_level,
            weekly_schedule: request.weekly_schedule,
            exercises: request.exercises,
            status: request.status.unwrap_or_default(),
            total_assignments: 0,
            created_at: now,
            updated_at: now,
        };
        self.repos.programs.put(&program).await?;
        Ok(program)
    }

    async fn update_program(
        &self,
        trainer_id: &str,
        id: &str,
        request: UpdateProgramRequest,
    ) -> ServiceResult<Program> {
        request.validate()?;
        let mut program = self.owned_program(trainer_id, id).await?;

        if let Some(name) = request.name {
            program.name = name.trim().to_string();
        }
        if request.description.is_some() {
            program.description = request.description;
        }
        if let Some(weeks) = request.total_weeks {
            program.total_weeks = weeks;
        }
        if let Some(per_week) = request.sessions_per_week {
            program.sessions_per_week = per_week;
        }
        if let Some(goals) = request.goals {
            program.goals = goals;
        }
        if request.target_fitness_level.is_some() {
            program.target_fitness_level = request.target_fitness_level;
        }
        if let Some(weekly) = request.weekly_schedule {
            program.weekly_schedule = weekly;
        }
        if let Some(exercises) = request.exercises {
            program.exercises = exercises;
        }
        if let Some(status) = request.status {
            program.status = status;
        }
        program.updated_at = Utc::now();

        self.repos.programs.put(&program).await?;
        Ok(program)
    }

    async fn delete_program(&self, trainer_id: &str, id: &str) -> ServiceResult<()> {
        self.owned_program(trainer_id, id).await?;
        self.repos.programs.remove(trainer_id, id).await?;
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn assign_program(
        &self,
        trainer_id: &str,
        program_id: &str,
        request: AssignProgramRequest,
    ) -> ServiceResult<ProgramAssignment> {
        request.validate()?;
        let mut program = self.owned_program(trainer_id, program_id).await?;
        self.client_link(trainer_id, &request.trainee_id).await?;

        let now = Utc::now();
        let assignment = ProgramAssignment {
            id: new_id(),
            program_id: program.id.clone(),
            trainee_id: request.trainee_id,
            trainer_id: trainer_id.to_string(),
            start_date: request.start_date,
            end_date: request.start_date + Duration::weeks(program.total_weeks as i64),
            current_week: 1,
            sessions_completed: 0,
            total_sessions: program.total_sessions(),
            status: AssignmentStatus::Active,
            progress_notes: request.notes.into_iter().collect(),
            created_at: now,
            updated_at: now,
        };
        self.repos.assignments.put(&assignment).await?;

        program.total_assignments += 1;
        program.updated_at = now;
        self.repos.programs.put(&program).await?;

        notify(
            &self.repos,
            Notification::new(
                &assignment.trainee_id,
                NotificationType::Progress,
                "New program assigned",
                format!("{} starts on {}", program.name, assignment.start_date),
            )
            .with_related("assignment", &assignment.id)
            .with_action_url(format!("/trainee/programs/{}", assignment.id)),
        )
        .await;

        info!("Program {} assigned to trainee {}", program.id, assignment.trainee_id);
        Ok(assignment)
    }

    async fn list_exercises(&self, trainer_id: &str) -> ServiceResult<Vec<LibraryExercise>> {
        let mut exercises = self.repos.exercises.list(trainer_id).await?;
        exercises.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(exercises)
    }

    async fn create_exercise(&self, trainer_id: &str, request: ExerciseRequest) -> ServiceResult<LibraryExercise> {
        request.validate()?;

        let now = Utc::now();
        let exercise = LibraryExercise {
            id: new_id(),
            trainer_id: trainer_id.to_string(),
            name: request.name.trim().to_string(),
            category: request.category,
            description: request.description,
            equipment: request.equipment,
            created_at: now,
            updated_at: now,
        };
        self.repos.exercises.put(&exercise).await?;
        Ok(exercise)
    }

    async fn update_exercise(
        &self,
        trainer_id: &str,
        id: &str,
        request: ExerciseRequest,
    ) -> ServiceResult<LibraryExercise> {
        request.validate()?;
        let mut exercise = self.owned_exercise(trainer_id, id).await?;

        exercise.name = request.name.trim().to_string();
        exercise.category = request.category;
        exercise.description = request.description;
        exercise.equipment = request.equipment;
        exercise.updated_at = Utc::now();

        self.repos.exercises.put(&exercise).await?;
        Ok(exercise)
    }

    async fn delete_exercise(&self, trainer_id: &str, id: &str) -> ServiceResult<()> {
        self.owned_exercise(trainer_id, id).await?;
        self.repos.exercises.remove(trainer_id, id).await?;
        Ok(())
    }

    async fn exercise_categories(&self) -> ServiceResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .repos
            .exercises
            .list_all()
            .await?
            .into_iter()
            .filter_map(|e| e.category)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(categories.into_iter().collect())
    }
}

pub fn create_trainer_service(repos: Repositories) -> impl TrainerServiceTrait {
    TrainerService::new(repos)
}
