//! Read side of the trainee app plus notification management
//!
//! Every call is scoped to the caller: records owned by someone else answer 404
//! exactly like records that do not exist.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, instrument};

use crate::entities::{
    round1, streaks, AssignedProgram, AssignmentStatus, CalendarDay, CurrentProgram, MarkAllReadResult, Metric,
    MetricFilter, Notification, NotificationFilter, NotificationPage, NotificationType, Pagination, Program,
    ProgramAssignment, ProgramSummary, Schedule, ScheduleFilter, ScheduleStatus, SessionCard, SessionFilter,
    TraineeStats, UpcomingSchedules, User,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::Repositories;

pub const DEFAULT_UPCOMING_DAYS: u32 = 7;
pub const MAX_UPCOMING_DAYS: u32 = 60;
pub const DEFAULT_NOTIFICATION_LIMIT: usize = 20;
pub const MAX_NOTIFICATION_LIMIT: usize = 100;
const RECENT_ACHIEVEMENTS: usize = 5;

#[async_trait]
pub trait TraineeServiceTrait: Send + Sync {
    /// Open sessions in `[today, today + days)` and a calendar strip of the window
    async fn upcoming_schedules(
        &self,
        trainee_id: &str,
        today: NaiveDate,
        days: Option<u32>,
    ) -> ServiceResult<UpcomingSchedules>;

    async fn schedules(&self, trainee_id: &str, filter: ScheduleFilter) -> ServiceResult<Vec<Schedule>>;

    async fn schedule_detail(&self, trainee_id: &str, id: &str) -> ServiceResult<Schedule>;

    /// The active program started most recently, with its next session
    async fn current_program(&self, trainee_id: &str, today: NaiveDate) -> ServiceResult<CurrentProgram>;

    async fn programs(&self, trainee_id: &str) -> ServiceResult<Vec<AssignedProgram>>;

    async fn program_detail(&self, trainee_id: &str, assignment_id: &str) -> ServiceResult<AssignedProgram>;

    async fn stats(&self, trainee_id: &str, today: NaiveDate) -> ServiceResult<TraineeStats>;

    /// One page of notifications, newest first
    async fn notifications(&self, user_id: &str, filter: NotificationFilter) -> ServiceResult<NotificationPage>;

    async fn mark_notification_read(&self, user_id: &str, id: &str) -> ServiceResult<Notification>;

    async fn mark_all_notifications_read(&self, user_id: &str) -> ServiceResult<MarkAllReadResult>;

    async fn sessions(&self, trainee_id: &str, filter: SessionFilter) -> ServiceResult<Vec<SessionCard>>;

    async fn session_detail(&self, trainee_id: &str, id: &str) -> ServiceResult<SessionCard>;

    async fn search_sessions(&self, trainee_id: &str, query: &str) -> ServiceResult<Vec<SessionCard>>;

    async fn metrics(&self, trainee_id: &str, filter: MetricFilter) -> ServiceResult<Vec<Metric>>;

    async fn profile(&self, user_id: &str) -> ServiceResult<User>;
}

pub struct TraineeService {
    repos: Repositories,
}

impl TraineeService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn program_of(&self, assignment: &ProgramAssignment) -> ServiceResult<Option<Program>> {
        Ok(self
            .repos
            .programs
            .get(&assignment.trainer_id, &assignment.program_id)
            .await?)
    }

    async fn active_program(&self, trainee_id: &str) -> ServiceResult<Option<(ProgramAssignment, Program)>> {
        let mut active: Vec<ProgramAssignment> = self
            .repos
            .assignments
            .list(trainee_id)
            .await?
            .into_iter()
            .filter(|a| a.status == AssignmentStatus::Active)
            .collect();
        active.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        for assignment in active {
            if let Some(program) = self.program_of(&assignment).await? {
                return Ok(Some((assignment, program)));
            }
            debug!("Assignment {} points at a missing program", assignment.id);
        }
        Ok(None)
    }

    async fn sorted_schedules(&self, trainee_id: &str) -> ServiceResult<Vec<Schedule>> {
        let mut schedules = self.repos.schedules.list(trainee_id).await?;
        schedules.sort_by(|a, b| a.starts_at().cmp(&b.starts_at()));
        Ok(schedules)
    }
}

/// Fractional weeks between two dates, never less than one
fn weeks_between(first: NaiveDate, today: NaiveDate) -> f64 {
    let days = (today - first).num_days().max(0) as f64;
    (days / 7.0).max(1.0)
}

#[async_trait]
impl TraineeServiceTrait for TraineeService {
    #[instrument(skip(self))]
    async fn upcoming_schedules(
        &self,
        trainee_id: &str,
        today: NaiveDate,
        days: Option<u32>,
    ) -> ServiceResult<UpcomingSchedules> {
        let days = days.unwrap_or(DEFAULT_UPCOMING_DAYS).clamp(1, MAX_UPCOMING_DAYS);
        let end = today + Duration::days(days as i64);

        let upcoming_sessions: Vec<Schedule> = self
            .sorted_schedules(trainee_id)
            .await?
            .into_iter()
            .filter(|s| s.status.is_open() && s.date >= today && s.date < end)
            .collect();

        let calendar = (0..days as i64)
            .map(|offset| CalendarDay::new(today + Duration::days(offset), today, &upcoming_sessions))
            .collect();

        Ok(UpcomingSchedules {
            upcoming_sessions,
            calendar,
        })
    }

    async fn schedules(&self, trainee_id: &str, filter: ScheduleFilter) -> ServiceResult<Vec<Schedule>> {
        let filter = ScheduleFilter {
            trainee_id: None,
            ..filter
        };
        Ok(self
            .sorted_schedules(trainee_id)
            .await?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect())
    }

    async fn schedule_detail(&self, trainee_id: &str, id: &str) -> ServiceResult<Schedule> {
        self.repos
            .schedules
            .get(trainee_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Schedule"))
    }

    #[instrument(skip(self))]
    async fn current_program(&self, trainee_id: &str, today: NaiveDate) -> ServiceResult<CurrentProgram> {
        let (assignment, program) = self
            .active_program(trainee_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No active program".to_string()))?;

        let next_session = self
            .sorted_schedules(trainee_id)
            .await?
            .into_iter()
            .find(|s| s.status.is_open() && s.date >= today);

        Ok(CurrentProgram {
            progress_percentage: assignment.progress_percentage(),
            current_week: assignment.week_on(today, program.total_weeks),
            assignment,
            program,
            next_session,
        })
    }

    async fn programs(&self, trainee_id: &str) -> ServiceResult<Vec<AssignedProgram>> {
        let mut assignments = self.repos.assignments.list(trainee_id).await?;
        assignments.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        let mut programs = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            if let Some(program) = self.program_of(&assignment).await? {
                programs.push(AssignedProgram {
                    progress_percentage: assignment.progress_percentage(),
                    assignment,
                    program,
                });
            }
        }
        Ok(programs)
    }

    async fn program_detail(&self, trainee_id: &str, assignment_id: &str) -> ServiceResult<AssignedProgram> {
        let assignment = self
            .repos
            .assignments
            .get(trainee_id, assignment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Program"))?;
        let program = self
            .program_of(&assignment)
            .await?
            .ok_or_else(|| ServiceError::not_found("Program"))?;

        Ok(AssignedProgram {
            progress_percentage: assignment.progress_percentage(),
            assignment,
            program,
        })
    }

    #[instrument(skip(self))]
    async fn stats(&self, trainee_id: &str, today: NaiveDate) -> ServiceResult<TraineeStats> {
        let schedules = self.repos.schedules.list(trainee_id).await?;

        let completed: Vec<&Schedule> = schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Completed)
            .collect();
        let upcoming_sessions = schedules
            .iter()
            .filter(|s| s.status.is_open() && s.date >= today)
            .count();
        let cancelled_sessions = schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Cancelled)
            .count();

        let minutes: u32 = completed.iter().map(|s| s.duration).sum();

        let training_days: BTreeSet<NaiveDate> = completed
            .iter()
            .map(|s| s.date)
            .filter(|d| *d <= today)
            .collect();
        let training_days: Vec<NaiveDate> = training_days.into_iter().collect();
        let (current_streak, longest_streak) = streaks(&training_days, today);

        let average_sessions_per_week = match completed.iter().map(|s| s.date).min() {
            Some(first) => round1(completed.len() as f64 / weeks_between(first, today)),
            None => 0.0,
        };

        let current_program = self
            .active_program(trainee_id)
            .await?
            .map(|(assignment, program)| ProgramSummary {
                assignment_id: assignment.id.clone(),
                name: program.name.clone(),
                progress_percentage: assignment.progress_percentage(),
                current_week: assignment.week_on(today, program.total_weeks),
                total_weeks: program.total_weeks,
            });

        let mut recent_achievements: Vec<Notification> = self
            .repos
            .notifications
            .list(trainee_id)
            .await?
            .into_iter()
            .filter(|n| n.notification_type == NotificationType::Achievement)
            .collect();
        recent_achievements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_achievements.truncate(RECENT_ACHIEVEMENTS);

        Ok(TraineeStats {
            total_sessions: schedules.len(),
            completed_sessions: completed.len(),
            upcoming_sessions,
            cancelled_sessions,
            total_workout_hours: round1(minutes as f64 / 60.0),
            current_streak,
            longest_streak,
            average_sessions_per_week,
            current_program,
            recent_achievements,
        })
    }

    async fn notifications(&self, user_id: &str, filter: NotificationFilter) -> ServiceResult<NotificationPage> {
        let limit = filter
            .limit
            .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
            .clamp(1, MAX_NOTIFICATION_LIMIT);
        let page = filter.page.unwrap_or(1).max(1);

        let mut all = self.repos.notifications.list(user_id).await?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let unread_count = all.iter().filter(|n| !n.is_read).count();

        let matching: Vec<Notification> = all
            .into_iter()
            .filter(|n| !filter.unread_only.unwrap_or(false) || !n.is_read)
            .filter(|n| {
                filter
                    .notification_type
                    .map_or(true, |t| n.notification_type == t)
            })
            .collect();
        let total_items = matching.len();

        let notifications = matching
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(NotificationPage {
            notifications,
            pagination: Pagination::new(page, limit, total_items),
            unread_count,
        })
    }

    async fn mark_notification_read(&self, user_id: &str, id: &str) -> ServiceResult<Notification> {
        let mut notification = self
            .repos
            .notifications
            .get(user_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification"))?;

        if notification.mark_read(Utc::now()) {
            self.repos.notifications.put(&notification).await?;
        }
        Ok(notification)
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> ServiceResult<MarkAllReadResult> {
        let now = Utc::now();
        let changed: Vec<Notification> = self
            .repos
            .notifications
            .list(user_id)
            .await?
            .into_iter()
            .filter_map(|mut n| n.mark_read(now).then_some(n))
            .collect();

        if !changed.is_empty() {
            self.repos.notifications.put_many(&changed).await?;
        }
        debug!("Marked {} notifications read for {}", changed.len(), user_id);

        Ok(MarkAllReadResult {
            marked_count: changed.len(),
        })
    }

    async fn sessions(&self, trainee_id: &str, filter: SessionFilter) -> ServiceResult<Vec<SessionCard>> {
        let filter = SessionFilter {
            trainee_id: None,
            ..filter
        };
        let mut cards: Vec<SessionCard> = self
            .repos
            .session_cards
            .list(trainee_id)
            .await?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        cards.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(cards)
    }

    async fn session_detail(&self, trainee_id: &str, id: &str) -> ServiceResult<SessionCard> {
        self.repos
            .session_cards
            .get(trainee_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Session"))
    }

    async fn search_sessions(&self, trainee_id: &str, query: &str) -> ServiceResult<Vec<SessionCard>> {
        if query.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Search query is required".to_string()));
        }

        let mut cards: Vec<SessionCard> = self
            .repos
            .session_cards
            .list(trainee_id)
            .await?
            .into_iter()
            .filter(|c| c.matches_query(query))
            .collect();
        cards.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(cards)
    }

    async fn metrics(&self, trainee_id: &str, filter: MetricFilter) -> ServiceResult<Vec<Metric>> {
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

    async fn profile(&self, user_id: &str) -> ServiceResult<User> {
        self.repos
            .users
            .get("", user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }
}

pub fn create_trainee_service(repos: Repositories) -> impl TraineeServiceTrait {
    TraineeService::new(repos)
}
