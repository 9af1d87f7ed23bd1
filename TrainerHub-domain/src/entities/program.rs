use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use trainer_hub_data::repository::Record;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::schedule::Schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

/// Exercise prescribed by a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProgramExercise {
    #[validate(length(min = 1, message = "Exercise name is required"))]
    pub name: String,
    pub sets: u32,
    /// Free-form rep scheme such as `8-12`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WeeklySession {
    pub day: String,
    pub focus: String,
    /// Minutes
    pub duration: u32,
}

/// Training program authored by a trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub trainer_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_weeks: u32,
    pub sessions_per_week: u32,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_fitness_level: Option<String>,
    #[serde(default)]
    pub weekly_schedule: Vec<WeeklySession>,
    #[serde(default)]
    pub exercises: Vec<ProgramExercise>,
    #[serde(default)]
    pub status: ProgramStatus,
    #[serde(default)]
    pub total_assignments: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Program {
    pub fn total_sessions(&self) -> u32 {
        self.total_weeks * self.sessions_per_week
    }
}

impl Record for Program {
    const NAMESPACE: &'static str = "programs";

    fn owner(&self) -> &str {
        &self.trainer_id
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Active,
    Completed,
    Paused,
    Cancelled,
}

/// A program handed to one trainee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProgramAssignment {
    pub id: String,
    pub program_id: String,
    pub trainee_id: String,
    pub trainer_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub current_week: u32,
    pub sessions_completed: u32,
    pub total_sessions: u32,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub progress_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgramAssignment {
    /// Share of sessions completed, in percent, capped at 100
    pub fn progress_percentage(&self) -> f64 {
        if self.total_sessions == 0 {
            return 0.0;
        }
        let pct = self.sessions_completed as f64 / self.total_sessions as f64 * 100.0;
        (pct.min(100.0) * 10.0).round() / 10.0
    }

    /// One-based week of the program that contains `today`
    pub fn week_on(&self, today: NaiveDate, total_weeks: u32) -> u32 {
        if today < self.start_date {
            return 1;
        }
        let week = ((today - self.start_date).num_days() / 7) as u32 + 1;
        week.min(total_weeks.max(1))
    }
}

impl Record for ProgramAssignment {
    const NAMESPACE: &'static str = "assignments";

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
pub struct CreateProgramRequest {
    #[validate(length(min = 1, max = 200, message = "Program name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 104, message = "Total weeks must be between 1 and 104"))]
    pub total_weeks: u32,
    #[validate(range(min = 1, max = 14, message = "Sessions per week must be between 1 and 14"))]
    pub sessions_per_week: u32,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub target_fitness_level: Option<String>,
    #[serde(default)]
    pub weekly_schedule: Vec<WeeklySession>,
    #[serde(default)]
    #[validate]
    pub exercises: Vec<ProgramExercise>,
    #[serde(default)]
    pub status: Option<ProgramStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgramRequest {
    #[validate(length(min = 1, max = 200, message = "Program name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 104, message = "Total weeks must be between 1 and 104"))]
    pub total_weeks: Option<u32>,
    #[validate(range(min = 1, max = 14, message = "Sessions per week must be between 1 and 14"))]
    pub sessions_per_week: Option<u32>,
    pub goals: Option<Vec<String>>,
    pub target_fitness_level: Option<String>,
    pub weekly_schedule: Option<Vec<WeeklySession>>,
    pub exercises: Option<Vec<ProgramExercise>>,
    pub status: Option<ProgramStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssignProgramRequest {
    #[validate(length(min = 1, message = "Trainee is required"))]
    pub trainee_id: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Assignment joined with the program it refers to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssignedProgram {
    pub assignment: ProgramAssignment,
    pub program: Program,
    pub progress_percentage: f64,
}

/// The trainee's active program with its next booked session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CurrentProgram {
    pub assignment: ProgramAssignment,
    pub program: Program,
    pub progress_percentage: f64,
    pub current_week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_session: Option<Schedule>,
}
