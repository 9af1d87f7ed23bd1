use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use trainer_hub_data::repository::Record;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::{IntoParams, ToSchema};

/// One set performed during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    #[validate(range(min = 1, message = "Set number starts at 1"))]
    pub set_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    /// Kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    pub weight: Option<f64>,
    /// Seconds, for timed sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Rest after the set, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10, message = "RPE must be between 1 and 10"))]
    pub rpe: Option<u8>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionExercise {
    #[validate(length(min = 1, message = "Exercise name is required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate]
    pub sets: Vec<ExerciseSet>,
}

/// Aggregates derived from the exercises of a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    pub total_exercises: u32,
    pub total_sets: u32,
    pub completed_sets: u32,
    /// Sum of reps x weight over completed sets
    pub total_volume: f64,
}

impl SessionTotals {
    pub fn from_exercises(exercises: &[SessionExercise]) -> Self {
        let mut totals = SessionTotals {
            total_exercises: exercises.len() as u32,
            ..SessionTotals::default()
        };

        for set in exercises.iter().flat_map(|e| e.sets.iter()) {
            totals.total_sets += 1;
            if set.completed {
                totals.completed_sets += 1;
                if let (Some(reps), Some(weight)) = (set.reps, set.weight) {
                    totals.total_volume += reps as f64 * weight;
                }
            }
        }

        totals
    }
}

/// Post-workout summary written by the trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionCard {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    pub trainer_id: String,
    pub trainee_id: String,
    pub date: NaiveDate,
    pub title: String,
    /// Minutes
    pub duration: u32,
    #[serde(default)]
    pub exercises: Vec<SessionExercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_feedback: Option<String>,
    #[serde(default)]
    pub next_session_goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_rating: Option<u8>,
    #[serde(default)]
    pub totals: SessionTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionCard {
    /// Case-insensitive match against title, feedback and exercise names
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&needle)
            || self
                .overall_feedback
                .as_deref()
                .is_some_and(|f| f.to_lowercase().contains(&needle))
            || self
                .exercises
                .iter()
                .any(|e| e.name.to_lowercase().contains(&needle))
    }
}

impl Record for SessionCard {
    const NAMESPACE: &'static str = "session_cards";

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
pub struct CreateSessionCardRequest {
    #[serde(default)]
    pub schedule_id: Option<String>,
    #[validate(length(min = 1, message = "Trainee is required"))]
    pub trainee_id: String,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(range(min = 1, max = 480, message = "Duration must be between 1 and 480 minutes"))]
    pub duration: u32,
    #[serde(default)]
    #[validate]
    pub exercises: Vec<SessionExercise>,
    #[serde(default)]
    pub overall_feedback: Option<String>,
    #[serde(default)]
    pub next_session_goals: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub trainer_rating: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionCardRequest {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(range(min = 1, max = 480, message = "Duration must be between 1 and 480 minutes"))]
    pub duration: Option<u32>,
    pub exercises: Option<Vec<SessionExercise>>,
    pub overall_feedback: Option<String>,
    pub next_session_goals: Option<Vec<String>>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub trainer_rating: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(IntoParams))]
#[cfg_attr(feature = "with-api", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct SessionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trainee_id: Option<String>,
}

impl SessionFilter {
    pub fn matches(&self, card: &SessionCard) -> bool {
        self.start_date.map_or(true, |start| card.date >= start)
            && self.end_date.map_or(true, |end| card.date <= end)
            && self.trainee_id.as_deref().map_or(true, |id| card.trainee_id == id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(IntoParams))]
#[cfg_attr(feature = "with-api", into_params(parameter_in = Query))]
pub struct SearchQuery {
    /// Text to look for
    #[serde(default)]
    pub q: String,
}
