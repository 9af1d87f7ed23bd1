//! Aggregated views computed from stored records

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::{IntoParams, ToSchema};

use super::notification::Notification;
use super::schedule::Schedule;

/// One day of the trainee calendar strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_name: String,
    pub is_today: bool,
    pub has_session: bool,
    pub session_count: usize,
}

impl CalendarDay {
    pub fn new(date: NaiveDate, today: NaiveDate, sessions: &[Schedule]) -> Self {
        let session_count = sessions.iter().filter(|s| s.date == date).count();
        Self {
            date,
            day_name: date.weekday().to_string(),
            is_today: date == today,
            has_session: session_count > 0,
            session_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpcomingSchedules {
    pub upcoming_sessions: Vec<Schedule>,
    pub calendar: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(IntoParams))]
#[cfg_attr(feature = "with-api", into_params(parameter_in = Query))]
pub struct UpcomingQuery {
    /// Window length in days, 1 to 60
    pub days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProgramSummary {
    pub assignment_id: String,
    pub name: String,
    pub progress_percentage: f64,
    pub current_week: u32,
    pub total_weeks: u32,
}

/// Training history figures for one trainee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TraineeStats {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub upcoming_sessions: usize,
    pub cancelled_sessions: usize,
    pub total_workout_hours: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub average_sessions_per_week: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_program: Option<ProgramSummary>,
    pub recent_achievements: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clients: usize,
    pub active_programs: usize,
    pub today_sessions: usize,
    pub this_week_sessions: usize,
    /// Percent of closed sessions that were completed
    pub completion_rate: f64,
    pub upcoming_sessions: Vec<Schedule>,
}

/// Current and longest runs of consecutive training days
///
/// `days` must be sorted and free of duplicates. The current run only counts when
/// it reaches today or yesterday.
pub fn streaks(days: &[NaiveDate], today: NaiveDate) -> (u32, u32) {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let current = match previous {
        Some(last) if last == today || last.succ_opt() == Some(today) => run,
        _ => 0,
    };

    (current, longest)
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_streaks() {
        assert_eq!(streaks(&[], d(10)), (0, 0));
        assert_eq!(streaks(&[d(1), d(2), d(3), d(7), d(8)], d(9)), (2, 3));
        assert_eq!(streaks(&[d(1), d(2), d(3), d(7), d(8)], d(8)), (2, 3));
        assert_eq!(streaks(&[d(1), d(2), d(3)], d(10)), (0, 3));
    }

    #[test]
    fn test_calendar_day() {
        let day = CalendarDay::new(d(4), d(4), &[]);
        assert_eq!(day.day_name, "Mon");
        assert!(day.is_today);
        assert!(!day.has_session);
    }
}
