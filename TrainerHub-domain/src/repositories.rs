//! Typed collections over the shared key-value store

use trainer_hub_data::repository::{Collection, SharedKvStore};

use crate::entities::{
    ClientLink, DaySchedule, LibraryExercise, Metric, Notification, Program, ProgramAssignment, Schedule,
    SessionCard, SessionSummary, User, WorkoutLog,
};

/// Every collection the services read or write
#[derive(Clone)]
pub struct Repositories {
    pub users: Collection<User>,
    pub clients: Collection<ClientLink>,
    pub schedules: Collection<Schedule>,
    pub programs: Collection<Program>,
    pub assignments: Collection<ProgramAssignment>,
    pub session_cards: Collection<SessionCard>,
    pub metrics: Collection<Metric>,
    pub notifications: Collection<Notification>,
    pub exercises: Collection<LibraryExercise>,
    pub day_schedules: Collection<DaySchedule>,
    pub workouts: Collection<WorkoutLog>,
    pub session_summaries: Collection<SessionSummary>,
    store: SharedKvStore,
}

impl Repositories {
    pub fn new(store: SharedKvStore) -> Self {
        Self {
            users: Collection::new(store.clone()),
            clients: Collection::new(store.clone()),
            schedules: Collection::new(store.clone()),
            programs: Collection::new(store.clone()),
            assignments: Collection::new(store.clone()),
            session_cards: Collection::new(store.clone()),
            metrics: Collection::new(store.clone()),
            notifications: Collection::new(store.clone()),
            exercises: Collection::new(store.clone()),
            day_schedules: Collection::new(store.clone()),
            workouts: Collection::new(store.clone()),
            session_summaries: Collection::new(store.clone()),
            store,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &SharedKvStore {
        &self.store
    }
}
