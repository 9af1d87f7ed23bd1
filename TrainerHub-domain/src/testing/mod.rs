// Testing utilities and mock implementations for the domain layer
// Available to this crate's tests and, with the "mock" feature, to dependent crates

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use trainer_hub_data::repository::InMemoryKvStore;

use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::repositories::Repositories;

// Re-export the failing store from the data layer
pub use trainer_hub_data::repository::tests::FailingKvStore;

/// Repositories over a fresh in-memory store
pub fn in_memory_repositories() -> Repositories {
    Repositories::new(Arc::new(InMemoryKvStore::new()))
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    store_status: ComponentStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            store_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    pub fn with_degraded_store(mut self) -> Self {
        self.store_status = ComponentStatus::Degraded;
        self
    }

    pub fn with_unhealthy_store(mut self) -> Self {
        self.store_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components
            .insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "store".to_string(),
            HealthComponent {
                status: self.store_status,
                details: match self.store_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Store is responding slowly".to_string()),
                    ComponentStatus::Unhealthy => Some("Store connection failed".to_string()),
                },
            },
        );

        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        SystemHealth { status, components }
    }

    async fn check_store_status(&self) -> Result<bool, String> {
        match self.store_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Store connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}

/// Ready-made records for tests; trainer-side records belong to trainer `c1`
pub mod fixtures {
    use chrono::{Duration, NaiveDate, Utc};

    use crate::entities::{
        AssignmentStatus, ClientLink, ClientStatus, Metric, MetricType, Program, ProgramAssignment, ProgramStatus,
        Role, Schedule, ScheduleStatus, SessionCard, SessionTotals, User,
    };

    pub fn user(id: &str, email: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            name: id.to_uppercase(),
            role,
            phone_number: None,
            profile_image: None,
            created_at: Utc::now(),
        }
    }

    pub fn client_link(trainer_id: &str, trainee_id: &str) -> ClientLink {
        ClientLink {
            trainer_id: trainer_id.to_string(),
            trainee_id: trainee_id.to_string(),
            joined_at: Utc::now(),
            status: ClientStatus::Active,
            notes: None,
        }
    }

    pub fn schedule(id: &str, trainee_id: &str, date: NaiveDate, time: &str) -> Schedule {
        Schedule {
            id: id.to_string(),
            trainer_id: "c1".to_string(),
            trainee_id: trainee_id.to_string(),
            date,
            time: time.to_string(),
            duration: 60,
            title: "Training".to_string(),
            description: None,
            session_type: None,
            planned_exercises: vec![],
            location: None,
            status: ScheduleStatus::Scheduled,
            notes: None,
            cancellation_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            session_card_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn program(id: &str, trainer_id: &str, total_weeks: u32, sessions_per_week: u32) -> Program {
        Program {
            id: id.to_string(),
            trainer_id: trainer_id.to_string(),
            name: format!("Program {}", id),
            description: None,
            total_weeks,
            sessions_per_week,
            goals: vec![],
            target_fitness_level: None,
            weekly_schedule: vec![],
            exercises: vec![],
            status: ProgramStatus::Active,
            total_assignments: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Twelve-week, 24-session assignment from trainer `c1`
    pub fn assignment(id: &str, program_id: &str, trainee_id: &str, start_date: NaiveDate) -> ProgramAssignment {
        ProgramAssignment {
            id: id.to_string(),
            program_id: program_id.to_string(),
            trainee_id: trainee_id.to_string(),
            trainer_id: "c1".to_string(),
            start_date,
            end_date: start_date + Duration::weeks(12),
            current_week: 1,
            sessions_completed: 0,
            total_sessions: 24,
            status: AssignmentStatus::Active,
            progress_notes: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn session_card(id: &str, trainee_id: &str, date: NaiveDate) -> SessionCard {
        SessionCard {
            id: id.to_string(),
            schedule_id: None,
            trainer_id: "c1".to_string(),
            trainee_id: trainee_id.to_string(),
            date,
            title: "Session".to_string(),
            duration: 60,
            exercises: vec![],
            overall_feedback: None,
            next_session_goals: vec![],
            trainer_rating: None,
            totals: SessionTotals::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn metric(id: &str, trainee_id: &str, date: NaiveDate, value: f64) -> Metric {
        Metric {
            id: id.to_string(),
            trainee_id: trainee_id.to_string(),
            date,
            metric_type: MetricType::Weight,
            value,
            unit: "kg".to_string(),
            notes: None,
            recorded_by: None,
            created_at: Utc::now(),
        }
    }
}
