// Domain services
// Each service is a trait plus a store-backed implementation built by a factory function.

pub mod auth;
pub mod records;
pub mod trainee;
pub mod trainer;
mod notifications;

// Re-export service traits and factory functions
pub use auth::{create_auth_service, AuthService, AuthServiceTrait};
pub use records::{create_records_service, RecordsService, RecordsServiceTrait};
pub use trainee::{create_trainee_service, TraineeService, TraineeServiceTrait};
pub use trainer::{create_trainer_service, TrainerService, TrainerServiceTrait};
