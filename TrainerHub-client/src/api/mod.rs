//! Typed wrappers over the REST and function surfaces

mod auth;
mod functions;
mod trainee;
mod trainer;

pub use auth::AuthApi;
pub use functions::FunctionsApi;
pub use trainee::TraineeApi;
pub use trainer::TrainerApi;
