// TrainerHub Domain
// This crate contains the business logic for the TrainerHub application

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Error type and wire envelope shared by all services
pub mod errors;

// Health checks and system status
pub mod health;

// Typed collections over the key-value store
pub mod repositories;

// Re-export the database module from the data crate for convenience
pub use trainer_hub_data::database;

// Testing utilities - only available with mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
