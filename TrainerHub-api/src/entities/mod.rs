// Public entities for the TrainerHub API
// Wire shapes owned by the HTTP layer; records and requests come from the domain crate.

// Success envelope of the REST surface
pub mod common;

// Response bodies of the serverless function surface
pub mod functions;
