// TrainerHub API
//
// HTTP surface of the TrainerHub application: the versioned REST API, the serverless
// function endpoints, and the configuration that wires them to a store.

pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;
