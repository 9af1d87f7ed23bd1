// TrainerHub Data
// This crate handles persistence through a generic key-value store

// Database connection management
pub mod database;

// Key-value stores and typed record collections
pub mod repository;
