pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod models;

pub use error::{MigrationError, MigrationResult};
