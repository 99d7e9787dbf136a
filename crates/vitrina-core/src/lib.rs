//! Vitrina Core Library
//!
//! This crate provides the domain models, the requirement resolution engine,
//! the day completion evaluator, chunk protocol validation, configuration,
//! and error types shared across all Vitrina components.

pub mod chunking;
pub mod completion;
pub mod config;
pub mod error;
pub mod models;
pub mod resolution;
pub mod versioning;

// Re-export commonly used types
pub use completion::{evaluate_day, DayEvaluation};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use resolution::{resolve_requirement, RuleSet};
