//! Access to the work item process REST APIs
//!
//! The importer and exporter only see the repository traits. [`DevOpsClient`]
//! implements them over HTTP; tests implement them in memory.

pub mod client;
pub mod constants;
pub mod error;
pub mod repository;
pub mod resilience;

pub use client::DevOpsClient;
pub use error::ApiError;
pub use repository::{
    ApiResult, ArtifactRepository, BehaviorRepository, FieldRepository, LayoutRepository, PicklistRepository,
    ProcessRepository, RuleRepository, StateRepository, WorkItemTypeRepository,
};
pub use resilience::{ApiLogger, ResilienceConfig, RetryClassifier, RetryConfig, RetryPolicy, RetryableError};
