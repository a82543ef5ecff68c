//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod automation_service;
pub mod execution_service;
pub mod inbox_service;

pub use automation_service::{AutomationService, ScheduleSync};
pub use execution_service::ExecutionService;
pub use inbox_service::InboxService;
