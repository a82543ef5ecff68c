//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod ai_provider;
pub mod automation_repo;
pub mod execution_repo;
pub mod inbox;

pub use ai_provider::{AiProvider, Completion, CompletionOptions};
pub use automation_repo::AutomationRepository;
pub use execution_repo::ExecutionRepository;
pub use inbox::{InboxRepository, InboxSink};
