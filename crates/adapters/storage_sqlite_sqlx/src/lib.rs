//! # cronpilot-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `cronpilot-app::ports`
//!   (`AutomationRepository`, `ExecutionRepository`, `InboxSink`, `InboxRepository`)
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `cronpilot-app` (for port traits) and `cronpilot-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod automation_repo;
pub mod error;
pub mod execution_repo;
pub mod inbox;
pub mod pool;
mod row;

pub use automation_repo::SqliteAutomationRepository;
pub use execution_repo::SqliteExecutionRepository;
pub use inbox::SqliteInbox;
pub use pool::{Config, Database};
