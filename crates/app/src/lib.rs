//! # cronpilot-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationRepository`: CRUD and counters for automations
//!   - `ExecutionRepository`: execution history
//!   - `AiProvider`: text completions
//!   - `InboxSink` / `InboxRepository`: the inbox action sink and its read side
//! - Run the **trigger scheduler**: one timer task per cron trigger, plus the
//!   startup backfill of missed fires
//! - Run the **execution orchestrator**: record, complete, act, count
//! - Run the **action pipeline** and its handlers (inbox)
//! - Expose **services** used by the driving adapters (HTTP)
//!
//! ## Dependency rule
//! Depends on `cronpilot-domain` only (plus `tokio` for tasks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod actions;
pub mod orchestrator;
pub mod ports;
pub mod scheduler;
pub mod services;

#[cfg(test)]
mod testing;
