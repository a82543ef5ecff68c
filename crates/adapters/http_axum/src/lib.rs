//! # cronpilot-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API (`/api/automations`, `/api/executions`, `/api/inbox`)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map [`CronpilotError`](cronpilot_domain::error::CronpilotError) into
//!   status codes and JSON error bodies
//!
//! ## Dependency rule
//! Depends on `cronpilot-app` (for port traits, services and the orchestrator)
//! and `cronpilot-domain` (for the types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
