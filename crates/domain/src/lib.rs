//! # cronpilot-domain
//!
//! Pure domain model for the cronpilot AI automation runner.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Automations** (cron triggers + agent prompt + follow-up actions)
//! - Define **Triggers** and their cron schedules (parsing, next fire, missed-fire policy)
//! - Define **Actions** (post-completion side effects such as posting to the inbox)
//! - Define **Executions** (one record per firing, with a terminal status)
//! - Define the **Inbox** (conversations created by automations)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod execution;
pub mod inbox;
