//! # Shiftwatch Core Library
//!
//! Core business logic for Shiftwatch, an employee attendance and break
//! tracker. It implements a CLI-first philosophy: every operation is
//! available through the standalone CLI binary, and any richer front end
//! (a chat bot, a desktop shell) is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **State machines**: per-employee shift and break transitions,
//!   validated before mutation, with per-employee locking
//! - **Rule engine**: pure functions classifying transitions as policy
//!   violations
//! - **Sweeps**: time-triggered scans for ongoing violations and the
//!   daily forced shift closure
//! - **Reports**: read-only today/week/summary aggregation
//! - **Storage**: SQLite roster persistence and TOML policy files
//!
//! ## Key Components
//!
//! - [`AttendanceEngine`]: the boundary surface for front ends and
//!   schedulers
//! - [`EmployeeStore`]: concurrency-safe keyed roster
//! - [`WorkPolicy`]: shift window and per-break-kind allowances
//! - [`ViolationNotifier`]: trait for delivery channels

pub mod breaks;
pub mod engine;
pub mod error;
pub mod notify;
pub mod policy;
pub mod report;
pub mod rules;
pub mod shift;
pub mod state;
pub mod storage;
pub mod store;
pub mod sweep;
pub mod violation_log;

pub use engine::{AttendanceEngine, EmployeeAction, ForceTarget, TransitionResult};
pub use error::{ConfigError, CoreError, PolicyError, StorageError, TransitionError};
pub use notify::{LogNotifier, ViolationNotifier};
pub use policy::{BreakRule, FrequencyMode, WorkPolicy};
pub use report::{SummaryReport, TodayReport, WeekReport, WorkStatus};
pub use rules::{Violation, ViolationKind};
pub use shift::{ClosureRecord, ShiftSummary};
pub use state::EmployeeState;
pub use storage::RosterDb;
pub use store::EmployeeStore;
pub use violation_log::ViolationLog;
