//! Task Workflow Domain
//!
//! The discharge-planning task engine: patients are enrolled into care
//! algorithms (Behavioral, Guardianship, Long-Term-Care) which generate a
//! graph of tasks with dependencies, recurrence, due dates, and status
//! transitions.
//!
//! # Architecture
//!
//! - **Catalog**: immutable task template reference data, built once
//! - **Instantiation**: derives the initial task set from patient attributes
//! - **Lifecycle**: the per-instance state machine (start, complete, miss,
//!   follow up, acknowledge)
//! - **Scheduler**: recurrence and dependent-task unlocking on completion
//! - **Sweep**: pure predicates backing the periodic auto-miss and
//!   court-date-reminder triggers
//!
//! All logic in this crate is pure: the caller supplies the current instant
//! and the relevant persisted state, and receives the instances to create or
//! the mutation applied in place. Persistence lives in `infra_db`.

pub mod catalog;
pub mod patient;
pub mod instance;
pub mod instantiation;
pub mod lifecycle;
pub mod scheduler;
pub mod sweep;
pub mod notify;
pub mod error;

pub use catalog::{Algorithm, CourtDateTarget, TaskCatalog, TaskTemplate};
pub use patient::{PatientProfile, PatientStatus};
pub use instance::{can_transition, StatusHistoryEntry, TaskInstance, TaskStatus, TransitionContext};
pub use instantiation::initial_tasks;
pub use lifecycle::{CompletionOutcome, CompletionRequest};
pub use scheduler::{run_cascade, CascadeInput};
pub use notify::{Notification, NotificationEmitter};
pub use error::TaskError;
