//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the discharge-planning
//! engine on PostgreSQL using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern, providing data access
//! abstractions that hide the database implementation details from the domain
//! layer. Task status transitions are persisted with guarded updates: every
//! write states the status it expects to replace, and a write that matches no
//! row surfaces as [`DatabaseError::Conflict`] instead of silently clobbering
//! a concurrent change.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, TaskRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/discharge")).await?;
//! let repo = TaskRepository::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::notifications::NotificationRepository;
pub use repositories::patients::PatientRepository;
pub use repositories::tasks::TaskRepository;
