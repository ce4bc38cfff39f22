//! Repository implementations
//!
//! Each repository wraps the connection pool and exposes the persistence
//! operations one aggregate needs. Conversions between database rows and
//! domain types live next to the repository that owns them.

pub mod notifications;
pub mod patients;
pub mod tasks;
