//! Request/response data transfer objects

pub mod notifications;
pub mod tasks;
