//! Request handlers

pub mod health;
pub mod notifications;
pub mod patients;
pub mod tasks;
