//! Core Kernel - Foundational types and utilities for the discharge-planning system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed identifiers for patients, staff, hospitals, and tasks
//! - Timezone-aware date resolution for due-date arithmetic

pub mod temporal;
pub mod identifiers;

pub use temporal::{Timezone, TemporalError, DEFAULT_TIMEZONE};
pub use identifiers::{
    PatientId, StaffId, HospitalId,
    TaskTemplateId, TaskInstanceId, NotificationId,
};
