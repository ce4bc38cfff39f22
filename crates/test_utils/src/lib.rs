//! Test Utilities
//!
//! Shared builders and fixtures for the discharge-planning test suite.
//! Builders let tests specify only the relevant fields while using
//! predictable defaults for everything else.

pub mod builders;
pub mod fixtures;

pub use builders::{TestInstanceBuilder, TestPatientBuilder};
pub use fixtures::{IdFixtures, TemporalFixtures, TextFixtures};
