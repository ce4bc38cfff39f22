//! End-to-end workflow tests
//!
//! Cross-module scenarios spanning instantiation, the lifecycle engine, and
//! the cascade scheduler.

use chrono::{TimeZone, Utc};
use std::collections::HashSet;

use domain_tasks::catalog::{names, TaskCatalog};
use domain_tasks::lifecycle::{self, CompletionRequest};
use domain_tasks::{initial_tasks, TaskStatus};
use test_utils::{IdFixtures, TemporalFixtures, TestPatientBuilder};

/// A guardianship patient is admitted, the identify-guardian task is
/// completed, and the next step of the track unlocks with the right
/// schedule.
#[test]
fn test_admission_completion_and_unlock() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new().guardianship_person().build();
    let admitted_at = TemporalFixtures::admission_instant();

    // Admission instantiates the standard guardianship opening set
    let mut instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        admitted_at,
    );
    assert_eq!(instances.len(), 3);

    let identify_id = catalog.find_by_name(names::IDENTIFY_GUARDIAN).unwrap().id;
    let mut identify = instances
        .drain(..)
        .find(|i| i.template_id == identify_id)
        .unwrap();
    let template = catalog.get(identify_id).unwrap();

    // The other two templates already have active instances, so the
    // cascade must not duplicate them
    let active: HashSet<_> = [
        catalog.find_by_name(names::OFFICE_CONTACTED).unwrap().id,
        catalog.find_by_name(names::COURT_PETITION_INITIATED).unwrap().id,
    ]
    .into_iter()
    .collect();

    let completed_at = Utc.with_ymd_and_hms(2024, 1, 9, 18, 0, 0).unwrap();
    let outcome = lifecycle::complete(
        &mut identify,
        template,
        &patient,
        catalog,
        &active,
        1,
        &CompletionRequest {
            staff_id: IdFixtures::staff_id(),
            court_date: None,
            override_date: None,
            timezone: TemporalFixtures::eastern(),
            now: completed_at,
        },
    )
    .unwrap();

    assert_eq!(outcome.final_status, TaskStatus::Completed);
    assert!(outcome.created.is_empty());
    assert_eq!(identify.completed_at, Some(completed_at));

    // With no active successor, completing unlocks Office Contacted
    // two days out
    let mut identify_again = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        admitted_at,
    )
    .into_iter()
    .find(|i| i.template_id == identify_id)
    .unwrap();

    let outcome = lifecycle::complete(
        &mut identify_again,
        template,
        &patient,
        catalog,
        &HashSet::new(),
        1,
        &CompletionRequest {
            staff_id: IdFixtures::staff_id(),
            court_date: None,
            override_date: None,
            timezone: TemporalFixtures::eastern(),
            now: completed_at,
        },
    )
    .unwrap();

    assert_eq!(outcome.created.len(), 1);
    let office = &outcome.created[0];
    assert_eq!(
        office.template_id,
        catalog.find_by_name(names::OFFICE_CONTACTED).unwrap().id
    );
    // Jan 9 completion + 2 days, end of day Eastern
    assert_eq!(
        office.due_date,
        Some(Utc.with_ymd_and_hms(2024, 1, 12, 4, 59, 0).unwrap())
    );
}
