//! Tests for the admission-time task instantiation decision table

use chrono::TimeZone;
use chrono::Utc;
use std::collections::HashSet;

use domain_tasks::catalog::{names, TaskCatalog, TaskTemplate};
use domain_tasks::{initial_tasks, Algorithm, TaskInstance};
use test_utils::{TemporalFixtures, TestPatientBuilder};

fn template_names(catalog: &TaskCatalog, instances: &[TaskInstance]) -> Vec<String> {
    instances
        .iter()
        .map(|i| catalog.get(i.template_id).unwrap().name.clone())
        .collect()
}

#[test]
fn test_geriatric_behavioral_patient_gets_exact_task_set() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new()
        .behavioral()
        .age(70)
        .geriatric_psych_available()
        .build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let mut found = template_names(catalog, &instances);
    found.sort();
    let mut expected = vec![
        names::BEHAVIORAL_CONTRACT.to_string(),
        names::MEDICATION_ASSESSMENT.to_string(),
        names::DAILY_NURSING_DOCUMENTATION.to_string(),
        names::GERIATRIC_PSYCHIATRY_CONSULT.to_string(),
    ];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn test_instantiation_due_dates_are_end_of_local_day() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new().behavioral().build();

    // Admitted Jan 8 10:00 Eastern; +0d lands at Jan 8 23:59 Eastern
    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let nursing = instances
        .iter()
        .find(|i| {
            catalog.get(i.template_id).unwrap().name == names::DAILY_NURSING_DOCUMENTATION
        })
        .unwrap();
    assert_eq!(
        nursing.due_date.unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 9, 4, 59, 0).unwrap()
    );
    assert_eq!(nursing.ideal_due_date, nursing.due_date);

    let contract = instances
        .iter()
        .find(|i| catalog.get(i.template_id).unwrap().name == names::BEHAVIORAL_CONTRACT)
        .unwrap();
    assert_eq!(
        contract.due_date.unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 11, 4, 59, 0).unwrap()
    );
}

#[test]
fn test_young_patient_gets_general_psychiatry() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new()
        .behavioral()
        .age(40)
        .geriatric_psych_available()
        .build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let found = template_names(catalog, &instances);
    assert!(found.contains(&names::PSYCHIATRY_CONSULT.to_string()));
    assert!(!found.contains(&names::GERIATRIC_PSYCHIATRY_CONSULT.to_string()));
}

#[test]
fn test_elderly_without_geriatric_service_gets_general_psychiatry() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new().behavioral().age(80).build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let found = template_names(catalog, &instances);
    assert!(found.contains(&names::PSYCHIATRY_CONSULT.to_string()));
}

#[test]
fn test_restraint_and_team_flags_add_tasks() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new()
        .behavioral()
        .restrained()
        .behavioral_team()
        .build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let found = template_names(catalog, &instances);
    assert!(found.contains(&names::ASSESSMENT_OF_APPROPRIATENESS.to_string()));
    assert!(found.contains(&names::BEHAVIORAL_INTERVENTION_TEAM.to_string()));
}

#[test]
fn test_guardianship_standard_path() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new().guardianship_person().build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let found = template_names(catalog, &instances);
    assert_eq!(instances.len(), 3);
    assert!(found.contains(&names::IDENTIFY_GUARDIAN.to_string()));
    assert!(found.contains(&names::OFFICE_CONTACTED.to_string()));
    assert!(found.contains(&names::COURT_PETITION_INITIATED.to_string()));
}

#[test]
fn test_guardianship_emergency_path_skips_identify_guardian() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new()
        .guardianship_person()
        .guardianship_emergency()
        .build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let found = template_names(catalog, &instances);
    assert_eq!(instances.len(), 2);
    assert!(!found.contains(&names::IDENTIFY_GUARDIAN.to_string()));
    assert!(found.contains(&names::OFFICE_CONTACTED.to_string()));
    assert!(found.contains(&names::COURT_PETITION_INITIATED.to_string()));
}

#[test]
fn test_guardianship_financial_adds_inventory() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new().guardianship_financial().build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let found = template_names(catalog, &instances);
    assert!(found.contains(&names::FINANCIAL_INVENTORY.to_string()));
}

#[test]
fn test_ltc_branches() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new().ltc_medical().ltc_financial().build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let found = template_names(catalog, &instances);
    assert!(found.contains(&names::LTC_INITIATE_APPLICATION.to_string()));
    assert!(found.contains(&names::LTC_COMPILE_MEDICAL.to_string()));
    assert!(found.contains(&names::LTC_FINANCIAL_SCREENING.to_string()));
}

#[test]
fn test_reinvocation_is_idempotent() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new().behavioral().ltc().build();

    let first = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );
    assert!(!first.is_empty());

    let existing: HashSet<_> = first.iter().map(|i| i.template_id).collect();
    let second = initial_tasks(
        &patient,
        catalog,
        &existing,
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );
    assert!(second.is_empty());
}

#[test]
fn test_no_assigned_staff_skips_instantiation() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new()
        .behavioral()
        .without_assigned_staff()
        .build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );
    assert!(instances.is_empty());
}

#[test]
fn test_unresolved_template_names_are_skipped() {
    // A partial catalog without the behavioral templates
    let partial = TaskCatalog::new(vec![TaskTemplate::new(
        names::BEHAVIORAL_CONTRACT,
        "Behavioral",
        Algorithm::Behavioral,
    )]);
    let patient = TestPatientBuilder::new().behavioral().build();

    let instances = initial_tasks(
        &patient,
        &partial,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );
    assert_eq!(instances.len(), 1);
}

#[test]
fn test_output_sorted_by_due_date() {
    let catalog = TaskCatalog::builtin();
    let patient = TestPatientBuilder::new().behavioral().guardianship_person().build();

    let instances = initial_tasks(
        &patient,
        catalog,
        &HashSet::new(),
        TemporalFixtures::eastern(),
        TemporalFixtures::admission_instant(),
    );

    let dues: Vec<_> = instances.iter().map(|i| i.due_date).collect();
    let mut sorted = dues.clone();
    sorted.sort();
    assert_eq!(dues, sorted);
}
