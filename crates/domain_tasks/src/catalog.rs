//! Task catalog - immutable template reference data
//!
//! Templates are loaded once at startup into a process-wide [`TaskCatalog`]
//! keyed by id, with dependency edges pre-resolved into a dependents
//! adjacency. Runtime lookups go through ids; the name index exists for the
//! instantiation decision table, which is specified in terms of template
//! names.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use core_kernel::TaskTemplateId;

/// Namespace for deriving stable template ids from template names, so that
/// persisted instances keep pointing at the same template across restarts.
const CATALOG_NAMESPACE: Uuid = Uuid::from_u128(0x6f1d_8a02_4c53_4b1e_9a77_2d5c_0e4b_91a3);

/// A named discharge-planning workflow track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    Behavioral,
    Guardianship,
    Ltc,
}

/// Which patient court-date field a court-date task writes on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourtDateTarget {
    Guardianship,
    Ltc,
}

/// An immutable task definition shared across patients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: TaskTemplateId,
    pub name: String,
    pub category: String,
    pub is_repeating: bool,
    pub recurrence_interval_days: Option<i64>,
    pub max_repeats: Option<u32>,
    /// Informational only; surfaced to staff, never evaluated
    pub condition_required: Option<String>,
    pub due_in_days_after_dependency: Option<i64>,
    pub is_non_blocking: bool,
    pub court_date_target: Option<CourtDateTarget>,
    pub algorithm: Option<Algorithm>,
    pub depends_on: Vec<TaskTemplateId>,
}

impl TaskTemplate {
    pub fn new(name: &str, category: &str, algorithm: Algorithm) -> Self {
        Self {
            id: template_id(name),
            name: name.to_string(),
            category: category.to_string(),
            is_repeating: false,
            recurrence_interval_days: None,
            max_repeats: None,
            condition_required: None,
            due_in_days_after_dependency: None,
            is_non_blocking: false,
            court_date_target: None,
            algorithm: Some(algorithm),
            depends_on: Vec::new(),
        }
    }

    pub fn repeating(mut self, interval_days: i64) -> Self {
        self.is_repeating = true;
        self.recurrence_interval_days = Some(interval_days);
        self
    }

    pub fn max_repeats(mut self, cap: u32) -> Self {
        self.max_repeats = Some(cap);
        self
    }

    pub fn dependency_offset(mut self, days: i64) -> Self {
        self.due_in_days_after_dependency = Some(days);
        self
    }

    pub fn non_blocking(mut self) -> Self {
        self.is_non_blocking = true;
        self
    }

    pub fn court_date(mut self, target: CourtDateTarget) -> Self {
        self.court_date_target = Some(target);
        self
    }

    pub fn condition(mut self, text: &str) -> Self {
        self.condition_required = Some(text.to_string());
        self
    }

    pub fn depends_on(mut self, names: &[&str]) -> Self {
        self.depends_on = names.iter().map(|n| template_id(n)).collect();
        self
    }

    pub fn is_court_date(&self) -> bool {
        self.court_date_target.is_some()
    }

    /// Repeating templates with a dependency offset are rescheduled through
    /// an explicit follow-up call rather than automatic recurrence.
    pub fn is_manual_follow_up(&self) -> bool {
        self.is_repeating && self.due_in_days_after_dependency.is_some()
    }
}

/// Derives the stable id for a template name
pub fn template_id(name: &str) -> TaskTemplateId {
    TaskTemplateId::from_uuid(Uuid::new_v5(&CATALOG_NAMESPACE, name.as_bytes()))
}

/// Well-known template names used by the instantiation decision table and
/// the scheduler's conditional skip rules
pub mod names {
    pub const BEHAVIORAL_CONTRACT: &str = "Behavioral Contract Created";
    pub const MEDICATION_ASSESSMENT: &str = "Medication Assessment";
    pub const DAILY_NURSING_DOCUMENTATION: &str = "Daily Nursing Documentation";
    pub const ASSESSMENT_OF_APPROPRIATENESS: &str = "Assessment of Appropriateness";
    pub const BEHAVIORAL_INTERVENTION_TEAM: &str = "Behavioral Intervention Team";
    pub const PSYCHIATRY_CONSULT: &str = "Psychiatry Consult";
    pub const GERIATRIC_PSYCHIATRY_CONSULT: &str = "Geriatric Psychiatry Consult";
    pub const BEHAVIORAL_DISCHARGE_NOTE: &str = "Behavioral - Discharge Plan Note";

    pub const IDENTIFY_GUARDIAN: &str = "Identify Guardian";
    pub const OFFICE_CONTACTED: &str = "Appropriate Office Contacted ASAP";
    pub const COURT_PETITION_INITIATED: &str = "Court Petition Initiated";
    pub const EMERGENCY_COURT_PETITION_FILED: &str = "Emergency Court Petition Filed";
    pub const CONFIRM_GUARDIANSHIP_APPOINTED: &str = "Guardianship - Confirm Guardianship Appointed";
    pub const GUARDIANSHIP_COURT_DATE: &str = "Guardianship - Court Date Scheduled";
    pub const FINANCIAL_INVENTORY: &str = "Financial inventory of patient assets required";

    pub const LTC_INITIATE_APPLICATION: &str = "Initiate appropriate application process";
    pub const LTC_COMPILE_MEDICAL: &str = "LTC - Compile medical eligibility information";
    pub const LTC_FINANCIAL_SCREENING: &str = "LTC - Financial screening completed";
    pub const LTC_COMPILE_FINANCIAL: &str = "LTC - Begin compiling needed financial/legal information";
    pub const LTC_FOLLOW_UP_STATE: &str = "LTC - Follow up with state on Medical Application status";
    pub const LTC_SUBMIT_APPLICATION: &str = "LTC - Submit application to state";
    pub const LTC_COURT_DATE: &str = "LTC - State Hearing Date Scheduled";
    pub const LTC_NOTIFY_FAMILY: &str = "LTC - Notify family of placement options";
}

/// Process-wide immutable catalog of task templates
#[derive(Debug)]
pub struct TaskCatalog {
    templates: HashMap<TaskTemplateId, TaskTemplate>,
    by_name: HashMap<String, TaskTemplateId>,
    dependents: HashMap<TaskTemplateId, Vec<TaskTemplateId>>,
}

impl TaskCatalog {
    /// Builds a catalog from template definitions, resolving dependency
    /// edges into a dependents adjacency
    pub fn new(templates: Vec<TaskTemplate>) -> Self {
        let mut by_name = HashMap::new();
        let mut dependents: HashMap<TaskTemplateId, Vec<TaskTemplateId>> = HashMap::new();
        let mut map = HashMap::new();

        for template in templates {
            by_name.insert(template.name.clone(), template.id);
            for dep in &template.depends_on {
                dependents.entry(*dep).or_default().push(template.id);
            }
            map.insert(template.id, template);
        }

        Self {
            templates: map,
            by_name,
            dependents,
        }
    }

    pub fn get(&self, id: TaskTemplateId) -> Option<&TaskTemplate> {
        self.templates.get(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&TaskTemplate> {
        self.by_name.get(name).and_then(|id| self.templates.get(id))
    }

    /// Templates whose dependency set includes the given template
    pub fn dependents_of(&self, id: TaskTemplateId) -> &[TaskTemplateId] {
        self.dependents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn templates(&self) -> impl Iterator<Item = &TaskTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The built-in catalog covering the Behavioral, Guardianship and LTC
    /// tracks, constructed once per process
    pub fn builtin() -> &'static TaskCatalog {
        static CATALOG: Lazy<TaskCatalog> = Lazy::new(|| TaskCatalog::new(builtin_templates()));
        &CATALOG
    }
}

fn builtin_templates() -> Vec<TaskTemplate> {
    use names::*;
    use Algorithm::*;
    use CourtDateTarget as Target;

    vec![
        // Behavioral track
        TaskTemplate::new(BEHAVIORAL_CONTRACT, "Behavioral", Behavioral),
        TaskTemplate::new(MEDICATION_ASSESSMENT, "Behavioral", Behavioral).repeating(3),
        TaskTemplate::new(DAILY_NURSING_DOCUMENTATION, "Behavioral", Behavioral).repeating(1),
        TaskTemplate::new(ASSESSMENT_OF_APPROPRIATENESS, "Behavioral", Behavioral)
            .repeating(1)
            .max_repeats(30)
            .condition("Patient currently under restraint orders"),
        TaskTemplate::new(BEHAVIORAL_INTERVENTION_TEAM, "Behavioral", Behavioral),
        TaskTemplate::new(PSYCHIATRY_CONSULT, "Behavioral", Behavioral)
            .repeating(7)
            .dependency_offset(2),
        TaskTemplate::new(GERIATRIC_PSYCHIATRY_CONSULT, "Behavioral", Behavioral)
            .repeating(7)
            .dependency_offset(2)
            .condition("Geriatric psychiatry service available on site"),
        TaskTemplate::new(BEHAVIORAL_DISCHARGE_NOTE, "Behavioral", Behavioral)
            .non_blocking()
            .depends_on(&[BEHAVIORAL_CONTRACT]),
        // Guardianship track
        TaskTemplate::new(IDENTIFY_GUARDIAN, "Guardianship", Guardianship),
        TaskTemplate::new(OFFICE_CONTACTED, "Guardianship", Guardianship)
            .depends_on(&[IDENTIFY_GUARDIAN])
            .dependency_offset(2),
        TaskTemplate::new(COURT_PETITION_INITIATED, "Guardianship", Guardianship)
            .depends_on(&[OFFICE_CONTACTED])
            .dependency_offset(2),
        TaskTemplate::new(EMERGENCY_COURT_PETITION_FILED, "Guardianship", Guardianship)
            .depends_on(&[COURT_PETITION_INITIATED])
            .dependency_offset(1),
        TaskTemplate::new(CONFIRM_GUARDIANSHIP_APPOINTED, "Guardianship", Guardianship)
            .depends_on(&[EMERGENCY_COURT_PETITION_FILED])
            .dependency_offset(3),
        TaskTemplate::new(GUARDIANSHIP_COURT_DATE, "Guardianship", Guardianship)
            .depends_on(&[COURT_PETITION_INITIATED])
            .dependency_offset(14)
            .court_date(Target::Guardianship),
        TaskTemplate::new(FINANCIAL_INVENTORY, "Guardianship", Guardianship),
        // Long-Term-Care track
        TaskTemplate::new(LTC_INITIATE_APPLICATION, "LTC", Ltc),
        TaskTemplate::new(LTC_COMPILE_MEDICAL, "LTC", Ltc),
        TaskTemplate::new(LTC_FINANCIAL_SCREENING, "LTC", Ltc),
        TaskTemplate::new(LTC_COMPILE_FINANCIAL, "LTC", Ltc)
            .depends_on(&[LTC_INITIATE_APPLICATION])
            .dependency_offset(3),
        TaskTemplate::new(LTC_SUBMIT_APPLICATION, "LTC", Ltc)
            .depends_on(&[LTC_COMPILE_MEDICAL, LTC_COMPILE_FINANCIAL])
            .dependency_offset(2),
        TaskTemplate::new(LTC_FOLLOW_UP_STATE, "LTC", Ltc)
            .depends_on(&[LTC_SUBMIT_APPLICATION])
            .repeating(7),
        TaskTemplate::new(LTC_COURT_DATE, "LTC", Ltc)
            .depends_on(&[LTC_SUBMIT_APPLICATION])
            .dependency_offset(10)
            .court_date(Target::Ltc),
        TaskTemplate::new(LTC_NOTIFY_FAMILY, "LTC", Ltc)
            .non_blocking()
            .depends_on(&[LTC_INITIATE_APPLICATION]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_resolves_all_names() {
        let catalog = TaskCatalog::builtin();
        for name in [
            names::BEHAVIORAL_CONTRACT,
            names::MEDICATION_ASSESSMENT,
            names::DAILY_NURSING_DOCUMENTATION,
            names::PSYCHIATRY_CONSULT,
            names::GERIATRIC_PSYCHIATRY_CONSULT,
            names::IDENTIFY_GUARDIAN,
            names::OFFICE_CONTACTED,
            names::COURT_PETITION_INITIATED,
            names::CONFIRM_GUARDIANSHIP_APPOINTED,
            names::LTC_INITIATE_APPLICATION,
            names::LTC_FOLLOW_UP_STATE,
        ] {
            assert!(catalog.find_by_name(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn test_template_ids_are_stable() {
        assert_eq!(
            template_id(names::IDENTIFY_GUARDIAN),
            template_id(names::IDENTIFY_GUARDIAN)
        );
        assert_ne!(
            template_id(names::IDENTIFY_GUARDIAN),
            template_id(names::OFFICE_CONTACTED)
        );
    }

    #[test]
    fn test_dependents_are_pre_resolved() {
        let catalog = TaskCatalog::builtin();
        let petition = catalog.find_by_name(names::COURT_PETITION_INITIATED).unwrap();
        let dependents = catalog.dependents_of(petition.id);
        assert!(dependents.contains(&template_id(names::EMERGENCY_COURT_PETITION_FILED)));
        assert!(dependents.contains(&template_id(names::GUARDIANSHIP_COURT_DATE)));
    }

    #[test]
    fn test_manual_follow_up_eligibility() {
        let catalog = TaskCatalog::builtin();
        let psych = catalog.find_by_name(names::PSYCHIATRY_CONSULT).unwrap();
        assert!(psych.is_manual_follow_up());
        let nursing = catalog.find_by_name(names::DAILY_NURSING_DOCUMENTATION).unwrap();
        assert!(!nursing.is_manual_follow_up());
    }

    #[test]
    fn test_court_date_targets() {
        let catalog = TaskCatalog::builtin();
        let guardianship = catalog.find_by_name(names::GUARDIANSHIP_COURT_DATE).unwrap();
        assert_eq!(guardianship.court_date_target, Some(CourtDateTarget::Guardianship));
        let ltc = catalog.find_by_name(names::LTC_COURT_DATE).unwrap();
        assert_eq!(ltc.court_date_target, Some(CourtDateTarget::Ltc));
    }

    #[test]
    fn test_non_blocking_templates_have_no_schedule() {
        let catalog = TaskCatalog::builtin();
        let note = catalog.find_by_name(names::BEHAVIORAL_DISCHARGE_NOTE).unwrap();
        assert!(note.is_non_blocking);
        assert!(note.recurrence_interval_days.is_none());
    }
}
