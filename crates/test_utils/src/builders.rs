//! Test data builders
//!
//! Builder patterns for constructing patients and task instances with
//! sensible defaults, so tests only state what matters to them.

use chrono::{DateTime, Utc};

use core_kernel::{HospitalId, PatientId, StaffId, TaskTemplateId};
use domain_tasks::{PatientProfile, PatientStatus, TaskInstance, TaskStatus};

use crate::fixtures::{IdFixtures, TemporalFixtures};

/// Builder for patient profiles
pub struct TestPatientBuilder {
    profile: PatientProfile,
}

impl Default for TestPatientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPatientBuilder {
    /// An admitted 45-year-old with an assigned staff member and no
    /// algorithm flags set
    pub fn new() -> Self {
        Self {
            profile: PatientProfile {
                id: PatientId::new(),
                hospital_id: IdFixtures::hospital_id(),
                assigned_staff_id: Some(IdFixtures::staff_id()),
                status: PatientStatus::Admitted,
                age: 45,
                is_behavioral: false,
                is_restrained: false,
                is_geriatric_psych_available: false,
                is_behavioral_team: false,
                is_ltc: false,
                is_ltc_medical: false,
                is_ltc_financial: false,
                is_guardianship: false,
                is_guardianship_financial: false,
                is_guardianship_person: false,
                is_guardianship_emergency: false,
                guardianship_court_datetime: None,
                ltc_court_datetime: None,
            },
        }
    }

    pub fn hospital(mut self, id: HospitalId) -> Self {
        self.profile.hospital_id = id;
        self
    }

    pub fn age(mut self, age: u32) -> Self {
        self.profile.age = age;
        self
    }

    pub fn without_assigned_staff(mut self) -> Self {
        self.profile.assigned_staff_id = None;
        self
    }

    pub fn assigned_staff(mut self, id: StaffId) -> Self {
        self.profile.assigned_staff_id = Some(id);
        self
    }

    pub fn discharged(mut self) -> Self {
        self.profile.status = PatientStatus::Discharged;
        self
    }

    pub fn behavioral(mut self) -> Self {
        self.profile.is_behavioral = true;
        self
    }

    pub fn restrained(mut self) -> Self {
        self.profile.is_restrained = true;
        self
    }

    pub fn behavioral_team(mut self) -> Self {
        self.profile.is_behavioral_team = true;
        self
    }

    pub fn geriatric_psych_available(mut self) -> Self {
        self.profile.is_geriatric_psych_available = true;
        self
    }

    pub fn ltc(mut self) -> Self {
        self.profile.is_ltc = true;
        self
    }

    pub fn ltc_medical(mut self) -> Self {
        self.profile.is_ltc = true;
        self.profile.is_ltc_medical = true;
        self
    }

    pub fn ltc_financial(mut self) -> Self {
        self.profile.is_ltc = true;
        self.profile.is_ltc_financial = true;
        self
    }

    pub fn guardianship_person(mut self) -> Self {
        self.profile.is_guardianship = true;
        self.profile.is_guardianship_person = true;
        self
    }

    pub fn guardianship_financial(mut self) -> Self {
        self.profile.is_guardianship = true;
        self.profile.is_guardianship_financial = true;
        self
    }

    pub fn guardianship_emergency(mut self) -> Self {
        self.profile.is_guardianship_emergency = true;
        self
    }

    pub fn build(self) -> PatientProfile {
        self.profile
    }
}

/// Builder for task instances
pub struct TestInstanceBuilder {
    patient_id: PatientId,
    template_id: TaskTemplateId,
    status: TaskStatus,
    due_date: Option<DateTime<Utc>>,
    ideal_due_date: Option<DateTime<Utc>>,
    override_due_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TestInstanceBuilder {
    /// A Pending instance due at the Jan 10 fixture date
    pub fn new(template_id: TaskTemplateId) -> Self {
        Self {
            patient_id: IdFixtures::patient_id(),
            template_id,
            status: TaskStatus::Pending,
            due_date: Some(TemporalFixtures::jan_10_end_of_day()),
            ideal_due_date: Some(TemporalFixtures::jan_10_end_of_day()),
            override_due_date: None,
            completed_at: None,
            created_at: TemporalFixtures::admission_instant(),
        }
    }

    pub fn patient(mut self, id: PatientId) -> Self {
        self.patient_id = id;
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn due(mut self, due: Option<DateTime<Utc>>) -> Self {
        self.due_date = due;
        self
    }

    pub fn ideal(mut self, ideal: Option<DateTime<Utc>>) -> Self {
        self.ideal_due_date = ideal;
        self
    }

    pub fn override_due(mut self, date: DateTime<Utc>) -> Self {
        self.override_due_date = Some(date);
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn build(self) -> TaskInstance {
        let mut instance = TaskInstance::new(
            self.patient_id,
            self.template_id,
            self.due_date,
            self.ideal_due_date,
            self.created_at,
        );
        instance.status = self.status;
        instance.override_due_date = self.override_due_date;
        instance.completed_at = self.completed_at;
        instance
    }
}
