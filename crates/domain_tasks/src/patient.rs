//! Patient profile - the subset of patient state the engine reads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{HospitalId, PatientId, StaffId};

/// Admission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientStatus {
    Admitted,
    Discharged,
}

/// The patient attributes that drive task instantiation and scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: PatientId,
    pub hospital_id: HospitalId,
    /// Tasks require an owning staff member; instantiation is skipped
    /// entirely while this is unset
    pub assigned_staff_id: Option<StaffId>,
    pub status: PatientStatus,
    pub age: u32,
    // Behavioral algorithm flags
    pub is_behavioral: bool,
    pub is_restrained: bool,
    pub is_geriatric_psych_available: bool,
    pub is_behavioral_team: bool,
    // Long-term-care algorithm flags
    pub is_ltc: bool,
    pub is_ltc_medical: bool,
    pub is_ltc_financial: bool,
    // Guardianship algorithm flags
    pub is_guardianship: bool,
    pub is_guardianship_financial: bool,
    pub is_guardianship_person: bool,
    pub is_guardianship_emergency: bool,
    /// Set when a guardianship court-date task completes
    pub guardianship_court_datetime: Option<DateTime<Utc>>,
    /// Set when an LTC court-date task completes
    pub ltc_court_datetime: Option<DateTime<Utc>>,
}

impl PatientProfile {
    pub fn is_admitted(&self) -> bool {
        self.status == PatientStatus::Admitted
    }
}
