//! Patient repository
//!
//! Reads the patient attributes the task engine consumes. The court-date
//! fields are written inside the completion transaction, not here.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{HospitalId, PatientId, StaffId};
use domain_tasks::{PatientProfile, PatientStatus};

use crate::error::DatabaseError;

/// Database row representation of a patient
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PatientRow {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub assigned_staff_id: Option<Uuid>,
    pub status: String,
    pub age: i32,
    pub is_behavioral: bool,
    pub is_restrained: bool,
    pub is_geriatric_psych_available: bool,
    pub is_behavioral_team: bool,
    pub is_ltc: bool,
    pub is_ltc_medical: bool,
    pub is_ltc_financial: bool,
    pub is_guardianship: bool,
    pub is_guardianship_financial: bool,
    pub is_guardianship_person: bool,
    pub is_guardianship_emergency: bool,
    pub guardianship_court_datetime: Option<DateTime<Utc>>,
    pub ltc_court_datetime: Option<DateTime<Utc>>,
}

impl PatientRow {
    /// Converts the row into its domain representation
    pub fn into_profile(self) -> Result<PatientProfile, DatabaseError> {
        let status = match self.status.as_str() {
            "admitted" => PatientStatus::Admitted,
            "discharged" => PatientStatus::Discharged,
            other => {
                return Err(DatabaseError::SerializationError(format!(
                    "unknown patient status '{other}'"
                )))
            }
        };
        Ok(PatientProfile {
            id: PatientId::from_uuid(self.id),
            hospital_id: HospitalId::from_uuid(self.hospital_id),
            assigned_staff_id: self.assigned_staff_id.map(StaffId::from_uuid),
            status,
            age: self.age.max(0) as u32,
            is_behavioral: self.is_behavioral,
            is_restrained: self.is_restrained,
            is_geriatric_psych_available: self.is_geriatric_psych_available,
            is_behavioral_team: self.is_behavioral_team,
            is_ltc: self.is_ltc,
            is_ltc_medical: self.is_ltc_medical,
            is_ltc_financial: self.is_ltc_financial,
            is_guardianship: self.is_guardianship,
            is_guardianship_financial: self.is_guardianship_financial,
            is_guardianship_person: self.is_guardianship_person,
            is_guardianship_emergency: self.is_guardianship_emergency,
            guardianship_court_datetime: self.guardianship_court_datetime,
            ltc_court_datetime: self.ltc_court_datetime,
        })
    }
}

const SELECT_PATIENT: &str = r#"
    SELECT id, hospital_id, assigned_staff_id, status, age,
           is_behavioral, is_restrained, is_geriatric_psych_available,
           is_behavioral_team, is_ltc, is_ltc_medical, is_ltc_financial,
           is_guardianship, is_guardianship_financial, is_guardianship_person,
           is_guardianship_emergency, guardianship_court_datetime,
           ltc_court_datetime
    FROM patients
"#;

/// Repository for patient reads
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    /// Creates a new PatientRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a patient profile by id
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such patient exists
    pub async fn find_by_id(&self, id: PatientId) -> Result<PatientProfile, DatabaseError> {
        let query = format!("{SELECT_PATIENT} WHERE id = $1");
        let row = sqlx::query_as::<_, PatientRow>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Patient", id))?;
        row.into_profile()
    }

    /// All currently admitted patients; input to the court-date reminder
    /// sweep
    pub async fn admitted_profiles(&self) -> Result<Vec<PatientProfile>, DatabaseError> {
        let query = format!("{SELECT_PATIENT} WHERE status = 'admitted'");
        let rows = sqlx::query_as::<_, PatientRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(PatientRow::into_profile).collect()
    }
}
