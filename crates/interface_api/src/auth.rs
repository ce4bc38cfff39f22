//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use core_kernel::{HospitalId, StaffId};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff member ID)
    pub sub: String,
    /// The hospital every request is scoped to
    pub hospital_id: Uuid,
    /// Administrative privileges (override dates, catalog inspection)
    pub is_admin: bool,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    pub fn hospital_id(&self) -> HospitalId {
        HospitalId::from_uuid(self.hospital_id)
    }

    pub fn staff_id(&self) -> Result<StaffId, AuthError> {
        StaffId::from_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Administrator privileges required")]
    AdminRequired,
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `staff_id` - Staff member identifier
/// * `hospital_id` - Hospital the token is scoped to
/// * `is_admin` - Whether the staff member has administrative privileges
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    staff_id: StaffId,
    hospital_id: HospitalId,
    is_admin: bool,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: staff_id.to_string(),
        hospital_id: (*hospital_id.as_uuid()),
        is_admin,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if e.to_string().contains("ExpiredSignature") {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}
