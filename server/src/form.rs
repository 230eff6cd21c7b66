//! Field validation for incoming signups. Everything past this boundary
//! trusts that names and emails are non-empty and that buildings and
//! interests come from the known lists.
use serde::Deserialize;

use crate::{
    error::AppError,
    ledger::{BUILDINGS, INTERESTS, NewSignup},
};

#[derive(Deserialize)]
pub struct SignupPayload {
    pub first_name: String,
    pub email: String,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub referred_by: Option<String>,
}

/// Urlencoded variant of [`SignupPayload`]. Form posts cannot carry a
/// repeated field through `serde_urlencoded`, so interests arrive as one
/// comma-separated value.
#[derive(Deserialize)]
pub struct SignupForm {
    pub first_name: String,
    pub email: String,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub referred_by: Option<String>,
}

impl From<SignupForm> for SignupPayload {
    fn from(form: SignupForm) -> Self {
        let interests = form
            .interests
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|interest| interest.trim().to_string())
            .filter(|interest| !interest.is_empty())
            .collect();

        Self {
            first_name: form.first_name,
            email: form.email,
            building: form.building,
            interests,
            referred_by: form.referred_by,
        }
    }
}

pub fn validate(payload: SignupPayload) -> Result<NewSignup, AppError> {
    let first_name = payload.first_name.trim().to_string();
    let email = payload.email.trim().to_string();

    if first_name.is_empty() || email.is_empty() {
        return Err(AppError::Validation);
    }

    let building = payload
        .building
        .map(|building| building.trim().to_string())
        .filter(|building| !building.is_empty());

    if let Some(building) = &building {
        if !BUILDINGS.contains(&building.as_str()) {
            return Err(AppError::Validation);
        }
    }

    // The form only offers the predefined set, anything else is dropped
    let interests: Vec<String> = payload
        .interests
        .into_iter()
        .filter(|interest| INTERESTS.contains(&interest.as_str()))
        .collect();

    let referred_by = payload
        .referred_by
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty());

    Ok(NewSignup {
        first_name,
        email,
        building,
        interests,
        referred_by,
    })
}
