//! # Signup Ledger
//!
//! The one invariant-bearing piece: create a signup exactly once, let the
//! database's unique constraints catch repeats, and answer with the queue
//! position and referral code.
//!
//! Rows are never updated or deleted here. Position is derived on every
//! read from `(created_at, id)` ordering within the area, so two racing
//! signups may both see a slightly stale count. Positions are advisory,
//! not allocation tickets.
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::{database::Store, referral::make_referral_code};

/// Buildings in the area. Kept for signups that mention one, the
/// waitlist itself is open to everyone.
pub const BUILDINGS: &[&str] = &[
    "Syren Hus",
    "Hortensia Hus",
    "Lathyrus Hus",
    "Rhododendron Hus",
    "Ranunkel Hus",
    "Verbena Hus (karréen)",
    "Spirea Hus",
    "Hibiscus Hus",
    "Røllike Hus",
    "Primula Hus",
    "Astilbe Hus",
    "Amaryllis Hus",
    "Astrantia Hus",
    "Geranium Rækkerne",
    "Verbena Hus Tårnet",
    "Akeleje Hus",
    "Magnolia Hus",
    "Bofællesskabet Spir",
    "Kamelia Hus",
    "Asters Rækkerne",
    "Fresia Hus",
    "Hosta Hus",
    "Dahlia Hus",
    "Torveporten",
    "Iris Hus",
    "Filippa Haven",
];

pub const INTERESTS: &[&str] = &["Kaffe", "Gåtur", "Træning", "Brætspil", "Mad", "Andet"];

/// Already validated at the HTTP boundary, see [`crate::form`].
pub struct NewSignup {
    pub first_name: String,
    pub email: String,
    pub building: Option<String>,
    pub interests: Vec<String>,
    pub referred_by: Option<String>,
}

pub enum SignupOutcome {
    Success {
        position: Option<i64>,
        referral_code: String,
    },
    Duplicate,
    InsertFailed {
        message: String,
    },
    NoId,
}

pub fn create_signup(store: &Store, area: &str, signup: &NewSignup) -> SignupOutcome {
    let referral_code = make_referral_code();

    let first_name = signup.first_name.trim();
    let email = signup.email.trim().to_lowercase();
    let interests = encode_interests(&signup.interests);

    let inserted = match store.insert_signup(
        area,
        first_name,
        &email,
        signup.building.as_deref(),
        interests.as_deref(),
        &referral_code,
        signup.referred_by.as_deref(),
    ) {
        Ok(inserted) => inserted,
        Err(err) => {
            log_store_error("insert", &err);

            if is_unique_violation(&err) {
                return SignupOutcome::Duplicate;
            }

            return SignupOutcome::InsertFailed {
                message: err.to_string(),
            };
        }
    };

    if inserted.id <= 0 {
        error!("Insert succeeded but no row id came back");
        return SignupOutcome::NoId;
    }

    #[cfg(feature = "verbose")]
    tracing::info!("Inserted signup {} into {area}", inserted.id);

    // The signup is already durable at this point. A failed position
    // lookup degrades the response, it must not undo the signup.
    let position = match store.position_of(area, inserted.id) {
        Ok(position) => Some(position),
        Err(err) => {
            warn!(signup_id = inserted.id, error = %err, "Position lookup failed");
            None
        }
    };

    SignupOutcome::Success {
        position,
        referral_code,
    }
}

fn encode_interests(interests: &[String]) -> Option<String> {
    if interests.is_empty() {
        return None;
    }

    serde_json::to_string(interests).ok()
}

/// Duplicate-key signal: the SQLite unique-constraint codes, with a
/// message match as fallback for stores that only surface text.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    if let rusqlite::Error::SqliteFailure(failure, message) = err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        {
            return true;
        }

        if let Some(message) = message {
            let message = message.to_lowercase();
            return message.contains("unique") || message.contains("duplicate");
        }
    }

    false
}

fn log_store_error(operation: &str, err: &rusqlite::Error) {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => error!(
            operation,
            code = ?failure.code,
            extended_code = failure.extended_code,
            message = message.as_deref().unwrap_or(""),
            "Waitlist store error"
        ),
        other => error!(operation, error = %other, "Waitlist store error"),
    }
}

impl SignupOutcome {
    /// Response body shape for the JSON endpoint. Store diagnostics stay
    /// out of it, `InsertFailed` details are log-only.
    pub fn to_json(&self) -> Value {
        match self {
            SignupOutcome::Success {
                position,
                referral_code,
            } => json!({
                "ok": true,
                "position": position,
                "referral_code": referral_code,
            }),
            SignupOutcome::Duplicate => json!({ "ok": false, "reason": "duplicate" }),
            SignupOutcome::InsertFailed { .. } => {
                json!({ "ok": false, "reason": "insert_failed" })
            }
            SignupOutcome::NoId => json!({ "ok": false, "reason": "no_id" }),
        }
    }

    /// Flat string pairs for round-tripping the outcome through redirect
    /// query parameters. `position` is omitted when unresolved.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            SignupOutcome::Success {
                position,
                referral_code,
            } => {
                let mut pairs = vec![("ok", "true".to_string())];
                if let Some(position) = position {
                    pairs.push(("position", position.to_string()));
                }
                pairs.push(("referral_code", referral_code.clone()));
                pairs
            }
            SignupOutcome::Duplicate => vec![
                ("ok", "false".to_string()),
                ("reason", "duplicate".to_string()),
            ],
            SignupOutcome::InsertFailed { .. } => vec![
                ("ok", "false".to_string()),
                ("reason", "insert_failed".to_string()),
            ],
            SignupOutcome::NoId => {
                vec![("ok", "false".to_string()), ("reason", "no_id".to_string())]
            }
        }
    }
}
