use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde_json::json;

use crate::{
    error::AppError,
    form::{SignupForm, SignupPayload, validate},
    ledger::{NewSignup, SignupOutcome, create_signup},
    state::State as ServerState,
    stats::get_total_stats,
};

pub async fn signup_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let signup = validate(payload)?;
    let outcome = run_signup(state, signup).await?;

    Ok((StatusCode::OK, Json(outcome.to_json())))
}

/// Form variant: the outcome travels back to the thank-you page in the
/// redirect's query string instead of a response body.
pub async fn signup_form_handler(
    State(state): State<Arc<ServerState>>,
    Form(form): Form<SignupForm>,
) -> Result<impl IntoResponse, AppError> {
    let signup = validate(form.into())?;
    let outcome = run_signup(state, signup).await?;

    let query = serde_urlencoded::to_string(outcome.to_query_pairs())
        .map_err(|err| AppError::InternalError(Box::new(err)))?;

    Ok(Redirect::to(&format!("/waitlist?{query}")))
}

pub async fn stats_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<impl IntoResponse, AppError> {
    let count =
        tokio::task::spawn_blocking(move || get_total_stats(&state.store, &state.config.area))
            .await
            .map_err(|err| AppError::InternalError(Box::new(err)))?;

    Ok(Json(json!({ "count": count })))
}

async fn run_signup(state: Arc<ServerState>, signup: NewSignup) -> Result<SignupOutcome, AppError> {
    tokio::task::spawn_blocking(move || create_signup(&state.store, &state.config.area, &signup))
        .await
        .map_err(|err| AppError::InternalError(Box::new(err)))
}
