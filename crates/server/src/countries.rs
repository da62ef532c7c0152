//! Visited countries endpoints

use api_types::{
    Message,
    country::{CountryAdd, CountryRemove},
};
use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::Redirect,
};

use crate::{Failure, ServerError, form_or_default, server::ServerState};

const INVALID_DATA: &str = "Invalid Data";

/// Handle requests for recording a visit of the current user
pub async fn add(
    State(state): State<ServerState>,
    payload: Result<Form<CountryAdd>, FormRejection>,
) -> Result<Redirect, ServerError> {
    let input = form_or_default(payload).country.unwrap_or_default();
    state.engine.add_visited_country(&input).await?;
    Ok(Redirect::to("/"))
}

/// Handle requests for forgetting a visit
///
/// Malformed forms are sent back to the index page, database failures are
/// reported as JSON.
pub async fn remove(
    State(state): State<ServerState>,
    payload: Result<Form<CountryRemove>, FormRejection>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let payload = form_or_default(payload);
    let (Some(country_code), Some(user_id)) = (
        payload.country_code.filter(|code| !code.trim().is_empty()),
        payload.user_id.filter(|id| !id.trim().is_empty()),
    ) else {
        return Err(ServerError::Redirect(Failure::validation(INVALID_DATA)));
    };
    let Ok(user_id) = user_id.trim().parse::<i32>() else {
        return Err(ServerError::Redirect(Failure::validation(INVALID_DATA)));
    };

    state
        .engine
        .remove_visited_country(&country_code, user_id)
        .await
        .map_err(|err| ServerError::Json(err.into()))?;

    Ok((StatusCode::OK, Json(Message::new("Success"))))
}
