//! User endpoints: switching, creation and deletion.

use api_types::user::{UserNew, UserSwitch};
use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{Failure, ServerError, form_or_default, server::ServerState, views};

/// Message of a failed creation that is not a name conflict.
const CREATE_FAILED: &str = "Something went wrong";

/// Either show the new user form or change the current user.
pub async fn switch(
    State(state): State<ServerState>,
    payload: Result<Form<UserSwitch>, FormRejection>,
) -> Result<Response, ServerError> {
    let payload = form_or_default(payload);
    if payload.wants_new_user() {
        return Ok(Html(views::new_user().into_string()).into_response());
    }

    let user_id = payload
        .user
        .as_deref()
        .and_then(|id| id.trim().parse::<i32>().ok())
        .ok_or_else(|| ServerError::Redirect(Failure::validation("Invalid user")))?;
    state.engine.switch_user(user_id);

    Ok(Redirect::to("/").into_response())
}

/// Create a user and make it the current one.
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Form<UserNew>, FormRejection>,
) -> Result<Redirect, ServerError> {
    let payload = form_or_default(payload);
    let name = payload.name.unwrap_or_default();
    state
        .engine
        .create_user(&name, payload.color.as_deref())
        .await
        .map_err(|err| ServerError::Redirect(Failure::from(err).or_internal(CREATE_FAILED)))?;

    Ok(Redirect::to("/"))
}

/// Delete a user and their visits.
///
/// The id is taken as text so that a malformed one is reported like any
/// other failure.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Redirect, ServerError> {
    let id = id
        .parse::<i32>()
        .map_err(|_| ServerError::Redirect(Failure::validation("Invalid id")))?;
    state.engine.delete_user(id).await?;

    Ok(Redirect::to("/"))
}
