//! Index page.

use api_types::IndexQuery;
use axum::{
    extract::{Query, State},
    response::Html,
};

use crate::{Failure, ServerError, server::ServerState, views};

/// Render the users, the current user and the countries they visited.
pub async fn get(
    State(state): State<ServerState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, ServerError> {
    let dashboard = state
        .engine
        .dashboard()
        .await
        .map_err(|err| ServerError::Page(Failure::from(err)))?;

    let error = query.error.as_deref().filter(|message| !message.is_empty());
    Ok(Html(views::index(error, &dashboard).into_string()))
}
