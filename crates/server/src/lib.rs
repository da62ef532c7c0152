use axum::{
    Form, Json,
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use engine::EngineError;

use api_types::Message;
pub use server::{
    ServerConfig, ServerState, WriteGate, router, run_with_listener, spawn_with_listener,
};

mod countries;
mod index;
mod server;
mod users;
pub mod views;

/// Message shown in place of any database error.
const INTERNAL_ERROR: &str = "Internal Server Error";

/// What went wrong, independent of how it is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    NotFound,
    Conflict,
    Database,
    Forbidden,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    /// Replace the generic message of a database failure.
    pub fn or_internal(self, message: &str) -> Self {
        match self.kind {
            FailureKind::Database => Self::new(FailureKind::Database, message),
            _ => self,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            FailureKind::Validation => StatusCode::BAD_REQUEST,
            FailureKind::NotFound => StatusCode::NOT_FOUND,
            FailureKind::Conflict => StatusCode::CONFLICT,
            FailureKind::Database => StatusCode::INTERNAL_SERVER_ERROR,
            FailureKind::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Location sending the message back to the index page.
    pub fn location(&self) -> String {
        let message: String =
            url::form_urlencoded::byte_serialize(self.message.as_bytes()).collect();
        format!("/?error={message}")
    }
}

impl From<EngineError> for Failure {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(message) => Self::new(FailureKind::Validation, message),
            EngineError::KeyNotFound(message) => Self::new(FailureKind::NotFound, message),
            EngineError::ExistingKey(message) => Self::new(FailureKind::Conflict, message),
            EngineError::Database(db_err) => {
                tracing::error!("database error: {db_err}");
                Self::new(FailureKind::Database, INTERNAL_ERROR)
            }
        }
    }
}

/// The posted form, or an empty one when the body is missing or unreadable.
///
/// An empty form fails the handler's own validation, so every bad body is
/// reported the same way as blank fields.
fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(payload)) => payload,
        Err(rejection) => {
            tracing::debug!("unreadable form: {rejection}");
            T::default()
        }
    }
}

/// A [`Failure`] together with the way the route reports it.
#[derive(Debug)]
pub enum ServerError {
    /// `303` back to `/` with the message in the `error` query parameter.
    Redirect(Failure),
    /// `{"message": ...}` with the status of the failure.
    Json(Failure),
    /// Plain text with the status of the failure.
    Page(Failure),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServerError::Redirect(failure) => Redirect::to(&failure.location()).into_response(),
            ServerError::Json(failure) => {
                (failure.status(), Json(Message::new(failure.message))).into_response()
            }
            ServerError::Page(failure) => (failure.status(), failure.message).into_response(),
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Redirect(value.into())
    }
}
