use sea_orm::DatabaseConnection;

use crate::{CurrentUser, EngineError, ResultEngine, User};

mod countries;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    current_user: CurrentUser,
}

/// Everything the index page shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub users: Vec<User>,
    pub current_user: Option<User>,
    /// Codes visited by the current user.
    pub countries: Vec<String>,
}

impl Dashboard {
    pub fn total(&self) -> usize {
        self.countries.len()
    }

    pub fn color(&self) -> &str {
        self.current_user
            .as_ref()
            .map_or(crate::FALLBACK_COLOR, User::color)
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The process-wide current user pointer.
    pub fn current_user(&self) -> &CurrentUser {
        &self.current_user
    }
}

fn normalize_required_text<'a>(value: &'a str, message: &str) -> ResultEngine<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(message.to_string()));
    }
    Ok(trimmed)
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    current_user: Option<i32>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Start with the pointer on `user_id` instead of empty.
    pub fn current_user(mut self, user_id: i32) -> EngineBuilder {
        self.current_user = Some(user_id);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            current_user: CurrentUser::new(self.current_user),
        })
    }
}
