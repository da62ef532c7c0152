use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{DEFAULT_COLOR, EngineError, ResultEngine, User, users, visited_countries};

use super::{Dashboard, Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// All users, oldest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        let users = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::from)
            .collect();
        Ok(users)
    }

    /// Load the index page state.
    ///
    /// The current user pointer is cleared when no user exists and moved to
    /// the oldest user when it is empty or references a deleted user.
    pub async fn dashboard(&self) -> ResultEngine<Dashboard> {
        let users = self.list_users().await?;
        let Some(first) = users.first() else {
            self.current_user.clear();
            return Ok(Dashboard::default());
        };

        let current = match self
            .current_user
            .get()
            .and_then(|id| users.iter().find(|user| user.id == id))
        {
            Some(user) => user.clone(),
            None => {
                tracing::debug!("current user reset to {}", first.id);
                self.current_user.set(first.id);
                first.clone()
            }
        };

        let countries = self.visited_countries(current.id).await?;
        Ok(Dashboard {
            users,
            current_user: Some(current),
            countries,
        })
    }

    /// Codes of the countries `user_id` has visited.
    pub async fn visited_countries(&self, user_id: i32) -> ResultEngine<Vec<String>> {
        let codes = visited_countries::Entity::find()
            .filter(visited_countries::Column::UserId.eq(user_id))
            .order_by_asc(visited_countries::Column::CountryCode)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|visit| visit.country_code)
            .collect();
        Ok(codes)
    }

    /// The user the current pointer references, if it still exists.
    pub async fn resolve_current_user(&self) -> ResultEngine<Option<User>> {
        let Some(id) = self.current_user.get() else {
            return Ok(None);
        };
        let user = users::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(User::from);
        Ok(user)
    }

    /// Make `user_id` the current user.
    ///
    /// The id is not checked: a dangling pointer is repaired by the next
    /// [`Engine::dashboard`].
    pub fn switch_user(&self, user_id: i32) {
        tracing::debug!("switching current user to {user_id}");
        self.current_user.set(user_id);
    }

    /// Create a user and make it the current one.
    pub async fn create_user(&self, name: &str, color: Option<&str>) -> ResultEngine<User> {
        let name = normalize_required_text(name, "Enter a name")?;
        let color = normalize_optional_text(color).unwrap_or_else(|| DEFAULT_COLOR.to_string());

        let user = users::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            color: ActiveValue::Set(Some(color)),
            ..Default::default()
        };
        let user: User = user
            .insert(&self.database)
            .await
            .map_err(|err| EngineError::from_unique_violation(err, "User already exists"))?
            .into();

        tracing::info!("created user {} ({})", user.name, user.id);
        self.current_user.set(user.id);
        Ok(user)
    }

    /// Delete a user together with the countries they visited.
    ///
    /// When the deleted user was the current one, the pointer moves to the
    /// oldest remaining user, or is cleared if none is left.
    pub async fn delete_user(&self, user_id: i32) -> ResultEngine<()> {
        if user_id <= 0 {
            return Err(EngineError::InvalidInput("Invalid id".to_string()));
        }

        let fallback = with_tx!(self, |db_tx| {
            visited_countries::Entity::delete_many()
                .filter(visited_countries::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;

            let deleted = users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            if deleted.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("No user found".to_string()));
            }

            let fallback = users::Entity::find()
                .order_by_asc(users::Column::Id)
                .one(&db_tx)
                .await?
                .map(|user| user.id);
            Ok::<_, EngineError>(fallback)
        })?;

        tracing::info!("deleted user {user_id}");
        if self.current_user.replace_if(user_id, fallback) {
            tracing::debug!("current user reset to {fallback:?}");
        }

        Ok(())
    }
}
