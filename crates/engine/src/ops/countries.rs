use sea_orm::{
    ActiveValue, QueryOrder,
    prelude::*,
    sea_query::{Expr, Func, LikeExpr, OnConflict, Order},
};

use crate::{EngineError, ResultEngine, countries, visited_countries};

use super::{Engine, normalize_required_text};

/// Escape character for the LIKE pattern built from user input.
const LIKE_ESCAPE: char = '!';

/// `input` with the LIKE wildcards escaped.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

fn lower_name() -> Expr {
    Expr::expr(Func::lower(Expr::col(countries::Column::CountryName)))
}

impl Engine {
    /// Find the country whose name contains `input`, ignoring case.
    ///
    /// When several names match, an exact match wins over a name starting
    /// with `input`, which wins over any other. Ties go to the alphabetically
    /// first name.
    pub async fn lookup_country(&self, input: &str) -> ResultEngine<countries::Model> {
        let input = normalize_required_text(input, "Invalid Input")?.to_lowercase();
        let escaped = escape_like(&input);

        countries::Entity::find()
            .filter(
                lower_name().like(LikeExpr::new(format!("%{escaped}%")).escape(LIKE_ESCAPE)),
            )
            .order_by(lower_name().eq(input.as_str()), Order::Desc)
            .order_by(
                lower_name().like(LikeExpr::new(format!("{escaped}%")).escape(LIKE_ESCAPE)),
                Order::Desc,
            )
            .order_by_asc(countries::Column::CountryName)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Country not found".to_string()))
    }

    /// Record that the current user visited the country matching `input`.
    ///
    /// Returns the code of the recorded country.
    pub async fn add_visited_country(&self, input: &str) -> ResultEngine<String> {
        normalize_required_text(input, "Invalid Input")?;

        let user = self
            .resolve_current_user()
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("No user selected".to_string()))?;
        let country = self.lookup_country(input).await?;

        let visit = visited_countries::ActiveModel {
            user_id: ActiveValue::Set(user.id),
            country_code: ActiveValue::Set(country.country_code.clone()),
        };
        let inserted = visited_countries::Entity::insert(visit)
            .on_conflict(
                OnConflict::columns([
                    visited_countries::Column::UserId,
                    visited_countries::Column::CountryCode,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;

        if inserted == 0 {
            return Err(EngineError::ExistingKey("Country already exist".to_string()));
        }

        tracing::info!("user {} visited {}", user.id, country.country_code);
        Ok(country.country_code)
    }

    /// Forget that `user_id` visited `country_code`.
    ///
    /// Returns the number of removed rows, zero when the visit was unknown.
    pub async fn remove_visited_country(
        &self,
        country_code: &str,
        user_id: i32,
    ) -> ResultEngine<u64> {
        let country_code = normalize_required_text(country_code, "Invalid Data")?;

        let removed = visited_countries::Entity::delete_many()
            .filter(visited_countries::Column::UserId.eq(user_id))
            .filter(visited_countries::Column::CountryCode.eq(country_code))
            .exec(&self.database)
            .await?;

        tracing::info!("user {user_id} unvisited {country_code}");
        Ok(removed.rows_affected)
    }
}
