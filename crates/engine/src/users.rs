//! Users table.
//!
//! A user is a display name and the colour used to paint their countries.

use sea_orm::entity::prelude::*;

/// Colour given to users created without one.
pub const DEFAULT_COLOR: &str = "#c1c1be";

/// Colour of the page when there is no current user or it has no colour.
pub const FALLBACK_COLOR: &str = "#000000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
}

impl User {
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(FALLBACK_COLOR)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub color: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::visited_countries::Entity")]
    VisitedCountries,
}

impl Related<super::visited_countries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VisitedCountries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
        }
    }
}
