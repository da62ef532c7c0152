pub use sea_orm_migration::prelude::*;

mod m20260301_090000_users;
mod m20260301_091000_countries;
mod m20260301_092000_visited_countries;
mod m20260302_090000_seed_countries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_090000_users::Migration),
            Box::new(m20260301_091000_countries::Migration),
            Box::new(m20260301_092000_visited_countries::Migration),
            Box::new(m20260302_090000_seed_countries::Migration),
        ]
    }
}
