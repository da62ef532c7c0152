//! One row per (user, country) pair the user has visited.
//!
//! Rows are not removed by the database when their user goes away: the
//! engine deletes them in the same transaction as the user.

use sea_orm_migration::prelude::*;

use crate::m20260301_090000_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum VisitedCountries {
    Table,
    UserId,
    CountryCode,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VisitedCountries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VisitedCountries::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(VisitedCountries::CountryCode)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(VisitedCountries::UserId)
                            .col(VisitedCountries::CountryCode),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-visited_countries-user_id")
                            .from(VisitedCountries::Table, VisitedCountries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-visited_countries-user_id")
                    .table(VisitedCountries::Table)
                    .col(VisitedCountries::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VisitedCountries::Table).to_owned())
            .await
    }
}
