use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UpdatedCountries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UpdatedCountries::CountryCode)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UpdatedCountries::CountryName)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UpdatedCountries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UpdatedCountries {
    Table,
    CountryCode,
    CountryName,
}
