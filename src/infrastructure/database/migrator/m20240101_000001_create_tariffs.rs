//! Create tariffs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tariffs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tariffs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tariffs::City).text().not_null())
                    .col(
                        ColumnDef::new(Tariffs::Type)
                            .text()
                            .not_null()
                            .check(Expr::col(Tariffs::Type).is_in(["REGULAR", "PRIVILEGED"])),
                    )
                    .col(
                        ColumnDef::new(Tariffs::Price)
                            .double()
                            .not_null()
                            .check(Expr::col(Tariffs::Price).between(0.01, 1000.00)),
                    )
                    .col(
                        ColumnDef::new(Tariffs::Discount)
                            .double()
                            .not_null()
                            .default(0.0)
                            .check(Expr::col(Tariffs::Discount).between(0.0, 100.0)),
                    )
                    .to_owned(),
            )
            .await?;

        // Backstop for the manager's duplicate check
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tariffs_unique")
                    .table(Tariffs::Table)
                    .col(Tariffs::City)
                    .col(Tariffs::Type)
                    .col(Tariffs::Price)
                    .col(Tariffs::Discount)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tariffs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Tariffs {
    Table,
    Id,
    City,
    Type,
    Price,
    Discount,
}
