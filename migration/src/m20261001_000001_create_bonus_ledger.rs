use sea_orm_migration::prelude::*;

/// Per-user cached balance and lifetime order count
#[derive(DeriveIden)]
enum BonusAccounts {
    Table,
    UserId,
    Balance,
    TotalOrders,
    CreatedAt,
    UpdatedAt,
}

/// Append-only bonus ledger (earned / spent)
#[derive(DeriveIden)]
enum BonusTransactions {
    Table,
    Id,
    UserId,
    Kind,
    Amount,
    BalanceAfter,
    Description,
    OrderId,
    PromoCode,
    RewardId,
    CreatedAt,
}

/// Tenant-wide bonus settings, stored as a single JSON document row
#[derive(DeriveIden)]
enum BonusSettings {
    Table,
    Id,
    Document,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BonusAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BonusAccounts::UserId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BonusAccounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BonusAccounts::TotalOrders)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BonusAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BonusAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BonusTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BonusTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BonusTransactions::UserId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BonusTransactions::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BonusTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BonusTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BonusTransactions::Description)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BonusTransactions::OrderId).big_integer().null())
                    .col(ColumnDef::new(BonusTransactions::PromoCode).string_len(32).null())
                    .col(ColumnDef::new(BonusTransactions::RewardId).string_len(64).null())
                    .col(
                        ColumnDef::new(BonusTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bonus_transactions_user_id")
                    .table(BonusTransactions::Table)
                    .col(BonusTransactions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BonusSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BonusSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BonusSettings::Document).text().not_null())
                    .col(
                        ColumnDef::new(BonusSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(BonusSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(BonusTransactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(BonusAccounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
