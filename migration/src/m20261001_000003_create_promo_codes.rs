use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum PromoCodes {
    Table,
    Id,
    Code,
    UserId,
    DiscountType,
    Discount,
    Cost,
    RewardId,
    IsUsed,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PromoCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PromoCodes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PromoCodes::Code).string_len(32).not_null())
                    .col(ColumnDef::new(PromoCodes::UserId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(PromoCodes::DiscountType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PromoCodes::Discount).big_integer().not_null())
                    .col(ColumnDef::new(PromoCodes::Cost).big_integer().not_null())
                    .col(ColumnDef::new(PromoCodes::RewardId).string_len(64).null())
                    .col(
                        ColumnDef::new(PromoCodes::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PromoCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PromoCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 兑换码全局唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_promo_codes_code_unique")
                    .table(PromoCodes::Table)
                    .col(PromoCodes::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_promo_codes_user_id")
                    .table(PromoCodes::Table)
                    .col(PromoCodes::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(PromoCodes::Table).to_owned())
            .await?;
        Ok(())
    }
}
