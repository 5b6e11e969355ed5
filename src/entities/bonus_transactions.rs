use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    #[sea_orm(string_value = "earned")]
    Earned,
    #[sea_orm(string_value = "spent")]
    Spent,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Earned => write!(f, "earned"),
            TransactionKind::Spent => write!(f, "spent"),
        }
    }
}

/// 积分流水（只追加，不修改）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bonus_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub kind: TransactionKind,
    /// 始终为正数，方向由 kind 决定
    pub amount: i64,
    pub balance_after: i64,
    pub description: String,
    pub order_id: Option<i64>,
    pub promo_code: Option<String>,
    pub reward_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// 该条流水对余额的带符号贡献
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Earned => self.amount,
            TransactionKind::Spent => -self.amount,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
