use crate::entities::{TransactionKind, bonus_transaction_entity};
use crate::rules::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBonusQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BonusHistoryEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: i64,
    pub balance_after: i64,
    pub description: String,
    pub order_id: Option<i64>,
    pub promo_code: Option<String>,
    pub reward_id: Option<String>,
    pub date: DateTime<Utc>,
}

impl From<bonus_transaction_entity::Model> for BonusHistoryEntry {
    fn from(m: bonus_transaction_entity::Model) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            amount: m.amount,
            balance_after: m.balance_after,
            description: m.description,
            order_id: m.order_id,
            promo_code: m.promo_code,
            reward_id: m.reward_id,
            date: m.created_at,
        }
    }
}

/// 用户积分账户视图
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBonusResponse {
    pub balance: i64,
    pub level: Tier,
    pub next_level: Option<Tier>,
    pub orders_to_next_level: i64,
    pub total_orders: i64,
    /// 当前等级的积分倍率
    pub multiplier: f64,
    pub earned_this_month: i64,
    pub spent_this_month: i64,
    /// 最近的流水，按时间倒序
    pub history: Vec<BonusHistoryEntry>,
}
