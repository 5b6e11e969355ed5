use crate::entities::{DiscountType, promo_code_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 积分兑换请求：rewardId 与 amount 二选一，同时提供时以 rewardId 为准
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UseBonusRequest {
    pub user_id: Option<String>,
    #[schema(example = "free-espresso")]
    pub reward_id: Option<String>,
    #[schema(example = 100)]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UseBonusResponse {
    #[schema(example = "BONUS7XK2QA")]
    pub promo_code: String,
    pub discount: i64,
    pub discount_type: DiscountType,
    pub cost: i64,
    pub expires_at: DateTime<Utc>,
    pub new_balance: i64,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeResponse {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount: i64,
    pub cost: i64,
    pub reward_id: Option<String>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<promo_code_entity::Model> for PromoCodeResponse {
    fn from(m: promo_code_entity::Model) -> Self {
        Self {
            code: m.code,
            discount_type: m.discount_type,
            discount: m.discount,
            cost: m.cost,
            reward_id: m.reward_id,
            is_used: m.is_used,
            created_at: m.created_at,
            expires_at: m.expires_at,
        }
    }
}
