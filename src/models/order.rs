use crate::entities::{OrderStatus, order_entity, order_item_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[schema(example = "Cappuccino")]
    pub name: String,
    /// 单价（最小货币单位）
    #[schema(example = 350)]
    pub price: i64,
    #[schema(example = 2)]
    pub quantity: i64,
    #[schema(example = "coffee")]
    pub category: Option<String>,
}

impl OrderItemRequest {
    pub fn subtotal(&self) -> Option<i64> {
        self.price.checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// 可省略，省略时使用当前登录用户
    pub user_id: Option<String>,
    pub items: Vec<OrderItemRequest>,
    /// 客户端计算的总额，必须与明细汇总一致
    pub amount: i64,
    #[serde(default)]
    pub bonus_used: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: i64,
    pub bonus_earned: i64,
    pub bonus_used: i64,
    pub new_balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub order_id: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub user_id: Option<String>,
    pub status: Option<OrderStatus>,
    /// 返回条数上限，默认 100
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub name: String,
    pub category: Option<String>,
    pub price: i64,
    pub quantity: i64,
}

impl From<order_item_entity::Model> for OrderItemResponse {
    fn from(m: order_item_entity::Model) -> Self {
        Self {
            name: m.name,
            category: m.category,
            price: m.price,
            quantity: m.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: String,
    pub items: Vec<OrderItemResponse>,
    pub amount: i64,
    pub bonus_used: i64,
    pub bonus_earned: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_parts(order: order_entity::Model, items: Vec<order_item_entity::Model>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            amount: order.amount,
            bonus_used: order.bonus_used,
            bonus_earned: order.bonus_earned,
            status: order.status,
            created_at: order.created_at,
        }
    }
}
