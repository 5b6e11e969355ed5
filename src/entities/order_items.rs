use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 订单明细（下单时的名称/价格快照）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub category: Option<String>,
    pub price: i64,
    pub quantity: i64,
}

impl Model {
    pub fn subtotal(&self) -> i64 {
        self.price * self.quantity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
