#![allow(dead_code)]

use bonus_backend::config::ShopConfig;
use bonus_backend::entities::{
    OrderStatus, bonus_account_entity as accounts, bonus_transaction_entity as ledger,
    order_entity as orders,
};
use bonus_backend::models::{CreateOrderRequest, OrderItemRequest};
use bonus_backend::services::Services;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

pub const TEST_SECRET: &str = "test-secret";

/// 单连接的内存 SQLite，保证所有查询看到同一个数据库
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn setup() -> (DatabaseConnection, Services) {
    let db = setup_db().await;
    let services = Services::new(db.clone(), ShopConfig::default());
    (db, services)
}

pub fn item(name: &str, price: i64, quantity: i64) -> OrderItemRequest {
    OrderItemRequest {
        name: name.to_string(),
        price,
        quantity,
        category: None,
    }
}

/// 单品订单，金额与明细一致
pub fn order_of(amount: i64, bonus_used: Option<i64>) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: None,
        items: vec![item("Flat white", amount, 1)],
        amount,
        bonus_used,
    }
}

pub async fn cached_balance(db: &DatabaseConnection, user_id: &str) -> Option<i64> {
    accounts::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await
        .unwrap()
        .map(|a| a.balance)
}

pub async fn set_cached_balance(db: &DatabaseConnection, user_id: &str, balance: i64) {
    let account = accounts::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await
        .unwrap()
        .unwrap();
    let mut active: accounts::ActiveModel = account.into();
    active.balance = Set(balance);
    active.update(db).await.unwrap();
}

pub async fn ledger_for(db: &DatabaseConnection, user_id: &str) -> Vec<ledger::Model> {
    ledger::Entity::find()
        .filter(ledger::Column::UserId.eq(user_id))
        .all(db)
        .await
        .unwrap()
}

/// 写入一条没有流水的历史订单（模拟旧数据）
pub async fn insert_legacy_order(
    db: &DatabaseConnection,
    user_id: &str,
    amount: i64,
    bonus_earned: i64,
    bonus_used: i64,
) -> orders::Model {
    let now = Utc::now();
    orders::ActiveModel {
        user_id: Set(user_id.to_string()),
        amount: Set(amount),
        bonus_used: Set(bonus_used),
        bonus_earned: Set(bonus_earned),
        status: Set(OrderStatus::Completed),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
