//! 各服务共用的积分流水读写
//!
//! 函数都接受泛型连接：读取时传连接池，写入时传 `DatabaseTransaction`。

use crate::entities::{
    TransactionKind, bonus_account_entity as accounts, bonus_transaction_entity as ledger,
    order_entity as orders,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

/// 待写入的流水
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub kind: TransactionKind,
    pub amount: i64,
    pub balance_after: i64,
    pub description: String,
    pub order_id: Option<i64>,
    pub promo_code: Option<String>,
    pub reward_id: Option<String>,
}

impl NewLedgerEntry {
    pub fn new(kind: TransactionKind, amount: i64, balance_after: i64, description: String) -> Self {
        Self {
            kind,
            amount,
            balance_after,
            description,
            order_id: None,
            promo_code: None,
            reward_id: None,
        }
    }
}

pub async fn append_entry<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    entry: NewLedgerEntry,
) -> Result<ledger::Model, DbErr> {
    if entry.amount <= 0 {
        return Err(DbErr::Custom(format!(
            "Ledger amount must be positive, got {}",
            entry.amount
        )));
    }

    ledger::ActiveModel {
        user_id: Set(user_id.to_string()),
        kind: Set(entry.kind),
        amount: Set(entry.amount),
        balance_after: Set(entry.balance_after),
        description: Set(entry.description),
        order_id: Set(entry.order_id),
        promo_code: Set(entry.promo_code),
        reward_id: Set(entry.reward_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// 获取账户，不存在则创建（并发创建时以先写入者为准）
pub async fn ensure_account<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<accounts::Model, DbErr> {
    if let Some(m) = accounts::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
    {
        return Ok(m);
    }

    // 历史数据里可能已有订单，累计订单数从已有订单开始
    let existing_orders = orders::Entity::find()
        .filter(orders::Column::UserId.eq(user_id))
        .count(db)
        .await? as i64;

    let now = Utc::now();
    let model = accounts::ActiveModel {
        user_id: Set(user_id.to_string()),
        balance: Set(0),
        total_orders: Set(existing_orders),
        created_at: Set(now),
        updated_at: Set(now),
    };
    accounts::Entity::insert(model)
        .on_conflict(
            OnConflict::column(accounts::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    accounts::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("bonus account {user_id}")))
}

/// 用户全部流水，按时间倒序
pub async fn ledger_entries<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Vec<ledger::Model>, DbErr> {
    ledger::Entity::find()
        .filter(ledger::Column::UserId.eq(user_id))
        .order_by_desc(ledger::Column::CreatedAt)
        .order_by_desc(ledger::Column::Id)
        .all(db)
        .await
}

pub fn ledger_sum(entries: &[ledger::Model]) -> i64 {
    entries.iter().map(ledger::Model::signed_amount).sum()
}

/// 旧数据兼容：流水为空时根据订单上的 bonus_earned / bonus_used 推算余额。
/// 返回 None 表示没有任何历史订单。
pub async fn legacy_order_balance<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Option<i64>, DbErr> {
    let history = orders::Entity::find()
        .filter(orders::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    if history.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        history
            .iter()
            .map(|o| o.bonus_earned - o.bonus_used)
            .sum(),
    ))
}

/// 用户首次写流水时，把只存在于历史订单上的余额记为一条期初流水
///
/// 必须在写事务内、账户行更新之后调用（账户行更新使并发写入串行化）。
pub async fn carry_over_legacy_balance<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<(), DbErr> {
    let existing = ledger::Entity::find()
        .filter(ledger::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let opening = legacy_order_balance(db, user_id).await?.unwrap_or(0);
    if opening > 0 {
        log::info!("Carrying over legacy bonus balance {opening} for user {user_id}");
        append_entry(
            db,
            user_id,
            NewLedgerEntry::new(
                TransactionKind::Earned,
                opening,
                opening,
                "Opening balance carried over from order history".to_string(),
            ),
        )
        .await?;
    }
    Ok(())
}
