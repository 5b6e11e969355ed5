use crate::config::ShopConfig;
use crate::entities::{
    OrderStatus, TransactionKind, bonus_account_entity as accounts, order_entity as orders,
    order_item_entity as order_items,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateOrderRequest, CreateOrderResponse, OrderItemRequest, OrderQuery, OrderResponse,
};
use crate::rules::{AccrualContext, order_accrual, tier_for, validate_transition};
use crate::services::ledger::{self, NewLedgerEntry};
use crate::services::{BonusService, SettingsService};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

const DEFAULT_LIST_LIMIT: u64 = 100;
const MAX_LIST_LIMIT: u64 = 500;

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    shop: ShopConfig,
    bonus_service: BonusService,
    settings_service: SettingsService,
}

impl OrderService {
    pub fn new(
        pool: DatabaseConnection,
        shop: ShopConfig,
        bonus_service: BonusService,
        settings_service: SettingsService,
    ) -> Self {
        Self {
            pool,
            shop,
            bonus_service,
            settings_service,
        }
    }

    /// 创建订单：扣减抵扣积分、发放积分、写流水，全部在一个事务内完成
    pub async fn create_order(
        &self,
        user_id: &str,
        request: CreateOrderRequest,
    ) -> AppResult<CreateOrderResponse> {
        let amount = validate_order(&request)?;
        let bonus_used = request.bonus_used.unwrap_or(0);

        let settings = self.settings_service.get_settings().await?;
        let balance = self.bonus_service.reconcile(user_id).await;
        if bonus_used > balance {
            return Err(AppError::InsufficientBalance {
                required: bonus_used,
                available: balance,
            });
        }

        let total_orders = self.bonus_service.total_orders(user_id).await?;
        let tier = tier_for(total_orders).tier;
        let now = Utc::now();
        let ctx = AccrualContext::at(now, &self.shop, tier, shared_category(&request.items));
        let bonus_earned = order_accrual(amount, &settings, &ctx, tier);

        let txn = self.pool.begin().await?;
        ledger::ensure_account(&txn, user_id).await?;

        // 余额条件更新，防止并发下单重复抵扣
        let updated = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(bonus_earned - bonus_used),
            )
            .col_expr(
                accounts::Column::TotalOrders,
                Expr::col(accounts::Column::TotalOrders).add(1),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::Balance.gte(bonus_used))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            let available = ledger::ensure_account(&txn, user_id).await?.balance;
            return Err(AppError::InsufficientBalance {
                required: bonus_used,
                available,
            });
        }

        ledger::carry_over_legacy_balance(&txn, user_id).await?;

        let order = orders::ActiveModel {
            user_id: Set(user_id.to_string()),
            amount: Set(amount),
            bonus_used: Set(bonus_used),
            bonus_earned: Set(bonus_earned),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let items: Vec<order_items::ActiveModel> = request
            .items
            .iter()
            .map(|item| order_items::ActiveModel {
                order_id: Set(order.id),
                name: Set(item.name.trim().to_string()),
                category: Set(item.category.clone()),
                price: Set(item.price),
                quantity: Set(item.quantity),
                ..Default::default()
            })
            .collect();
        order_items::Entity::insert_many(items).exec(&txn).await?;

        let new_balance = ledger::ensure_account(&txn, user_id).await?.balance;

        if bonus_used > 0 {
            let mut spent = NewLedgerEntry::new(
                TransactionKind::Spent,
                bonus_used,
                new_balance - bonus_earned,
                format!("Bonus applied to order #{}", order.id),
            );
            spent.order_id = Some(order.id);
            ledger::append_entry(&txn, user_id, spent).await?;
        }
        if bonus_earned > 0 {
            let mut earned = NewLedgerEntry::new(
                TransactionKind::Earned,
                bonus_earned,
                new_balance,
                format!("Bonus earned for order #{}", order.id),
            );
            earned.order_id = Some(order.id);
            ledger::append_entry(&txn, user_id, earned).await?;
        }

        txn.commit().await?;

        log::info!(
            "Order {} created for user {user_id}: amount={amount}, bonus_used={bonus_used}, bonus_earned={bonus_earned}, tier={tier}, balance={new_balance}",
            order.id
        );

        Ok(CreateOrderResponse {
            order_id: order.id,
            bonus_earned,
            bonus_used,
            new_balance,
        })
    }

    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order #{order_id} not found")))?;
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .order_by_asc(order_items::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    /// 推进订单状态，只允许前进一步；以当前状态为条件更新，并发推进只有一个成功
    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order #{order_id} not found")))?;

        validate_transition(order.status, status)?;

        let result = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(status))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(order_id))
            .filter(orders::Column::Status.eq(order.status))
            .exec(&self.pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::ValidationError(format!(
                "Order #{order_id} status changed concurrently, expected {}",
                order.status
            )));
        }

        log::info!("Order {order_id} status: {} -> {status}", order.status);
        self.get_order(order_id).await
    }

    /// 订单列表，按创建时间倒序；user_id / status 为可选过滤条件
    pub async fn list_orders(&self, query: &OrderQuery) -> AppResult<Vec<OrderResponse>> {
        let mut select = orders::Entity::find();
        if let Some(user_id) = query.user_id.as_deref() {
            select = select.filter(orders::Column::UserId.eq(user_id));
        }
        if let Some(status) = query.status {
            select = select.filter(orders::Column::Status.eq(status));
        }

        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        let list = select
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(limit)
            .all(&self.pool)
            .await?;

        if list.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = list.iter().map(|o| o.id).collect();
        let mut items_by_order: HashMap<i64, Vec<order_items::Model>> = HashMap::new();
        for item in order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(ids))
            .order_by_asc(order_items::Column::Id)
            .all(&self.pool)
            .await?
        {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(list
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                OrderResponse::from_parts(order, items)
            })
            .collect())
    }
}

/// 校验订单明细并返回按明细汇总的金额
fn validate_order(request: &CreateOrderRequest) -> AppResult<i64> {
    if request.items.is_empty() {
        return Err(AppError::ValidationError(
            "Order must contain at least one item".to_string(),
        ));
    }

    let mut total: i64 = 0;
    for item in &request.items {
        if item.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Item name must not be empty".to_string(),
            ));
        }
        if item.price < 0 {
            return Err(AppError::ValidationError(format!(
                "Item '{}' has a negative price",
                item.name
            )));
        }
        if item.quantity <= 0 {
            return Err(AppError::ValidationError(format!(
                "Item '{}' must have a positive quantity",
                item.name
            )));
        }
        total = item
            .subtotal()
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or_else(|| AppError::ValidationError("Order amount is too large".to_string()))?;
    }

    if request.amount != total {
        return Err(AppError::ValidationError(format!(
            "Order amount {} does not match item total {total}",
            request.amount
        )));
    }

    match request.bonus_used {
        Some(used) if used < 0 => Err(AppError::ValidationError(
            "bonusUsed must not be negative".to_string(),
        )),
        Some(used) if used > total => Err(AppError::ValidationError(
            "bonusUsed cannot exceed the order amount".to_string(),
        )),
        _ => Ok(total),
    }
}

/// 所有明细同属一个品类时才按品类加成
fn shared_category(items: &[OrderItemRequest]) -> Option<String> {
    let first = items.first()?.category.as_deref()?;
    items
        .iter()
        .all(|item| item.category.as_deref() == Some(first))
        .then(|| first.to_string())
}
