use crate::config::ShopConfig;
use crate::entities::{TransactionKind, bonus_account_entity as accounts, bonus_transaction_entity};
use crate::error::{AppError, AppResult};
use crate::models::{BonusHistoryEntry, UserBonusResponse};
use crate::rules::tier_for;
use crate::services::ledger::{self, legacy_order_balance, ledger_entries, ledger_sum};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

/// 个人中心展示的流水条数
pub const HISTORY_LIMIT: usize = 50;

/// 并发写入导致缓存余额对比失败时的最大重试次数
const RECONCILE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct BonusService {
    pool: DatabaseConnection,
    shop: ShopConfig,
}

impl BonusService {
    pub fn new(pool: DatabaseConnection, shop: ShopConfig) -> Self {
        Self { pool, shop }
    }

    /// 按流水重新计算余额，缓存余额不一致时修正账户行
    ///
    /// 不返回错误：存储出错时记录日志并返回缓存余额（没有账户时为 0）。
    pub async fn reconcile(&self, user_id: &str) -> i64 {
        match self.try_reconcile(user_id).await {
            Ok(balance) => balance,
            Err(e) => {
                log::error!("Bonus reconciliation failed for user {user_id}: {e}");
                self.cached_balance(user_id).await
            }
        }
    }

    async fn cached_balance(&self, user_id: &str) -> i64 {
        match accounts::Entity::find_by_id(user_id.to_string())
            .one(&self.pool)
            .await
        {
            Ok(Some(account)) => account.balance.max(0),
            Ok(None) => 0,
            Err(e) => {
                log::error!("Failed to read cached bonus balance for user {user_id}: {e}");
                0
            }
        }
    }

    pub async fn try_reconcile(&self, user_id: &str) -> AppResult<i64> {
        for attempt in 1..=RECONCILE_ATTEMPTS {
            // 先读缓存再读流水：对比时若缓存已被并发写入修改，CAS 会失败并重试
            let account = accounts::Entity::find_by_id(user_id.to_string())
                .one(&self.pool)
                .await?;
            let entries = ledger_entries(&self.pool, user_id).await?;

            let computed = if entries.is_empty() {
                // 旧数据：流水为空时从订单推算
                legacy_order_balance(&self.pool, user_id)
                    .await?
                    .unwrap_or(0)
            } else {
                ledger_sum(&entries)
            };
            let computed = if computed < 0 {
                log::warn!(
                    "Computed bonus balance {computed} for user {user_id} is negative, clamping to 0"
                );
                0
            } else {
                computed
            };

            let Some(account) = account else {
                if computed == 0 {
                    return Ok(0);
                }
                ledger::ensure_account(&self.pool, user_id).await?;
                continue;
            };

            if account.balance == computed {
                return Ok(computed);
            }

            let result = accounts::Entity::update_many()
                .col_expr(accounts::Column::Balance, Expr::value(computed))
                .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(accounts::Column::UserId.eq(user_id))
                .filter(accounts::Column::Balance.eq(account.balance))
                .exec(&self.pool)
                .await?;

            if result.rows_affected == 1 {
                log::info!(
                    "Repaired cached bonus balance for user {user_id}: {} -> {computed}",
                    account.balance
                );
                return Ok(computed);
            }
            log::debug!(
                "Bonus account {user_id} changed during reconciliation (attempt {attempt}), retrying"
            );
        }

        Err(AppError::InternalError(format!(
            "Bonus account {user_id} kept changing during reconciliation"
        )))
    }

    /// 当前累计订单数；没有账户时按已有订单计算
    pub async fn total_orders(&self, user_id: &str) -> AppResult<i64> {
        if let Some(account) = accounts::Entity::find_by_id(user_id.to_string())
            .one(&self.pool)
            .await?
        {
            return Ok(account.total_orders);
        }
        let count = crate::entities::order_entity::Entity::find()
            .filter(crate::entities::order_entity::Column::UserId.eq(user_id))
            .count(&self.pool)
            .await?;
        Ok(count as i64)
    }

    /// 用户积分视图：余额、等级进度、本月汇总与最近流水
    pub async fn get_user_bonus(&self, user_id: &str) -> AppResult<UserBonusResponse> {
        let balance = self.reconcile(user_id).await;
        let total_orders = self.total_orders(user_id).await?;
        let progress = tier_for(total_orders);

        let entries = ledger_entries(&self.pool, user_id).await?;
        let since = self.month_start(Utc::now());
        let (earned_this_month, spent_this_month) = monthly_totals(&entries, since);

        let history: Vec<BonusHistoryEntry> = entries
            .into_iter()
            .take(HISTORY_LIMIT)
            .map(Into::into)
            .collect();

        Ok(UserBonusResponse {
            balance,
            level: progress.tier,
            next_level: progress.next_tier,
            orders_to_next_level: progress.orders_to_next,
            total_orders,
            multiplier: progress.tier.multiplier(),
            earned_this_month,
            spent_this_month,
            history,
        })
    }

    /// 门店本地时间当月 1 日 00:00 对应的 UTC 时刻
    fn month_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let offset = self.shop.offset();
        let local = now.with_timezone(&offset);
        offset
            .with_ymd_and_hms(local.year(), local.month(), 1, 0, 0, 0)
            .single()
            .map(|start| start.with_timezone(&Utc))
            .unwrap_or(now)
    }
}

fn monthly_totals(entries: &[bonus_transaction_entity::Model], since: DateTime<Utc>) -> (i64, i64) {
    entries
        .iter()
        .filter(|e| e.created_at >= since)
        .fold((0, 0), |(earned, spent), e| match e.kind {
            TransactionKind::Earned => (earned + e.amount, spent),
            TransactionKind::Spent => (earned, spent + e.amount),
        })
}
