use crate::entities::{
    DiscountType, TransactionKind, bonus_account_entity as accounts, promo_code_entity as promo,
};
use crate::error::{AppError, AppResult};
use crate::models::{BonusSettings, PromoCodeResponse, UseBonusRequest, UseBonusResponse};
use crate::services::ledger::{self, NewLedgerEntry};
use crate::services::{BonusService, SettingsService};
use crate::utils::generate_promo_code;
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// 优惠码有效期
pub const PROMO_CODE_TTL_DAYS: i64 = 30;

/// 生成唯一兑换码的最大尝试次数
const MAX_CODE_ATTEMPTS: usize = 10;

/// 一次兑换需要扣除的积分及得到的优惠
#[derive(Debug, Clone, PartialEq)]
struct RedemptionCost {
    cost: i64,
    discount_type: DiscountType,
    discount: i64,
    reward_id: Option<String>,
    description: String,
}

#[derive(Clone)]
pub struct RedemptionService {
    pool: DatabaseConnection,
    bonus_service: BonusService,
    settings_service: SettingsService,
}

impl RedemptionService {
    pub fn new(
        pool: DatabaseConnection,
        bonus_service: BonusService,
        settings_service: SettingsService,
    ) -> Self {
        Self {
            pool,
            bonus_service,
            settings_service,
        }
    }

    /// 积分兑换优惠码：扣减余额、写流水、生成优惠码在同一事务内完成
    pub async fn redeem(&self, user_id: &str, request: UseBonusRequest) -> AppResult<UseBonusResponse> {
        let balance = self.bonus_service.reconcile(user_id).await;

        let settings = self.settings_service.get_settings().await?;
        let resolved = resolve_cost(&settings, &request)?;

        if balance < resolved.cost {
            return Err(AppError::InsufficientBalance {
                required: resolved.cost,
                available: balance,
            });
        }

        let code = self.generate_unique_code().await?;
        let now = Utc::now();
        let expires_at = now + Duration::days(PROMO_CODE_TTL_DAYS);

        let txn = self.pool.begin().await?;

        // 条件扣减：并发兑换时余额不足的一方更新 0 行
        let updated = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).sub(resolved.cost),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::Balance.gte(resolved.cost))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            let available = accounts::Entity::find_by_id(user_id.to_string())
                .one(&txn)
                .await?
                .map(|a| a.balance)
                .unwrap_or(0);
            return Err(AppError::InsufficientBalance {
                required: resolved.cost,
                available,
            });
        }

        ledger::carry_over_legacy_balance(&txn, user_id).await?;

        let new_balance = ledger::ensure_account(&txn, user_id).await?.balance;

        let record = promo::ActiveModel {
            code: Set(code.clone()),
            user_id: Set(user_id.to_string()),
            discount_type: Set(resolved.discount_type),
            discount: Set(resolved.discount),
            cost: Set(resolved.cost),
            reward_id: Set(resolved.reward_id.clone()),
            is_used: Set(false),
            created_at: Set(now),
            expires_at: Set(expires_at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut spent = NewLedgerEntry::new(
            TransactionKind::Spent,
            resolved.cost,
            new_balance,
            resolved.description.clone(),
        );
        spent.promo_code = Some(code.clone());
        spent.reward_id = resolved.reward_id.clone();
        ledger::append_entry(&txn, user_id, spent).await?;

        txn.commit().await?;

        log::info!(
            "User {user_id} redeemed {} points for promo code {code} ({} {}), balance={new_balance}",
            resolved.cost,
            resolved.discount,
            resolved.discount_type
        );

        Ok(UseBonusResponse {
            promo_code: record.code,
            discount: record.discount,
            discount_type: record.discount_type,
            cost: record.cost,
            expires_at: record.expires_at,
            new_balance,
        })
    }

    /// 未使用且未过期的优惠码，最新的在前
    pub async fn list_active_promo_codes(&self, user_id: &str) -> AppResult<Vec<PromoCodeResponse>> {
        let list = promo::Entity::find()
            .filter(promo::Column::UserId.eq(user_id))
            .filter(promo::Column::IsUsed.eq(false))
            .filter(promo::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(promo::Column::CreatedAt)
            .order_by_desc(promo::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn generate_unique_code(&self) -> AppResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_promo_code();
            let exists = promo::Entity::find()
                .filter(promo::Column::Code.eq(code.as_str()))
                .count(&self.pool)
                .await?
                > 0;
            if !exists {
                return Ok(code);
            }
            log::debug!("Promo code collision on {code}, regenerating");
        }
        Err(AppError::InternalError(
            "Failed to generate a unique promo code".to_string(),
        ))
    }
}

/// 解析兑换成本：rewardId 优先，其次为显式积分数（按 1 积分 = 1 单位金额的固定折扣）
fn resolve_cost(settings: &BonusSettings, request: &UseBonusRequest) -> AppResult<RedemptionCost> {
    if let Some(reward_id) = request.reward_id.as_deref() {
        let reward = settings
            .find_reward(reward_id)
            .ok_or_else(|| AppError::NotFound(format!("Reward '{reward_id}' not found")))?;
        if !reward.is_active {
            return Err(AppError::ValidationError(format!(
                "Reward '{reward_id}' is inactive"
            )));
        }
        return Ok(RedemptionCost {
            cost: reward.cost,
            discount_type: reward.discount_type,
            discount: reward.discount,
            reward_id: Some(reward.id.clone()),
            description: format!("Redeemed reward: {}", reward.name),
        });
    }

    match request.amount {
        Some(amount) if amount > 0 => Ok(RedemptionCost {
            cost: amount,
            discount_type: DiscountType::Fixed,
            discount: amount,
            reward_id: None,
            description: format!("Redeemed {amount} bonus points"),
        }),
        Some(_) => Err(AppError::ValidationError(
            "amount must be a positive number of points".to_string(),
        )),
        None => Err(AppError::ValidationError(
            "Either rewardId or amount must be provided".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RewardItem;

    fn settings() -> BonusSettings {
        BonusSettings {
            rewards: vec![
                RewardItem {
                    id: "free-espresso".to_string(),
                    name: "Free espresso".to_string(),
                    description: String::new(),
                    cost: 50,
                    discount_type: DiscountType::Fixed,
                    discount: 250,
                    is_active: true,
                },
                RewardItem {
                    id: "half-off".to_string(),
                    name: "Half off".to_string(),
                    description: String::new(),
                    cost: 400,
                    discount_type: DiscountType::Percentage,
                    discount: 50,
                    is_active: false,
                },
            ],
            ..BonusSettings::default()
        }
    }

    fn request(reward_id: Option<&str>, amount: Option<i64>) -> UseBonusRequest {
        UseBonusRequest {
            user_id: None,
            reward_id: reward_id.map(str::to_string),
            amount,
        }
    }

    #[test]
    fn test_resolve_reward() {
        let cost = resolve_cost(&settings(), &request(Some("free-espresso"), None)).unwrap();
        assert_eq!(cost.cost, 50);
        assert_eq!(cost.discount, 250);
        assert_eq!(cost.reward_id.as_deref(), Some("free-espresso"));
    }

    #[test]
    fn test_reward_takes_precedence_over_amount() {
        let cost = resolve_cost(&settings(), &request(Some("free-espresso"), Some(999))).unwrap();
        assert_eq!(cost.cost, 50);
    }

    #[test]
    fn test_unknown_and_inactive_rewards() {
        assert!(matches!(
            resolve_cost(&settings(), &request(Some("nope"), None)),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            resolve_cost(&settings(), &request(Some("half-off"), None)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_explicit_amount() {
        let cost = resolve_cost(&settings(), &request(None, Some(120))).unwrap();
        assert_eq!(cost.cost, 120);
        assert_eq!(cost.discount_type, DiscountType::Fixed);
        assert_eq!(cost.discount, 120);
        assert!(cost.reward_id.is_none());

        assert!(resolve_cost(&settings(), &request(None, Some(0))).is_err());
        assert!(resolve_cost(&settings(), &request(None, None)).is_err());
    }
}
