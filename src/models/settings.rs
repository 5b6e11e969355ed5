use crate::entities::DiscountType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

fn one() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// 时段/会员加成系数，未配置的项按 1.0 处理
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContextMultipliers {
    #[serde(default = "one")]
    pub morning: f64,
    #[serde(default = "one")]
    pub evening: f64,
    #[serde(default = "one")]
    pub weekend: f64,
    #[serde(default = "one")]
    pub vip: f64,
}

impl Default for ContextMultipliers {
    fn default() -> Self {
        Self {
            morning: 1.0,
            evening: 1.0,
            weekend: 1.0,
            vip: 1.0,
        }
    }
}

/// 可兑换的奖励目录项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardItem {
    #[schema(example = "free-espresso")]
    pub id: String,
    #[schema(example = "Free espresso")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 兑换所需积分
    pub cost: i64,
    pub discount_type: DiscountType,
    /// fixed: 金额; percentage: 百分比 (1-100)
    pub discount: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// 会员等级说明（仅展示用，等级计算使用固定阈值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub name: String,
    pub min_orders: i64,
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// 全店共用的积分配置文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BonusSettings {
    /// 订单金额中计入积分的百分比
    pub base_rate: f64,
    #[serde(default)]
    pub multipliers: ContextMultipliers,
    #[serde(default)]
    pub category_multipliers: BTreeMap<String, f64>,
    #[serde(default)]
    pub rewards: Vec<RewardItem>,
    #[serde(default)]
    pub levels: Vec<LevelInfo>,
}

impl Default for BonusSettings {
    fn default() -> Self {
        Self {
            base_rate: 5.0,
            multipliers: ContextMultipliers::default(),
            category_multipliers: BTreeMap::new(),
            rewards: Vec::new(),
            levels: vec![
                LevelInfo {
                    name: "Novice".to_string(),
                    min_orders: 0,
                    benefits: vec!["Base bonus rate".to_string()],
                },
                LevelInfo {
                    name: "Enthusiast".to_string(),
                    min_orders: 10,
                    benefits: vec!["x1.2 bonus".to_string()],
                },
                LevelInfo {
                    name: "Expert".to_string(),
                    min_orders: 50,
                    benefits: vec!["x1.5 bonus".to_string()],
                },
                LevelInfo {
                    name: "VIP".to_string(),
                    min_orders: 100,
                    benefits: vec!["x2 bonus".to_string()],
                },
            ],
        }
    }
}

impl BonusSettings {
    pub fn find_reward(&self, reward_id: &str) -> Option<&RewardItem> {
        self.rewards.iter().find(|r| r.id == reward_id)
    }

    /// 未配置的品类返回 1.0
    pub fn category_multiplier(&self, category: Option<&str>) -> f64 {
        category
            .and_then(|c| self.category_multipliers.get(c))
            .copied()
            .unwrap_or(1.0)
    }
}
