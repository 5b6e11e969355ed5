use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 会员等级，由累计订单数决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Tier {
    Novice,
    Enthusiast,
    Expert,
    #[serde(rename = "VIP")]
    Vip,
}

impl Tier {
    /// 等级积分倍率（固定表，与配置中的时段倍率相互独立）
    pub fn multiplier(self) -> f64 {
        match self {
            Tier::Novice => 1.0,
            Tier::Enthusiast => 1.2,
            Tier::Expert => 1.5,
            Tier::Vip => 2.0,
        }
    }

    /// 属于该等级的最小 `total_orders`
    pub fn threshold(self) -> i64 {
        match self {
            Tier::Novice => 0,
            Tier::Enthusiast => 10,
            Tier::Expert => 50,
            Tier::Vip => 100,
        }
    }

    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Novice => Some(Tier::Enthusiast),
            Tier::Enthusiast => Some(Tier::Expert),
            Tier::Expert => Some(Tier::Vip),
            Tier::Vip => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Novice => write!(f, "Novice"),
            Tier::Enthusiast => write!(f, "Enthusiast"),
            Tier::Expert => write!(f, "Expert"),
            Tier::Vip => write!(f, "VIP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierProgress {
    pub tier: Tier,
    pub next_tier: Option<Tier>,
    pub orders_to_next: i64,
}

/// 根据累计订单数计算等级；阈值下界闭合（10 单即为 Enthusiast）
pub fn tier_for(total_orders: i64) -> TierProgress {
    let tier = if total_orders >= Tier::Vip.threshold() {
        Tier::Vip
    } else if total_orders >= Tier::Expert.threshold() {
        Tier::Expert
    } else if total_orders >= Tier::Enthusiast.threshold() {
        Tier::Enthusiast
    } else {
        Tier::Novice
    };

    let next_tier = tier.next();
    let orders_to_next = next_tier
        .map(|next| next.threshold() - total_orders)
        .unwrap_or(0);

    TierProgress {
        tier,
        next_tier,
        orders_to_next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_closed_at_lower_bound() {
        assert_eq!(tier_for(9).tier, Tier::Novice);
        assert_eq!(tier_for(10).tier, Tier::Enthusiast);
        assert_eq!(tier_for(49).tier, Tier::Enthusiast);
        assert_eq!(tier_for(50).tier, Tier::Expert);
        assert_eq!(tier_for(99).tier, Tier::Expert);
        assert_eq!(tier_for(100).tier, Tier::Vip);
    }

    #[test]
    fn test_orders_to_next() {
        let p = tier_for(0);
        assert_eq!(p.next_tier, Some(Tier::Enthusiast));
        assert_eq!(p.orders_to_next, 10);

        let p = tier_for(12);
        assert_eq!(p.next_tier, Some(Tier::Expert));
        assert_eq!(p.orders_to_next, 38);

        let p = tier_for(75);
        assert_eq!(p.next_tier, Some(Tier::Vip));
        assert_eq!(p.orders_to_next, 25);

        let p = tier_for(250);
        assert_eq!(p.tier, Tier::Vip);
        assert_eq!(p.next_tier, None);
        assert_eq!(p.orders_to_next, 0);
    }

    #[test]
    fn test_multiplier_table() {
        assert_eq!(Tier::Novice.multiplier(), 1.0);
        assert_eq!(Tier::Enthusiast.multiplier(), 1.2);
        assert_eq!(Tier::Expert.multiplier(), 1.5);
        assert_eq!(Tier::Vip.multiplier(), 2.0);
    }

    #[test]
    fn test_vip_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Tier::Vip).unwrap(), "\"VIP\"");
        assert_eq!(serde_json::to_string(&Tier::Novice).unwrap(), "\"Novice\"");
    }
}
