use crate::config::ShopConfig;
use crate::models::BonusSettings;
use crate::rules::Tier;
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

/// 计算积分时的上下文标记，各标记相互独立，可同时生效
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccrualContext {
    pub is_morning: bool,
    pub is_evening: bool,
    pub is_weekend: bool,
    pub is_vip: bool,
    pub category: Option<String>,
}

impl AccrualContext {
    /// 按门店本地时间计算 `instant` 所处的时段标记
    pub fn at(
        instant: DateTime<Utc>,
        shop: &ShopConfig,
        tier: Tier,
        category: Option<String>,
    ) -> Self {
        let local = instant.with_timezone(&shop.offset());
        let hour = local.hour();

        Self {
            is_morning: in_window(hour, shop.morning_start_hour, shop.morning_end_hour),
            is_evening: in_window(hour, shop.evening_start_hour, shop.evening_end_hour),
            is_weekend: matches!(local.weekday(), Weekday::Sat | Weekday::Sun),
            is_vip: tier == Tier::Vip,
            category,
        }
    }
}

/// [start, end) 小时区间，start > end 时视为跨零点
fn in_window(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        start <= hour && hour < end
    } else {
        hour >= start || hour < end
    }
}

fn contextual_points(order_amount: i64, settings: &BonusSettings, ctx: &AccrualContext) -> f64 {
    if order_amount <= 0 {
        return 0.0;
    }

    let m = &settings.multipliers;
    let mut bonus = order_amount as f64 * settings.base_rate / 100.0;
    if ctx.is_morning {
        bonus *= m.morning;
    }
    if ctx.is_evening {
        bonus *= m.evening;
    }
    if ctx.is_weekend {
        bonus *= m.weekend;
    }
    if ctx.is_vip {
        bonus *= m.vip;
    }
    bonus * settings.category_multiplier(ctx.category.as_deref())
}

fn floor_points(points: f64) -> i64 {
    if !points.is_finite() || points <= 0.0 {
        return 0;
    }
    // 吸收浮点误差，避免 49.999999 被截成 49
    (points + 1e-9).floor() as i64
}

/// 仅按上下文倍率计算订单金额可得的积分
pub fn compute_accrual(order_amount: i64, settings: &BonusSettings, ctx: &AccrualContext) -> i64 {
    floor_points(contextual_points(order_amount, settings, ctx))
}

/// 下单时实际发放的积分：先乘时段/品类倍率，再乘等级倍率，最后统一取整
pub fn order_accrual(
    order_amount: i64,
    settings: &BonusSettings,
    ctx: &AccrualContext,
    tier: Tier,
) -> i64 {
    floor_points(contextual_points(order_amount, settings, ctx) * tier.multiplier())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContextMultipliers;
    use chrono::TimeZone;

    fn settings(base_rate: f64) -> BonusSettings {
        BonusSettings {
            base_rate,
            ..BonusSettings::default()
        }
    }

    #[test]
    fn test_neutral_context_is_floor_of_base_rate() {
        let s = settings(5.0);
        let ctx = AccrualContext::default();
        for amount in 0..5000i64 {
            assert_eq!(compute_accrual(amount, &s, &ctx), amount * 5 / 100);
        }
    }

    #[test]
    fn test_non_positive_amount_earns_nothing() {
        let s = settings(5.0);
        let ctx = AccrualContext {
            is_weekend: true,
            ..Default::default()
        };
        assert_eq!(compute_accrual(0, &s, &ctx), 0);
        assert_eq!(compute_accrual(-500, &s, &ctx), 0);
    }

    #[test]
    fn test_contextual_multipliers_compose() {
        let s = BonusSettings {
            base_rate: 10.0,
            multipliers: ContextMultipliers {
                morning: 2.0,
                evening: 1.0,
                weekend: 1.5,
                vip: 1.0,
            },
            ..BonusSettings::default()
        };
        let ctx = AccrualContext {
            is_morning: true,
            is_weekend: true,
            ..Default::default()
        };
        // 1000 * 10% = 100, * 2 * 1.5 = 300
        assert_eq!(compute_accrual(1000, &s, &ctx), 300);
    }

    #[test]
    fn test_category_multiplier() {
        let mut s = settings(10.0);
        s.category_multipliers.insert("pastry".to_string(), 3.0);

        let pastry = AccrualContext {
            category: Some("pastry".to_string()),
            ..Default::default()
        };
        let unknown = AccrualContext {
            category: Some("merch".to_string()),
            ..Default::default()
        };
        assert_eq!(compute_accrual(500, &s, &pastry), 150);
        assert_eq!(compute_accrual(500, &s, &unknown), 50);
    }

    #[test]
    fn test_result_is_floored() {
        let s = settings(5.0);
        assert_eq!(compute_accrual(39, &s, &AccrualContext::default()), 1);
    }

    #[test]
    fn test_tier_multiplier_applied_after_context() {
        let s = BonusSettings {
            base_rate: 5.0,
            multipliers: ContextMultipliers {
                vip: 1.1,
                ..ContextMultipliers::default()
            },
            ..BonusSettings::default()
        };
        let ctx = AccrualContext {
            is_vip: true,
            ..Default::default()
        };
        // 1000 * 5% = 50, * 1.1 = 55, * 2.0 (VIP) = 110
        assert_eq!(order_accrual(1000, &s, &ctx, Tier::Vip), 110);
        assert_eq!(
            order_accrual(1000, &s, &AccrualContext::default(), Tier::Novice),
            50
        );
        // 1000 * 5% = 50 * 1.2 = 60
        assert_eq!(
            order_accrual(1000, &s, &AccrualContext::default(), Tier::Enthusiast),
            60
        );
    }

    #[test]
    fn test_context_from_local_time() {
        let shop = ShopConfig {
            utc_offset_minutes: 180,
            ..ShopConfig::default()
        };
        // 2026-10-17 是周六；UTC 05:30 -> 本地 08:30
        let saturday_morning = Utc.with_ymd_and_hms(2026, 10, 17, 5, 30, 0).unwrap();
        let ctx = AccrualContext::at(saturday_morning, &shop, Tier::Novice, None);
        assert!(ctx.is_morning);
        assert!(!ctx.is_evening);
        assert!(ctx.is_weekend);
        assert!(!ctx.is_vip);

        // 周一 UTC 16:00 -> 本地 19:00
        let monday_evening = Utc.with_ymd_and_hms(2026, 10, 19, 16, 0, 0).unwrap();
        let ctx = AccrualContext::at(monday_evening, &shop, Tier::Vip, Some("tea".into()));
        assert!(!ctx.is_morning);
        assert!(ctx.is_evening);
        assert!(!ctx.is_weekend);
        assert!(ctx.is_vip);
        assert_eq!(ctx.category.as_deref(), Some("tea"));
    }

    #[test]
    fn test_window_wraps_midnight() {
        assert!(in_window(23, 22, 2));
        assert!(in_window(1, 22, 2));
        assert!(!in_window(2, 22, 2));
        assert!(!in_window(12, 22, 2));
        assert!(in_window(6, 6, 11));
        assert!(!in_window(11, 6, 11));
    }
}
