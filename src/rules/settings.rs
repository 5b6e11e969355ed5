use crate::entities::DiscountType;
use crate::error::{AppError, AppResult};
use crate::models::BonusSettings;
use std::collections::HashSet;

fn check_multiplier(name: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::ValidationError(format!(
            "Multiplier '{name}' must be a positive number"
        )));
    }
    Ok(())
}

impl BonusSettings {
    pub fn validate(&self) -> AppResult<()> {
        validate_settings(self)
    }
}

/// 校验管理端提交的积分配置
pub fn validate_settings(settings: &BonusSettings) -> AppResult<()> {
    if !settings.base_rate.is_finite() || !(0.0..=100.0).contains(&settings.base_rate) {
        return Err(AppError::ValidationError(
            "baseRate must be between 0 and 100".to_string(),
        ));
    }

    let m = &settings.multipliers;
    check_multiplier("morning", m.morning)?;
    check_multiplier("evening", m.evening)?;
    check_multiplier("weekend", m.weekend)?;
    check_multiplier("vip", m.vip)?;

    for (category, value) in &settings.category_multipliers {
        if category.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Category name must not be empty".to_string(),
            ));
        }
        check_multiplier(category, *value)?;
    }

    let mut seen = HashSet::new();
    for reward in &settings.rewards {
        if reward.id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Reward id must not be empty".to_string(),
            ));
        }
        if !seen.insert(reward.id.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Duplicate reward id '{}'",
                reward.id
            )));
        }
        if reward.cost <= 0 {
            return Err(AppError::ValidationError(format!(
                "Reward '{}' must cost a positive number of points",
                reward.id
            )));
        }
        if reward.discount <= 0 {
            return Err(AppError::ValidationError(format!(
                "Reward '{}' must have a positive discount",
                reward.id
            )));
        }
        if reward.discount_type == DiscountType::Percentage && reward.discount > 100 {
            return Err(AppError::ValidationError(format!(
                "Reward '{}' percentage discount cannot exceed 100",
                reward.id
            )));
        }
    }

    for level in &settings.levels {
        if level.min_orders < 0 {
            return Err(AppError::ValidationError(format!(
                "Level '{}' must have a non-negative minOrders",
                level.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RewardItem;

    fn reward(id: &str, cost: i64, discount_type: DiscountType, discount: i64) -> RewardItem {
        RewardItem {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            cost,
            discount_type,
            discount,
            is_active: true,
        }
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(BonusSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_base_rate() {
        let mut s = BonusSettings::default();
        s.base_rate = 120.0;
        assert!(validate_settings(&s).is_err());
        s.base_rate = -1.0;
        assert!(validate_settings(&s).is_err());
        s.base_rate = f64::NAN;
        assert!(validate_settings(&s).is_err());
    }

    #[test]
    fn test_rejects_non_positive_multiplier() {
        let mut s = BonusSettings::default();
        s.multipliers.weekend = 0.0;
        assert!(validate_settings(&s).is_err());

        let mut s = BonusSettings::default();
        s.category_multipliers.insert("tea".into(), -2.0);
        assert!(validate_settings(&s).is_err());
    }

    #[test]
    fn test_rejects_duplicate_reward_ids() {
        let mut s = BonusSettings::default();
        s.rewards = vec![
            reward("latte", 300, DiscountType::Fixed, 300),
            reward("latte", 200, DiscountType::Fixed, 200),
        ];
        assert!(validate_settings(&s).is_err());
    }

    #[test]
    fn test_rejects_bad_reward_values() {
        let mut s = BonusSettings::default();
        s.rewards = vec![reward("free", 0, DiscountType::Fixed, 100)];
        assert!(validate_settings(&s).is_err());

        s.rewards = vec![reward("half", 100, DiscountType::Percentage, 150)];
        assert!(validate_settings(&s).is_err());

        s.rewards = vec![reward("half", 100, DiscountType::Percentage, 50)];
        assert!(validate_settings(&s).is_ok());
    }
}
