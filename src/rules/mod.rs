//! 纯积分规则：积分计算、会员等级、订单状态流转与配置校验，不访问数据库

pub mod accrual;
pub mod lifecycle;
pub mod settings;
pub mod tier;

pub use accrual::{AccrualContext, compute_accrual, order_accrual};
pub use lifecycle::validate_transition;
pub use settings::validate_settings;
pub use tier::{Tier, TierProgress, tier_for};
