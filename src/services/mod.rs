pub mod bonus_service;
pub mod ledger;
pub mod order_service;
pub mod redemption_service;
pub mod settings_service;

pub use bonus_service::*;
pub use order_service::*;
pub use redemption_service::*;
pub use settings_service::*;

use crate::config::ShopConfig;
use sea_orm::DatabaseConnection;

/// 应用内全部服务，main 与集成测试共用同一套装配
#[derive(Clone)]
pub struct Services {
    pub settings: SettingsService,
    pub bonus: BonusService,
    pub orders: OrderService,
    pub redemption: RedemptionService,
}

impl Services {
    pub fn new(pool: DatabaseConnection, shop: ShopConfig) -> Self {
        let settings = SettingsService::new(pool.clone());
        let bonus = BonusService::new(pool.clone(), shop.clone());
        let orders = OrderService::new(pool.clone(), shop, bonus.clone(), settings.clone());
        let redemption = RedemptionService::new(pool, bonus.clone(), settings.clone());
        Self {
            settings,
            bonus,
            orders,
            redemption,
        }
    }
}
