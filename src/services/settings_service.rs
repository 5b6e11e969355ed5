use crate::entities::bonus_settings_entity as settings;
use crate::error::AppResult;
use crate::models::BonusSettings;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

/// 配置只有一行
const SETTINGS_ROW_ID: i32 = 1;

#[derive(Clone)]
pub struct SettingsService {
    pool: DatabaseConnection,
}

impl SettingsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 读取当前配置，尚未保存过时返回默认配置
    pub async fn get_settings(&self) -> AppResult<BonusSettings> {
        match settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.pool)
            .await?
        {
            Some(row) => Ok(serde_json::from_str(&row.document)?),
            None => Ok(BonusSettings::default()),
        }
    }

    /// 整体替换配置文档，校验失败时不写入任何内容
    pub async fn replace_settings(&self, new_settings: BonusSettings) -> AppResult<BonusSettings> {
        new_settings.validate()?;
        let document = serde_json::to_string(&new_settings)?;

        let row = settings::ActiveModel {
            id: Set(SETTINGS_ROW_ID),
            document: Set(document),
            updated_at: Set(Utc::now()),
        };
        settings::Entity::insert(row)
            .on_conflict(
                OnConflict::column(settings::Column::Id)
                    .update_columns([settings::Column::Document, settings::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        log::info!(
            "Bonus settings updated: base_rate={}, rewards={}, categories={}",
            new_settings.base_rate,
            new_settings.rewards.len(),
            new_settings.category_multipliers.len()
        );
        Ok(new_settings)
    }
}
