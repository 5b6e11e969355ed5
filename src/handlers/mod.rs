pub mod bonus;
pub mod health;
pub mod order;
pub mod settings;

pub use bonus::bonus_config;
pub use health::health_check;
pub use order::order_config;
pub use settings::settings_config;

use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use actix_web::{HttpMessage, HttpRequest};

/// 从请求扩展中获取调用方身份（中间件在鉴权后注入）
fn current_user(req: &HttpRequest) -> AppResult<AuthUser> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}
