use super::current_user;
use crate::models::*;
use crate::services::SettingsService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/bonus-settings",
    tag = "settings",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取积分配置成功", body = BonusSettings),
        (status = 401, description = "未授权")
    )
)]
/// 当前积分配置（未保存过时返回默认配置）
pub async fn get_bonus_settings(settings_service: web::Data<SettingsService>) -> Result<HttpResponse> {
    match settings_service.get_settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(ApiResponse::success(settings))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/bonus-settings",
    tag = "settings",
    request_body = BonusSettings,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "保存成功", body = BonusSettings),
        (status = 400, description = "配置校验失败"),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅管理员可操作")
    )
)]
/// 整体替换积分配置（仅管理员）
pub async fn update_bonus_settings(
    settings_service: web::Data<SettingsService>,
    req: HttpRequest,
    request: web::Json<BonusSettings>,
) -> Result<HttpResponse> {
    if let Err(e) = current_user(&req).and_then(|user| user.require_admin()) {
        return Ok(e.error_response());
    }

    match settings_service.replace_settings(request.into_inner()).await {
        Ok(settings) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            settings,
            "Settings saved".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn settings_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/bonus-settings")
            .route(web::get().to(get_bonus_settings))
            .route(web::post().to(update_bonus_settings)),
    );
}
