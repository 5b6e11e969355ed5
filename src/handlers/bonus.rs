use super::current_user;
use crate::models::*;
use crate::services::{BonusService, RedemptionService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/user-bonus",
    tag = "bonus",
    params(
        ("userId" = Option<String>, Query, description = "用户 ID（默认当前用户）")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取积分信息成功", body = UserBonusResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "无权查看其他用户")
    )
)]
/// 积分账户：余额（按流水重新核算）、等级进度、本月汇总与最近流水
pub async fn get_user_bonus(
    bonus_service: web::Data<BonusService>,
    req: HttpRequest,
    query: web::Query<UserBonusQuery>,
) -> Result<HttpResponse> {
    let user_id = match current_user(&req)
        .and_then(|user| user.resolve_user_id(query.user_id.as_deref()))
    {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match bonus_service.get_user_bonus(&user_id).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/use-bonus",
    tag = "bonus",
    request_body = UseBonusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "兑换成功", body = UseBonusResponse),
        (status = 400, description = "积分不足或奖励不可用"),
        (status = 401, description = "未授权"),
        (status = 404, description = "奖励不存在")
    )
)]
/// 用积分兑换优惠码（rewardId 或 amount 二选一）
pub async fn use_bonus(
    redemption_service: web::Data<RedemptionService>,
    req: HttpRequest,
    request: web::Json<UseBonusRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let user_id = match current_user(&req)
        .and_then(|user| user.resolve_user_id(request.user_id.as_deref()))
    {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match redemption_service.redeem(&user_id, request).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            result,
            "Bonus redeemed".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/promo-codes",
    tag = "bonus",
    params(
        ("userId" = Option<String>, Query, description = "用户 ID（默认当前用户）")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取可用优惠码成功", body = [PromoCodeResponse]),
        (status = 401, description = "未授权")
    )
)]
/// 未使用且未过期的优惠码
pub async fn get_promo_codes(
    redemption_service: web::Data<RedemptionService>,
    req: HttpRequest,
    query: web::Query<PromoCodeQuery>,
) -> Result<HttpResponse> {
    let user_id = match current_user(&req)
        .and_then(|user| user.resolve_user_id(query.user_id.as_deref()))
    {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match redemption_service.list_active_promo_codes(&user_id).await {
        Ok(codes) => Ok(HttpResponse::Ok().json(ApiResponse::success(codes))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn bonus_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/user-bonus", web::get().to(get_user_bonus))
        .route("/use-bonus", web::post().to(use_bonus))
        .route("/promo-codes", web::get().to(get_promo_codes));
}
