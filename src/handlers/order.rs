use super::current_user;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    params(
        ("userId" = Option<String>, Query, description = "用户 ID（普通用户只能查询自己）"),
        ("status" = Option<String>, Query, description = "订单状态: pending / accepted / ready / completed"),
        ("limit" = Option<u64>, Query, description = "返回条数 (默认100, 最大500)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取订单列表成功", body = [OrderResponse]),
        (status = 401, description = "未授权"),
        (status = 403, description = "无权查看其他用户订单")
    )
)]
/// 订单列表（按创建时间倒序）；管理员不带 userId 时返回所有用户的订单
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    let mut query = query.into_inner();
    if !user.is_admin() || query.user_id.is_some() {
        match user.resolve_user_id(query.user_id.as_deref()) {
            Ok(user_id) => query.user_id = Some(user_id),
            Err(e) => return Ok(e.error_response()),
        }
    }

    match order_service.list_orders(&query).await {
        Ok(orders) => Ok(HttpResponse::Ok().json(ApiResponse::success(orders))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    request_body = CreateOrderRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "下单成功", body = CreateOrderResponse),
        (status = 400, description = "参数错误或积分不足"),
        (status = 401, description = "未授权"),
        (status = 403, description = "无权为其他用户下单")
    )
)]
/// 创建订单：校验明细、按当前等级与时段计算积分、抵扣积分（可选）
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let user_id = match current_user(&req)
        .and_then(|user| user.resolve_user_id(request.user_id.as_deref()))
    {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.create_order(&user_id, request).await {
        Ok(created) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            created,
            "Order created".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders",
    tag = "orders",
    request_body = UpdateOrderStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态更新成功", body = OrderResponse),
        (status = 400, description = "非法的状态流转"),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅管理员可操作"),
        (status = 404, description = "订单不存在")
    )
)]
/// 推进订单状态（仅管理员）：pending → accepted → ready → completed
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = current_user(&req).and_then(|user| user.require_admin()) {
        return Ok(e.error_response());
    }

    let request = request.into_inner();
    match order_service
        .update_status(request.order_id, request.status)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/orders")
            .route(web::get().to(get_orders))
            .route(web::post().to(create_order))
            .route(web::put().to(update_order_status)),
    );
}
