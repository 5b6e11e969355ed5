use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DiscountType, OrderStatus, TransactionKind};
use crate::handlers;
use crate::models::*;
use crate::rules::Tier;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::order::get_orders,
        handlers::order::create_order,
        handlers::order::update_order_status,
        handlers::bonus::get_user_bonus,
        handlers::bonus::use_bonus,
        handlers::bonus::get_promo_codes,
        handlers::settings::get_bonus_settings,
        handlers::settings::update_bonus_settings,
    ),
    components(
        schemas(
            OrderItemRequest,
            CreateOrderRequest,
            CreateOrderResponse,
            UpdateOrderStatusRequest,
            OrderItemResponse,
            OrderResponse,
            OrderStatus,
            UserBonusResponse,
            BonusHistoryEntry,
            TransactionKind,
            Tier,
            UseBonusRequest,
            UseBonusResponse,
            PromoCodeResponse,
            DiscountType,
            BonusSettings,
            ContextMultipliers,
            RewardItem,
            LevelInfo,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "orders", description = "Order lifecycle API"),
        (name = "bonus", description = "Bonus balance and redemption API"),
        (name = "settings", description = "Bonus program settings API"),
    ),
    info(
        title = "Bonus Backend API",
        version = "1.0.0",
        description = "Coffee shop bonus program REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
