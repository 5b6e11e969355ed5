use actix_web::{HttpResponse, Result};
use serde_json::json;

/// 健康检查（无需鉴权）
pub async fn health_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "bonus-backend"
    })))
}
