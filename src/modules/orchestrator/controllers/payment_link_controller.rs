use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, TenancyContext};
use crate::modules::orchestrator::models::PaymentLinkRequest;
use crate::modules::orchestrator::services::Orchestrator;

/// POST /payment-links
pub async fn create_payment_link(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    request: web::Json<PaymentLinkRequest>,
) -> Result<HttpResponse, AppError> {
    let status = orchestrator
        .create_payment_link(&ctx, request.into_inner())
        .await?;
    Ok(HttpResponse::Accepted().json(status))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/payment-links").route("", web::post().to(create_payment_link)));
}
