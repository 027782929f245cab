use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, TenancyContext};
use crate::modules::orchestrator::models::StatusUpdateRequest;
use crate::modules::orchestrator::services::Orchestrator;

/// GET /statuses/{entity_type}/{id}
pub async fn get_status(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (entity_type, entity_id) = path.into_inner();
    let status = orchestrator.status(&ctx, &entity_id, &entity_type).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Overwrite an entity's status
/// POST /statuses
pub async fn update_status(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    request: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let status = orchestrator.status_update(&ctx, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(status))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/statuses")
            .route("", web::post().to(update_status))
            .route("/{entity_type}/{id}", web::get().to(get_status)),
    );
}
