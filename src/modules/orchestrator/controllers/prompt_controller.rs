use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, TenancyContext};
use crate::modules::orchestrator::models::PromptRequest;
use crate::modules::orchestrator::services::Orchestrator;

/// POST /prompts
pub async fn initiate_prompt(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    request: web::Json<PromptRequest>,
) -> Result<HttpResponse, AppError> {
    let status = orchestrator.initiate_prompt(&ctx, request.into_inner()).await?;
    Ok(HttpResponse::Accepted().json(status))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/prompts").route("", web::post().to(initiate_prompt)));
}
