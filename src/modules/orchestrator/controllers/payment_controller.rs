use std::sync::Arc;

use actix_web::{web, HttpResponse};
use tokio::sync::mpsc;

use crate::core::{AppError, TenancyContext};
use crate::modules::orchestrator::models::{PaymentRequest, SearchRequest, SearchResult};
use crate::modules::orchestrator::services::Orchestrator;

const SEARCH_BUFFER: usize = 64;

/// Accept an outbound payment
/// POST /payments/send
pub async fn send_payment(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    request: web::Json<PaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let status = orchestrator.send(&ctx, request.into_inner()).await?;
    Ok(HttpResponse::Accepted().json(status))
}

/// Accept an inbound payment
/// POST /payments/receive
pub async fn receive_payment(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    request: web::Json<PaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let status = orchestrator.receive(&ctx, request.into_inner()).await?;
    Ok(HttpResponse::Accepted().json(status))
}

/// POST /payments/{id}/release
pub async fn release_payment(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payment_id = path.into_inner();
    let status = orchestrator.release(&ctx, &payment_id).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// POST /payments/{id}/cancel
pub async fn cancel_payment(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payment_id = path.into_inner();
    let status = orchestrator.cancel(&ctx, &payment_id).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Search payments by exact id or free text
/// GET /payments/search?id=..|q=..
///
/// Results are streamed by the orchestrator and collected into one array.
pub async fn search_payments(
    orchestrator: web::Data<Arc<Orchestrator>>,
    ctx: TenancyContext,
    query: web::Query<SearchRequest>,
) -> Result<HttpResponse, AppError> {
    let (tx, mut rx) = mpsc::channel::<SearchResult>(SEARCH_BUFFER);

    let producer = orchestrator.search(&ctx, query.into_inner(), tx);
    let collector = async {
        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results
    };

    let (outcome, results) = tokio::join!(producer, collector);
    outcome?;

    Ok(HttpResponse::Ok().json(results))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/send", web::post().to(send_payment))
            .route("/receive", web::post().to(receive_payment))
            .route("/search", web::get().to(search_payments))
            .route("/{id}/release", web::post().to(release_payment))
            .route("/{id}/cancel", web::post().to(cancel_payment)),
    );
}
