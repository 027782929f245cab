use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::core::{AppError, TenancyContext};

pub const TENANT_HEADER: &str = "X-Tenant-ID";
pub const PARTITION_HEADER: &str = "X-Partition-ID";
pub const ACCESS_HEADER: &str = "X-Access-ID";

fn header(req: &HttpRequest, name: &str) -> String {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Tenancy is read from request headers; a partition is mandatory because
/// routes are scoped by it
impl FromRequest for TenancyContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let context = TenancyContext::new(
            header(req, TENANT_HEADER),
            header(req, PARTITION_HEADER),
            header(req, ACCESS_HEADER),
        );

        if context.partition_id.is_empty() {
            return ready(Err(AppError::invalid_argument(format!(
                "{} header is required",
                PARTITION_HEADER
            ))));
        }

        ready(Ok(context))
    }
}
