use crate::utils::auth::DEV_SECRET;
use actix_web::{HttpResponse, Responder};
use serde::Serialize;
use std::env;
use tracing::warn;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize, ToSchema)]
pub struct HealthChecks {
    pub session_secret_configured: bool,
    pub session_secret_uses_default: bool,
}

/// Public health check endpoint with configuration checks
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is degraded")
    ),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    let secret = env::var("SESSION_SECRET").ok();

    let session_secret_configured = secret.is_some();
    let session_secret_uses_default = secret.as_deref() == Some(DEV_SECRET);

    if !session_secret_configured || session_secret_uses_default {
        warn!("Health check: session signing secret not configured - NOT SECURE FOR PRODUCTION");
    }

    let status = if session_secret_configured && !session_secret_uses_default {
        "healthy"
    } else {
        "degraded"
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            session_secret_configured,
            session_secret_uses_default,
        },
    };

    if status == "healthy" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
