use std::any::Any;
use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use contact_common::{Envelope, Health, RuleSet};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as AnyOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod config;
pub mod error;
pub mod handlers {
    pub mod contact_handlers;
    pub mod contact_payload;
    pub mod rate_limit;
}
pub mod models {
    pub mod contact_models;
}
pub mod utils {
    pub mod client_ip;
    pub mod email_template;
    pub mod mailer;
}
#[cfg(test)]
mod test_support;

use config::{Config, CorsOrigin};
use error::INTERNAL_ERROR_MESSAGE;
use handlers::{contact_handlers, rate_limit};
use rate_limit::ContactLimiter;
use utils::{email_template::EmailTemplate, mailer::Mailer};

pub struct AppState {
    pub config: Config,
    pub rules: RuleSet,
    pub template: EmailTemplate,
    pub mailer: Arc<dyn Mailer>,
    pub contact_limiter: ContactLimiter,
}

impl AppState {
    pub fn new(
        config: Config,
        rules: RuleSet,
        template: EmailTemplate,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let contact_limiter = ContactLimiter::per_minute(config.rate_limit_per_minute);
        Self {
            config,
            rules,
            template,
            mailer,
            contact_limiter,
        }
    }
}

async fn health_check() -> Json<Health> {
    Json(Health {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked while serving request");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::failure(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}

fn cors_layer(origin: &CorsOrigin) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);
    match origin {
        CorsOrigin::Any => layer.allow_origin(AnyOrigin),
        CorsOrigin::List(origins) => layer
            .allow_origin(AllowOrigin::list(origins.iter().cloned()))
            .allow_credentials(true),
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // Only the contact route is rate limited; health checks stay cheap.
    let contact_routes = Router::new()
        .route("/api/contact", post(contact_handlers::submit_contact))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_contact,
        ));

    Router::new()
        .merge(contact_routes)
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.cors_origin))
        .with_state(state)
}
