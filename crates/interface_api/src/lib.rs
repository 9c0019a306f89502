//! HTTP API layer
//!
//! REST interface for the insurance administration backend, built on Axum.
//!
//! - **Handlers**: one module per resource (auth, users, policies,
//!   premiums, claims, payments, admin)
//! - **Middleware**: bearer-token authentication and audit logging
//! - **DTOs**: request/response types with field validation
//! - **Envelopes**: every response is a `{ status, message, data }` or
//!   `{ status, message, errors }` JSON body
//!
//! ```rust,ignore
//! use interface_api::{create_router, config::ApiConfig};
//!
//! let app = create_router(pool, ApiConfig::default());
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod response;
pub mod validation;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use domain_billing::{GatewayKind, SignedGateway};
use infra_db::{
    ClaimRepository, PaymentRepository, PolicyRepository, PremiumRepository, ReportsRepository,
    UserRepository,
};

use crate::config::ApiConfig;
use crate::handlers::{admin, auth as auth_handlers, claims, health, payments, policies, premiums, users};
use crate::mailer::{Mailer, TracingMailer};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        Self {
            pool,
            config,
            mailer: Arc::new(TracingMailer),
        }
    }

    /// Swaps in a different notification backend
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn policies(&self) -> PolicyRepository {
        PolicyRepository::new(self.pool.clone())
    }

    pub fn premiums(&self) -> PremiumRepository {
        PremiumRepository::new(self.pool.clone())
    }

    pub fn claims(&self) -> ClaimRepository {
        ClaimRepository::new(self.pool.clone())
    }

    pub fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportsRepository {
        ReportsRepository::new(self.pool.clone())
    }

    /// Gateway adapter for the given vendor, keyed by its webhook secret
    pub fn gateway(&self, kind: GatewayKind) -> SignedGateway {
        let secret = match kind {
            GatewayKind::Stripe => &self.config.stripe_webhook_secret,
            GatewayKind::Razorpay => &self.config.razorpay_webhook_secret,
        };
        SignedGateway::new(kind, secret)
    }
}

/// Creates the API router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let state = AppState::new(pool, config);
    router_with_state(state)
}

/// Router construction against a prepared state (tests inject mailers here)
pub fn router_with_state(state: AppState) -> Router {
    // Public API routes: credential exchange and signed webhooks.
    let public_api = Router::new()
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/refresh", post(auth_handlers::refresh))
        .route("/webhooks/:gateway", post(payments::gateway_webhook));

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/me",
            get(auth_handlers::me).put(auth_handlers::update_profile),
        )
        .route("/:id", get(users::get_user))
        .route("/:id/activation", put(users::set_active));

    let policy_routes = Router::new()
        .route(
            "/",
            get(policies::list_policies).post(policies::create_policy),
        )
        .route("/:id", get(policies::get_policy))
        .route("/:id/next-due", get(policies::next_premium_due))
        .route("/:id/beneficiaries", put(policies::update_beneficiaries))
        .route("/:id/renew", post(policies::renew_policy))
        .route("/:id/cancel", post(policies::cancel_policy));

    let premium_routes = Router::new()
        .route(
            "/",
            get(premiums::list_premiums).post(premiums::create_premium),
        )
        .route("/sweep-overdue", post(premiums::sweep_overdue))
        .route("/:id", get(premiums::get_premium))
        .route("/:id/pay", post(premiums::pay_premium))
        .route("/:id/mark-overdue", post(premiums::mark_overdue));

    let claim_routes = Router::new()
        .route("/", get(claims::list_claims).post(claims::submit_claim))
        .route("/:id", get(claims::get_claim))
        .route("/:id/review", post(claims::review_claim))
        .route("/:id/pay", post(claims::pay_claim));

    let payment_routes = Router::new()
        .route("/orders", post(payments::checkout))
        .route("/confirm", post(payments::confirm_payment))
        .route("/:order_id", get(payments::get_payment));

    let admin_routes = Router::new()
        .route("/summary", get(admin::dashboard))
        .route("/revenue", get(admin::monthly_revenue));

    let protected_routes = Router::new()
        .route(
            "/auth/me",
            get(auth_handlers::me).put(auth_handlers::update_profile),
        )
        .route("/auth/password", put(auth_handlers::change_password))
        .nest("/users", user_routes)
        .nest("/policies", policy_routes)
        .nest("/premiums", premium_routes)
        .nest("/claims", claim_routes)
        .nest("/payments", payment_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_v1 = public_api.merge(protected_routes);

    // The static front-end is served for any path no API route claims.
    let static_dir = state.config.static_dir.clone();
    let front_end = ServeDir::new(&static_dir)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1)
        .fallback_service(front_end)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
