/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use societysync_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = societysync_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use societysync_shared::auth::{jwt, middleware::AuthContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /v1/                             # API v1 (versioned)
/// │   ├── /auth/                       # Authentication
/// │   │   ├── POST /login              # Public
/// │   │   ├── POST /refresh            # Public
/// │   │   ├── POST /change-password    # Authenticated
/// │   │   └── GET  /me                 # Authenticated
/// │   ├── /bills/                      # Resident billing
/// │   ├── /complaints/                 # Resident complaints
/// │   ├── /visitors/                   # Visitor log
/// │   ├── /notifications/              # Broadcasts + read tracking
/// │   ├── /polls/                      # Voting
/// │   └── /admin/                      # Admin-only management
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
/// 4. Admin role guard (admin subtree only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth routes
    let public_auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Auth routes that need a valid session
    let session_auth_routes = Router::new()
        .route("/change-password", post(routes::auth::change_password))
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let auth_routes = public_auth_routes.merge(session_auth_routes);

    // Resident-facing routes (any authenticated role)
    let resident_routes = Router::new()
        .route("/tenants", get(routes::users::list_my_tenants))
        .route("/bills", get(routes::bills::list_my_bills))
        .route("/bills/:id/pay", post(routes::bills::pay_bill))
        .route("/complaints", post(routes::complaints::file_complaint))
        .route("/complaints", get(routes::complaints::list_my_complaints))
        .route("/visitors", post(routes::visitors::log_entry))
        .route("/visitors", get(routes::visitors::list_visitors))
        .route("/visitors/:id/exit", post(routes::visitors::log_exit))
        .route("/notifications", get(routes::notifications::list_all))
        .route("/notifications/unread", get(routes::notifications::list_unread))
        .route(
            "/notifications/unread/count",
            get(routes::notifications::unread_count),
        )
        .route(
            "/notifications/:id/read",
            post(routes::notifications::mark_read),
        )
        .route("/polls", get(routes::polls::list_polls))
        .route("/polls/:id/vote", post(routes::polls::vote))
        .route("/polls/:id/results", get(routes::polls::results))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Admin management routes (admin role required)
    let admin_routes = Router::new()
        .route("/users", post(routes::users::create_user))
        .route("/users", get(routes::users::list_users))
        .route("/users/:id/credentials", get(routes::users::credentials))
        .route("/owners", get(routes::users::list_owners))
        .route("/bills", post(routes::bills::create_bill))
        .route("/bills", get(routes::bills::list_bills))
        .route("/bills/sweep-overdue", post(routes::bills::sweep_overdue))
        .route("/bills/:id/mark-paid", post(routes::bills::mark_paid))
        .route("/bills/stats", get(routes::bills::payment_stats))
        .route("/complaints", get(routes::complaints::list_complaints))
        .route(
            "/complaints/:id/status",
            put(routes::complaints::update_status),
        )
        .route(
            "/complaints/:id/response",
            put(routes::complaints::respond),
        )
        .route("/notifications", post(routes::notifications::broadcast))
        .route("/polls", post(routes::polls::create_poll))
        .route("/polls/:id/close", post(routes::polls::close_poll))
        .route("/stats", get(routes::admin::society_stats))
        .route("/tables", get(routes::admin::list_tables))
        .route("/tables/:name", get(routes::admin::browse_table))
        .layer(axum::middleware::from_fn(require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(resident_routes)
        .nest("/admin", admin_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects AuthContext into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    // Create auth context carrying the session role
    let auth_context = AuthContext::from_claims(claims.sub, claims.role);

    // Insert into request extensions
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Admin role guard
///
/// Runs after `jwt_auth_layer`, so the AuthContext is already present.
/// Rejects any non-admin session before the handler is reached.
async fn require_admin(req: Request, next: Next) -> Result<Response, crate::error::ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| crate::error::ApiError::Unauthorized("Missing credentials".to_string()))?;

    if !auth.is_admin() {
        return Err(crate::error::ApiError::Forbidden(
            "Requires admin role".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
