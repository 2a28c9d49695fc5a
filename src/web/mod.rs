//! HTTP surface: server-rendered pages, form posts and the JSON API.
//!
//! Every request passes the auth gate first; handlers then read through
//! `Storage` or write through `Actions`.

mod api;
mod errors;
mod forms;
mod pages;
mod templates;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::actions::Actions;
use crate::auth::{auth_gate, SessionManager};
use crate::config::Config;
use crate::revalidation::Revalidator;
use crate::storage::Storage;
use crate::upload::UploadStore;

pub use errors::{ApiError, ApiResult};
pub use templates::{PageContext, Templates};

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub sessions: Arc<SessionManager>,
    pub revalidator: Revalidator,
    pub uploads: Arc<UploadStore>,
    pub actions: Actions,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(config: Config, storage: Storage) -> tera::Result<Self> {
        let sessions = Arc::new(SessionManager::new(&config.auth));
        let revalidator = Revalidator::new();
        let uploads = Arc::new(UploadStore::new(&config.upload));
        let actions = Actions::new(
            storage.clone(),
            revalidator.clone(),
            uploads.clone(),
            sessions.clone(),
        );
        Ok(Self {
            config: Arc::new(config),
            storage,
            sessions,
            revalidator,
            uploads,
            actions,
            templates: Arc::new(Templates::new()?),
        })
    }
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    // Multipart bodies carry the avatar plus the text fields.
    let body_limit = DefaultBodyLimit::max(state.config.upload.max_bytes + 64 * 1024);
    let uploads = ServeDir::new(state.uploads.base_path());
    let upload_prefix = state.uploads.public_prefix().to_string();

    let pages = Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login).post(forms::login))
        .route("/signup", get(pages::signup).post(forms::signup))
        .route("/logout", post(forms::logout))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/invoices", get(pages::invoices))
        .route(
            "/dashboard/invoices/create",
            get(pages::create_invoice).post(forms::create_invoice),
        )
        .route(
            "/dashboard/invoices/:id/edit",
            get(pages::edit_invoice).post(forms::update_invoice),
        )
        .route("/dashboard/invoices/:id/delete", post(forms::delete_invoice))
        .route("/dashboard/customers", get(pages::customers))
        .route(
            "/dashboard/customers/create",
            get(pages::create_customer).post(forms::create_customer),
        )
        .route(
            "/dashboard/customers/:id/edit",
            get(pages::edit_customer).post(forms::update_customer),
        )
        .route("/dashboard/customers/:id/delete", post(forms::delete_customer))
        .route("/admin", get(pages::admin))
        .route("/profile", get(pages::profile).post(forms::update_profile));

    let api = Router::new()
        .route("/api/auth/session", get(api::session).post(api::sign_in))
        .route("/api/auth/signout", post(api::sign_out))
        .route("/api/protected", get(api::protected))
        .route("/api/seed", get(api::seed).post(api::seed))
        .route("/api/admin/users", get(api::admin_users))
        .route(
            "/api/admin/products",
            get(api::admin_products).post(api::create_product),
        )
        .route(
            "/api/admin/products/:id",
            get(api::get_product)
                .put(api::update_product)
                .delete(api::delete_product),
        )
        .route("/api/products", get(api::products))
        .route("/api/dashboard/revenue", get(api::revenue))
        .route("/api/dashboard/cards", get(api::cards))
        .route("/api/invoices/latest", get(api::latest_invoices))
        .route("/api/invoices", get(api::invoices).post(api::create_invoice))
        .route("/api/invoices/pages", get(api::invoice_pages))
        .route("/api/invoices/infinite", get(api::infinite_invoices))
        .route(
            "/api/invoices/:id",
            get(api::get_invoice)
                .put(api::update_invoice)
                .delete(api::delete_invoice),
        )
        .route("/api/customers", get(api::customers).post(api::create_customer))
        .route("/api/customers/filtered", get(api::filtered_customers))
        .route(
            "/api/customers/:id",
            get(api::get_customer)
                .put(api::update_customer)
                .delete(api::delete_customer),
        )
        .route("/api/revalidate", get(api::revalidate_events));

    Router::new()
        .merge(pages)
        .merge(api)
        .nest_service(&upload_prefix, uploads)
        .layer(from_fn_with_state(state.clone(), auth_gate))
        .route("/health", get(api::health))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if state.config.auth.uses_default_secret() {
        warn!("Using the built-in session secret; set DASHBOARD_SESSION_SECRET in production");
    }

    let addr = state.config.server.bind_address();
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    info!(address = %local, "Dashboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
