pub mod config;
pub mod errors;
pub mod providers;
pub mod ratelimit;
pub mod resources;
pub mod state;
pub mod utils;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::errors::ProviderError;
use crate::providers::{create_provider, TutorProvider};
use crate::resources::v1::tutor::handlers;
use crate::state::AppState;

/// Build the shared state, selecting the provider named in the config.
pub fn create_app_state(config: Config) -> Result<AppState, ProviderError> {
    let provider: Arc<dyn TutorProvider> = create_provider(&config)?;
    Ok(AppState::new(config, provider))
}

pub fn create_app(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.cors_allowed_origins);

    Router::new()
        .route("/", get(handlers::app_info))
        .route("/health", get(handlers::health))
        .route("/ask_tutor", post(handlers::ask_tutor))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// A `*` entry opens the API to every origin without credentials; otherwise only
/// the listed origins are allowed, with credentials. An empty list allows no
/// cross-origin access.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                server_warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
