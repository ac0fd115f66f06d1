use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use quill_core::SlugService;

use crate::config::AppConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    slug_service: Arc<SlugService>,
}

impl AppState {
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, AppError> {
        let slug_service = match &config.generation {
            Some(generation) => SlugService::remote(
                generation.base_url.clone(),
                generation.api_key.clone(),
                generation.model.clone(),
            ),
            None => SlugService::local(),
        }
        .map_err(|error| AppError::Internal(error.to_string()))?;

        Ok(Self {
            config,
            slug_service: Arc::new(slug_service),
        })
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/blog/generate-slug", post(generate_slug))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
    slug_strategy: &'static str,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
        slug_strategy: state.slug_service.strategy(),
    })
}

#[derive(Debug, Deserialize)]
struct GenerateSlugRequest {
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct SlugResponse {
    slug: String,
}

async fn generate_slug(
    State(state): State<AppState>,
    Json(request): Json<GenerateSlugRequest>,
) -> Result<Json<SlugResponse>, AppError> {
    let title = request.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(AppError::bad_request("title is required"));
    }

    let slug = state
        .slug_service
        .generate_slug(title)
        .await
        .map_err(|error| {
            tracing::error!(endpoint = "generate_slug", "Slug generation failed: {error}");
            AppError::from(error)
        })?;

    tracing::info!(
        endpoint = "generate_slug",
        strategy = state.slug_service.strategy(),
        title_len = title.len(),
        slug_len = slug.len(),
        "Generated slug"
    );
    Ok(Json(SlugResponse { slug }))
}
