//! Axum API Server Module
//!
//! Wires the recommendation engine behind a REST endpoint and maps engine
//! errors onto client/server HTTP statuses.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use serde::Deserialize;
use std::sync::Arc;

use crate::advisory::render_message;
use crate::data::NutrientTable;
use crate::engine::{AdvisoryError, RecommendationEngine};
use crate::weather::{LocationQuery, WeatherService};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(table: NutrientTable, weather: WeatherService) -> Self {
        Self {
            engine: Arc::new(RecommendationEngine::new(table, weather)),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/recommend", get(get_recommendation))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(CorsLayer::permissive()) // Allow all origins (adjust for production)
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Fertilizer Recommendation API is running"
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Query params for the advisory endpoint
#[derive(Debug, Deserialize)]
struct RecommendQuery {
    soil_type: String,
    crop_type: String,
    /// Land size in square meters
    land_size: f64,
    /// Consecutive years the plot has not been cultivated
    fallow_years: u32,
    /// Resolve weather from `lat`/`lon` instead of `manual_location`
    #[serde(default)]
    use_my_location: bool,
    lat: Option<f64>,
    lon: Option<f64>,
    manual_location: Option<String>,
}

impl RecommendQuery {
    /// Coordinates when requested and complete, else the manual place name,
    /// else nothing (the engine substitutes the default snapshot).
    fn location(&self) -> Option<LocationQuery> {
        if self.use_my_location {
            if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
                return Some(LocationQuery::Coordinates { lat, lon });
            }
        }
        self.manual_location
            .as_ref()
            .map(|name| LocationQuery::Named(name.clone()))
    }
}

async fn get_recommendation(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let location = params.location();

    tracing::debug!(
        "Recommendation request: soil={} crop={} location={:?}",
        params.soil_type,
        params.crop_type,
        location
    );

    let recommendation = state
        .engine
        .recommend(
            &params.soil_type,
            &params.crop_type,
            params.land_size,
            params.fallow_years,
            location.as_ref(),
        )
        .await?;

    let farmer_message = render_message(&recommendation);

    let mut body = serde_json::to_value(&recommendation)
        .map_err(|e| AppError::Internal(format!("JSON serialization error: {}", e)))?;
    body["farmer_message"] = serde_json::Value::String(farmer_message);

    Ok(Json(body))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<AdvisoryError> for AppError {
    fn from(err: AdvisoryError) -> Self {
        match err {
            // Missing reference data and unusable weather are request
            // problems; the caller can fix the pair or the location
            AdvisoryError::NoReferenceData { .. } | AdvisoryError::WeatherUnavailable(_) => {
                Self::BadRequest(err.to_string())
            }
            AdvisoryError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
