// API Integration Tests
//
// Purpose: drive the full router with tower::oneshot. Requests without a
// location use the fixed default snapshot, so no network is involved.
// Run with: cargo test --test api_integration_tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use fert_advisor::{create_router, AppState, NutrientTable, WeatherService};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

// Helper: router over the built-in table; the weather service never gets
// called because these requests carry no location
fn test_app() -> axum::Router {
    let weather = WeatherService::new("test-key").expect("client should build");
    create_router(AppState::new(NutrientTable::builtin(), weather))
}

// Helper: parse JSON response
async fn json_response(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).expect("Failed to parse JSON")
}

async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

// =========================================================================
// Section 1: Service Status
// =========================================================================

#[tokio::test]
async fn test_root_status_message() {
    let response = get(test_app(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["message"], "Fertilizer Recommendation API is running");
}

#[tokio::test]
async fn test_health_check() {
    let response = get(test_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

// =========================================================================
// Section 2: Recommendation Endpoint
// =========================================================================

#[tokio::test]
async fn test_recommend_all_thresholds_fire() {
    // Red/Rice baseline (N=250, P=8, K=100) is below every threshold
    let response = get(
        test_app(),
        "/api/recommend?soil_type=Red&crop_type=Rice&land_size=500&fallow_years=1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(
        body["fertilizers"],
        serde_json::json!(["Urea", "Single Super Phosphate", "Muriate of Potash"])
    );
    assert_eq!(body["land_size_m2"], 500.0);
    assert_eq!(body["fallow_years"], 1);

    // Default snapshot: no location was supplied
    assert_eq!(body["weather"]["temperature"], 25.0);
    assert_eq!(body["weather"]["soil_temp"], 23.0);
    assert_eq!(body["weather"]["soil_moisture"], 50.0);

    let message = body["farmer_message"].as_str().unwrap();
    assert!(message.contains("FARMER ADVISORY"));
    assert!(message.contains("**Apply Urea** (140kg/acre for nitrogen)"));
    assert!(message.contains("**Apply SSP** (50kg/acre for phosphorus)"));
    assert!(message.contains("**Apply MOP** (40kg/acre for potassium)"));
}

#[tokio::test]
async fn test_recommend_no_thresholds_fire() {
    // Black/Cotton baseline (N=300, P=12, K=120) clears every threshold
    let response = get(
        test_app(),
        "/api/recommend?soil_type=Black&crop_type=Cotton&land_size=800&fallow_years=0",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["fertilizers"], serde_json::json!([]));

    let message = body["farmer_message"].as_str().unwrap();
    assert!(message.contains("✅ No fertilizers needed now"));
}

#[tokio::test]
async fn test_recommend_fallow_notes() {
    let app = test_app();

    let response = get(
        app.clone(),
        "/api/recommend?soil_type=Red&crop_type=Rice&land_size=500&fallow_years=3",
    )
    .await;
    let body = json_response(response).await;
    let message = body["farmer_message"].as_str().unwrap();
    assert!(message.contains("Long fallow period!"));

    let response = get(
        app,
        "/api/recommend?soil_type=Red&crop_type=Rice&land_size=500&fallow_years=1",
    )
    .await;
    let body = json_response(response).await;
    let message = body["farmer_message"].as_str().unwrap();
    assert!(message.contains("No critical issues detected"));
}

// =========================================================================
// Section 3: Client Errors
// =========================================================================

#[tokio::test]
async fn test_unknown_pair_returns_400() {
    let response = get(
        test_app(),
        "/api/recommend?soil_type=Peaty&crop_type=Rice&land_size=500&fallow_years=1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_response(response).await;
    assert_eq!(body["error"], "No data for this soil-crop combination.");
}

#[tokio::test]
async fn test_known_soil_with_wrong_crop_returns_400() {
    // Both values exist in the table, just not as a pair
    let response = get(
        test_app(),
        "/api/recommend?soil_type=Red&crop_type=Cotton&land_size=500&fallow_years=1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_required_params_returns_400() {
    let response = get(test_app(), "/api/recommend?soil_type=Red").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_land_size_returns_400() {
    let response = get(
        test_app(),
        "/api/recommend?soil_type=Red&crop_type=Rice&land_size=large&fallow_years=1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
