//! Fertilizer Advisory Service
//!
//! Looks up baseline soil nutrients for a soil/crop pair, resolves current
//! weather for the caller's location, and derives a fertilizer plan plus a
//! farmer-facing advisory message.
//!
//! Module layout:
//! - `data`: nutrient reference table (CSV load with built-in fallback)
//! - `weather`: weather provider client with per-location lookup cache
//! - `engine`: threshold rules joining the table row with the weather
//! - `advisory`: renders the farmer message from a recommendation
//! - `api_server`: Axum router, state, and error mapping
//!
//! Served as a REST API; see `bin/api_server.rs` for the entry point.

pub mod advisory;
pub mod api_server;
pub mod data;
pub mod engine;
pub mod weather;

// Re-export commonly used types
pub use advisory::render_message;
pub use api_server::{create_router, AppState};
pub use data::{NutrientRow, NutrientTable, TableSource};
pub use engine::{AdvisoryError, Fertilizer, Recommendation, RecommendationEngine};
pub use weather::{LocationQuery, WeatherError, WeatherService, WeatherSnapshot};
