//! Recommendation Engine
//!
//! Joins the nutrient baseline for a soil/crop pair with current weather and
//! applies fixed thresholds to decide which fertilizers to recommend.

use crate::data::NutrientTable;
use crate::weather::{LocationQuery, WeatherError, WeatherService, WeatherSnapshot};
use serde::Serialize;

/// Available nitrogen below this needs Urea (kg/ha)
const NITROGEN_THRESHOLD: f64 = 280.0;
/// Available phosphorus below this needs SSP (kg/ha)
const PHOSPHORUS_THRESHOLD: f64 = 10.0;
/// Exchangeable potassium below this needs MOP (kg/ha)
const POTASSIUM_THRESHOLD: f64 = 110.0;

/// Recommendable fertilizers, declared in evaluation order (N, then P,
/// then K)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fertilizer {
    #[serde(rename = "Urea")]
    Urea,
    #[serde(rename = "Single Super Phosphate")]
    SingleSuperPhosphate,
    #[serde(rename = "Muriate of Potash")]
    MuriateOfPotash,
}

impl Fertilizer {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Urea => "Urea",
            Self::SingleSuperPhosphate => "Single Super Phosphate",
            Self::MuriateOfPotash => "Muriate of Potash",
        }
    }

    /// Abbreviation used in the advisory message
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::Urea => "Urea",
            Self::SingleSuperPhosphate => "SSP",
            Self::MuriateOfPotash => "MOP",
        }
    }

    /// Fixed application rate (kg/acre)
    pub fn application_rate_kg_per_acre(&self) -> u32 {
        match self {
            Self::Urea => 140,
            Self::SingleSuperPhosphate => 50,
            Self::MuriateOfPotash => 40,
        }
    }

    /// Nutrient the fertilizer supplies
    pub fn nutrient(&self) -> &'static str {
        match self {
            Self::Urea => "nitrogen",
            Self::SingleSuperPhosphate => "phosphorus",
            Self::MuriateOfPotash => "potassium",
        }
    }
}

/// Errors surfaced by the engine. Expected failures are always values here,
/// never panics.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    /// The soil/crop pair has no row in the reference table. A client input
    /// error, not a server fault.
    #[error("No data for this soil-crop combination.")]
    NoReferenceData {
        soil_type: String,
        crop_type: String,
    },
    /// The weather lookup failed; the recommendation cannot proceed
    #[error("{0}")]
    WeatherUnavailable(#[from] WeatherError),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A fertilizer plan for one request. Never mutated after construction.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub fertilizers: Vec<Fertilizer>,
    pub land_size_m2: f64,
    pub fallow_years: u32,
    pub weather: WeatherSnapshot,
}

/// Main recommendation coordinator: owns the reference table and the
/// weather service
pub struct RecommendationEngine {
    table: NutrientTable,
    weather: WeatherService,
}

impl RecommendationEngine {
    pub fn new(table: NutrientTable, weather: WeatherService) -> Self {
        Self { table, weather }
    }

    /// Derive a fertilizer plan for a soil/crop pair.
    ///
    /// Fails with `NoReferenceData` when the pair is absent from the table
    /// and with `WeatherUnavailable` when the location's weather cannot be
    /// resolved. With no location, the fixed default snapshot is used and no
    /// provider call is made.
    pub async fn recommend(
        &self,
        soil_type: &str,
        crop_type: &str,
        land_size_m2: f64,
        fallow_years: u32,
        location: Option<&LocationQuery>,
    ) -> Result<Recommendation, AdvisoryError> {
        let row = self.table.lookup(soil_type, crop_type).ok_or_else(|| {
            AdvisoryError::NoReferenceData {
                soil_type: soil_type.to_string(),
                crop_type: crop_type.to_string(),
            }
        })?;

        let weather = match location {
            Some(query) => self.weather.get_weather(query).await?,
            None => WeatherSnapshot::default_conditions(),
        };

        // List order is part of the contract: the advisory renderer walks
        // it as-is.
        let mut fertilizers = Vec::new();
        if row.avail_n < NITROGEN_THRESHOLD {
            fertilizers.push(Fertilizer::Urea);
        }
        if row.avail_p < PHOSPHORUS_THRESHOLD {
            fertilizers.push(Fertilizer::SingleSuperPhosphate);
        }
        if row.exch_k < POTASSIUM_THRESHOLD {
            fertilizers.push(Fertilizer::MuriateOfPotash);
        }

        Ok(Recommendation {
            fertilizers,
            land_size_m2,
            fallow_years,
            weather,
        })
    }
}
