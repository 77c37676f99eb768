//! Nutrient Reference Table
//!
//! Loads the soil/crop nutrient baselines with Polars CSV reading and keeps
//! them as typed rows for exact-match lookups. The table is read once at
//! startup and never mutated afterwards.

use anyhow::{Context, Result};
use polars::prelude::*;

/// One row of the nutrient reference table
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientRow {
    pub soil_type: String,
    pub crop_type: String,
    /// Available nitrogen (kg/ha)
    pub avail_n: f64,
    /// Available phosphorus (kg/ha)
    pub avail_p: f64,
    /// Exchangeable potassium (kg/ha)
    pub exch_k: f64,
}

/// Which source `load_or_builtin` ended up using
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    File,
    BuiltIn,
}

/// Nutrient baselines keyed by (soil type, crop type)
///
/// Lookup is exact and case-sensitive; the first matching row wins when
/// duplicates exist.
#[derive(Debug, Clone)]
pub struct NutrientTable {
    rows: Vec<NutrientRow>,
}

impl NutrientTable {
    /// Load the table from CSV, substituting the built-in sample table when
    /// the file is missing or unreadable. Returns which source was used so
    /// the caller can log it; a bad deployment degrades, it does not refuse
    /// to start.
    pub fn load_or_builtin(path: &str) -> (Self, TableSource) {
        match Self::from_csv(path) {
            Ok(table) => (table, TableSource::File),
            Err(e) => {
                tracing::warn!("Failed to load nutrient table from {}: {:#}", path, e);
                (Self::builtin(), TableSource::BuiltIn)
            }
        }
    }

    /// Load the table from a CSV file with columns
    /// `Soil_type, Crop_type, Avail_N, Avail_P, Exch_K`.
    pub fn from_csv(path: &str) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.into()))
            .with_context(|| format!("Failed to create CSV reader: {}", path))?
            .finish()
            .with_context(|| format!("Failed to load nutrient table: {}", path))?;

        Self::from_dataframe(&df)
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let soil = str_column(df, "Soil_type")?;
        let crop = str_column(df, "Crop_type")?;
        let avail_n = f64_column(df, "Avail_N")?;
        let avail_p = f64_column(df, "Avail_P")?;
        let exch_k = f64_column(df, "Exch_K")?;

        let mut rows = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            if let (Some(soil_type), Some(crop_type), Some(n), Some(p), Some(k)) = (
                soil.get(idx),
                crop.get(idx),
                avail_n.get(idx),
                avail_p.get(idx),
                exch_k.get(idx),
            ) {
                rows.push(NutrientRow {
                    soil_type: soil_type.to_string(),
                    crop_type: crop_type.to_string(),
                    avail_n: n,
                    avail_p: p,
                    exch_k: k,
                });
            }
        }

        if rows.is_empty() {
            anyhow::bail!("Nutrient table has no usable rows");
        }

        Ok(Self { rows })
    }

    /// Build a table directly from rows (used by the built-in fallback and
    /// by tests that need tailored baselines).
    pub fn from_rows(rows: Vec<NutrientRow>) -> Self {
        Self { rows }
    }

    /// Built-in fallback table used when no CSV is deployed
    pub fn builtin() -> Self {
        Self::from_rows(vec![
            NutrientRow {
                soil_type: "Red".to_string(),
                crop_type: "Rice".to_string(),
                avail_n: 250.0,
                avail_p: 8.0,
                exch_k: 100.0,
            },
            NutrientRow {
                soil_type: "Black".to_string(),
                crop_type: "Cotton".to_string(),
                avail_n: 300.0,
                avail_p: 12.0,
                exch_k: 120.0,
            },
            NutrientRow {
                soil_type: "Sandy".to_string(),
                crop_type: "Maize".to_string(),
                avail_n: 200.0,
                avail_p: 6.0,
                exch_k: 80.0,
            },
        ])
    }

    /// First row matching both keys exactly (case-sensitive)
    pub fn lookup(&self, soil_type: &str, crop_type: &str) -> Option<&NutrientRow> {
        self.rows
            .iter()
            .find(|row| row.soil_type == soil_type && row.crop_type == crop_type)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let col = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;
    let values = col
        .f64()
        .with_context(|| format!("Column '{}' is not numeric", name))?;
    Ok(values.clone())
}
