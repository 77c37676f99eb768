//! Advisory Message Renderer
//!
//! Turns a `Recommendation` into the farmer-facing message. Pure string
//! assembly; every rule reads only the recommendation itself.

use crate::engine::{Fertilizer, Recommendation};

/// Render the advisory message for a recommendation.
///
/// Block order is fixed: field conditions, weather alerts, soil care,
/// fertilizer plan, special notes.
pub fn render_message(recommendation: &Recommendation) -> String {
    let weather = &recommendation.weather;

    // Weather alerts: the rain rules are mutually exclusive, the wind rule
    // may add a second line
    let mut weather_advice: Vec<String> = Vec::new();
    if weather.rainfall > 10.0 {
        weather_advice.push("🚨 **Heavy rain warning!** Avoid all field work today.".to_string());
    } else if weather.rainfall > 5.0 {
        weather_advice.push("🌧️ **Rain expected.** Delay fertilizer application.".to_string());
    } else {
        weather_advice.push("☀️ **Dry conditions.** Water crops if needed.".to_string());
    }

    if weather.wind_speed > 8.0 {
        weather_advice.push("💨 **Strong winds!** No spraying today.".to_string());
    } else if weather.wind_speed > 5.0 {
        weather_advice.push("🌬️ **Breezy conditions.** Spray carefully.".to_string());
    }

    let mut soil_advice: Vec<String> = Vec::new();
    if weather.soil_temp < 15.0 {
        soil_advice.push("❄️ **Cold soil.** Delay planting warm-season crops.".to_string());
    } else if weather.soil_temp > 30.0 {
        soil_advice.push("🔥 **Hot soil.** Water deeply in early morning.".to_string());
    }

    if weather.soil_moisture > 85.0 {
        soil_advice.push("💧 **Waterlogged soil.** Improve drainage.".to_string());
    } else if weather.soil_moisture < 40.0 {
        soil_advice.push("🏜️ **Dry soil.** Irrigate soon.".to_string());
    }

    let fert_advice: Vec<String> = recommendation
        .fertilizers
        .iter()
        .map(|fertilizer| fertilizer_line(*fertilizer))
        .collect();

    let fallow_note = if recommendation.fallow_years >= 2 {
        "⚠️ **Long fallow period!** Plant green manure crops."
    } else {
        "No critical issues detected"
    };

    let mut message = String::with_capacity(1024);

    message.push_str("🌱 **FARMER ADVISORY** 🌱\n");
    message.push_str("========================\n");
    message.push_str("**FIELD CONDITIONS:**\n");
    message.push_str(&format!(
        "- Land: {}m² | Fallow: {} year(s)\n",
        recommendation.land_size_m2, recommendation.fallow_years
    ));
    message.push_str(&format!(
        "- Soil Temp: {}°C | Moisture: {}%\n\n",
        weather.soil_temp, weather.soil_moisture
    ));

    message.push_str("**WEATHER ALERTS:**\n");
    message.push_str(&weather_advice.join("\n"));
    message.push_str("\n\n");

    message.push_str("**SOIL CARE:**\n");
    if soil_advice.is_empty() {
        message.push_str("✅ Soil conditions normal");
    } else {
        message.push_str(&soil_advice.join("\n"));
    }
    message.push_str("\n\n");

    message.push_str("**FERTILIZER PLAN:**\n");
    if fert_advice.is_empty() {
        message.push_str("✅ No fertilizers needed now");
    } else {
        message.push_str(&fert_advice.join("\n"));
    }
    message.push_str("\n\n");

    message.push_str("**SPECIAL NOTES:**\n");
    message.push_str(fallow_note);
    message.push('\n');

    message
}

fn fertilizer_line(fertilizer: Fertilizer) -> String {
    let icon = match fertilizer {
        Fertilizer::Urea => "🔵",
        Fertilizer::SingleSuperPhosphate => "🟢",
        Fertilizer::MuriateOfPotash => "🟣",
    };

    format!(
        "{} **Apply {}** ({}kg/acre for {})",
        icon,
        fertilizer.short_label(),
        fertilizer.application_rate_kg_per_acre(),
        fertilizer.nutrient()
    )
}
