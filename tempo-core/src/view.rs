//! Shaping of raw WeatherAPI documents into display-ready view models.
//!
//! Everything here is pure: the raw JSON is parsed eagerly into typed wire
//! structs and then mapped onto [`CurrentConditions`] / [`ForecastDay`], so a
//! missing or mistyped field fails here rather than during rendering. The
//! location coordinates are the exception: they are carried through as raw
//! JSON and only the map region converts them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::{
    error::DashboardError,
    model::{CurrentConditions, ForecastDay, HourSample},
};

/// Hour indices shown in the condensed per-day view.
pub const HIGHLIGHTED_HOURS: [usize; 4] = [0, 6, 12, 18];
pub const HOURS_PER_DAY: usize = 24;

const WEEKDAYS_PT: [(&str, &str); 7] = [
    ("Monday", "Seg"),
    ("Tuesday", "Ter"),
    ("Wednesday", "Qua"),
    ("Thursday", "Qui"),
    ("Friday", "Sex"),
    ("Saturday", "Sáb"),
    ("Sunday", "Dom"),
];

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    #[serde(default)]
    lat: serde_json::Value,
    #[serde(default)]
    lon: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    condition: WaCondition,
    humidity: u8,
    wind_kph: f64,
    pressure_mb: f64,
    uv: f64,
    vis_km: f64,
    last_updated: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    condition: WaCondition,
    totalprecip_mm: f64,
    uv: f64,
    maxwind_kph: f64,
    avghumidity: f64,
    avgvis_km: f64,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    time: String,
    temp_c: f64,
    condition: WaCondition,
    humidity: u8,
    wind_kph: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
    hour: Vec<WaHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
}

/// WeatherAPI sends protocol-relative icon paths (`//cdn.weatherapi.com/...`).
pub fn icon_url(partial: &str) -> String {
    format!("https:{partial}")
}

/// Portuguese abbreviation for an English weekday name.
pub fn weekday_pt(english: &str) -> Result<&'static str, DashboardError> {
    WEEKDAYS_PT
        .iter()
        .find(|(en, _)| *en == english)
        .map(|(_, pt)| *pt)
        .ok_or_else(|| DashboardError::UnknownWeekday(english.to_string()))
}

pub fn build_current(raw: &serde_json::Value) -> Result<CurrentConditions, DashboardError> {
    let parsed = WaCurrentResponse::deserialize(raw).map_err(|e| {
        DashboardError::MalformedResponse(format!("Failed to parse WeatherAPI current JSON: {e}"))
    })?;

    let current = parsed.current;
    Ok(CurrentConditions {
        temperature_c: current.temp_c,
        feels_like_c: current.feelslike_c,
        condition_icon_url: icon_url(&current.condition.icon),
        condition_text: current.condition.text,
        humidity_pct: current.humidity,
        wind_kph: current.wind_kph,
        pressure_mb: current.pressure_mb,
        uv_index: current.uv,
        visibility_km: current.vis_km,
        last_updated: current.last_updated,
        latitude: parsed.location.lat,
        longitude: parsed.location.lon,
    })
}

pub fn build_forecast_days(raw: &serde_json::Value) -> Result<Vec<ForecastDay>, DashboardError> {
    let parsed = WaForecastResponse::deserialize(raw).map_err(|e| {
        DashboardError::MalformedResponse(format!("Failed to parse WeatherAPI forecast JSON: {e}"))
    })?;

    parsed.forecast.forecastday.into_iter().map(build_day).collect()
}

fn build_day(raw: WaForecastDay) -> Result<ForecastDay, DashboardError> {
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").map_err(|e| {
        DashboardError::MalformedResponse(format!("Invalid forecast date '{}': {e}", raw.date))
    })?;
    let weekday_label = weekday_pt(&date.format("%A").to_string())?.to_string();

    let last_needed = HIGHLIGHTED_HOURS[HIGHLIGHTED_HOURS.len() - 1];
    if raw.hour.len() <= last_needed {
        return Err(DashboardError::IncompleteForecastData {
            date: raw.date,
            hours: raw.hour.len(),
        });
    }
    if raw.hour.len() != HOURS_PER_DAY {
        tracing::warn!(
            date = %raw.date,
            hours = raw.hour.len(),
            "Forecast day does not carry a full 24-hour list"
        );
    }

    let hourly_samples = raw.hour.into_iter().map(build_hour).collect::<Result<Vec<_>, _>>()?;
    let highlighted_hours =
        HIGHLIGHTED_HOURS.iter().map(|&i| hourly_samples[i].clone()).collect();

    let day = raw.day;
    Ok(ForecastDay {
        date,
        weekday_label,
        max_temp_c: day.maxtemp_c,
        min_temp_c: day.mintemp_c,
        avg_temp_c: day.avgtemp_c,
        condition_icon_url: icon_url(&day.condition.icon),
        condition_text: day.condition.text,
        total_precip_mm: day.totalprecip_mm,
        uv_index: day.uv,
        max_wind_kph: day.maxwind_kph,
        avg_humidity_pct: day.avghumidity,
        avg_visibility_km: day.avgvis_km,
        hourly_samples,
        highlighted_hours,
    })
}

fn build_hour(raw: WaHour) -> Result<HourSample, DashboardError> {
    let time = NaiveDateTime::parse_from_str(&raw.time, "%Y-%m-%d %H:%M").map_err(|e| {
        DashboardError::MalformedResponse(format!("Invalid hourly timestamp '{}': {e}", raw.time))
    })?;

    Ok(HourSample {
        time_of_day: time.time(),
        temperature_c: raw.temp_c,
        condition_icon_url: icon_url(&raw.condition.icon),
        condition_text: raw.condition.text,
        humidity_pct: raw.humidity,
        wind_kph: raw.wind_kph,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::NaiveTime;
    use serde_json::{Value, json};

    #[test]
    fn builds_current_conditions() {
        let raw = current_json(15.2, "Parcialmente nublado", json!(41.15), json!(-8.61));
        let current = build_current(&raw).unwrap();

        assert_eq!(current.temperature_c, 15.2);
        assert_eq!(current.condition_text, "Parcialmente nublado");
        assert_eq!(
            current.condition_icon_url,
            "https://cdn.weatherapi.com/weather/64x64/day/116.png"
        );
        assert_eq!(current.humidity_pct, 72);
        assert_eq!(current.last_updated, "2025-05-10 14:30");
        assert_eq!((current.latitude, current.longitude), (json!(41.15), json!(-8.61)));
    }

    #[test]
    fn current_keeps_unusable_coordinates_for_the_map_to_judge() {
        let raw = current_json(15.2, "Sol", json!("not-a-number"), Value::Null);
        let current = build_current(&raw).unwrap();
        assert_eq!(current.latitude, json!("not-a-number"));
        assert_eq!(current.longitude, Value::Null);

        let mut raw = current_json(15.2, "Sol", json!(41.15), json!(-8.61));
        raw["location"].as_object_mut().unwrap().remove("lat");
        assert_eq!(build_current(&raw).unwrap().latitude, Value::Null);
    }

    #[test]
    fn current_with_missing_field_is_malformed() {
        let mut raw = current_json(15.2, "Sol", json!(41.15), json!(-8.61));
        raw["current"].as_object_mut().unwrap().remove("temp_c");

        let err = build_current(&raw).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedResponse(ref m) if m.contains("temp_c")));
    }

    #[test]
    fn weekday_mapping_covers_the_whole_week() {
        // 2025-05-05 is a Monday.
        let expected = ["Seg", "Ter", "Qua", "Qui", "Sex", "Sáb", "Dom"];
        for (offset, label) in expected.iter().enumerate() {
            let date = NaiveDate::from_ymd_opt(2025, 5, 5 + offset as u32).unwrap();
            assert_eq!(weekday_pt(&date.format("%A").to_string()).unwrap(), *label);
        }
        assert!(matches!(weekday_pt("Funday"), Err(DashboardError::UnknownWeekday(_))));
    }

    #[test]
    fn saturday_forecast_is_labelled_sab() {
        let raw = forecast_json(&[("2025-05-10", 24)]);
        let days = build_forecast_days(&raw).unwrap();
        assert_eq!(days[0].weekday_label, "Sáb");
        assert_eq!(days[0].heading(), "Sáb, 10/05");
    }

    #[test]
    fn two_day_forecast_keeps_order_and_highlights_four_hours() {
        let raw = forecast_json(&[("2025-05-10", 24), ("2025-05-11", 24)]);
        let days = build_forecast_days(&raw).unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2025, 5, 11).unwrap());
        assert_eq!(days[1].weekday_label, "Dom");

        for day in &days {
            assert_eq!(day.hourly_samples.len(), 24);
            assert_eq!(day.highlighted_hours.len(), 4);
            let times: Vec<NaiveTime> =
                day.highlighted_hours.iter().map(|h| h.time_of_day).collect();
            let expected: Vec<NaiveTime> =
                [0, 6, 12, 18].iter().map(|&h| NaiveTime::from_hms_opt(h, 0, 0).unwrap()).collect();
            assert_eq!(times, expected);
            assert_eq!(day.highlighted_hours[2], day.hourly_samples[12]);
        }

        let day = &days[0];
        assert_eq!(day.max_temp_c, 21.3);
        assert_eq!(day.avg_humidity_pct, 65.0);
        assert_eq!(day.condition_icon_url, "https://cdn.weatherapi.com/weather/64x64/day/113.png");
        assert_eq!(day.hourly_samples[6].condition_icon_url, "https://cdn/6.png");
    }

    #[test]
    fn short_hour_list_is_incomplete() {
        let raw = forecast_json(&[("2025-05-10", 10)]);
        let err = build_forecast_days(&raw).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::IncompleteForecastData { ref date, hours: 10 } if date == "2025-05-10"
        ));
    }

    #[test]
    fn nineteen_hours_is_enough_to_highlight() {
        let raw = forecast_json(&[("2025-05-10", 19)]);
        let days = build_forecast_days(&raw).unwrap();
        assert_eq!(days[0].hourly_samples.len(), 19);
        assert_eq!(days[0].highlighted_hours.len(), 4);
    }

    #[test]
    fn invalid_date_is_malformed() {
        let raw = forecast_json(&[("10/05/2025", 24)]);
        assert!(matches!(build_forecast_days(&raw), Err(DashboardError::MalformedResponse(_))));
    }
}
