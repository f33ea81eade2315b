use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    /// `"lat,lon"` as sent in the `q` query parameter.
    pub fn location_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Number of forecast days, always within 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ForecastDays(u8);

impl ForecastDays {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(days: u8) -> Result<Self, DashboardError> {
        if (Self::MIN..=Self::MAX).contains(&days) {
            Ok(Self(days))
        } else {
            Err(DashboardError::InvalidForecastDays(days))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ForecastDays {
    fn default() -> Self {
        Self(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherQuery {
    pub city: City,
    pub forecast_days: ForecastDays,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition_text: String,
    pub condition_icon_url: String,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub pressure_mb: f64,
    pub uv_index: f64,
    pub visibility_km: f64,
    pub last_updated: String,
    /// Coordinates as sent by the API; only the map converts them to numbers.
    pub latitude: Value,
    pub longitude: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourSample {
    pub time_of_day: NaiveTime,
    pub temperature_c: f64,
    pub condition_text: String,
    pub condition_icon_url: String,
    pub humidity_pct: u8,
    pub wind_kph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Portuguese 3-letter weekday, e.g. "Sáb".
    pub weekday_label: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    pub condition_text: String,
    pub condition_icon_url: String,
    pub total_precip_mm: f64,
    pub uv_index: f64,
    pub max_wind_kph: f64,
    pub avg_humidity_pct: f64,
    pub avg_visibility_km: f64,
    pub hourly_samples: Vec<HourSample>,
    pub highlighted_hours: Vec<HourSample>,
}

impl ForecastDay {
    /// Heading such as "Sáb, 10/05".
    pub fn heading(&self) -> String {
        format!("{}, {}", self.weekday_label, self.date.format("%d/%m"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_days_bounds() {
        assert!(ForecastDays::new(0).is_err());
        assert_eq!(ForecastDays::new(1).unwrap().get(), 1);
        assert_eq!(ForecastDays::new(3).unwrap().get(), 3);
        assert!(matches!(ForecastDays::new(4), Err(DashboardError::InvalidForecastDays(4))));
        assert_eq!(ForecastDays::default().get(), 2);
    }

    #[test]
    fn location_query_is_lat_comma_lon() {
        let city = City { name: "Porto", latitude: 41.15, longitude: -8.61 };
        assert_eq!(city.location_query(), "41.15,-8.61");
    }
}
