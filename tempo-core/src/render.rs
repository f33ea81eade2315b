//! Text rendering of the dashboard's independent regions.
//!
//! Each region turns a [`DashboardView`] into text, or fails on its own. The
//! controller guards every region separately, so one failing region never
//! blanks the others.

use std::fmt::Write;

use crate::{
    dashboard::DashboardView,
    error::DashboardError,
    model::{CurrentConditions, ForecastDay, HourSample},
};

pub const MAP_ZOOM: u8 = 12;
pub const MAP_TILES: &str = "OpenStreetMap";
pub const FOOTER: &str =
    "© 2025 Mario/Mythus | 🌦️ Fonte: WeatherAPI (https://www.weatherapi.com/)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Current,
    Map,
    Forecast,
}

impl RegionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionKind::Current => "current",
            RegionKind::Map => "map",
            RegionKind::Forecast => "forecast",
        }
    }
}

/// An independently rendered, independently fallible part of the dashboard.
pub trait Region {
    fn kind(&self) -> RegionKind;

    fn title(&self, view: &DashboardView) -> String;

    fn render(&self, view: &DashboardView) -> Result<String, DashboardError>;
}

/// Current conditions plus the full-details block.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentRegion;

impl Region for CurrentRegion {
    fn kind(&self) -> RegionKind {
        RegionKind::Current
    }

    fn title(&self, view: &DashboardView) -> String {
        format!("Condições atuais em {}", view.query.city.name)
    }

    fn render(&self, view: &DashboardView) -> Result<String, DashboardError> {
        Ok(render_current(&view.current))
    }
}

fn render_current(c: &CurrentConditions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Temperatura:       {}", celsius(c.temperature_c));
    let _ = writeln!(out, "Sensação Térmica:  {}", celsius(c.feels_like_c));
    let _ = writeln!(out, "Condição:          {}", c.condition_text);
    let _ = writeln!(out, "Ícone:             {}", c.condition_icon_url);
    let _ = writeln!(out, "Humidade:          {}%", c.humidity_pct);
    let _ = writeln!(out, "Vento:             {} km/h", c.wind_kph);
    let _ = writeln!(out);
    let _ = writeln!(out, "Detalhes completos");
    let _ = writeln!(
        out,
        "  Coordenadas:          {}, {}",
        coordinate_text(&c.latitude),
        coordinate_text(&c.longitude)
    );
    let _ = writeln!(out, "  Última atualização:   {}", c.last_updated);
    let _ = writeln!(out, "  Pressão atmosférica:  {} mb", c.pressure_mb);
    let _ = writeln!(out, "  Índice UV:            {}", c.uv_index);
    let _ = write!(out, "  Visibilidade:         {} km", c.visibility_km);
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub popup: String,
    pub tooltip: String,
}

/// What the map widget needs: a centre, a zoom level and one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub tiles: &'static str,
    pub marker: MapMarker,
}

impl MapView {
    pub fn for_view(view: &DashboardView) -> Result<Self, DashboardError> {
        let lat = parse_coordinate("latitude", &view.current.latitude, 90.0)?;
        let lon = parse_coordinate("longitude", &view.current.longitude, 180.0)?;

        Ok(Self {
            latitude: lat,
            longitude: lon,
            zoom: MAP_ZOOM,
            tiles: MAP_TILES,
            marker: MapMarker {
                latitude: lat,
                longitude: lon,
                popup: format!(
                    "{} / Temperatura: {}",
                    view.query.city.name,
                    celsius(view.current.temperature_c)
                ),
                tooltip: "Clique para detalhes".to_string(),
            },
        })
    }

    pub fn osm_url(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map={zoom}/{lat}/{lon}",
            lat = self.latitude,
            lon = self.longitude,
            zoom = self.zoom
        )
    }
}

/// Numbers and numeric strings are accepted; anything else, or a value
/// outside `-limit..=limit`, is a map error.
fn parse_coordinate(
    name: &str,
    raw: &serde_json::Value,
    limit: f64,
) -> Result<f64, DashboardError> {
    let value = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| DashboardError::MapRender(format!("{name} is not a number: {raw}")))?;

    if !value.is_finite() || !(-limit..=limit).contains(&value) {
        return Err(DashboardError::MapRender(format!("{name} {value} is out of range")));
    }
    Ok(value)
}

fn coordinate_text(raw: &serde_json::Value) -> String {
    match raw {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MapRegion;

impl Region for MapRegion {
    fn kind(&self) -> RegionKind {
        RegionKind::Map
    }

    fn title(&self, _view: &DashboardView) -> String {
        "🗺️ Ver no mapa".to_string()
    }

    fn render(&self, view: &DashboardView) -> Result<String, DashboardError> {
        let map = MapView::for_view(view)?;
        Ok(format!(
            "Centro: {}, {} (zoom {}, {})\nMarcador: {} ({})\n{}",
            map.latitude,
            map.longitude,
            map.zoom,
            map.tiles,
            map.marker.popup,
            map.marker.tooltip,
            map.osm_url()
        ))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ForecastRegion;

impl Region for ForecastRegion {
    fn kind(&self) -> RegionKind {
        RegionKind::Forecast
    }

    fn title(&self, view: &DashboardView) -> String {
        format!(
            "⏳ Previsão para os próximos {} dias em {}",
            view.query.forecast_days.get(),
            view.query.city.name
        )
    }

    fn render(&self, view: &DashboardView) -> Result<String, DashboardError> {
        Ok(view.forecast.iter().map(render_day).collect::<Vec<_>>().join("\n\n"))
    }
}

fn render_day(day: &ForecastDay) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "▸ {}", day.heading());
    let _ = writeln!(
        out,
        "  🌡️ Máxima: {} | Mínima: {} | Média: {}",
        celsius(day.max_temp_c),
        celsius(day.min_temp_c),
        celsius(day.avg_temp_c)
    );
    let _ = writeln!(
        out,
        "  🌦️ {} | Chuva: {} mm | UV: {}",
        day.condition_text, day.total_precip_mm, day.uv_index
    );
    let _ = writeln!(out, "     {}", day.condition_icon_url);
    let _ = writeln!(
        out,
        "  💨 Vel. vento: {} km/h | Humidade: {}% | Visibilidade: {} km",
        day.max_wind_kph, day.avg_humidity_pct, day.avg_visibility_km
    );
    let _ = write!(out, "  🕒 Previsão horária");
    for hour in &day.highlighted_hours {
        let _ = write!(out, "\n    {}", render_hour_line(hour));
    }
    out
}

fn render_hour_line(h: &HourSample) -> String {
    format!(
        "{}  {:>7}  {}  💧 {}%",
        h.time_of_day.format("%H:%M"),
        celsius(h.temperature_c),
        h.condition_text,
        h.humidity_pct
    )
}

/// Every hourly sample of a day as a table.
pub fn render_hour_table(day: &ForecastDay) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Todas as horas para {}", day.date.format("%Y-%m-%d"));
    let _ = writeln!(
        out,
        "{:<5}  {:>7}  {:>8}  {:>9}  {:<28}  condition_icon",
        "time", "temp_c", "humidity", "wind_kph", "condition_text"
    );
    for h in &day.hourly_samples {
        let _ = writeln!(
            out,
            "{:<5}  {:>7.1}  {:>8}  {:>9.1}  {:<28}  {}",
            h.time_of_day.format("%H:%M").to_string(),
            h.temperature_c,
            h.humidity_pct,
            h.wind_kph,
            h.condition_text,
            h.condition_icon_url
        );
    }
    out.trim_end().to_string()
}

/// Pretty-printed raw API document.
pub fn render_raw_json(body: &serde_json::Value) -> Result<String, DashboardError> {
    serde_json::to_string_pretty(body)
        .map_err(|e| DashboardError::MalformedResponse(format!("Failed to print JSON: {e}")))
}

fn celsius(value: f64) -> String {
    format!("{value:.1}°C")
}
