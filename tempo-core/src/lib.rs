//! Core library for the `tempo` weather dashboard.
//!
//! This crate defines:
//! - API key resolution (secrets file, then environment)
//! - The fixed registry of Portuguese cities
//! - A cached WeatherAPI.com client behind the `WeatherProvider` trait
//! - View models built from the raw API documents
//! - The dashboard controller and its independently rendered regions
//!
//! It is used by `tempo-cli`, but has no terminal dependencies of its own.

pub mod cache;
pub mod cities;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;
pub mod view;

pub use cache::{CachedResponse, ResponseCache};
pub use cities::CityRegistry;
pub use config::{ApiKey, ClientConfig, KeySource, ResolvedApiKey, resolve_api_key};
pub use dashboard::{
    DashboardController, DashboardView, FailureKind, FailureNotice, RenderedDashboard,
    SessionState,
};
pub use error::DashboardError;
pub use model::{City, CurrentConditions, ForecastDay, ForecastDays, HourSample, WeatherQuery};
pub use provider::{WeatherApiClient, WeatherProvider};
pub use render::RegionKind;
