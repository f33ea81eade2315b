use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    cache::CachedResponse,
    error::DashboardError,
    model::{City, ForecastDays},
};

pub mod weatherapi;

pub use weatherapi::WeatherApiClient;

/// Source of raw weather documents.
///
/// Implementations return the JSON body exactly as the upstream API sent it;
/// shaping it for display is left to [`crate::view`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &City) -> Result<Arc<CachedResponse>, DashboardError>;

    async fn fetch_forecast(
        &self,
        city: &City,
        days: ForecastDays,
    ) -> Result<Arc<CachedResponse>, DashboardError>;
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Arc<P> {
    async fn fetch_current(&self, city: &City) -> Result<Arc<CachedResponse>, DashboardError> {
        (**self).fetch_current(city).await
    }

    async fn fetch_forecast(
        &self,
        city: &City,
        days: ForecastDays,
    ) -> Result<Arc<CachedResponse>, DashboardError> {
        (**self).fetch_forecast(city, days).await
    }
}
