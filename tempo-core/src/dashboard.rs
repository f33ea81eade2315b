//! Session state machine driving fetch, view-model building and rendering.
//!
//! A selection moves the session `Idle -> Fetching`, and the completed cycle
//! lands in `Rendered` or `Failed`. Every selection hands out a [`CycleTicket`];
//! completing a ticket that is no longer the latest is ignored, so the last
//! selection always wins the render.

use std::sync::Arc;

use crate::{
    cache::CachedResponse,
    cities::CityRegistry,
    error::DashboardError,
    model::{CurrentConditions, ForecastDay, ForecastDays, WeatherQuery},
    provider::WeatherProvider,
    render::{CurrentRegion, ForecastRegion, MapRegion, Region, RegionKind},
    view,
};

/// Everything the regions need, computed before any of them renders.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub query: WeatherQuery,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastDay>,
    pub raw_current: Arc<CachedResponse>,
    pub raw_forecast: Arc<CachedResponse>,
}

impl DashboardView {
    pub fn build(
        query: WeatherQuery,
        raw_current: Arc<CachedResponse>,
        raw_forecast: Arc<CachedResponse>,
    ) -> Result<Self, DashboardError> {
        let current = view::build_current(&raw_current.body)?;
        let forecast = view::build_forecast_days(&raw_forecast.body)?;
        Ok(Self { query, current, forecast, raw_current, raw_forecast })
    }
}

#[derive(Debug, Clone)]
pub struct RegionOutput {
    pub kind: RegionKind,
    pub title: String,
    /// Rendered text, or the region-local error message.
    pub body: Result<String, String>,
}

#[derive(Debug, Clone)]
pub struct RenderedDashboard {
    pub view: DashboardView,
    pub regions: Vec<RegionOutput>,
}

impl RenderedDashboard {
    pub fn region(&self, kind: RegionKind) -> Option<&RegionOutput> {
        self.regions.iter().find(|r| r.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connectivity,
    Unexpected,
}

#[derive(Debug, Clone)]
pub struct FailureNotice {
    pub kind: FailureKind,
    pub message: String,
    pub error: DashboardError,
}

impl From<DashboardError> for FailureNotice {
    fn from(error: DashboardError) -> Self {
        let kind = if error.is_connectivity() {
            FailureKind::Connectivity
        } else {
            FailureKind::Unexpected
        };
        Self { kind, message: error.user_message(), error }
    }
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Fetching(WeatherQuery),
    Rendered(Box<RenderedDashboard>),
    Failed(FailureNotice),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Fetching(_) => "fetching",
            SessionState::Rendered(_) => "rendered",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Handle for one fetch-and-render cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTicket {
    pub generation: u64,
    pub query: WeatherQuery,
}

pub struct DashboardController<P> {
    provider: P,
    registry: CityRegistry,
    regions: Vec<Box<dyn Region + Send + Sync>>,
    state: SessionState,
    generation: u64,
}

impl<P: WeatherProvider> DashboardController<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            registry: CityRegistry::portugal(),
            regions: vec![Box::new(CurrentRegion), Box::new(MapRegion), Box::new(ForecastRegion)],
            state: SessionState::Idle,
            generation: 0,
        }
    }

    /// Replace the rendered regions, in display order.
    pub fn with_regions(mut self, regions: Vec<Box<dyn Region + Send + Sync>>) -> Self {
        self.regions = regions;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn registry(&self) -> &CityRegistry {
        &self.registry
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run a full cycle for a city / forecast-length selection.
    pub async fn select(&mut self, city: &str, days: u8) -> &SessionState {
        if let Ok(ticket) = self.begin(city, days) {
            let outcome = self.fetch(&ticket).await;
            self.complete(ticket, outcome);
        }
        &self.state
    }

    /// Start a new cycle, invalidating whatever was displayed before.
    pub fn begin(&mut self, city: &str, days: u8) -> Result<CycleTicket, DashboardError> {
        self.generation += 1;

        let query = match self.query_for(city, days) {
            Ok(query) => query,
            Err(err) => {
                tracing::warn!(city, days, "Rejected selection: {err}");
                self.state = SessionState::Failed(err.clone().into());
                return Err(err);
            }
        };

        tracing::info!(city, days, generation = self.generation, "Fetching weather");
        self.state = SessionState::Fetching(query);
        Ok(CycleTicket { generation: self.generation, query })
    }

    fn query_for(&self, city: &str, days: u8) -> Result<WeatherQuery, DashboardError> {
        Ok(WeatherQuery {
            city: self.registry.lookup(city)?,
            forecast_days: ForecastDays::new(days)?,
        })
    }

    /// Fetch current conditions, then the forecast, and build the view model.
    pub async fn fetch(&self, ticket: &CycleTicket) -> Result<DashboardView, DashboardError> {
        let query = ticket.query;
        let raw_current = self.provider.fetch_current(&query.city).await?;
        let raw_forecast = self.provider.fetch_forecast(&query.city, query.forecast_days).await?;
        DashboardView::build(query, raw_current, raw_forecast)
    }

    /// Apply a cycle's outcome. Returns `false` when the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: CycleTicket,
        outcome: Result<DashboardView, DashboardError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "Dropping result of superseded cycle"
            );
            return false;
        }

        self.state = match outcome {
            Ok(view) => {
                let rendered = self.render(view);
                tracing::info!(city = rendered.view.query.city.name, "Dashboard rendered");
                SessionState::Rendered(Box::new(rendered))
            }
            Err(err) => {
                tracing::warn!("Weather cycle failed: {err}");
                SessionState::Failed(err.into())
            }
        };
        true
    }

    /// Render every region, isolating failures to the region that raised them.
    pub fn render(&self, view: DashboardView) -> RenderedDashboard {
        let regions = self
            .regions
            .iter()
            .map(|region| {
                let kind = region.kind();
                let body = region.render(&view).map_err(|err| {
                    tracing::error!(region = kind.as_str(), "Region failed to render: {err}");
                    region_error_message(kind, &err)
                });
                RegionOutput { kind, title: region.title(&view), body }
            })
            .collect();

        RenderedDashboard { view, regions }
    }
}

fn region_error_message(kind: RegionKind, err: &DashboardError) -> String {
    match (kind, err) {
        (_, DashboardError::MapRender(_)) | (RegionKind::Map, _) => {
            format!("Erro ao gerar mapa: {err}")
        }
        (RegionKind::Current, _) => format!("Erro ao mostrar condições atuais: {err}"),
        (RegionKind::Forecast, _) => format!("Erro ao mostrar previsão: {err}"),
    }
}
