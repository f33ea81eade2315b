//! Error taxonomy shared by every stage of the dashboard pipeline.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ENV_API_KEY, SECRETS_KEY, SECRETS_SECTION};

#[derive(Debug, Clone, Error)]
pub enum DashboardError {
    #[error(
        "No API key configured.\n\
         Hint: add `API_KEY = \"...\"` under a `[WEATHER]` section of the secrets file, \
         or set the environment variable `WEATHER_API_KEY`."
    )]
    MissingCredential,

    #[error("Unknown city '{0}'")]
    UnknownCity(String),

    #[error("Invalid forecast length {0}: must be between 1 and 3 days")]
    InvalidForecastDays(u8),

    #[error("Network error: {0}")]
    Network(#[source] Arc<reqwest::Error>),

    #[error("WeatherAPI request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    /// A successful status whose body is not JSON at all, e.g. a proxy error page.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    #[error("Unknown weekday '{0}'")]
    UnknownWeekday(String),

    #[error("Incomplete forecast data for {date}: need at least 19 hourly entries, got {hours}")]
    IncompleteForecastData { date: String, hours: usize },

    #[error("Map error: {0}")]
    MapRender(String),
}

impl DashboardError {
    /// Network and HTTP failures are reported as connectivity problems; everything
    /// else reaching the top-level guard is unexpected.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Http { .. } | Self::InvalidBody(_))
    }

    /// Portuguese message shown to the user in place of the failed output.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => format!(
                "🔐 Configuração de API Key necessária:\n\n\
                 Opção 1 (Recomendada para local): crie o ficheiro de secrets com:\n\n\
                 \x20   [{SECRETS_SECTION}]\n\
                 \x20   {SECRETS_KEY} = \"sua_chave_aqui\"\n\n\
                 Opção 2 (Para produção): defina a variável de ambiente `{ENV_API_KEY}`"
            ),
            Self::Network(_) | Self::Http { .. } | Self::InvalidBody(_) => {
                format!("Erro na conexão com a API: {self}")
            }
            Self::MapRender(msg) => format!("Erro ao gerar mapa: {msg}"),
            _ => format!("Ocorreu um erro inesperado: {self}"),
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(Arc::new(err))
    }
}
