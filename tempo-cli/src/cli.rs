use anyhow::{Context, anyhow};
use clap::Parser;
use inquire::{InquireError, Select};
use std::{fmt, path::PathBuf};

use tempo_core::{
    ClientConfig, DashboardController, ForecastDays, SessionState, WeatherApiClient,
    config::Secrets, resolve_api_key,
};

use crate::output::{self, Toggles};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tempo", version, about = "Previsão do Tempo - Portugal")]
pub struct Cli {
    /// City to show first, e.g. "Porto". Defaults to the first city in the list.
    #[arg(long)]
    pub city: Option<String>,

    /// Forecast length in days.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub days: Option<u8>,

    /// Render the dashboard once and exit instead of prompting.
    #[arg(long)]
    pub once: bool,

    /// Secrets file with a `[WEATHER]` section holding `API_KEY`.
    #[arg(long)]
    pub secrets: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ChangeCity,
    ChangeDays,
    ToggleHours,
    ToggleRawCurrent,
    ToggleRawForecast,
    Quit,
}

impl Action {
    const ALL: [Action; 6] = [
        Action::ChangeCity,
        Action::ChangeDays,
        Action::ToggleHours,
        Action::ToggleRawCurrent,
        Action::ToggleRawForecast,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::ChangeCity => "Selecionar outra cidade",
            Action::ChangeDays => "Alterar dias de previsão",
            Action::ToggleHours => "Mostrar/ocultar todas as horas de um dia",
            Action::ToggleRawCurrent => "Mostrar/ocultar dados brutos da API (atual)",
            Action::ToggleRawForecast => "Mostrar/ocultar dados brutos da API (previsão)",
            Action::Quit => "Sair",
        })
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let paths = match self.secrets {
            Some(path) => vec![path],
            None => Secrets::default_paths(),
        };

        // Checked once, before any network call.
        let resolved = resolve_api_key(&paths).map_err(|e| anyhow!(e.user_message()))?;
        for warning in &resolved.warnings {
            output::print_warning(&format!("Aviso na leitura de secrets: {warning}"));
        }
        tracing::debug!(source = %resolved.source, "API key resolved");

        let client = WeatherApiClient::new(resolved.key, ClientConfig::from_env())
            .context("Failed to create WeatherAPI client")?;
        let mut controller = DashboardController::new(client);

        let mut city = match self.city {
            Some(name) => controller.registry().lookup(&name)?.name,
            None => controller.registry().default_city().name,
        };
        let mut days = self.days.unwrap_or_else(|| ForecastDays::default().get());
        let mut toggles = Toggles::default();

        output::print_title();

        loop {
            if let Ok(selected) = controller.registry().lookup(city) {
                output::print_sidebar(&selected, days);
            }
            println!("A obter dados para {city}...");
            controller.select(city, days).await;
            output::print_state(controller.state(), &toggles);

            if self.once {
                output::print_footer();
                return Ok(());
            }

            // Toggles only change what is printed, so loop here without refetching.
            loop {
                let Some(action) = prompt(
                    Select::new("O que pretende fazer?", Action::ALL.to_vec()).prompt(),
                )?
                else {
                    output::print_footer();
                    return Ok(());
                };

                match action {
                    Action::ChangeCity => {
                        let names = controller.registry().list_cities();
                        let start = names.iter().position(|n| *n == city).unwrap_or(0);
                        if let Some(name) = prompt(
                            Select::new("Selecione uma cidade:", names)
                                .with_starting_cursor(start)
                                .prompt(),
                        )? {
                            city = name;
                            toggles.clear_hours();
                        }
                        break;
                    }
                    Action::ChangeDays => {
                        let options: Vec<u8> = (ForecastDays::MIN..=ForecastDays::MAX).collect();
                        let start = usize::from(days.saturating_sub(ForecastDays::MIN));
                        if let Some(d) = prompt(
                            Select::new("Dias de previsão", options)
                                .with_starting_cursor(start)
                                .prompt(),
                        )? {
                            days = d;
                        }
                        break;
                    }
                    Action::ToggleHours => {
                        let SessionState::Rendered(dash) = controller.state() else {
                            output::print_warning("Não há previsão carregada.");
                            continue;
                        };
                        let headings: Vec<String> =
                            dash.view.forecast.iter().map(|d| d.heading()).collect();
                        let picker = Select::new("Mostrar todas as horas para:", headings.clone());
                        if let Some(choice) = prompt(picker.prompt())? {
                            if let Some(idx) = headings.iter().position(|h| *h == choice) {
                                toggles.toggle_hours(dash.view.forecast[idx].date);
                            }
                        }
                    }
                    Action::ToggleRawCurrent => toggles.raw_current = !toggles.raw_current,
                    Action::ToggleRawForecast => toggles.raw_forecast = !toggles.raw_forecast,
                    Action::Quit => {
                        output::print_footer();
                        return Ok(());
                    }
                }

                output::print_state(controller.state(), &toggles);
            }
        }
    }
}

/// Map an inquire result to `None` when the user cancelled the prompt.
fn prompt<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Interactive prompt failed"),
    }
}
