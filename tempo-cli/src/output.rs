//! Terminal presentation of the dashboard state.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use tempo_core::{
    City, RegionKind, RenderedDashboard, SessionState,
    dashboard::{FailureKind, RegionOutput},
    render::{FOOTER, render_hour_table, render_raw_json},
};

/// Display-only switches; flipping one never triggers a fetch.
#[derive(Debug, Default)]
pub struct Toggles {
    pub raw_current: bool,
    pub raw_forecast: bool,
    expanded_days: BTreeSet<NaiveDate>,
}

impl Toggles {
    pub fn toggle_hours(&mut self, date: NaiveDate) {
        if !self.expanded_days.remove(&date) {
            self.expanded_days.insert(date);
        }
    }

    pub fn clear_hours(&mut self) {
        self.expanded_days.clear();
    }

    fn shows_hours(&self, date: &NaiveDate) -> bool {
        self.expanded_days.contains(date)
    }
}

pub fn print_title() {
    println!("🌤️ Previsão do Tempo - Portugal");
    println!();
}

pub fn print_sidebar(city: &City, days: u8) {
    println!(
        "Cidade: {} | Coordenadas: {}, {} | Dias de previsão: {days}",
        city.name, city.latitude, city.longitude
    );
}

pub fn print_warning(msg: &str) {
    eprintln!("⚠️ {msg}");
}

pub fn print_footer() {
    println!();
    println!("{}", "─".repeat(60));
    println!("{FOOTER}");
}

pub fn print_state(state: &SessionState, toggles: &Toggles) {
    match state {
        SessionState::Rendered(dash) => print_dashboard(dash, toggles),
        SessionState::Failed(notice) => {
            let icon = match notice.kind {
                FailureKind::Connectivity => "📡",
                FailureKind::Unexpected => "❌",
            };
            eprintln!("{icon} {}", notice.message);
        }
        SessionState::Idle | SessionState::Fetching(_) => {}
    }
}

fn print_dashboard(dash: &RenderedDashboard, toggles: &Toggles) {
    for region in &dash.regions {
        print_region(region);

        match region.kind {
            RegionKind::Current if toggles.raw_current => {
                print_raw("Dados brutos da API (atual)", &dash.view.raw_current.body);
            }
            RegionKind::Forecast => {
                for day in dash.view.forecast.iter().filter(|d| toggles.shows_hours(&d.date)) {
                    println!();
                    println!("{}", render_hour_table(day));
                }
                if toggles.raw_forecast {
                    print_raw("Dados brutos da API (previsão)", &dash.view.raw_forecast.body);
                }
            }
            _ => {}
        }
    }
}

fn print_region(region: &RegionOutput) {
    println!();
    println!("{}", region.title);
    println!("{}", "═".repeat(region.title.chars().count()));
    match &region.body {
        Ok(text) => println!("{text}"),
        Err(msg) => eprintln!("❌ {msg}"),
    }
}

fn print_raw(title: &str, body: &serde_json::Value) {
    println!();
    println!("{title}");
    match render_raw_json(body) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("❌ {}", err.user_message()),
    }
}
