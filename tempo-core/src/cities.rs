use crate::{error::DashboardError, model::City};

const CITIES: &[City] = &[
    City { name: "Montijo", latitude: 38.70, longitude: -8.97 },
    City { name: "Lisboa", latitude: 38.72, longitude: -9.14 },
    City { name: "Porto", latitude: 41.15, longitude: -8.61 },
    City { name: "Braga", latitude: 41.55, longitude: -8.42 },
    City { name: "Coimbra", latitude: 40.21, longitude: -8.42 },
    City { name: "Faro", latitude: 37.02, longitude: -7.93 },
    City { name: "Aveiro", latitude: 40.64, longitude: -8.65 },
    City { name: "Évora", latitude: 38.57, longitude: -7.91 },
    City { name: "Setúbal", latitude: 38.52, longitude: -8.89 },
    City { name: "Viseu", latitude: 40.664, longitude: -7.916 },
];

/// Fixed set of Portuguese cities offered by the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct CityRegistry {
    cities: &'static [City],
}

impl Default for CityRegistry {
    fn default() -> Self {
        Self::portugal()
    }
}

impl CityRegistry {
    pub const fn portugal() -> Self {
        Self { cities: CITIES }
    }

    /// City names in display order.
    pub fn list_cities(&self) -> Vec<&'static str> {
        self.cities.iter().map(|c| c.name).collect()
    }

    pub fn lookup(&self, name: &str) -> Result<City, DashboardError> {
        self.cities
            .iter()
            .find(|c| c.name == name)
            .copied()
            .ok_or_else(|| DashboardError::UnknownCity(name.to_string()))
    }

    /// First entry, used as the initial selection.
    pub fn default_city(&self) -> City {
        self.cities[0]
    }
}
