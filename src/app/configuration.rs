use super::AppError;
use crate::{model::ChainParameters, Distribution, Gauge};
use config::{Config, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize)]
pub(crate) struct Configuration {
    pub(crate) model: ChainParameters,
    pub(crate) spectral: SpectralConfiguration,
    pub(crate) distribution: Distribution,
    pub(crate) states: StatesConfiguration,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpectralConfiguration {
    pub(crate) minimum_energy: f64,
    pub(crate) maximum_energy: f64,
    pub(crate) number_of_energy_points: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatesConfiguration {
    pub(crate) kpoint: [f64; 3],
    #[serde(default)]
    pub(crate) gauge: Gauge,
    pub(crate) degeneracy_tolerance: f64,
    pub(crate) grid_shape: [usize; 3],
    #[serde(default)]
    pub(crate) spinor: usize,
}

impl Configuration {
    pub(crate) fn build() -> Result<Self, AppError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // The defaults shipped with the binary
            .add_source(File::with_name(".config/default"))
            // Optional overrides for the current run mode
            .add_source(File::with_name(&format!(".config/{}", run_mode)).required(false))
            .build()?;

        Ok(s.try_deserialize()?)
    }
}

#[cfg(test)]
mod test {
    use super::Configuration;
    use crate::{Distribution, Gauge, Spin};
    use config::{Config, File, FileFormat};

    const CONFIG: &str = r#"
        [model]
        lattice_constant = 2.5
        number_of_atoms = 1
        onsite_energy = 0.0
        hopping_energy = -1.0
        spin = "nc"
        orbital_radius = 2.0
        slater_exponent = 1.2

        [spectral]
        minimum_energy = -3.0
        maximum_energy = 3.0
        number_of_energy_points = 11

        [distribution]
        name = "lorentzian"
        gamma = 0.1

        [states]
        kpoint = [0.0, 0.0, 0.0]
        gauge = "orbital"
        degeneracy_tolerance = 1e-4
        grid_shape = [8, 8, 8]
    "#;

    #[test]
    fn configurations_deserialize_from_toml() {
        let configuration: Configuration = Config::builder()
            .add_source(File::from_str(CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(configuration.model.spin, Spin::NonCollinear);
        assert_eq!(configuration.model.hopping_overlap, 0.);
        assert_eq!(configuration.states.gauge, Gauge::Orbital);
        assert_eq!(configuration.states.spinor, 0);
        assert!(matches!(
            configuration.distribution,
            Distribution::Lorentzian { .. }
        ));
    }
}
