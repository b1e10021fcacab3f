//! This module governs the command line application: configuration, tracing and the calculations it runs
mod calculations;
mod configuration;
mod error;
mod telemetry;

pub(crate) use configuration::Configuration;
pub(crate) use error::AppError;

use clap::{ArgEnum, Parser};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Directory receiving the structured log
const LOG_DIRECTORY: &str = "results";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// Where to write the results, standard output when omitted
    output: Option<PathBuf>,
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
    #[clap(arg_enum, short, long)]
    calculation: Calculation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Info,
    Debug,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level = match self {
            Self::Trace => "trace",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Error => "error",
        };
        write!(f, "{}", level)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
pub(crate) enum Calculation {
    Dos,
    Pdos,
    Velocity,
    SpinMoment,
    Wavefunction,
}

/// Parse the command line, solve the configured model and write the requested quantity
pub fn run() -> color_eyre::Result<()> {
    let cli = App::parse();

    let directory = Path::new(LOG_DIRECTORY);
    std::fs::create_dir_all(directory).map_err(AppError::from)?;
    let (subscriber, _guard) = telemetry::get_subscriber(cli.log_level, directory);
    telemetry::init_subscriber(subscriber)?;

    let config = Configuration::build()?;
    tracing::info!(calculation = ?cli.calculation, spin = %config.model.spin, "building model");
    let model = config.model.build().map_err(AppError::from)?;

    let table =
        calculations::calculate(&model, &config, cli.calculation).map_err(AppError::from)?;

    match cli.output {
        Some(path) => {
            std::fs::write(&path, table.to_string()).map_err(AppError::from)?;
            tracing::info!(path = %path.display(), "results written");
        }
        None => console::Term::stdout()
            .write_str(&table.to_string())
            .map_err(AppError::from)?,
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::{App, Calculation, LogLevel};
    use clap::Parser;

    #[test]
    fn calculations_are_parsed_in_kebab_case() {
        let app = App::try_parse_from(["electron-post", "out.dat", "-c", "spin-moment"]).unwrap();
        assert_eq!(app.calculation, Calculation::SpinMoment);
        assert_eq!(app.log_level, LogLevel::Info);
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert!(App::try_parse_from(["electron-post", "-c", "bands"]).is_err());
    }
}
