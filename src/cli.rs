use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use double_pendulum::Method;

pub const DEFAULT_CONFIG: &str = "config/default.toml";

/// Command line options for the double pendulum viewer.
#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive double pendulum simulator")]
pub struct CliOptions {
    /// Path to the simulation TOML configuration file.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the integration method configured in the TOML file.
    #[arg(long, value_enum)]
    pub method: Option<MethodOverride>,

    /// Override the number of ticks simulated per frame.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub speed: Option<u32>,

    /// Start the simulation immediately instead of stopped.
    #[arg(long)]
    pub run: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Integration methods exposed on the CLI.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum MethodOverride {
    #[value(alias = "fe")]
    ForwardEuler,
    #[value(alias = "be")]
    BackwardEuler,
    Rk4,
}

impl From<MethodOverride> for Method {
    fn from(value: MethodOverride) -> Self {
        match value {
            MethodOverride::ForwardEuler => Method::ForwardEuler,
            MethodOverride::BackwardEuler => Method::BackwardEuler,
            MethodOverride::Rk4 => Method::RungeKutta4,
        }
    }
}

impl CliOptions {
    pub fn uses_default_config(&self) -> bool {
        self.config == PathBuf::from(DEFAULT_CONFIG)
    }
}
