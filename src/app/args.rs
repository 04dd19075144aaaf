//! Command-line arguments for the pipeline simulation

use crate::app::simulation::SimulationSettings;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tunnelq::queue::ConfigError;

#[derive(Parser, Debug, Clone)]
#[command(name = "tunnelq")]
#[command(about = "Drive the tunnel pipeline queues with a simulated packet flow")]
#[command(version = tunnelq::core::version::long_version())]
pub struct Args {
    /// Number of producer tasks feeding the outbound queue
    #[arg(short = 'P', long = "producers", value_name = "N", default_value_t = 4)]
    pub producers: usize,

    /// Number of worker tasks draining the outbound queue
    #[arg(short = 'C', long = "consumers", value_name = "N", default_value_t = 2)]
    pub consumers: usize,

    /// Packets sent by each producer
    #[arg(short = 'n', long = "packets", value_name = "N", default_value_t = 1000)]
    pub packets: usize,

    /// Queue configuration file (TOML)
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        value_parser = ["trace", "debug", "info", "warn", "error", "off"]
    )]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(
        short = 'o',
        long = "log-format",
        value_name = "FORMAT",
        value_parser = ["text", "ext", "json"]
    )]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Colour when forced, or when stderr is a terminal and not disabled
    pub fn use_color(&self) -> bool {
        !self.no_color && (self.color || std::io::stderr().is_terminal())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("producers", self.producers),
            ("consumers", self.consumers),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("--{} must be at least 1", field),
                });
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            producers: self.producers,
            consumers: self.consumers,
            packets_per_producer: self.packets,
        }
    }
}
