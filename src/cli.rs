use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Default configuration file, optional when not given explicitly
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Command line arguments structure using clap derive macros
#[derive(Debug, Parser)]
#[command(name = "foliage-raytrace")]
#[command(about = "Trace signal paths from a transmitter to a receiver through reflective surfaces and foliage")]
pub struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Number of rays to cast
    #[arg(long, short = 'n', help = "Number of rays to cast (overrides config)")]
    pub rays: Option<usize>,

    /// Maximum reflections per ray
    #[arg(long, short = 'b', help = "Maximum reflections per ray (overrides config)")]
    pub bounces: Option<u32>,

    /// Seed for direction sampling
    #[arg(long, help = "Seed for direction sampling (overrides config)")]
    pub seed: Option<u64>,

    /// Output CSV path
    #[arg(short, long, help = "Output CSV path (overrides config)")]
    pub output: Option<PathBuf>,

    /// Trace on a single thread
    #[arg(long, help = "Trace on a single thread")]
    pub sequential: bool,

    /// Hide the progress bar
    #[arg(long, help = "Hide the progress bar")]
    pub no_progress: bool,
}

impl Args {
    /// True when the config path is the implicit default.
    pub fn config_is_default(&self) -> bool {
        self.config.as_os_str() == DEFAULT_CONFIG
    }
}
