//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::state::{MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "health-reminders")]
#[command(about = "Eye-rest and hydration reminders that survive restarts")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File holding enabled flags, intervals and deadlines between runs
    #[arg(short, long, default_value = "health-reminders.json")]
    pub state_file: PathBuf,

    /// Hydration interval in minutes used until one is configured
    #[arg(
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u32).range(MIN_INTERVAL_MINUTES as i64..=MAX_INTERVAL_MINUTES as i64)
    )]
    pub hydration_minutes: u32,

    /// Deliver reminders as in-app toasts only
    #[arg(long)]
    pub no_desktop_notifications: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["health-reminders"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.hydration_minutes, 30);
        assert_eq!(config.log_level(), "info");
        assert!(!config.no_desktop_notifications);
    }

    #[test]
    fn rejects_out_of_range_hydration_interval() {
        assert!(Config::try_parse_from(["health-reminders", "--hydration-minutes", "0"]).is_err());
        let config =
            Config::try_parse_from(["health-reminders", "--hydration-minutes", "45", "-v"]).unwrap();
        assert_eq!(config.hydration_minutes, 45);
        assert_eq!(config.log_level(), "debug");
    }
}
