//! Configuration and CLI argument handling

use crate::network::DEFAULT_PORT;
use crate::timer::parse_duration;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pico-timer")]
#[command(about = "Countdown timer control panel for a remote WebSocket device")]
#[command(version)]
pub struct Config {
    /// Device address pre-filled in the address field
    #[arg(short, long, default_value = "192.168.10.105")]
    pub address: String,

    /// WebSocket port on the device
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Initial countdown in seconds (1-3600)
    #[arg(short, long, default_value = "60")]
    pub duration: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Initial duration, with the same fallback rules as the input field
    pub fn duration_secs(&self) -> f64 {
        parse_duration(&self.duration)
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
    fn defaults_match_the_device() {
        let config = Config::try_parse_from(["pico-timer"]).unwrap();
        assert_eq!(config.address, "192.168.10.105");
        assert_eq!(config.port, 8080);
        assert_eq!(config.duration_secs(), 60.0);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn duration_uses_input_rules() {
        let config = Config::try_parse_from(["pico-timer", "--duration", "soon", "-v"]).unwrap();
        assert_eq!(config.duration_secs(), 60.0);
        assert_eq!(config.log_level(), "debug");

        let config = Config::try_parse_from(["pico-timer", "-d", "90.25", "-a", "10.0.0.7"]).unwrap();
        assert_eq!(config.duration_secs(), 90.3);
        assert_eq!(config.address, "10.0.0.7");
    }
}
