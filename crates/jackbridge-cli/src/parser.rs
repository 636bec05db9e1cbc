//! Command-line parser.
//!
//! Every flag can also be set through the environment (and a `.env` file);
//! flags win over the environment, which wins over built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use jackbridge_axum::{CorsConfig, DEFAULT_LISTEN, ServerConfig};
use jackbridge_core::{
    BridgeSettings, DEFAULT_DEFAULTS_FILE, DEFAULT_DEPENDENTS, DEFAULT_PID_FILE,
    DEFAULT_PROBE_TIMEOUT, DEFAULT_SERVICE, DEFAULT_SERVICE_COMMAND,
};

/// Command-line interface definition for the bridge daemon.
#[derive(Debug, Parser)]
#[command(name = "jack-bridged")]
#[command(about = "Control and monitor the JACK realtime service over HTTP")]
#[command(version)]
pub struct Cli {
    /// Address to serve the HTTP API on
    #[arg(long, env = "JACKBRIDGE_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Pid file written by the service's init script
    #[arg(long, env = "JACKBRIDGE_PID_FILE", default_value = DEFAULT_PID_FILE)]
    pub pid_file: PathBuf,

    /// Name of the managed service
    #[arg(long, env = "JACKBRIDGE_SERVICE", default_value = DEFAULT_SERVICE)]
    pub service: String,

    /// Service manager front-end, run as `<command> <service> start|stop`
    #[arg(long, env = "JACKBRIDGE_SERVICE_COMMAND", default_value = DEFAULT_SERVICE_COMMAND)]
    pub service_command: String,

    /// Service restarted after a start and stopped after a stop (repeatable;
    /// an empty value disables dependents)
    #[arg(
        long = "dependent",
        env = "JACKBRIDGE_DEPENDENTS",
        value_delimiter = ',',
        default_values_t = DEFAULT_DEPENDENTS.iter().map(ToString::to_string).collect::<Vec<String>>()
    )]
    pub dependents: Vec<String>,

    /// Shell defaults file holding the service's parameters
    #[arg(long, env = "JACKBRIDGE_DEFAULTS_FILE", default_value = DEFAULT_DEFAULTS_FILE)]
    pub defaults_file: PathBuf,

    /// Liveness poll period in milliseconds
    #[arg(long, env = "JACKBRIDGE_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Upper bound for a start/stop command in seconds
    #[arg(long, env = "JACKBRIDGE_COMMAND_TIMEOUT_SECS", default_value_t = 30)]
    pub command_timeout_secs: u64,

    /// Notifications buffered per subscriber before the oldest are dropped
    #[arg(long, env = "JACKBRIDGE_EVENT_CAPACITY", default_value_t = 64)]
    pub event_capacity: usize,

    /// Origin allowed to call the API from a browser (repeatable; `*` for any)
    #[arg(long = "allow-origin", env = "JACKBRIDGE_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Bridge settings described by the arguments. Not yet validated.
    pub fn bridge_settings(&self) -> BridgeSettings {
        let poll_interval = Duration::from_millis(self.poll_interval_ms);
        BridgeSettings {
            pid_file: self.pid_file.clone(),
            service: self.service.clone(),
            service_command: self.service_command.clone(),
            dependents: self
                .dependents
                .iter()
                .map(|d| d.trim())
                .filter(|d| !d.is_empty())
                .map(ToString::to_string)
                .collect(),
            defaults_file: self.defaults_file.clone(),
            poll_interval,
            probe_timeout: DEFAULT_PROBE_TIMEOUT.min(poll_interval / 2),
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            event_capacity: self.event_capacity,
            ..BridgeSettings::default()
        }
    }

    pub fn cors(&self) -> CorsConfig {
        if self.allowed_origins.iter().any(|o| o == "*") {
            CorsConfig::AllowAll
        } else {
            CorsConfig::AllowOrigins(self.allowed_origins.clone())
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            listen: self.listen,
            bridge: self.bridge_settings(),
            cors: self.cors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use jackbridge_core::validate_settings;

    #[test]
    fn test_cli_parser_builds() {
        // Verify the CLI parser can be constructed
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["jack-bridged"]).unwrap();
        let config = cli.server_config();
        assert_eq!(config.listen.to_string(), "127.0.0.1:9877");
        assert_eq!(config.bridge, BridgeSettings::default());
        assert!(validate_settings(&config.bridge).is_ok());
        assert!(matches!(config.cors, CorsConfig::AllowOrigins(ref o) if o.is_empty()));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "jack-bridged",
            "--listen",
            "0.0.0.0:8080",
            "--service",
            "jackd",
            "--dependent",
            "a2jmidid",
            "--poll-interval-ms",
            "200",
            "--allow-origin",
            "*",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);

        let settings = cli.bridge_settings();
        assert_eq!(settings.service, "jackd");
        assert_eq!(settings.dependents, vec!["a2jmidid"]);
        assert_eq!(settings.poll_interval, Duration::from_millis(200));
        assert_eq!(settings.probe_timeout, Duration::from_millis(100));
        assert!(matches!(cli.cors(), CorsConfig::AllowAll));
    }

    #[test]
    fn test_empty_dependent_disables_dependents() {
        let cli = Cli::try_parse_from(["jack-bridged", "--dependent", ""]).unwrap();
        assert!(cli.bridge_settings().dependents.is_empty());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let cli = Cli::try_parse_from(["jack-bridged", "--poll-interval-ms", "0"]).unwrap();
        assert!(validate_settings(&cli.bridge_settings()).is_err());

        let cli = Cli::try_parse_from(["jack-bridged", "--service", "jackd; reboot"]).unwrap();
        assert!(validate_settings(&cli.bridge_settings()).is_err());

        assert!(Cli::try_parse_from(["jack-bridged", "--listen", "nowhere"]).is_err());
    }
}
