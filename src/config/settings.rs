//! Runtime settings

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::{
    config::CliArgs,
    core::{auto_connect::AutoConnectPolicy, regdb, service::LinkConfig},
};

/// Rejected command-line configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown country code {0}; known codes: {1}")]
    UnknownCountry(String, String),

    #[error("Invalid socket mode {0}: expected octal permissions")]
    InvalidSocketMode(String),

    #[error("Auto-connect needs at least one attempt")]
    NoAttempts,
}

/// Runtime configuration settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub link: LinkConfig,
    pub store_path: PathBuf,
    pub enable_unix_socket: bool,
    pub socket_path: String,
    pub socket_mode: u32,
    pub sim_networks: Option<PathBuf>,
}

impl TryFrom<CliArgs> for Settings {
    type Error = SettingsError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if regdb::lookup(&args.country).is_none() {
            let known: Vec<&str> = regdb::country_codes().collect();
            return Err(SettingsError::UnknownCountry(args.country, known.join(", ")));
        }

        let socket_mode = u32::from_str_radix(&args.socket_mode, 8)
            .ok()
            .filter(|mode| *mode <= 0o777)
            .ok_or_else(|| SettingsError::InvalidSocketMode(args.socket_mode.clone()))?;

        if !args.no_auto_connect && args.auto_connect_attempts == 0 {
            return Err(SettingsError::NoAttempts);
        }

        let policy = AutoConnectPolicy {
            max_attempts: args.auto_connect_attempts,
            attempt_timeout: Duration::from_millis(args.auto_connect_timeout_ms),
            retry_delay: Duration::from_millis(args.auto_connect_delay_ms),
        };

        Ok(Settings {
            link: LinkConfig {
                country_code: args.country,
                auto_connect: (!args.no_auto_connect).then_some(policy),
                pending_timeout: policy.attempt_timeout,
            },
            store_path: args.store_path,
            enable_unix_socket: args.enable_unix_socket,
            socket_path: args.socket_path,
            socket_mode,
            sim_networks: args.sim_networks,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["halow-link-manager"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::try_from(parse(&[])).unwrap();

        assert_eq!(settings.link, LinkConfig::default());
        assert_eq!(
            settings.store_path,
            PathBuf::from("/var/lib/halow/credentials.json")
        );
        assert_eq!(settings.socket_mode, 0o660);
        assert!(!settings.enable_unix_socket);
        assert_eq!(settings.sim_networks, None);
    }

    #[test]
    fn test_custom_policy() {
        let settings = Settings::try_from(parse(&[
            "--country",
            "AU",
            "--auto-connect-attempts",
            "5",
            "--auto-connect-timeout-ms",
            "1000",
            "--auto-connect-delay-ms",
            "250",
        ]))
        .unwrap();

        assert_eq!(settings.link.country_code, "AU");
        assert_eq!(
            settings.link.auto_connect,
            Some(AutoConnectPolicy {
                max_attempts: 5,
                attempt_timeout: Duration::from_millis(1000),
                retry_delay: Duration::from_millis(250),
            })
        );
        assert_eq!(settings.link.pending_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_auto_connect_disabled() {
        let settings = Settings::try_from(parse(&["--no-auto-connect"])).unwrap();
        assert_eq!(settings.link.auto_connect, None);
    }

    #[test]
    fn test_unknown_country_rejected() {
        let err = Settings::try_from(parse(&["--country", "XX"])).unwrap_err();
        assert!(matches!(err, SettingsError::UnknownCountry(ref c, _) if c == "XX"));
        assert!(err.to_string().contains("US"));
    }

    #[test]
    fn test_invalid_socket_mode_rejected() {
        assert_eq!(
            Settings::try_from(parse(&["--socket-mode", "999"])).unwrap_err(),
            SettingsError::InvalidSocketMode("999".into())
        );
        assert!(Settings::try_from(parse(&["--socket-mode", "1777"])).is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert_eq!(
            Settings::try_from(parse(&["--auto-connect-attempts", "0"])).unwrap_err(),
            SettingsError::NoAttempts
        );
    }
}
