use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::config::{Config, ConfigError};

fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    Config::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn test_config_defaults() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(config.port, 4001);
    assert_eq!(config.content_dir, PathBuf::from("content"));
    assert_eq!(config.upload_dir, PathBuf::from("public/uploads"));
    assert_eq!(config.database_url, None);
    assert_eq!(config.admin_key, None);
    assert!(config.cookie_secure);
}

#[test]
fn test_bulletin_port_wins_over_legacy_port() {
    let config = config_from(&[("PORT", "3000"), ("BULLETIN_PORT", "8080")]).unwrap();
    assert_eq!(config.port, 8080);

    let legacy = config_from(&[("PORT", "3000")]).unwrap();
    assert_eq!(legacy.port, 3000);
}

#[test]
fn test_database_url_falls_back_to_postgres_url() {
    let config = config_from(&[("POSTGRES_URL", "postgres://db/bulletin")]).unwrap();
    assert_eq!(config.database_url.as_deref(), Some("postgres://db/bulletin"));

    let blank = config_from(&[("DATABASE_URL", "  ")]).unwrap();
    assert_eq!(blank.database_url, None);
}

#[test]
fn test_access_settings() {
    let config = config_from(&[
        ("ACCESS_ADMIN_KEY", "letmein"),
        ("BULLETIN_COOKIE_SECURE", "false"),
    ])
    .unwrap();

    assert_eq!(config.admin_key.as_deref(), Some("letmein"));
    assert!(!config.cookie_secure);

    let invalid = config_from(&[("BULLETIN_COOKIE_SECURE", "maybe")]);
    assert!(matches!(invalid, Err(ConfigError::InvalidFlag { .. })));
}

#[test]
fn test_config_port_zero() {
    let result = config_from(&[("BULLETIN_PORT", "0")]);
    assert!(matches!(result, Err(ConfigError::PortOutOfRange(0))));
}

#[test]
fn test_invalid_host() {
    let result = config_from(&[("BULLETIN_HOST", "localhost:80")]);
    assert!(matches!(result, Err(ConfigError::InvalidHost(_))));
}

#[rstest]
#[case("1", 1)]
#[case("80", 80)]
#[case("4001", 4001)]
#[case("65535", 65535)]
fn test_valid_port_numbers(#[case] port_str: &str, #[case] expected: u16) {
    let config = config_from(&[("BULLETIN_PORT", port_str)]).unwrap();
    assert_eq!(config.port, expected);
}

#[rstest]
#[case("-1")]
#[case("65536")]
#[case("1.5")]
#[case("0x1234")]
fn test_invalid_port_formats(#[case] port_str: &str) {
    let result = config_from(&[("BULLETIN_PORT", port_str)]);
    assert!(matches!(result, Err(ConfigError::InvalidPort(_))));
}

#[test]
fn test_socket_addr() {
    let config = config_from(&[("BULLETIN_HOST", "0.0.0.0"), ("BULLETIN_PORT", "9000")]).unwrap();
    assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
}

#[test]
fn test_config_error_display() {
    let error = ConfigError::PortOutOfRange(0);
    assert_eq!(error.to_string(), "Port 0 is out of valid range (1-65535)");
}
