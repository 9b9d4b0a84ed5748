use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use safetrace_crypto::{KeyPolicy, KeySource, ReadinessFinding};
use safetrace_server::{ConfigError, ServerConfig};

fn parse(args: &[&str]) -> ServerConfig {
    let mut argv = vec!["safetrace-server"];
    argv.extend_from_slice(args);
    ServerConfig::try_parse_from(argv).unwrap()
}

#[test]
fn explicit_flags_are_applied() {
    let config = parse(&[
        "--port",
        "9000",
        "--bind",
        "127.0.0.1",
        "--store-url",
        ":memory:",
        "--store-timeout-secs",
        "3",
        "--strict-keys",
    ]);
    assert_eq!(
        config.socket_addr(),
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9000)
    );
    assert_eq!(config.store_url, ":memory:");
    assert_eq!(config.store_deadline(), Duration::from_secs(3));
    assert_eq!(config.key_policy(), KeyPolicy::Strict);
}

#[test]
fn invalid_port_is_rejected() {
    assert!(ServerConfig::try_parse_from(["safetrace-server", "--port", "http"]).is_err());
}

#[test]
fn configured_key_builds_provider() {
    let key = "k".repeat(32);
    let config = parse(&["--encryption-key", key.as_str()]);
    let keys = config.key_provider().unwrap();
    assert_eq!(keys.source(), KeySource::Configured);
    assert!(config.check_readiness(&keys).unwrap().is_empty());
}

#[test]
fn strict_policy_rejects_short_key_at_startup() {
    let config = parse(&["--encryption-key", "short", "--strict-keys"]);
    assert!(matches!(
        config.key_provider(),
        Err(ConfigError::InvalidKey(_))
    ));
}

#[test]
fn reshaped_key_is_a_finding() {
    let config = parse(&["--encryption-key", "0123456789"]);
    let keys = config.key_provider().unwrap();
    assert_eq!(
        config.check_readiness(&keys).unwrap(),
        vec![ReadinessFinding::KeyReshaped { actual: 10 }]
    );
}

#[test]
fn production_mode_refuses_open_findings() {
    let config = parse(&["--encryption-key", "0123456789", "--production"]);
    let keys = config.key_provider().unwrap();
    let err = config.check_readiness(&keys).unwrap_err();
    assert!(matches!(err, ConfigError::NotProductionReady(ref f) if f.len() == 1));
    assert!(err.to_string().contains("10"));
}
