//! Configuration validation.
//!
//! # Responsibilities
//! - Check that every address is well-formed `host:port`
//! - Validate value ranges (ports fit in 16 bits)
//! - Detect duplicate seeds
//! - Check resolver settings are literal IPs / socket addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NodeConfig → Result<(), Vec<ValidationError>>
//! - No name resolution happens here

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::NodeConfig;
use crate::net::address::{is_loopback_alias, AddressError, HostPort};

/// A single semantic problem in a config.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {source}")]
    Address {
        field: String,
        #[source]
        source: AddressError,
    },

    #[error("{field}: port {port} out of range 0-65535")]
    PortRange { field: String, port: i32 },

    #[error("node.seeds: duplicate seed {0}")]
    DuplicateSeed(String),

    #[error("resolver.probe_address: {0:?} is not a socket address")]
    ProbeAddress(String),

    #[error("resolver.static_ip: {0:?} is not an IP address")]
    StaticIp(String),
}

/// Validate a parsed config, collecting every problem.
pub fn validate_config(config: &NodeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("node.address", &config.node.address, &mut errors);

    let mut seen = HashSet::new();
    for (i, seed) in config.node.seeds.iter().enumerate() {
        let field = format!("node.seeds[{i}]");
        if let Some(pair) = check_address(&field, seed, &mut errors) {
            if !seen.insert(seed_key(pair)) {
                errors.push(ValidationError::DuplicateSeed(seed.clone()));
            }
        }
    }

    if let Err(e) = check_probe_address(&config.resolver.probe_address) {
        errors.push(e);
    }

    if let Some(ip) = &config.resolver.static_ip {
        if let Err(e) = check_static_ip(ip) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Loopback aliases all normalize to the same host, so they share one key.
fn seed_key(pair: HostPort) -> (Option<String>, i32) {
    let host = (!is_loopback_alias(&pair.host)).then_some(pair.host);
    (host, pair.port)
}

pub(crate) fn check_probe_address(text: &str) -> Result<SocketAddr, ValidationError> {
    text.parse()
        .map_err(|_| ValidationError::ProbeAddress(text.to_string()))
}

pub(crate) fn check_static_ip(text: &str) -> Result<IpAddr, ValidationError> {
    text.parse()
        .map_err(|_| ValidationError::StaticIp(text.to_string()))
}

fn check_address(field: &str, text: &str, errors: &mut Vec<ValidationError>) -> Option<HostPort> {
    match HostPort::parse(text) {
        Ok(pair) if u16::try_from(pair.port).is_err() => {
            errors.push(ValidationError::PortRange {
                field: field.to_string(),
                port: pair.port,
            });
            None
        }
        Ok(pair) => Some(pair),
        Err(source) => {
            errors.push(ValidationError::Address {
                field: field.to_string(),
                source,
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&NodeConfig::default()).is_ok());
    }

    #[test]
    fn loopback_seeds_are_duplicates() {
        let mut config = NodeConfig::default();
        config.node.seeds = vec![
            "localhost:1".into(),
            "127.0.0.1:1".into(),
            "127.0.1.1:1".into(),
            "localhost:2".into(),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], ValidationError::DuplicateSeed(s) if s == "127.0.0.1:1"));
        assert!(matches!(&errors[1], ValidationError::DuplicateSeed(s) if s == "127.0.1.1:1"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = NodeConfig::default();
        config.node.address = "noport".into();
        config.node.seeds = vec!["a:1".into(), "a:1".into(), "b:70000".into()];
        config.resolver.probe_address = "nowhere".into();
        config.resolver.static_ip = Some("not-an-ip".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(matches!(errors[0], ValidationError::Address { .. }));
        assert!(matches!(errors[1], ValidationError::DuplicateSeed(_)));
        assert!(matches!(errors[2], ValidationError::PortRange { port: 70000, .. }));
        assert!(matches!(errors[3], ValidationError::ProbeAddress(_)));
        assert!(matches!(errors[4], ValidationError::StaticIp(_)));
    }
}
