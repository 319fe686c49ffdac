//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::NodeConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::net::address::AddressError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<NodeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<NodeConfig, ConfigError> {
    let config: NodeConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.node.address, "localhost:4801");
        assert!(config.node.seeds.is_empty());
        assert_eq!(config.logging.filter, "nodekit=info");
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        assert!(matches!(parse_config("node = ["), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = parse_config("[node]\naddress = \":1\"\nseeds = [\"x\"]\n").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "), "{message}");
        assert!(message.contains("node.address: can't parse host from: :1"), "{message}");
        assert!(message.contains("node.seeds[0]"), "{message}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
