//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Addresses are kept as text here; they are parsed during validation and
//! resolved on demand, so loading a config never touches the network.

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::config::validation::{check_probe_address, check_static_ip, ValidationError};
use crate::net::address::{Address, HostPort};
use crate::net::resolver::{HostResolver, StaticResolver, SystemResolver, DEFAULT_PROBE_ADDRESS};

/// Root configuration for a node.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NodeConfig {
    /// This node's identity on the network.
    pub node: NodeSection,

    /// How loopback aliases are resolved.
    pub resolver: ResolverConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Node addressing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeSection {
    /// Address advertised to peers (e.g., "localhost:4801").
    pub address: String,

    /// Addresses of peers to contact first.
    pub seeds: Vec<String>,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            address: "localhost:4801".to_string(),
            seeds: Vec::new(),
        }
    }
}

/// Local IP resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Remote address whose route selects the local interface.
    pub probe_address: String,

    /// Fixed local IP; skips the system lookup when set.
    pub static_ip: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            probe_address: DEFAULT_PROBE_ADDRESS.to_string(),
            static_ip: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "nodekit=info".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Build the configured resolver. `static_ip` wins over the probe.
    pub fn build(&self) -> Result<Box<dyn HostResolver>, ValidationError> {
        if let Some(ip) = &self.static_ip {
            return Ok(Box::new(StaticResolver(check_static_ip(ip)?)));
        }
        let probe = check_probe_address(&self.probe_address)?;
        Ok(Box::new(SystemResolver::new(probe)))
    }
}

impl NodeConfig {
    /// Resolver built from the `[resolver]` section.
    pub fn resolver(&self) -> Result<Box<dyn HostResolver>, ConfigError> {
        self.resolver
            .build()
            .map_err(|e| ConfigError::Validation(vec![e]))
    }

    /// This node's normalized address.
    pub fn node_address(&self) -> Result<Address, ConfigError> {
        let resolver = self.resolver()?;
        Ok(Address::parse_with(&self.node.address, resolver.as_ref())?)
    }

    /// Normalized seed addresses, in configured order.
    pub fn seed_addresses(&self) -> Result<Vec<Address>, ConfigError> {
        let resolver = self.resolver()?;
        let seeds = self
            .node
            .seeds
            .iter()
            .map(|seed| HostPort::parse(seed)?.resolve(resolver.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(seeds)
    }
}
