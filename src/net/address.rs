//! Node address value type.
//!
//! # Responsibilities
//! - Parse `host:port` text (host may itself contain colons)
//! - Replace loopback aliases with the machine's routable IP
//! - Render the canonical `host:port` form
//!
//! # Design Decisions
//! - Syntax ([`HostPort`]) and normalization ([`HostPort::resolve`]) are separate
//!   steps; [`Address::parse`] composes them
//! - The resolver is injected, [`SystemResolver`] is only the default
//! - Port range is not enforced here, only by [`Address::to_socket_addr`]

use std::borrow::Cow;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::resolver::{HostResolver, ResolveError, SystemResolver};

/// Host names that mean "this machine" and get replaced at construction.
pub const LOOPBACK_ALIASES: [&str; 3] = ["localhost", "127.0.0.1", "127.0.1.1"];

/// Sentinel meaning "no address".
pub const NULL_ADDRESS: Address = Address::NULL;

/// Errors produced while building an [`Address`].
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("host-and-port string must be present")]
    Missing,

    #[error("can't parse host-and-port string from: {input}")]
    Malformed { input: String },

    #[error("can't parse host from: {input}")]
    MissingHost { input: String },

    #[error("can't parse port from: {input}")]
    InvalidPort {
        input: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error("{address} is not a socket address")]
    NotSocketAddr { address: String },
}

impl AddressError {
    /// True for errors caused by malformed input text.
    pub fn is_invalid_format(&self) -> bool {
        matches!(
            self,
            AddressError::Missing
                | AddressError::Malformed { .. }
                | AddressError::MissingHost { .. }
                | AddressError::InvalidPort { .. }
        )
    }
}

/// Whether `host` is one of [`LOOPBACK_ALIASES`]. Exact, case-sensitive match.
pub fn is_loopback_alias(host: &str) -> bool {
    LOOPBACK_ALIASES.contains(&host)
}

/// Syntactically valid `host:port` pair, before loopback normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPort {
    pub host: String,
    pub port: i32,
}

impl HostPort {
    /// Split `text` at its trailing `:<digits>` suffix.
    ///
    /// The host is everything before the last colon that is followed only by
    /// ASCII digits, so `a:b:9090` yields host `a:b` and port `9090`.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        if text.is_empty() {
            return Err(AddressError::Missing);
        }

        let digits_start = text
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i);

        let (host, digits) = match digits_start {
            Some(start) if text[..start].ends_with(':') => (&text[..start - 1], &text[start..]),
            _ => {
                return Err(AddressError::Malformed {
                    input: text.to_string(),
                })
            }
        };

        if host.is_empty() {
            return Err(AddressError::MissingHost {
                input: text.to_string(),
            });
        }

        let port = digits
            .parse::<i32>()
            .map_err(|source| AddressError::InvalidPort {
                input: text.to_string(),
                source,
            })?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Normalize the host through `resolver` and build the final [`Address`].
    pub fn resolve(self, resolver: &dyn HostResolver) -> Result<Address, AddressError> {
        Address::with_resolver(self.host, self.port, resolver)
    }
}

/// Immutable `host:port` address of a node.
///
/// The host is never one of the [`LOOPBACK_ALIASES`], except when built
/// through [`Address::unresolved`] or `From<HostPort>`, which skip
/// normalization.
///
/// Deserialization goes through [`Address::parse`]: a loopback alias in the
/// input triggers a blocking [`SystemResolver`] lookup. Deserialize into a
/// string and use [`HostPort::parse`] to avoid it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    host: Cow<'static, str>,
    port: i32,
}

impl Address {
    pub const NULL: Address = Address {
        host: Cow::Borrowed("nullhost"),
        port: 0,
    };

    /// Build an address, resolving loopback aliases with the [`SystemResolver`].
    pub fn new(host: impl Into<String>, port: i32) -> Result<Self, AddressError> {
        Self::with_resolver(host, port, &SystemResolver::default())
    }

    /// Build an address, resolving loopback aliases with `resolver`.
    pub fn with_resolver(
        host: impl Into<String>,
        port: i32,
        resolver: &dyn HostResolver,
    ) -> Result<Self, AddressError> {
        let host = host.into();
        if !is_loopback_alias(&host) {
            return Ok(Self::unresolved(host, port));
        }

        let ip = resolver.local_ip()?;
        tracing::debug!(alias = %host, local_ip = %ip, "Replaced loopback alias");
        Ok(Self::unresolved(ip.to_string(), port))
    }

    /// Build an address verbatim, skipping loopback normalization.
    pub fn unresolved(host: impl Into<String>, port: i32) -> Self {
        Self {
            host: Cow::Owned(host.into()),
            port,
        }
    }

    /// Parse `host:port`, resolving loopback aliases with the [`SystemResolver`].
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        Self::parse_with(text, &SystemResolver::default())
    }

    /// Parse `host:port`, resolving loopback aliases with `resolver`.
    pub fn parse_with(text: &str, resolver: &dyn HostResolver) -> Result<Self, AddressError> {
        HostPort::parse(text)?.resolve(resolver)
    }

    /// Build an address from a socket address, e.g. a listener's `local_addr()`.
    /// Loopback IPs are normalized like any other loopback alias.
    pub fn from_socket_addr(
        addr: SocketAddr,
        resolver: &dyn HostResolver,
    ) -> Result<Self, AddressError> {
        Self::with_resolver(addr.ip().to_string(), i32::from(addr.port()), resolver)
    }

    /// Parse text that may be absent.
    pub fn from_optional(text: Option<&str>) -> Result<Self, AddressError> {
        match text {
            Some(text) => Self::parse(text),
            None => Err(AddressError::Missing),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> i32 {
        self.port
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Convert to a socket address when the host is an IP literal and the
    /// port fits in 16 bits. Never performs a DNS lookup.
    pub fn to_socket_addr(&self) -> Result<SocketAddr, AddressError> {
        let literal = self
            .host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.host);

        let ip = literal.parse::<IpAddr>().ok();
        let port = u16::try_from(self.port).ok();

        match (ip, port) {
            (Some(ip), Some(port)) => Ok(SocketAddr::new(ip, port)),
            _ => Err(AddressError::NotSocketAddr {
                address: self.to_string(),
            }),
        }
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl From<HostPort> for Address {
    fn from(pair: HostPort) -> Self {
        Address::unresolved(pair.host, pair.port)
    }
}
