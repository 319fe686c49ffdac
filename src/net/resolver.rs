//! Local IP resolution.
//!
//! # Responsibilities
//! - Answer "what is this machine's routable address"
//! - Keep the lookup behind a trait so address construction can be tested
//!   without touching the network
//!
//! # Design Decisions
//! - Host-name lookup first, route probe when the name doesn't resolve to a
//!   routable address
//! - No caching
//! - A loopback answer counts as a failure

use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};

use thiserror::Error;

/// Default probe target: TEST-NET-1 discard port. Connecting a UDP socket
/// only consults the routing table, nothing is sent.
pub const DEFAULT_PROBE_ADDRESS: &str = "192.0.2.1:9";

/// Errors raised while resolving the local IP address.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The OS lookup itself failed (no route, no network configuration).
    #[error("local host resolution failed: {0}")]
    Io(#[from] std::io::Error),

    /// The lookup succeeded but produced an address other nodes can't reach.
    #[error("local host resolved to non-routable address {0}")]
    NotRoutable(IpAddr),
}

/// Source of the machine's local IP address.
pub trait HostResolver: Send + Sync {
    /// Resolve the local IP address.
    fn local_ip(&self) -> Result<IpAddr, ResolveError>;
}

/// Resolver backed by the machine's host name, falling back to the
/// operating system's routing table.
#[derive(Debug, Clone, Copy)]
pub struct SystemResolver {
    probe: SocketAddr,
}

impl SystemResolver {
    /// Create a resolver that probes the route towards `probe`.
    pub fn new(probe: SocketAddr) -> Self {
        Self { probe }
    }

    /// The address whose route is used to pick the local interface.
    pub fn probe(&self) -> SocketAddr {
        self.probe
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        let probe = DEFAULT_PROBE_ADDRESS
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([192, 0, 2, 1], 9)));
        Self { probe }
    }
}

impl SystemResolver {
    fn host_name_ip(&self) -> Option<IpAddr> {
        let name = host_name()?;
        let resolved = (name.as_str(), 0).to_socket_addrs().ok()?;
        let ip = first_routable(resolved.map(|addr| addr.ip()))?;
        tracing::trace!(host_name = %name, local_ip = %ip, "Resolved local host name");
        Some(ip)
    }

    fn route_probe_ip(&self) -> Result<IpAddr, ResolveError> {
        let bind: SocketAddr = match self.probe {
            SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
            SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
        };

        let socket = UdpSocket::bind(bind)?;
        socket.connect(self.probe)?;
        let ip = socket.local_addr()?.ip();

        if ip.is_loopback() || ip.is_unspecified() {
            return Err(ResolveError::NotRoutable(ip));
        }

        tracing::trace!(probe = %self.probe, local_ip = %ip, "Resolved local IP by route");
        Ok(ip)
    }
}

impl HostResolver for SystemResolver {
    fn local_ip(&self) -> Result<IpAddr, ResolveError> {
        match self.host_name_ip() {
            Some(ip) => Ok(ip),
            None => self.route_probe_ip(),
        }
    }
}

fn host_name() -> Option<String> {
    let name = fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .or_else(|| env::var("HOSTNAME").ok())
        .or_else(|| env::var("COMPUTERNAME").ok())?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// First address another node could reach.
fn first_routable(ips: impl IntoIterator<Item = IpAddr>) -> Option<IpAddr> {
    ips.into_iter()
        .find(|ip| !ip.is_loopback() && !ip.is_unspecified())
}

/// Resolver that always answers with a fixed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticResolver(pub IpAddr);

impl HostResolver for StaticResolver {
    fn local_ip(&self) -> Result<IpAddr, ResolveError> {
        Ok(self.0)
    }
}

impl<R: HostResolver + ?Sized> HostResolver for Box<R> {
    fn local_ip(&self) -> Result<IpAddr, ResolveError> {
        (**self).local_ip()
    }
}
