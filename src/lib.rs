//! Node addressing and process lifecycle helpers for distributed services.
//!
//! - [`net`]: `host:port` addresses with loopback-to-routable-IP normalization
//! - [`lifecycle`]: shutdown callbacks for SIGINT/SIGTERM and cooperative
//!   interruption checks
//! - [`config`]: TOML node configuration
//! - [`observability`]: logging setup

pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::NodeConfig;
pub use lifecycle::{check_interrupted, on_shutdown, Interrupted, Shutdown};
pub use net::{Address, AddressError, HostPort, NULL_ADDRESS};
