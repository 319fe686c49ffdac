//! Network addressing subsystem.
//!
//! # Data Flow
//! ```text
//! "host:port" text
//!     → address.rs (HostPort::parse, syntax only)
//!     → resolver.rs (local IP lookup, only for loopback aliases)
//!     → Address (normalized, immutable)
//! ```
//!
//! # Design Decisions
//! - Parsing never performs I/O; resolution is an explicit second step
//! - Resolution failures propagate to the caller unchanged

pub mod address;
pub mod resolver;

pub use address::{is_loopback_alias, Address, AddressError, HostPort, NULL_ADDRESS};
pub use resolver::{HostResolver, ResolveError, StaticResolver, SystemResolver};
