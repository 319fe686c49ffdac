//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → listener thread → SignalDispatcher → shutdown callback
//!
//! Shutdown (shutdown.rs):
//!     callback → broadcast → async tasks stop
//!
//! Interrupt (interrupt.rs):
//!     InterruptFlag::interrupt() → check_interrupted() in long-running work
//! ```
//!
//! # Design Decisions
//! - One callback per signal kind, last registration wins
//! - Interruption is cooperative; nothing is preempted

pub mod interrupt;
pub mod shutdown;
pub mod signals;

pub use interrupt::{check_interrupted, InterruptFlag, Interrupted};
pub use shutdown::Shutdown;
pub use signals::{on_shutdown, SignalDispatcher, SignalKind, SignalRegistry};
