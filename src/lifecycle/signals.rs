//! OS signal handling.
//!
//! # Responsibilities
//! - Keep one shutdown callback per signal kind (SIGINT, SIGTERM)
//! - Listen for OS signals and forward each one to the registered callback
//!
//! # Design Decisions
//! - Dispatch goes through [`SignalDispatcher`] so tests can deliver signals
//!   without touching the process
//! - Last registration wins; there is no unregister
//! - Uses Tokio's signal handling on a dedicated thread, so callbacks never
//!   run on the registering thread

use std::fmt;
use std::io;
use std::sync::{Arc, OnceLock};
use std::thread;

use arc_swap::ArcSwapOption;

/// Callback invoked when a shutdown signal is delivered.
pub type ShutdownCallback = Arc<dyn Fn() + Send + Sync>;

/// Signals that request the process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// SIGINT (Ctrl-C).
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl SignalKind {
    pub const ALL: [SignalKind; 2] = [SignalKind::Interrupt, SignalKind::Terminate];

    fn slot(self) -> usize {
        match self {
            SignalKind::Interrupt => 0,
            SignalKind::Terminate => 1,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Interrupt => f.write_str("SIGINT"),
            SignalKind::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Routes delivered signals to registered callbacks.
pub trait SignalDispatcher: Send + Sync {
    /// Replace the callback for `kind`.
    fn register(&self, kind: SignalKind, callback: ShutdownCallback);

    /// Invoke the callback registered for `kind` once.
    /// Returns false when nothing is registered.
    fn deliver(&self, kind: SignalKind) -> bool;

    /// Register one callback for every shutdown signal.
    fn register_shutdown(&self, callback: ShutdownCallback) {
        for kind in SignalKind::ALL {
            self.register(kind, Arc::clone(&callback));
        }
    }
}

/// Lock-free callback table, one slot per [`SignalKind`].
#[derive(Default)]
pub struct SignalRegistry {
    slots: [ArcSwapOption<ShutdownCallback>; 2],
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a callback is registered for `kind`.
    pub fn is_registered(&self, kind: SignalKind) -> bool {
        self.slots[kind.slot()].load().is_some()
    }
}

impl SignalDispatcher for SignalRegistry {
    fn register(&self, kind: SignalKind, callback: ShutdownCallback) {
        self.slots[kind.slot()].store(Some(Arc::new(callback)));
    }

    fn deliver(&self, kind: SignalKind) -> bool {
        match self.slots[kind.slot()].load_full() {
            Some(callback) => {
                (**callback)();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SignalRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalRegistry")
            .field("interrupt", &self.is_registered(SignalKind::Interrupt))
            .field("terminate", &self.is_registered(SignalKind::Terminate))
            .finish()
    }
}

static GLOBAL: OnceLock<Arc<SignalRegistry>> = OnceLock::new();
static OS_LISTENER: OnceLock<bool> = OnceLock::new();

/// The process-wide registry fed by the OS listener.
pub fn global() -> Arc<SignalRegistry> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(SignalRegistry::new())))
}

/// Run `callback` whenever the process receives SIGINT or SIGTERM.
///
/// Replaces any callback registered earlier. The callback runs on the
/// signal listener thread. Never blocks.
pub fn on_shutdown<F>(callback: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let registry = global();
    registry.register_shutdown(Arc::new(callback));

    OS_LISTENER.get_or_init(|| match install_os_handlers(registry) {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install OS signal handlers");
            false
        }
    });
}

/// Start forwarding OS signals to `dispatcher`.
///
/// Signal streams are registered before this returns; delivery happens on a
/// dedicated thread running a current-thread Tokio runtime.
pub fn install_os_handlers(
    dispatcher: Arc<dyn SignalDispatcher>,
) -> io::Result<thread::JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let streams = {
        let _guard = runtime.enter();
        OsSignals::register()?
    };

    thread::Builder::new()
        .name("nodekit-signals".to_string())
        .spawn(move || runtime.block_on(streams.forward(dispatcher)))
}

fn dispatch(dispatcher: &dyn SignalDispatcher, kind: SignalKind) {
    tracing::info!(signal = %kind, "Signal received");
    if !dispatcher.deliver(kind) {
        tracing::warn!(signal = %kind, "No shutdown callback registered");
    }
}

#[cfg(unix)]
struct OsSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind as OsKind};

        Ok(Self {
            interrupt: signal(OsKind::interrupt())?,
            terminate: signal(OsKind::terminate())?,
        })
    }

    async fn forward(mut self, dispatcher: Arc<dyn SignalDispatcher>) {
        loop {
            let kind = tokio::select! {
                Some(()) = self.interrupt.recv() => SignalKind::Interrupt,
                Some(()) = self.terminate.recv() => SignalKind::Terminate,
                else => break,
            };
            dispatch(dispatcher.as_ref(), kind);
        }
    }
}

#[cfg(windows)]
struct OsSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
    ctrl_break: tokio::signal::windows::CtrlBreak,
    ctrl_close: tokio::signal::windows::CtrlClose,
    ctrl_shutdown: tokio::signal::windows::CtrlShutdown,
}

#[cfg(windows)]
impl OsSignals {
    fn register() -> io::Result<Self> {
        use tokio::signal::windows;

        Ok(Self {
            ctrl_c: windows::ctrl_c()?,
            ctrl_break: windows::ctrl_break()?,
            ctrl_close: windows::ctrl_close()?,
            ctrl_shutdown: windows::ctrl_shutdown()?,
        })
    }

    async fn forward(mut self, dispatcher: Arc<dyn SignalDispatcher>) {
        loop {
            // Console close and system shutdown are the terminate requests on Windows.
            let kind = tokio::select! {
                Some(()) = self.ctrl_c.recv() => SignalKind::Interrupt,
                Some(()) = self.ctrl_break.recv() => SignalKind::Interrupt,
                Some(()) = self.ctrl_close.recv() => SignalKind::Terminate,
                Some(()) = self.ctrl_shutdown.recv() => SignalKind::Terminate,
                else => break,
            };
            dispatch(dispatcher.as_ref(), kind);
        }
    }
}

#[cfg(not(any(unix, windows)))]
struct OsSignals;

#[cfg(not(any(unix, windows)))]
impl OsSignals {
    fn register() -> io::Result<Self> {
        Ok(Self)
    }

    async fn forward(self, dispatcher: Arc<dyn SignalDispatcher>) {
        while tokio::signal::ctrl_c().await.is_ok() {
            dispatch(dispatcher.as_ref(), SignalKind::Interrupt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, ShutdownCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let callback: ShutdownCallback = Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, callback)
    }

    #[test]
    fn deliver_without_registration() {
        let registry = SignalRegistry::new();
        assert!(!registry.deliver(SignalKind::Interrupt));
        assert!(!registry.is_registered(SignalKind::Terminate));
    }

    #[test]
    fn kinds_have_separate_slots() {
        let registry = SignalRegistry::new();
        let (count, cb) = counter();
        registry.register(SignalKind::Terminate, cb);

        assert!(!registry.deliver(SignalKind::Interrupt));
        assert!(registry.deliver(SignalKind::Terminate));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn register_shutdown_covers_both_kinds() {
        let registry = SignalRegistry::new();
        let (count, cb) = counter();
        registry.register_shutdown(cb);

        registry.deliver(SignalKind::Interrupt);
        registry.deliver(SignalKind::Terminate);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn os_streams_register_inside_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();
        assert!(OsSignals::register().is_ok());
    }

    #[test]
    fn signal_names() {
        assert_eq!(SignalKind::Interrupt.to_string(), "SIGINT");
        assert_eq!(SignalKind::Terminate.to_string(), "SIGTERM");
    }
}
