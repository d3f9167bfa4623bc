//! Signal flags: reload and virtual-terminal switching.
//!
//! Handlers only touch atomic flags; the main loop consults them at the top
//! of each cycle. SIGHUP requests a document reload, SIGUSR1 releases the
//! virtual terminal (output suspended), SIGUSR2 acquires it again and
//! forces a redraw.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The process-wide signal flags.
#[derive(Clone, Default)]
pub struct SignalFlags {
    reload: Arc<AtomicBool>,
    suspend: Arc<AtomicBool>,
    redraw: Arc<AtomicBool>,
}

impl SignalFlags {
    /// Create unregistered flags (tests flip them by hand).
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handlers. Call once, from the binary.
    pub fn register(&self) -> std::io::Result<()> {
        signal_hook::flag::register(signal_hook::consts::SIGHUP, self.reload.clone())?;
        let suspend = self.suspend.clone();
        // SAFETY: the handlers only store into atomics.
        unsafe {
            signal_hook::low_level::register(signal_hook::consts::SIGUSR1, move || {
                suspend.store(true, Ordering::SeqCst);
            })?;
        }
        let suspend = self.suspend.clone();
        let redraw = self.redraw.clone();
        unsafe {
            signal_hook::low_level::register(signal_hook::consts::SIGUSR2, move || {
                suspend.store(false, Ordering::SeqCst);
                redraw.store(true, Ordering::SeqCst);
            })?;
        }
        Ok(())
    }

    /// Consume a pending reload request.
    pub fn take_reload(&self) -> bool {
        self.reload.swap(false, Ordering::SeqCst)
    }

    /// Whether output is currently suspended (VT switched away).
    pub fn suspended(&self) -> bool {
        self.suspend.load(Ordering::SeqCst)
    }

    /// Consume a pending redraw request (VT switched back in).
    pub fn take_redraw(&self) -> bool {
        self.redraw.swap(false, Ordering::SeqCst)
    }

    /// Raise the reload flag, as the SIGHUP handler would.
    pub fn request_reload(&self) {
        self.reload.store(true, Ordering::SeqCst);
    }

    /// Set the suspend flag, as the SIGUSR1 handler would.
    pub fn set_suspended(&self, suspended: bool) {
        self.suspend.store(suspended, Ordering::SeqCst);
        if !suspended {
            self.redraw.store(true, Ordering::SeqCst);
        }
    }
}
