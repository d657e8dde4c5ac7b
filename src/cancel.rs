//! Cooperative cancellation shared between a signal source and the search.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A stop request observed by the search between candidate attempts.
///
/// Clones share one flag. Once set it stays set for the rest of the run.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Calling it again has no further effect.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested by any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Makes the platform's termination signals (Ctrl+C among them) set this
    /// token instead of killing the process.
    pub fn install_signal_handlers(&self) -> io::Result<()> {
        for &signal in signal_hook::consts::TERM_SIGNALS {
            signal_hook::flag::register(signal, Arc::clone(&self.0))?;
        }
        Ok(())
    }
}
