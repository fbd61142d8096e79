//! Lock-free parameter ports between the control and render contexts.
//!
//! A port is one atomic `f32` cell split into two ends:
//!
//! - [`ParamHandle`] (control side): `set_target` stores the new target with
//!   a single atomic write. Never blocks, never allocates. Handles are
//!   `Clone + Send + Sync`.
//! - [`ParamReader`] (render side): `sync` loads the latest target once per
//!   render block and feeds it to a [`Smoother`]; `read_current` advances the
//!   smoother once per sample.
//!
//! Writes become visible to the render side at the next block boundary. The
//! last write before a block wins; ordering across different ports is not
//! guaranteed.
//!
//! ```rust
//! use fmosc_core::param::Smoothing;
//! use fmosc_core::port::ParamPort;
//!
//! let (handle, mut reader) = ParamPort::new(0.0, Smoothing::Linear, 48000.0, 10.0);
//!
//! handle.set_target(1.0); // control thread
//!
//! reader.sync(); // audio thread, start of block
//! let first = reader.read_current();
//! assert_eq!(first, 1.0); // first block of a new port applies immediately
//! ```

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::param::{Smoother, Smoothing};

/// Atomic `f32` cell stored as raw bits.
#[derive(Debug)]
struct ParamCell {
    bits: AtomicU32,
}

impl ParamCell {
    fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    #[inline]
    fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }
}

/// Constructor for a handle/reader pair.
pub struct ParamPort;

impl ParamPort {
    /// Create a port holding `initial`.
    ///
    /// `window_ms` is the smoothing window applied to every change after the
    /// first render block.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(
        initial: f32,
        policy: Smoothing,
        sample_rate: f32,
        window_ms: f32,
    ) -> (ParamHandle, ParamReader) {
        let cell = Arc::new(ParamCell::new(initial));
        let handle = ParamHandle {
            cell: Arc::clone(&cell),
        };
        let reader = ParamReader {
            cell,
            smoother: Smoother::new(policy, initial, sample_rate, window_ms),
            primed: false,
        };
        (handle, reader)
    }
}

/// Control-side end of a port.
#[derive(Debug, Clone)]
pub struct ParamHandle {
    cell: Arc<ParamCell>,
}

impl ParamHandle {
    /// Publish a new target. Callers validate the value first.
    #[inline]
    pub fn set_target(&self, value: f32) {
        self.cell.store(value);
    }

    /// Most recently published target.
    #[inline]
    pub fn target(&self) -> f32 {
        self.cell.load()
    }
}

/// Render-side end of a port.
#[derive(Debug)]
pub struct ParamReader {
    cell: Arc<ParamCell>,
    smoother: Smoother,
    /// False until the first `sync`; the first target is applied without a ramp.
    primed: bool,
}

impl ParamReader {
    /// Pull the latest target. Call once at the start of each render block.
    ///
    /// Non-finite targets are ignored and the last good target is kept.
    #[inline]
    pub fn sync(&mut self) {
        let target = self.cell.load();
        if !target.is_finite() {
            return;
        }
        if self.primed {
            self.smoother.set_target(target);
        } else {
            self.smoother.set_immediate(target);
            self.primed = true;
        }
    }

    /// Snap to `value` without consulting the cell.
    ///
    /// For readers that are temporarily not driving anything: the next
    /// `sync` ramps from `value` instead of from a stale output. Non-finite
    /// values are ignored.
    #[inline]
    pub fn follow(&mut self, value: f32) {
        if value.is_finite() {
            self.smoother.set_immediate(value);
            self.primed = true;
        }
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn read_current(&mut self) -> f32 {
        self.smoother.advance()
    }

    /// Smoothed value without advancing.
    #[inline]
    pub fn current(&self) -> f32 {
        self.smoother.get()
    }

    /// Target the smoother is heading to.
    #[inline]
    pub fn target(&self) -> f32 {
        self.smoother.target()
    }

    /// Whether the smoothed value has reached the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.smoother.is_settled()
    }
}
