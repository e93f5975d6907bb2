//! Multichannel biquad (bi-quadratic) filter stage.
//!
//! One set of coefficients shared by every channel, with independent delay
//! registers per channel. Coefficients come from [`crate::coefficients`].
//!
//! The difference equation uses the `a` = feedforward, `b` = feedback naming
//! of the classic analogue-modelled designs, plus an optional post-mix pair
//! for shelving and peaking topologies:
//!
//! ```text
//! y0  = a0*x0 + a1*x1 + a2*x2 - b1*y1 - b2*y2
//! out = y0                      (d0 == 0)
//! out = c0*y0 + d0*x0           (d0 != 0)
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec;

use crate::math::flush_denormal;

/// Biquad coefficient set, including the post-mix pair.
///
/// `c0`/`d0` are only consulted when `d0 != 0.0`; plain low/high-pass
/// designs leave them at `(1.0, 0.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward tap for x\[n\].
    pub a0: f64,
    /// Feedforward tap for x\[n-1\].
    pub a1: f64,
    /// Feedforward tap for x\[n-2\].
    pub a2: f64,
    /// Feedback tap for y\[n-1\] (subtracted).
    pub b1: f64,
    /// Feedback tap for y\[n-2\] (subtracted).
    pub b2: f64,
    /// Post-mix weight of the filtered signal.
    pub c0: f64,
    /// Post-mix weight of the unfiltered input.
    pub d0: f64,
}

impl BiquadCoefficients {
    /// Identity coefficients: `a0 = 1`, everything else zero, no post-mix.
    pub const NEUTRAL: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
        c0: 1.0,
        d0: 0.0,
    };

    /// Coefficients without a post-mix stage.
    pub const fn new(a0: f64, a1: f64, a2: f64, b1: f64, b2: f64) -> Self {
        Self {
            a0,
            a1,
            a2,
            b1,
            b2,
            c0: 1.0,
            d0: 0.0,
        }
    }

    /// Returns a copy with the post-mix pair set.
    pub const fn with_mix(mut self, c0: f64, d0: f64) -> Self {
        self.c0 = c0;
        self.d0 = d0;
        self
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Delay registers for one channel.
#[derive(Debug, Clone, Copy, Default)]
struct History {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

/// Second-order IIR filter with per-channel state.
///
/// Channel count is fixed at construction; processing never allocates.
///
/// # Example
///
/// ```rust
/// use squeeze_core::{BiquadFilter, coefficients};
///
/// let mut hpf = BiquadFilter::new(2);
/// hpf.set(coefficients::high_pass_second_order(100.0, 48000.0, 0.707));
///
/// let left = hpf.process_sample(0.5, 0);
/// let right = hpf.process_sample(-0.5, 1);
/// assert!((left + right).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coefficients: BiquadCoefficients,
    history: Box<[History]>,
}

impl BiquadFilter {
    /// Creates a neutral (pass-through) filter for `channels` channels.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is zero.
    pub fn new(channels: usize) -> Self {
        assert!(channels > 0, "BiquadFilter needs at least one channel");
        Self {
            coefficients: BiquadCoefficients::NEUTRAL,
            history: vec![History::default(); channels].into_boxed_slice(),
        }
    }

    /// Number of channels this filter was built for.
    pub fn channels(&self) -> usize {
        self.history.len()
    }

    /// Installs the identity coefficients. History is kept.
    pub fn neutral(&mut self) {
        self.coefficients = BiquadCoefficients::NEUTRAL;
    }

    /// Sets plain coefficients and disables the post-mix stage.
    ///
    /// Delay registers are left untouched.
    pub fn set_coefficients(&mut self, a0: f64, a1: f64, a2: f64, b1: f64, b2: f64) {
        self.coefficients = BiquadCoefficients::new(a0, a1, a2, b1, b2);
    }

    /// Sets coefficients together with the post-mix pair `c0`/`d0`.
    #[allow(clippy::too_many_arguments)]
    pub fn set_coefficients_with_mix(
        &mut self,
        a0: f64,
        a1: f64,
        a2: f64,
        b1: f64,
        b2: f64,
        c0: f64,
        d0: f64,
    ) {
        self.coefficients = BiquadCoefficients::new(a0, a1, a2, b1, b2).with_mix(c0, d0);
    }

    /// Installs a complete coefficient set.
    pub fn set(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    /// Current coefficient set.
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coefficients
    }

    /// Zeroes the delay registers of every channel. Coefficients are kept.
    pub fn reset_delays(&mut self) {
        self.history.fill(History::default());
    }

    /// Filters one sample on `channel`.
    ///
    /// `channel` must be below [`channels`](Self::channels); anything else is
    /// a programming error and panics.
    #[inline]
    pub fn process_sample(&mut self, value: f64, channel: usize) -> f64 {
        debug_assert!(
            channel < self.history.len(),
            "channel {channel} out of range for {}-channel biquad",
            self.history.len()
        );
        let c = &self.coefficients;
        let h = &mut self.history[channel];

        let y0 = c.a0 * value + c.a1 * h.x1 + c.a2 * h.x2 - c.b1 * h.y1 - c.b2 * h.y2;

        h.x2 = h.x1;
        h.x1 = value;
        h.y2 = h.y1;
        h.y1 = flush_denormal(y0);

        if c.d0 == 0.0 {
            y0
        } else {
            c.c0 * y0 + c.d0 * value
        }
    }

    /// Filters a buffer of one channel in place.
    pub fn process_in_place(&mut self, channel: usize, samples: &mut [f64]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample, channel);
        }
    }
}
