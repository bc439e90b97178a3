//! Per-frame chip-rate and IF error estimation.
//!
//! Clock recovery inserts or drops a 62.5 ns sample whenever the transmitter's
//! chip clock drifts against ours, so the adjustment count over a frame gives
//! the rate mismatch:
//!
//! ```text
//! ppm = 1e6 * (adjustments * 62.5 ns) / (len * 64 chips/byte * 500 ns/chip)
//!     = (adjustments * 15625) / (len * 8)
//! ```
//!
//! The IF estimate is the zero-crossing count over a fixed window and sits
//! near 500 when the IF is on target.

use super::fir::Fir;

/// Neutral IF zero-crossing count.
pub const IF_NOMINAL: i32 = 500;

/// Hardware counters captured for one received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameObservation {
    /// Payload length in bytes.
    pub packet_len: u8,
    /// Signed clock recovery adjustment count.
    pub cdr_adjustments: i16,
    /// Raw IF zero-crossing count.
    pub if_zero_crossings: u16,
    /// Estimated chip errors in the frame.
    pub chip_errors: u8,
}

/// Chip-rate error in ppm, truncated toward zero. `None` for an empty frame.
pub fn chip_rate_error_ppm(cdr_adjustments: i16, packet_len: u8) -> Option<i32> {
    if packet_len == 0 {
        return None;
    }
    Some((cdr_adjustments as i32 * 15_625) / (packet_len as i32 * 8))
}

/// What one observation contributed to the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Samples {
    /// Raw rate sample pushed, if the frame had a payload.
    pub rate_ppm: Option<i32>,
    /// Raw IF sample pushed, if the frame was clean enough.
    pub if_estimate: Option<i32>,
}

/// Rate and IF filters fed from received frames.
#[derive(Debug, Clone)]
pub struct Estimator {
    rate: Fir,
    if_est: Fir,
    chip_error_limit: u8,
}

impl Estimator {
    /// `chip_error_limit`: IF samples are only trusted below this chip error count.
    pub const fn new(chip_error_limit: u8) -> Self {
        Self {
            rate: Fir::new(0),
            if_est: Fir::new(IF_NOMINAL),
            chip_error_limit,
        }
    }

    /// Push the samples derived from `obs`.
    ///
    /// The rate sample does not depend on the chip error count; only the IF
    /// sample is gated by it.
    pub fn observe(&mut self, obs: &FrameObservation) -> Samples {
        let rate_ppm = chip_rate_error_ppm(obs.cdr_adjustments, obs.packet_len);
        if let Some(ppm) = rate_ppm {
            self.rate.push(ppm);
        }

        let if_estimate = if obs.chip_errors < self.chip_error_limit {
            let v = obs.if_zero_crossings as i32;
            self.if_est.push(v);
            Some(v)
        } else {
            trace!(
                "IF sample dropped: {} chip errors",
                obs.chip_errors
            );
            None
        };

        Samples {
            rate_ppm,
            if_estimate,
        }
    }

    /// Filtered chip-rate error in ppm.
    pub fn rate_ppm(&self) -> i32 {
        self.rate.output()
    }

    /// Filtered IF zero-crossing count.
    pub fn if_estimate(&self) -> i32 {
        self.if_est.output()
    }

    pub fn rate_filter(&self) -> &Fir {
        &self.rate
    }

    pub fn if_filter(&self) -> &Fir {
        &self.if_est
    }
}
