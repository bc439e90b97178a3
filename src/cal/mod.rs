//! Closed-loop frequency calibration.
//!
//! Every received frame yields a chip-rate sample and (when the frame is clean
//! enough) an IF sample. Both are smoothed by 11-tap FIR filters. Every
//! `update_rate` frames the filtered values are compared against wide
//! hysteresis bands and the tuning codes are stepped by one:
//! - chip-rate error outside ±`rate_threshold_ppm` steps the IF fine code
//!   (one step is about 2000 ppm);
//! - IF estimate outside `if_low..=if_high` steps the TX and RX LO codes of the
//!   active channel together (one step is about 80-100 kHz).
//!
//! The cooldown between steps gives the hardware and the filters time to
//! settle so the loop does not hunt.

mod channel;
mod estimator;
pub mod fir;
mod if_clock;

pub use channel::{Channel, ChannelCodes, Direction, DEFAULT_RX_LO_CODE, DEFAULT_TX_LO_CODE};
pub use estimator::{chip_rate_error_ppm, Estimator, FrameObservation, Samples, IF_NOMINAL};
pub use if_clock::{set_if_clock_frequency, IF_CODE_MAX};

/// What to do when the IF fine code would leave 0..=31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FineCodePolicy {
    /// Stay at the boundary.
    #[default]
    Clamp,
    /// Roll over to the opposite end of the range.
    Wrap,
}

/// Calibration loop configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frames between adjustments. Should be at least the FIR length.
    pub update_rate: u16,
    /// Chip-rate hysteresis, ppm.
    pub rate_threshold_ppm: i32,
    /// Lowest filtered IF estimate left alone.
    pub if_low: i32,
    /// Highest filtered IF estimate left alone.
    pub if_high: i32,
    /// IF samples are only trusted below this many chip errors (about 10%).
    pub chip_error_limit: u8,
    /// IF clock coarse code. Never changed by the loop.
    pub if_coarse: u8,
    /// Initial IF clock fine code.
    pub if_fine: u8,
    /// Run the IF oscillator in its high speed range.
    pub if_high_range: bool,
    pub fine_code_policy: FineCodePolicy,
    /// Factory LO codes.
    pub channel_codes: ChannelCodes,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_rate: 15,
            rate_threshold_ppm: 1000,
            if_low: 480,
            if_high: 520,
            chip_error_limit: 25,
            if_coarse: 22,
            if_fine: 18,
            if_high_range: false,
            fine_code_policy: FineCodePolicy::Clamp,
            channel_codes: ChannelCodes::default(),
        }
    }
}

/// Sign of a one-code adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Up,
    Down,
}

impl Step {
    const fn delta(self) -> i16 {
        match self {
            Step::Up => 1,
            Step::Down => -1,
        }
    }
}

/// Changes made by one calibration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Adjustment {
    /// IF fine code step, from the chip-rate estimate.
    pub if_fine: Option<Step>,
    /// Joint TX/RX LO step on the active channel, from the IF estimate.
    pub lo: Option<Step>,
}

impl Adjustment {
    pub fn is_empty(&self) -> bool {
        self.if_fine.is_none() && self.lo.is_none()
    }
}

/// Mutable calibration state.
#[derive(Debug, Clone)]
pub struct CalibrationState {
    /// Frames since the last adjustment point, `0..update_rate`.
    pub cooldown: u16,
    pub if_fine: u8,
    pub if_coarse: u8,
    pub active_channel: Channel,
    pub codes: ChannelCodes,
}

/// Estimator, filters and controller for one radio.
#[derive(Debug, Clone)]
pub struct Calibrator {
    config: Config,
    estimator: Estimator,
    state: CalibrationState,
}

impl Calibrator {
    pub fn new(config: Config) -> Self {
        let state = CalibrationState {
            cooldown: 0,
            if_fine: config.if_fine.min(IF_CODE_MAX),
            if_coarse: config.if_coarse,
            active_channel: Channel::default(),
            codes: config.channel_codes.clone(),
        };
        Self {
            estimator: Estimator::new(config.chip_error_limit),
            config,
            state,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Only the active channel is ever adjusted.
    pub fn set_active_channel(&mut self, ch: Channel) {
        self.state.active_channel = ch;
    }

    pub fn lo_code(&self, ch: Channel, dir: Direction) -> i16 {
        self.state.codes.get(ch, dir)
    }

    /// Feed one received frame.
    ///
    /// The cooldown advances on every frame, even when the frame contributed
    /// no samples. When it reaches `update_rate` the filtered estimates are
    /// evaluated and the cooldown restarts.
    pub fn process(&mut self, obs: &FrameObservation) -> Adjustment {
        self.estimator.observe(obs);

        self.state.cooldown += 1;
        if self.state.cooldown < self.config.update_rate {
            return Adjustment::default();
        }
        self.state.cooldown = 0;

        let adj = Adjustment {
            if_fine: self.rate_decision().filter(|&step| self.step_if_fine(step)),
            lo: self.if_decision(),
        };
        if let Some(step) = adj.lo {
            let ch = self.state.active_channel;
            self.state.codes.adjust(ch, Direction::Tx, step.delta());
            self.state.codes.adjust(ch, Direction::Rx, step.delta());
            debug!(
                "LO step {:?} on ch {}: filtered IF {} -> tx={} rx={}",
                step,
                ch.number(),
                self.estimator.if_estimate(),
                self.state.codes.get(ch, Direction::Tx),
                self.state.codes.get(ch, Direction::Rx),
            );
        }
        adj
    }

    fn rate_decision(&self) -> Option<Step> {
        let ppm = self.estimator.rate_ppm();
        if ppm > self.config.rate_threshold_ppm {
            Some(Step::Up)
        } else if ppm < -self.config.rate_threshold_ppm {
            Some(Step::Down)
        } else {
            None
        }
    }

    fn if_decision(&self) -> Option<Step> {
        let est = self.estimator.if_estimate();
        if est > self.config.if_high {
            Some(Step::Up)
        } else if est < self.config.if_low {
            Some(Step::Down)
        } else {
            None
        }
    }

    /// Returns false when the code could not move.
    fn step_if_fine(&mut self, step: Step) -> bool {
        let fine = self.state.if_fine;
        let next = match (step, self.config.fine_code_policy) {
            (Step::Up, FineCodePolicy::Clamp) => fine.saturating_add(1).min(IF_CODE_MAX),
            (Step::Down, FineCodePolicy::Clamp) => fine.saturating_sub(1),
            (Step::Up, FineCodePolicy::Wrap) => (fine + 1) & IF_CODE_MAX,
            (Step::Down, FineCodePolicy::Wrap) => fine.wrapping_sub(1) & IF_CODE_MAX,
        };
        if next == fine {
            warn!("IF fine code pinned at {}", fine);
            return false;
        }
        debug!(
            "IF fine step {:?}: filtered rate {} ppm, code {} -> {}",
            step,
            self.estimator.rate_ppm(),
            fine,
            next
        );
        self.state.if_fine = next;
        true
    }
}

#[cfg(test)]
mod tests;
