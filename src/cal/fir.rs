//! Fixed-window FIR smoothing of per-packet estimates.
//!
//! Each filter keeps the last [`TAPS`] samples in a ring (storage array plus
//! a head index). The window is pre-seeded and always holds exactly [`TAPS`]
//! samples.

/// Number of filter taps.
pub const TAPS: usize = 11;

/// Symmetric low-pass kernel, index 0 applies to the newest sample.
pub const COEFFS: [i32; TAPS] = [4, 16, 37, 64, 87, 96, 87, 64, 37, 16, 4];

/// Sum of [`COEFFS`].
pub const COEFF_SCALE: i32 = 512;

const _: () = {
    let mut sum = 0;
    let mut i = 0;
    while i < TAPS {
        sum += COEFFS[i];
        i += 1;
    }
    assert!(sum == COEFF_SCALE);
};

/// Ring of the [`TAPS`] most recent samples.
#[derive(Debug, Clone)]
pub struct History {
    buf: [i32; TAPS],
    /// Slot holding the newest sample.
    head: usize,
}

impl History {
    /// Window filled with `seed`.
    pub const fn new(seed: i32) -> Self {
        Self {
            buf: [seed; TAPS],
            head: 0,
        }
    }

    /// Push a sample, evicting the oldest.
    pub fn push(&mut self, sample: i32) {
        self.head = if self.head == 0 { TAPS - 1 } else { self.head - 1 };
        self.buf[self.head] = sample;
    }

    /// Always [`TAPS`].
    pub const fn len(&self) -> usize {
        TAPS
    }

    pub fn newest(&self) -> i32 {
        self.buf[self.head]
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        (0..TAPS).map(move |i| self.buf[(self.head + i) % TAPS])
    }
}

/// 11-tap FIR filter over a [`History`].
#[derive(Debug, Clone)]
pub struct Fir {
    history: History,
}

impl Fir {
    pub const fn new(seed: i32) -> Self {
        Self {
            history: History::new(seed),
        }
    }

    pub fn push(&mut self, sample: i32) {
        self.history.push(sample);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// `floor(sum(sample[i] * coeff[i]) / 512)`.
    pub fn output(&self) -> i32 {
        let sum: i64 = self
            .history
            .iter()
            .zip(COEFFS.iter())
            .map(|(s, &c)| s as i64 * c as i64)
            .sum();
        sum.div_euclid(COEFF_SCALE as i64) as i32
    }
}
