//! Error and activity counters for external monitoring.

use crate::cal::Adjustment;
use crate::radio::{ErrorFlags, ErrorKind};

/// Wrapping event counters. Nothing here stops the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    pub frames_received: u32,
    pub crc_errors: u32,
    /// Frames whose length byte exceeded the receive buffer.
    pub wrong_lengths: u32,
    pub tx_overflows: u32,
    pub tx_cutoffs: u32,
    pub rx_overflows: u32,
    pub rx_cutoffs: u32,
    /// Observations overwritten before housekeeping consumed them.
    pub observations_dropped: u32,
    pub if_fine_steps: u32,
    pub lo_steps: u32,
}

impl Diagnostics {
    pub const fn new() -> Self {
        Self {
            frames_received: 0,
            crc_errors: 0,
            wrong_lengths: 0,
            tx_overflows: 0,
            tx_cutoffs: 0,
            rx_overflows: 0,
            rx_cutoffs: 0,
            observations_dropped: 0,
            if_fine_steps: 0,
            lo_steps: 0,
        }
    }

    pub(crate) fn count_errors(&mut self, flags: ErrorFlags) {
        for kind in flags.iter() {
            let counter = match kind {
                ErrorKind::TxOverflow => &mut self.tx_overflows,
                ErrorKind::TxCutoff => &mut self.tx_cutoffs,
                ErrorKind::RxOverflow => &mut self.rx_overflows,
                ErrorKind::RxCrcError => &mut self.crc_errors,
                ErrorKind::RxCutoff => &mut self.rx_cutoffs,
            };
            *counter = counter.wrapping_add(1);
        }
    }

    pub(crate) fn count_adjustment(&mut self, adj: &Adjustment) {
        if adj.if_fine.is_some() {
            self.if_fine_steps = self.if_fine_steps.wrapping_add(1);
        }
        if adj.lo.is_some() {
            self.lo_steps = self.lo_steps.wrapping_add(1);
        }
    }
}
