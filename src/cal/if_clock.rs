//! IF ADC clock (RC oscillator) tuning through the analog scan chain.

use crate::regs::RegisterAccess;

/// Highest code of the 5-bit coarse and fine fields.
pub const IF_CODE_MAX: u8 = 31;

const COARSE_MSB_BIT: u16 = 431;
const FINE_MSB_BIT: u16 = 437;
const HIGH_RANGE_BIT: u16 = 726;

fn write_field<R: RegisterAccess + ?Sized>(regs: &mut R, msb_bit: u16, code: u8) {
    // bit 0 of the code lands on the highest chain index
    for j in 0..5u16 {
        if (code >> j) & 1 != 0 {
            regs.set_scan_chain_bit(msb_bit - j);
        } else {
            regs.clear_scan_chain_bit(msb_bit - j);
        }
    }
}

/// Program the IF clock with binary-weighted `coarse`/`fine` codes.
///
/// Only the low five bits of each code are used. `high_range` selects the
/// high speed range of the oscillator.
pub fn set_if_clock_frequency<R: RegisterAccess + ?Sized>(
    regs: &mut R,
    coarse: u8,
    fine: u8,
    high_range: bool,
) {
    write_field(regs, COARSE_MSB_BIT, coarse);
    write_field(regs, FINE_MSB_BIT, fine);
    if high_range {
        regs.set_scan_chain_bit(HIGH_RANGE_BIT);
    } else {
        regs.clear_scan_chain_bit(HIGH_RANGE_BIT);
    }
    regs.commit_scan_chain();
}
