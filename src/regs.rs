//! Register access boundary.
//!
//! The radio core never touches memory addresses. Everything it needs from
//! the chip goes through [`RegisterAccess`] (named registers and the analog
//! scan chain) and [`RadioPort`] (the DMA frame buffers and the LO code
//! mapping). A board crate implements both over MMIO; host tests implement
//! them over a fake register bank.

/// Registers the radio core reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Radio controller command register.
    Control,
    /// Radio controller interrupt enable mask.
    IntConfig,
    /// Pending radio interrupts.
    Int,
    /// Write-one-to-clear for [`Register::Int`].
    IntClear,
    /// Radio controller error enable mask.
    ErrorConfig,
    /// Pending radio errors.
    Error,
    /// Write-one-to-clear for [`Register::Error`].
    ErrorClear,
    /// Length of the frame loaded for transmission.
    TxPackLen,
    /// NVIC interrupt set-enable.
    NvicIser,
    /// NVIC interrupt clear-enable.
    NvicIcer,
    /// Free-running RF timer counter, the timestamp source for frame events.
    RfTimerCounter,
    /// Analog config word 4: digital baseband reset.
    BasebandCtrl,
    /// Analog config word 10: LDO enables and mux selection.
    LdoCtrl,
    /// Analog config word 15: AGC gain setting.
    AgcGain,
    /// Analog config word 16: polyphase/mixer enable on write, IF estimate on read.
    IfCtrl,
    /// Analog config word 21: link quality (estimated chip errors).
    Lqi,
    /// Signed count of samples inserted or dropped by clock recovery.
    CdrTau,
}

/// Length of the receive DMA buffer: 1 length byte, 125 payload bytes, 2 CRC bytes.
pub const RX_BUFFER_LEN: usize = 128;

/// Interrupt status/enable bits.
pub mod int {
    pub const TX_LOAD_DONE: u32 = 1 << 0;
    pub const TX_SFD_DONE: u32 = 1 << 1;
    pub const TX_SEND_DONE: u32 = 1 << 2;
    pub const RX_SFD_DONE: u32 = 1 << 3;
    pub const RX_DONE: u32 = 1 << 4;
}

/// Error status/enable bits.
pub mod err {
    pub const TX_OVERFLOW: u32 = 1 << 0;
    pub const TX_CUTOFF: u32 = 1 << 1;
    pub const RX_OVERFLOW: u32 = 1 << 2;
    pub const RX_CRC: u32 = 1 << 3;
    pub const RX_CUTOFF: u32 = 1 << 4;
}

/// Commands written to [`Register::Control`].
pub mod ctrl {
    pub const TX_LOAD: u32 = 1 << 0;
    pub const TX_SEND: u32 = 1 << 1;
    pub const RX_START: u32 = 1 << 2;
    pub const RF_RESET: u32 = 1 << 3;
}

/// NVIC line of the radio controller interrupt.
pub const RADIO_NVIC_LINE: u32 = 0x40;

/// LDO control: LO, PA and AUX on (transmit).
pub(crate) const LDO_TX: u32 = 0x0028;
/// LDO control: LO, IF and AUX on (receive).
pub(crate) const LDO_RX: u32 = 0x0018;
/// IF control: polyphase off, mixer disabled.
pub(crate) const IF_CTRL_TX: u32 = 0x6;
/// IF control: polyphase and mixers enabled.
pub(crate) const IF_CTRL_RX: u32 = 0x1;
/// Baseband held in reset.
pub(crate) const BASEBAND_RESET: u32 = 0x2000;
/// Baseband released.
pub(crate) const BASEBAND_RUN: u32 = 0x2800;

const IF_ESTIMATE_VALID: u32 = 0x400;
const IF_ESTIMATE_MASK: u32 = 0x3FF;

/// Named-register and scan-chain access.
///
/// Semantics are fixed by hardware; implementations pass them through unmodified.
/// None of these may block.
pub trait RegisterAccess {
    fn read_register(&mut self, reg: Register) -> u32;

    fn write_register(&mut self, reg: Register, value: u32);

    /// Set one bit of the analog scan chain image.
    fn set_scan_chain_bit(&mut self, index: u16);

    /// Clear one bit of the analog scan chain image.
    fn clear_scan_chain_bit(&mut self, index: u16);

    /// Shift the scan chain image into the analog front end.
    ///
    /// Backends that write the chain eagerly can leave this as a no-op.
    fn commit_scan_chain(&mut self) {}
}

/// Radio transport hooks that are not plain registers.
pub trait RadioPort: RegisterAccess {
    /// Copy `data` into the transmit DMA buffer and point the controller at it.
    fn load_tx_buffer(&mut self, data: &[u8]);

    /// Snapshot of the receive DMA buffer.
    fn read_rx_buffer(&mut self, out: &mut [u8; RX_BUFFER_LEN]);

    /// Program the local oscillator with a monotonic tuning code.
    fn set_lo_code(&mut self, code: i16);
}

/// Zero-crossing count of the IF over the estimate window, or 0 while invalid.
///
/// About 500 when the IF sits at its nominal 2.5 MHz; each count is roughly 5 kHz.
pub fn read_if_estimate<R: RegisterAccess + ?Sized>(regs: &mut R) -> u16 {
    let v = regs.read_register(Register::IfCtrl);
    if v & IF_ESTIMATE_VALID != 0 {
        (v & IF_ESTIMATE_MASK) as u16
    } else {
        0
    }
}

/// Estimated chip errors in the last frame.
pub fn read_lqi<R: RegisterAccess + ?Sized>(regs: &mut R) -> u8 {
    (regs.read_register(Register::Lqi) & 0xFF) as u8
}

/// AGC gain setting, a coarse proxy for received signal strength.
pub fn read_rssi<R: RegisterAccess + ?Sized>(regs: &mut R) -> u8 {
    (regs.read_register(Register::AgcGain) & 0xF) as u8
}

/// Clock recovery adjustment count of the last frame.
pub fn read_cdr_tau<R: RegisterAccess + ?Sized>(regs: &mut R) -> i16 {
    regs.read_register(Register::CdrTau) as u16 as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePort;

    #[test]
    fn if_estimate_requires_valid_flag() {
        let mut port = FakePort::new();
        port.set(Register::IfCtrl, 0x1F4);
        assert_eq!(read_if_estimate(&mut port), 0);

        port.set(Register::IfCtrl, IF_ESTIMATE_VALID | 0x1F4);
        assert_eq!(read_if_estimate(&mut port), 500);

        // upper bits are not part of the count
        port.set(Register::IfCtrl, 0xF800 | IF_ESTIMATE_VALID | 0x3FF);
        assert_eq!(read_if_estimate(&mut port), 0x3FF);
    }

    #[test]
    fn cdr_tau_is_sign_extended() {
        let mut port = FakePort::new();
        port.set(Register::CdrTau, 0xFFF0);
        assert_eq!(read_cdr_tau(&mut port), -16);
        port.set(Register::CdrTau, 16);
        assert_eq!(read_cdr_tau(&mut port), 16);
    }

    #[test]
    fn lqi_and_rssi_masks() {
        let mut port = FakePort::new();
        port.set(Register::Lqi, 0x1234);
        port.set(Register::AgcGain, 0xAB);
        assert_eq!(read_lqi(&mut port), 0x34);
        assert_eq!(read_rssi(&mut port), 0xB);
    }
}
