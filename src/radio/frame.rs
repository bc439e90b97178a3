//! Received frame slot.

use crate::regs::RX_BUFFER_LEN;
use crate::Error;

/// Largest payload the receive buffer carries.
pub const MAX_FRAME_LEN: usize = 125;

/// Placeholder signal strength, dBm. The radio has no calibrated RSSI.
pub const DEFAULT_RSSI: i8 = -50;

/// Metadata returned with a copied frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameInfo {
    pub len: usize,
    pub crc_ok: bool,
    pub rssi: i8,
    /// Estimated chip errors.
    pub lqi: u8,
}

/// The single most recent received frame.
///
/// A new frame overwrites an unconsumed one; reading does not consume.
#[derive(Debug, Clone)]
pub struct FrameSlot {
    payload: [u8; MAX_FRAME_LEN],
    len: u8,
    crc_ok: bool,
    lqi: u8,
}

impl FrameSlot {
    pub const fn new() -> Self {
        Self {
            payload: [0; MAX_FRAME_LEN],
            len: 0,
            crc_ok: true,
            lqi: 0,
        }
    }

    /// Store the frame in a length-prefixed receive buffer.
    ///
    /// Returns the length byte back as an error if it exceeds [`MAX_FRAME_LEN`];
    /// the slot is left untouched in that case.
    pub(crate) fn capture(
        &mut self,
        raw: &[u8; RX_BUFFER_LEN],
        crc_ok: bool,
        lqi: u8,
    ) -> Result<u8, u8> {
        let len = raw[0];
        if len as usize > MAX_FRAME_LEN {
            return Err(len);
        }
        self.payload[..len as usize].copy_from_slice(&raw[1..1 + len as usize]);
        self.len = len;
        self.crc_ok = crc_ok;
        self.lqi = lqi;
        Ok(len)
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn crc_ok(&self) -> bool {
        self.crc_ok
    }

    /// Copy the payload into `out`.
    ///
    /// Fails with [`Error::BufferTooSmall`] without writing anything when the
    /// frame does not fit.
    pub fn read(&self, out: &mut [u8]) -> Result<FrameInfo, Error> {
        let len = self.len();
        if len > out.len() {
            return Err(Error::BufferTooSmall {
                len,
                max_len: out.len(),
            });
        }
        out[..len].copy_from_slice(&self.payload[..len]);
        Ok(FrameInfo {
            len,
            crc_ok: self.crc_ok,
            rssi: DEFAULT_RSSI,
            lqi: self.lqi,
        })
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}
