/// Radio driver error.
///
/// Hardware error flags (CRC, overflow, cutoff) are not errors here; they are
/// reported through [`crate::radio::ErrorFlags`] and [`crate::Diagnostics`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The caller's buffer cannot hold the received frame.
    BufferTooSmall {
        /// Length of the stored frame.
        len: usize,
        /// Length of the caller's buffer.
        max_len: usize,
    },
    /// Channel number outside 11..=26.
    InvalidChannel(u8),
    /// Frame longer than the transmit buffer allows.
    PayloadTooLong { len: usize },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::BufferTooSmall { len, max_len } => {
                write!(f, "frame of {} bytes does not fit in {} bytes", len, max_len)
            }
            Error::InvalidChannel(ch) => write!(f, "invalid channel {}", ch),
            Error::PayloadTooLong { len } => write!(f, "payload of {} bytes is too long", len),
        }
    }
}

impl core::error::Error for Error {}
