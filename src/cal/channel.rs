//! Per-channel LO tuning codes.

use crate::Error;

/// Radio direction. TX and RX need different LO codes on the same channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Tx,
    Rx,
}

/// 802.15.4 2.4 GHz channel, 11..=26.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(u8);

impl Channel {
    pub const FIRST: u8 = 11;
    pub const LAST: u8 = 26;
    pub const COUNT: usize = (Self::LAST - Self::FIRST + 1) as usize;

    pub const fn new(ch: u8) -> Result<Self, Error> {
        if ch < Self::FIRST || ch > Self::LAST {
            return Err(Error::InvalidChannel(ch));
        }
        Ok(Self(ch))
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    const fn index(self) -> usize {
        (self.0 - Self::FIRST) as usize
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self(Self::FIRST)
    }
}

impl TryFrom<u8> for Channel {
    type Error = Error;

    fn try_from(ch: u8) -> Result<Self, Error> {
        Self::new(ch)
    }
}

/// Board-measured LO code for TX on channel 11.
pub const DEFAULT_TX_LO_CODE: i16 = 793;
/// Board-measured LO code for RX on channel 11.
pub const DEFAULT_RX_LO_CODE: i16 = 741;

/// TX and RX LO codes for every channel.
///
/// Each entry is an independent slot; the calibration loop steps TX and RX
/// of the active channel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCodes {
    tx: [i16; Channel::COUNT],
    rx: [i16; Channel::COUNT],
}

impl ChannelCodes {
    /// Table from factory calibration.
    pub const fn new(tx: [i16; Channel::COUNT], rx: [i16; Channel::COUNT]) -> Self {
        Self { tx, rx }
    }

    /// Same TX and RX code on every channel.
    pub const fn uniform(tx: i16, rx: i16) -> Self {
        Self::new([tx; Channel::COUNT], [rx; Channel::COUNT])
    }

    pub fn get(&self, ch: Channel, dir: Direction) -> i16 {
        match dir {
            Direction::Tx => self.tx[ch.index()],
            Direction::Rx => self.rx[ch.index()],
        }
    }

    /// Add `delta` to one slot, saturating at the `i16` range.
    pub fn adjust(&mut self, ch: Channel, dir: Direction, delta: i16) {
        let slot = match dir {
            Direction::Tx => &mut self.tx[ch.index()],
            Direction::Rx => &mut self.rx[ch.index()],
        };
        *slot = slot.saturating_add(delta);
    }
}

impl Default for ChannelCodes {
    fn default() -> Self {
        Self::uniform(DEFAULT_TX_LO_CODE, DEFAULT_RX_LO_CODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_range() {
        assert_eq!(Channel::new(10), Err(Error::InvalidChannel(10)));
        assert_eq!(Channel::new(27), Err(Error::InvalidChannel(27)));
        assert_eq!(Channel::new(11).map(Channel::number), Ok(11));
        assert_eq!(Channel::try_from(26).map(Channel::number), Ok(26));
        assert_eq!(Channel::COUNT, 16);
    }

    #[test]
    fn adjust_touches_only_one_slot() {
        let mut codes = ChannelCodes::uniform(100, 200);
        let ch = Channel::new(15).unwrap();
        let other = Channel::new(16).unwrap();

        codes.adjust(ch, Direction::Rx, -3);
        assert_eq!(codes.get(ch, Direction::Rx), 197);
        assert_eq!(codes.get(ch, Direction::Tx), 100);
        assert_eq!(codes.get(other, Direction::Rx), 200);

        codes.adjust(ch, Direction::Tx, 1);
        assert_eq!(codes.get(ch, Direction::Tx), 101);
        assert_eq!(codes.get(other, Direction::Tx), 100);
    }

    #[test]
    fn factory_table_is_kept() {
        let mut tx = [0; Channel::COUNT];
        let mut rx = [0; Channel::COUNT];
        for i in 0..Channel::COUNT {
            tx[i] = 700 + i as i16 * 50;
            rx[i] = 650 + i as i16 * 50;
        }
        let codes = ChannelCodes::new(tx, rx);
        let ch = Channel::new(20).unwrap();
        assert_eq!(codes.get(ch, Direction::Tx), 1150);
        assert_eq!(codes.get(ch, Direction::Rx), 1100);
    }
}
