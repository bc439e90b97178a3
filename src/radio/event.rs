//! Radio controller events, error flags and observer slots.

use crate::cal::Direction;
use crate::regs::{err, int};

/// RF timer tick captured when an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp(pub u32);

/// Point in a frame's life an observer can hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Frame loaded into the transmit buffer (TX only).
    Load,
    /// Start-of-frame delimiter sent or received.
    Start,
    /// Frame fully sent or received.
    End,
}

/// Discrete radio controller event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    TxLoadDone,
    TxSfdDone,
    TxSendDone,
    RxSfdDone,
    RxDone,
}

impl EventKind {
    /// In the order the interrupt handler services them.
    pub const ALL: [EventKind; 5] = [
        EventKind::TxLoadDone,
        EventKind::TxSfdDone,
        EventKind::TxSendDone,
        EventKind::RxSfdDone,
        EventKind::RxDone,
    ];

    pub const fn mask(self) -> u32 {
        match self {
            EventKind::TxLoadDone => int::TX_LOAD_DONE,
            EventKind::TxSfdDone => int::TX_SFD_DONE,
            EventKind::TxSendDone => int::TX_SEND_DONE,
            EventKind::RxSfdDone => int::RX_SFD_DONE,
            EventKind::RxDone => int::RX_DONE,
        }
    }

    pub const fn slot(self) -> (Direction, Phase) {
        match self {
            EventKind::TxLoadDone => (Direction::Tx, Phase::Load),
            EventKind::TxSfdDone => (Direction::Tx, Phase::Start),
            EventKind::TxSendDone => (Direction::Tx, Phase::End),
            EventKind::RxSfdDone => (Direction::Rx, Phase::Start),
            EventKind::RxDone => (Direction::Rx, Phase::End),
        }
    }
}

/// Event delivered by the radio controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioFrameEvent {
    pub kind: EventKind,
    pub timestamp: Timestamp,
}

/// Set of radio interrupt bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptFlags(pub u32);

impl InterruptFlags {
    pub const NONE: Self = Self(0);

    pub const fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.mask() != 0
    }

    pub const fn with(self, kind: EventKind) -> Self {
        Self(self.0 | kind.mask())
    }

    /// Asserted events in service order.
    pub fn iter(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

/// Radio error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    TxOverflow,
    TxCutoff,
    RxOverflow,
    RxCrcError,
    RxCutoff,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::TxOverflow,
        ErrorKind::TxCutoff,
        ErrorKind::RxOverflow,
        ErrorKind::RxCrcError,
        ErrorKind::RxCutoff,
    ];

    pub const fn mask(self) -> u32 {
        match self {
            ErrorKind::TxOverflow => err::TX_OVERFLOW,
            ErrorKind::TxCutoff => err::TX_CUTOFF,
            ErrorKind::RxOverflow => err::RX_OVERFLOW,
            ErrorKind::RxCrcError => err::RX_CRC,
            ErrorKind::RxCutoff => err::RX_CUTOFF,
        }
    }
}

/// Set of radio error bits. Cleared in hardware once acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorFlags(pub u32);

impl ErrorFlags {
    pub const NONE: Self = Self(0);

    pub const fn contains(self, kind: ErrorKind) -> bool {
        self.0 & kind.mask() != 0
    }

    pub const fn with(self, kind: ErrorKind) -> Self {
        Self(self.0 | kind.mask())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ErrorKind> {
        ErrorKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

/// Observer callback, invoked from interrupt context with the event timestamp.
pub type Observer = fn(Timestamp);

/// One observer slot per (direction, phase). Registering replaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObserverTable {
    tx: [Option<Observer>; 3],
    rx: [Option<Observer>; 3],
}

impl ObserverTable {
    pub const fn new() -> Self {
        Self {
            tx: [None; 3],
            rx: [None; 3],
        }
    }

    fn slot_mut(&mut self, dir: Direction, phase: Phase) -> &mut Option<Observer> {
        let row = match dir {
            Direction::Tx => &mut self.tx,
            Direction::Rx => &mut self.rx,
        };
        &mut row[phase as usize]
    }

    pub fn register(&mut self, dir: Direction, phase: Phase, cb: Observer) {
        *self.slot_mut(dir, phase) = Some(cb);
    }

    pub fn clear(&mut self, dir: Direction, phase: Phase) {
        *self.slot_mut(dir, phase) = None;
    }

    pub fn get(&self, dir: Direction, phase: Phase) -> Option<Observer> {
        let row = match dir {
            Direction::Tx => &self.tx,
            Direction::Rx => &self.rx,
        };
        row[phase as usize]
    }

    /// Call the observer for `event`, if one is registered.
    pub fn dispatch(&self, event: RadioFrameEvent) {
        let (dir, phase) = event.kind.slot();
        if let Some(cb) = self.get(dir, phase) {
            cb(event.timestamp);
        }
    }
}
