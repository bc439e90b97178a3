//! Interrupt-to-task handoff for deferred frequency housekeeping.
//!
//! The radio lives behind a critical-section mutex so the interrupt handler
//! and the application can both reach it. When a received frame leaves an
//! observation pending, the handler signals the housekeeping task; a second
//! frame before the task runs replaces the first observation.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo<P: scum_radio::regs::RadioPort>(shared: &scum_radio::SharedRadio<P>) {
//! // in the radio interrupt:
//! shared.on_interrupt();
//!
//! // in a task:
//! loop {
//!     if let Some(adj) = shared.housekeep().await {
//!         let _ = adj;
//!     }
//! }
//! # }
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::cal::Adjustment;
use crate::radio::{InterruptFlags, Radio};
use crate::regs::RadioPort;

/// A [`Radio`] shared between its interrupt handler and a housekeeping task.
pub struct SharedRadio<P: RadioPort> {
    radio: Mutex<CriticalSectionRawMutex, RefCell<Radio<P>>>,
    frame_ready: Signal<CriticalSectionRawMutex, ()>,
}

impl<P: RadioPort> SharedRadio<P> {
    pub const fn new(radio: Radio<P>) -> Self {
        Self {
            radio: Mutex::new(RefCell::new(radio)),
            frame_ready: Signal::new(),
        }
    }

    /// Run [`Radio::on_interrupt`] and wake the housekeeping task if a frame
    /// left an observation behind.
    pub fn on_interrupt(&self) -> InterruptFlags {
        let (events, pending) = self.with(|radio| {
            let events = radio.on_interrupt();
            (events, radio.has_pending_observation())
        });
        if pending {
            self.frame_ready.signal(());
        }
        events
    }

    /// Wait for a received frame and run housekeeping on it.
    ///
    /// Returns `None` if the observation was already consumed through
    /// [`SharedRadio::with`].
    pub async fn housekeep(&self) -> Option<Adjustment> {
        self.frame_ready.wait().await;
        self.with(|radio| radio.run_frequency_housekeeping())
    }

    /// Run `f` with exclusive access to the radio.
    pub fn with<R>(&self, f: impl FnOnce(&mut Radio<P>) -> R) -> R {
        self.radio.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn into_inner(self) -> Radio<P> {
        self.radio.into_inner().into_inner()
    }
}
