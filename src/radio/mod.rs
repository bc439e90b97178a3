//! 802.15.4 radio transport and packet framing.
//!
//! [`Radio`] owns the register port, the received-frame slot, the observer
//! table and the [`Calibrator`]. [`Radio::on_interrupt`] is the whole radio
//! interrupt handler: it acknowledges the controller, records errors,
//! captures received frames and calls observers. Frequency housekeeping
//! either runs inline from the RxDone handler or is left pending for
//! [`Radio::run_frequency_housekeeping`], one observation deep.
//!
//! # Example
//!
//! ```no_run
//! # fn demo<P: scum_radio::regs::RadioPort>(port: P) -> Result<(), scum_radio::Error> {
//! use scum_radio::radio::{self, Direction, Phase, Radio, Timestamp};
//!
//! fn on_rx_done(ts: Timestamp) {
//!     let _ = ts;
//! }
//!
//! let mut radio = Radio::new(port, radio::Config::default(), Default::default());
//! radio.register_observer(Direction::Rx, Phase::End, on_rx_done);
//! radio.enable_interrupts();
//! radio.set_frequency(11, Direction::Rx)?;
//! radio.rx_enable();
//! radio.rx_now();
//!
//! // after RxDone:
//! let mut buf = [0u8; 125];
//! let info = radio.get_received_frame(&mut buf)?;
//! radio.run_frequency_housekeeping();
//! # let _ = info;
//! # Ok(())
//! # }
//! ```

mod event;
mod frame;

pub use event::{
    ErrorFlags, ErrorKind, EventKind, InterruptFlags, Observer, ObserverTable, Phase,
    RadioFrameEvent, Timestamp,
};
pub use frame::{FrameInfo, FrameSlot, DEFAULT_RSSI, MAX_FRAME_LEN};

pub use crate::cal::{Channel, Direction};
use crate::cal::{self, set_if_clock_frequency, Adjustment, Calibrator, FrameObservation};
use crate::diag::Diagnostics;
use crate::regs::{self, ctrl, RadioPort, Register, RX_BUFFER_LEN};
use crate::Error;

/// Where frequency housekeeping runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Housekeeping {
    /// In the RxDone interrupt, right after the frame is captured.
    Inline,
    /// Whenever the application calls [`Radio::run_frequency_housekeeping`].
    #[default]
    Deferred,
}

/// Radio configuration.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Controller interrupts to enable.
    pub interrupts: InterruptFlags,
    /// Controller errors to enable.
    pub errors: ErrorFlags,
    /// Channel selected at start.
    pub channel: Channel,
    pub housekeeping: Housekeeping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interrupts: InterruptFlags::NONE
                .with(EventKind::TxSendDone)
                .with(EventKind::RxSfdDone)
                .with(EventKind::RxDone),
            errors: ErrorFlags::NONE.with(ErrorKind::RxCrcError),
            channel: Channel::default(),
            housekeeping: Housekeeping::Deferred,
        }
    }
}

/// Radio driver.
pub struct Radio<P: RadioPort> {
    port: P,
    config: Config,
    observers: ObserverTable,
    frame: FrameSlot,
    /// Errors reported by the interrupt being serviced.
    in_flight: ErrorFlags,
    pending: Option<FrameObservation>,
    calibrator: Calibrator,
    diag: Diagnostics,
    channel: Channel,
}

impl<P: RadioPort> Radio<P> {
    /// Create the driver and program the interrupt/error masks and the IF clock.
    ///
    /// Interrupts stay off at the NVIC until [`Radio::enable_interrupts`].
    pub fn new(mut port: P, config: Config, cal_config: cal::Config) -> Self {
        let mut calibrator = Calibrator::new(cal_config);
        calibrator.set_active_channel(config.channel);

        port.write_register(Register::IntConfig, config.interrupts.0);
        port.write_register(Register::ErrorConfig, config.errors.0);

        let st = calibrator.state();
        set_if_clock_frequency(
            &mut port,
            st.if_coarse,
            st.if_fine,
            calibrator.config().if_high_range,
        );
        info!(
            "radio init: ch {} IF coarse={} fine={}",
            config.channel.number(),
            st.if_coarse,
            st.if_fine
        );

        Self {
            port,
            config,
            observers: ObserverTable::new(),
            frame: FrameSlot::new(),
            in_flight: ErrorFlags::NONE,
            pending: None,
            calibrator,
            diag: Diagnostics::new(),
            channel: config.channel,
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Reset the radio controller state machine.
    pub fn reset(&mut self) {
        self.port.write_register(Register::Control, ctrl::RF_RESET);
    }

    /// Tune the LO to `channel` for `dir` and make it the calibrated channel.
    pub fn set_frequency(&mut self, channel: u8, dir: Direction) -> Result<(), Error> {
        let ch = Channel::new(channel)?;
        let code = self.calibrator.lo_code(ch, dir);
        self.port.set_lo_code(code);
        self.calibrator.set_active_channel(ch);
        self.channel = ch;
        debug!("ch {} {:?}: LO code {}", channel, dir, code);
        Ok(())
    }

    /// Load a frame for transmission.
    pub fn load_packet(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.len() > MAX_FRAME_LEN {
            return Err(Error::PayloadTooLong { len: data.len() });
        }
        self.port.load_tx_buffer(data);
        self.port
            .write_register(Register::TxPackLen, data.len() as u32);
        self.port.write_register(Register::Control, ctrl::TX_LOAD);
        Ok(())
    }

    /// Power the transmit chain. Allow ~50 us before [`Radio::tx_now`].
    pub fn tx_enable(&mut self) {
        self.port.write_register(Register::IfCtrl, regs::IF_CTRL_TX);
        self.port.write_register(Register::LdoCtrl, regs::LDO_TX);
    }

    /// Start modulating the loaded frame.
    pub fn tx_now(&mut self) {
        self.port.write_register(Register::Control, ctrl::TX_SEND);
    }

    /// Power the receive chain. Allow ~50 us before [`Radio::rx_now`].
    pub fn rx_enable(&mut self) {
        self.port.write_register(Register::LdoCtrl, regs::LDO_RX);
        self.port.write_register(Register::IfCtrl, regs::IF_CTRL_RX);
        self.port.write_register(Register::Control, ctrl::RF_RESET);
    }

    /// Start searching for a start-of-frame delimiter.
    pub fn rx_now(&mut self) {
        self.port
            .write_register(Register::BasebandCtrl, regs::BASEBAND_RESET);
        self.port
            .write_register(Register::BasebandCtrl, regs::BASEBAND_RUN);
        self.port.write_register(Register::Control, ctrl::RX_START);
    }

    /// Hold the baseband in reset and turn the LDOs off.
    pub fn rf_off(&mut self) {
        self.port
            .write_register(Register::BasebandCtrl, regs::BASEBAND_RESET);
        self.port.write_register(Register::LdoCtrl, 0);
    }

    pub fn enable_interrupts(&mut self) {
        self.port
            .write_register(Register::NvicIser, regs::RADIO_NVIC_LINE);
        self.port
            .write_register(Register::IntConfig, self.config.interrupts.0);
        self.port
            .write_register(Register::ErrorConfig, self.config.errors.0);
    }

    pub fn disable_interrupts(&mut self) {
        self.port
            .write_register(Register::NvicIcer, regs::RADIO_NVIC_LINE);
    }

    /// Install `cb` for `(dir, phase)`, replacing any previous observer.
    pub fn register_observer(&mut self, dir: Direction, phase: Phase, cb: Observer) {
        self.observers.register(dir, phase, cb);
    }

    pub fn clear_observer(&mut self, dir: Direction, phase: Phase) {
        self.observers.clear(dir, phase);
    }

    /// Radio interrupt handler.
    ///
    /// Errors are handled before events so a frame completed in the same
    /// interrupt sees them. Both status registers are acknowledged.
    pub fn on_interrupt(&mut self) -> InterruptFlags {
        let events = InterruptFlags(self.port.read_register(Register::Int));
        let errors = ErrorFlags(self.port.read_register(Register::Error));

        self.in_flight = ErrorFlags::NONE;
        if !errors.is_empty() {
            self.on_error(errors);
        }
        self.port.write_register(Register::ErrorClear, errors.0);

        for kind in events.iter() {
            let timestamp = Timestamp(self.port.read_register(Register::RfTimerCounter));
            self.on_event(RadioFrameEvent { kind, timestamp });
        }
        self.port.write_register(Register::IntClear, events.0);
        self.in_flight = ErrorFlags::NONE;

        events
    }

    /// Record radio errors for the interrupt being serviced.
    ///
    /// The stored frame is left alone; the flags only apply to a frame
    /// completed by the same interrupt.
    pub fn on_error(&mut self, flags: ErrorFlags) {
        for kind in flags.iter() {
            match kind {
                ErrorKind::TxOverflow => warn!("TX overflow"),
                ErrorKind::TxCutoff => warn!("TX cutoff"),
                ErrorKind::RxOverflow => warn!("RX overflow"),
                ErrorKind::RxCrcError => warn!("RX CRC error"),
                ErrorKind::RxCutoff => warn!("RX cutoff"),
            }
        }
        self.diag.count_errors(flags);
        self.in_flight = ErrorFlags(self.in_flight.0 | flags.0);
    }

    /// Handle one controller event and notify its observer.
    pub fn on_event(&mut self, event: RadioFrameEvent) {
        trace!("{:?} @ {}", event.kind, event.timestamp.0);
        if event.kind == EventKind::RxDone {
            self.capture_rx();
        }
        self.observers.dispatch(event);
    }

    fn capture_rx(&mut self) {
        let errors = self.in_flight;
        self.diag.frames_received = self.diag.frames_received.wrapping_add(1);

        if errors.contains(ErrorKind::RxOverflow) {
            warn!("RX frame dropped after overflow");
            return;
        }

        let mut raw = [0u8; RX_BUFFER_LEN];
        self.port.read_rx_buffer(&mut raw);
        let chip_errors = regs::read_lqi(&mut self.port);
        let crc_ok = !errors.contains(ErrorKind::RxCrcError);

        let packet_len = match self.frame.capture(&raw, crc_ok, chip_errors) {
            Ok(len) => len,
            Err(len) => {
                self.diag.wrong_lengths = self.diag.wrong_lengths.wrapping_add(1);
                warn!("RX frame dropped: length byte {}", len);
                return;
            }
        };

        if errors.contains(ErrorKind::RxCutoff) {
            debug!("RX frame cut off, not used for calibration");
            return;
        }

        let obs = FrameObservation {
            packet_len,
            cdr_adjustments: regs::read_cdr_tau(&mut self.port),
            if_zero_crossings: regs::read_if_estimate(&mut self.port),
            chip_errors,
        };
        match self.config.housekeeping {
            Housekeeping::Inline => {
                self.calibrate(&obs);
            }
            Housekeeping::Deferred => {
                if self.pending.replace(obs).is_some() {
                    self.diag.observations_dropped =
                        self.diag.observations_dropped.wrapping_add(1);
                }
            }
        }
    }

    /// An observation is waiting for [`Radio::run_frequency_housekeeping`].
    pub fn has_pending_observation(&self) -> bool {
        self.pending.is_some()
    }

    /// Run the estimator and controller on the last received frame.
    ///
    /// Returns `None` when no frame arrived since the last call.
    pub fn run_frequency_housekeeping(&mut self) -> Option<Adjustment> {
        let obs = self.pending.take()?;
        Some(self.calibrate(&obs))
    }

    /// New LO codes take effect on the next [`Radio::set_frequency`]; a new IF
    /// fine code is programmed immediately.
    fn calibrate(&mut self, obs: &FrameObservation) -> Adjustment {
        let adj = self.calibrator.process(obs);
        self.diag.count_adjustment(&adj);
        if adj.if_fine.is_some() {
            let st = self.calibrator.state();
            set_if_clock_frequency(
                &mut self.port,
                st.if_coarse,
                st.if_fine,
                self.calibrator.config().if_high_range,
            );
        }
        adj
    }

    /// Copy the last received frame into `out`.
    pub fn get_received_frame(&self, out: &mut [u8]) -> Result<FrameInfo, Error> {
        self.frame.read(out)
    }

    /// CRC result of the last received frame.
    pub fn is_crc_ok(&self) -> bool {
        self.frame.crc_ok()
    }
}
