//! Fake register bank for host tests.

use std::collections::{BTreeSet, HashMap};

use crate::regs::{RadioPort, Register, RegisterAccess, RX_BUFFER_LEN};

/// Registers read back what tests [`FakePort::set`]; writes are logged.
///
/// `IntClear` and `ErrorClear` clear the matching bits of `Int` and `Error`,
/// the way the controller's write-one-to-clear registers do.
#[derive(Debug, Default)]
pub struct FakePort {
    values: HashMap<Register, u32>,
    pub writes: Vec<(Register, u32)>,
    scan: BTreeSet<u16>,
    pub commits: usize,
    pub tx_buffer: Vec<u8>,
    pub rx_buffer: Vec<u8>,
    pub lo_codes: Vec<i16>,
}

impl FakePort {
    pub fn new() -> Self {
        Self {
            rx_buffer: vec![0; RX_BUFFER_LEN],
            ..Default::default()
        }
    }

    pub fn set(&mut self, reg: Register, value: u32) {
        self.values.insert(reg, value);
    }

    pub fn get(&self, reg: Register) -> u32 {
        self.values.get(&reg).copied().unwrap_or(0)
    }

    pub fn scan_bit(&self, index: u16) -> bool {
        self.scan.contains(&index)
    }

    /// Values written to `reg`, oldest first.
    pub fn written(&self, reg: Register) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Place a length-prefixed frame in the receive buffer.
    pub fn set_rx_frame(&mut self, payload: &[u8]) {
        self.rx_buffer.iter_mut().for_each(|b| *b = 0);
        self.rx_buffer[0] = payload.len() as u8;
        self.rx_buffer[1..1 + payload.len()].copy_from_slice(payload);
    }

    /// Assert interrupt and error bits for the next interrupt.
    pub fn raise(&mut self, int: u32, err: u32) {
        self.set(Register::Int, self.get(Register::Int) | int);
        self.set(Register::Error, self.get(Register::Error) | err);
    }
}

impl RegisterAccess for FakePort {
    fn read_register(&mut self, reg: Register) -> u32 {
        self.get(reg)
    }

    fn write_register(&mut self, reg: Register, value: u32) {
        self.writes.push((reg, value));
        match reg {
            Register::IntClear => self.set(Register::Int, self.get(Register::Int) & !value),
            Register::ErrorClear => {
                self.set(Register::Error, self.get(Register::Error) & !value)
            }
            _ => {}
        }
    }

    fn set_scan_chain_bit(&mut self, index: u16) {
        self.scan.insert(index);
    }

    fn clear_scan_chain_bit(&mut self, index: u16) {
        self.scan.remove(&index);
    }

    fn commit_scan_chain(&mut self) {
        self.commits += 1;
    }
}

impl RadioPort for FakePort {
    fn load_tx_buffer(&mut self, data: &[u8]) {
        self.tx_buffer = data.to_vec();
    }

    fn read_rx_buffer(&mut self, out: &mut [u8; RX_BUFFER_LEN]) {
        out.copy_from_slice(&self.rx_buffer);
    }

    fn set_lo_code(&mut self, code: i16) {
        self.lo_codes.push(code);
    }
}
