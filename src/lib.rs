#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod diag;
mod error;

pub mod cal;
pub mod handoff;
pub mod radio;
pub mod regs;

#[cfg(test)]
mod testing;

pub use diag::Diagnostics;
pub use error::Error;
pub use handoff::SharedRadio;
pub use radio::Radio;
