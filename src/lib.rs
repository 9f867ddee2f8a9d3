//! Platform harness for a small 8085-based single-board computer: the
//! deterministic interleaving of the CPU, the DMA engine, and the device
//! timebases; the bus-decoding fabric; the interrupt-line model; the
//! memory-banking protocol; and the soft real-time pacing loop (spec §1).
//!
//! The 8085 instruction decoder, the IDE register model, and the NEC 765
//! floppy engine are consumer-interface-only in this crate (spec §1); see
//! `cpu`, `devices::ide`, and `devices::fdc` for the scope of their
//! built-in stand-ins.

pub mod bus;
pub mod cli;
pub mod cpu;
pub mod devices;
pub mod error;
pub mod interrupts;
pub mod memory;
pub mod platform;
pub mod scheduler;
pub mod terminal;
