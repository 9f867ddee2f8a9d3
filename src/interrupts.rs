//! Thin adapter over the 8085's three level-sensitive restart inputs
//! (spec §4 "Interrupt lines", §9 "Model as an enum-keyed call rather than
//! tagged bits, since each device raises a distinct line").

/// One of the three RST inputs wired to a device in this platform.
///
/// RST5.5 is owned by the RTC, RST6.5 by the timer, RST7.5 by the ACIA
/// (spec glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptLine {
    Rst55,
    Rst65,
    Rst75,
}

/// Capability devices use to raise/lower their RST line. Implemented by
/// the CPU core; devices never touch CPU state directly.
pub trait InterruptSink {
    fn set_int(&mut self, line: InterruptLine);
    fn clear_int(&mut self, line: InterruptLine);
}
