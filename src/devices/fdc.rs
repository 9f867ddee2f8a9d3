//! NEC 765-style floppy engine stand-in and its port bridge (spec §3 "FDC
//! port", §4.4, §4.5).
//!
//! The full NEC765 command state machine (seek, read ID, format, the whole
//! phase/result-byte protocol) is out of scope (spec §1) — as in the
//! original, it lives in an external `765.h`/`765.c`. What the DMA engine
//! and the bus bridge actually need from it is modelled directly: a main
//! status register, a data register, a DMA-request signal, and the
//! terminal-count input the DMA controller pulses on channel 3 (spec
//! glossary).

/// Main status register bits this platform's DMA engine cares about (spec
/// §4.5: "main status `0x90` bits set").
const MSR_DMA_PENDING: u8 = 0x90;

pub struct FloppyEngine {
    data: u8,
    dma_pending: bool,
    terminal_count: bool,
    motor_on: bool,
    /// Backing images for drives A/B (spec §6). Held but not read from —
    /// the command sequencing that would actually stream sectors off them
    /// is out of scope (spec §1).
    drive_a: Option<std::fs::File>,
    drive_b: Option<std::fs::File>,
}

impl FloppyEngine {
    pub fn new() -> Self {
        Self { data: 0, dma_pending: false, terminal_count: false, motor_on: false, drive_a: None, drive_b: None }
    }

    pub fn attach_drive_a(&mut self, file: std::fs::File) {
        self.drive_a = Some(file);
    }

    pub fn attach_drive_b(&mut self, file: std::fs::File) {
        self.drive_b = Some(file);
    }

    pub fn main_status(&self) -> u8 {
        if self.dma_pending {
            MSR_DMA_PENDING
        } else {
            0x00
        }
    }

    pub fn read_data(&mut self) -> u8 {
        self.data
    }

    pub fn write_data(&mut self, val: u8) {
        self.data = val;
    }

    /// Port offset 2: latches the terminal-count signal from bit 7 (spec
    /// §4.4).
    pub fn set_terminal_count_input(&mut self, val: u8) {
        self.terminal_count = val & 0x80 != 0;
    }

    /// Pulsed by the DMA engine when channel 3's word count underflows
    /// (spec §4.5, glossary "terminal count").
    pub fn pulse_terminal_count(&mut self) {
        self.terminal_count = true;
    }

    pub fn terminal_count(&self) -> bool {
        self.terminal_count
    }

    pub fn set_motor(&mut self, on: bool) {
        self.motor_on = on;
    }

    pub fn motor_on(&self) -> bool {
        self.motor_on
    }

    /// Whether the engine has DMA data pending for the scheduler to arm
    /// channel 3 with (spec §4.5).
    pub fn dma_pending(&self) -> bool {
        self.dma_pending
    }

    pub fn set_dma_pending(&mut self, pending: bool) {
        self.dma_pending = pending;
    }
}

impl Default for FloppyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Local FDC control latch (spec §3 "FDC port", §4.4). Bit 0 drives the
/// motor enable mask on all four drives.
pub struct FdcPort {
    pub engine: FloppyEngine,
    control: u8,
}

impl FdcPort {
    pub fn new() -> Self {
        Self { engine: FloppyEngine::new(), control: 0 }
    }

    pub fn read(&mut self, offset: u8) -> u8 {
        match offset & 0x03 {
            0 => self.engine.read_data(),
            1 => self.engine.main_status(),
            3 => self.control,
            _ => 0xff,
        }
    }

    pub fn write(&mut self, offset: u8, val: u8) {
        match offset & 0x03 {
            0 => self.engine.write_data(val),
            2 => self.engine.set_terminal_count_input(val),
            3 => {
                self.control = val;
                self.engine.set_motor(val & 0x01 != 0);
            }
            _ => {}
        }
    }
}

impl Default for FdcPort {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_bit0_drives_motor() {
        let mut fdc = FdcPort::new();
        fdc.write(3, 0x01);
        assert!(fdc.engine.motor_on());
        fdc.write(3, 0x00);
        assert!(!fdc.engine.motor_on());
    }

    #[test]
    fn offset2_latches_terminal_count_from_bit7() {
        let mut fdc = FdcPort::new();
        fdc.write(2, 0x80);
        assert!(fdc.engine.terminal_count());
    }
}
