//! The platform aggregate: every device, the memory map, and the CPU core,
//! under the scheduler's exclusive ownership (spec §9 "Global device
//! state").

use std::fs::File;

use crate::bus::Bus;
use crate::cpu::{Cpu, Intel8085};
use crate::devices::ide::IdeDrive;

/// The CLI surface converted once at start-up (spec §0 "Configuration
/// layer"); nothing reads configuration after this point.
pub struct Config {
    pub trace: u16,
    pub fast: bool,
    pub bank_enable: u8,
}

pub struct Platform {
    pub cpu: Box<dyn Cpu>,
    pub bus: Bus,
    pub fast: bool,
}

impl Platform {
    pub fn new(config: Config, rom: &[u8]) -> Self {
        let mut bus = Bus::new(config.bank_enable, config.trace);
        bus.memory.load_rom(rom);

        let mut cpu: Box<dyn Cpu> = Box::new(Intel8085::new());
        cpu.reset(&mut bus);

        Self { cpu, bus, fast: config.fast }
    }

    pub fn attach_ide(&mut self, file: File) {
        self.bus.ide = IdeDrive::new(Some(file));
    }

    pub fn attach_drive_a(&mut self, file: File) {
        self.bus.fdc.engine.attach_drive_a(file);
    }

    pub fn attach_drive_b(&mut self, file: File) {
        self.bus.fdc.engine.attach_drive_b(file);
    }
}
