//! Port-range dispatch fabric (spec §4.10). A pure dispatch function over
//! the platform's aggregated device state (spec §9 "Global device state").

use crate::cpu::SystemBus;
use crate::devices::acia::Acia;
use crate::devices::dma::DmaController;
use crate::devices::fdc::FdcPort;
use crate::devices::ide::IdeDrive;
use crate::devices::mdrive::MDrive;
use crate::devices::rtc::Rtc;
use crate::devices::timer::Timer;
use crate::devices::video::Video;
use crate::interrupts::{InterruptLine, InterruptSink};
use crate::memory::MemoryMap;

pub const TRACE_MEM: u16 = 1 << 0;
pub const TRACE_IO: u16 = 1 << 1;
pub const TRACE_UNK: u16 = 1 << 2;
pub const TRACE_ACIA: u16 = 1 << 3;
pub const TRACE_BANK: u16 = 1 << 4;
pub const TRACE_FDC: u16 = 1 << 5;
pub const TRACE_DMA: u16 = 1 << 6;
pub const TRACE_MDRIVE: u16 = 1 << 7;
pub const TRACE_RTC: u16 = 1 << 8;
pub const TRACE_CPU: u16 = 1 << 9;

/// Interrupt edges raised by devices during one bus call, coalesced to
/// their final level and drained onto the real CPU afterward. Devices only
/// ever see this as an `InterruptSink`, same as they would the CPU itself
/// (spec §9 "Interrupt lines": "model as an enum-keyed call").
#[derive(Default)]
struct PendingInterrupts {
    rst55: Option<bool>,
    rst65: Option<bool>,
    rst75: Option<bool>,
}

impl InterruptSink for PendingInterrupts {
    fn set_int(&mut self, line: InterruptLine) {
        match line {
            InterruptLine::Rst55 => self.rst55 = Some(true),
            InterruptLine::Rst65 => self.rst65 = Some(true),
            InterruptLine::Rst75 => self.rst75 = Some(true),
        }
    }
    fn clear_int(&mut self, line: InterruptLine) {
        match line {
            InterruptLine::Rst55 => self.rst55 = Some(false),
            InterruptLine::Rst65 => self.rst65 = Some(false),
            InterruptLine::Rst75 => self.rst75 = Some(false),
        }
    }
}

pub struct Bus {
    pub memory: MemoryMap,
    pub acia: Acia,
    pub ide: IdeDrive,
    pub fdc: FdcPort,
    pub dma: DmaController,
    pub mdrive: MDrive,
    pub rtc: Rtc,
    pub video: Video,
    pub timer: Timer,
    pub trace: u16,
    pending: PendingInterrupts,
    tx_pending: Option<u8>,
}

impl Bus {
    pub fn new(bank_enable: u8, trace: u16) -> Self {
        Self {
            memory: MemoryMap::new(bank_enable),
            acia: Acia::new(),
            ide: IdeDrive::new(None),
            fdc: FdcPort::new(),
            dma: DmaController::new(),
            mdrive: MDrive::new(),
            rtc: Rtc::new(),
            video: Video::new(),
            timer: Timer::new(),
            trace,
            pending: PendingInterrupts::default(),
            tx_pending: None,
        }
    }

    /// Drains the byte (if any) queued by the last write to ACIA port
    /// 0x01, for the scheduler to hand to the host terminal (spec §4.3
    /// polling protocol).
    pub fn take_tx_pending(&mut self) -> Option<u8> {
        self.tx_pending.take()
    }

    /// Synthesizes an ACIA receive event from a byte the host terminal
    /// produced (spec §4.3 polling protocol).
    pub fn acia_receive(&mut self, byte: u8) {
        self.acia.on_receive(byte, &mut self.pending);
    }

    /// Synthesizes an ACIA write-ready event (spec §4.3 polling protocol).
    pub fn acia_writable(&mut self) {
        self.acia.on_writable(&mut self.pending);
    }

    /// Applies whatever interrupt edges devices raised during the last bus
    /// call (or tick) onto the real CPU. Generic rather than `&mut dyn
    /// InterruptSink` so callers can pass `&mut dyn Cpu` directly.
    pub fn drain_interrupts<S: InterruptSink + ?Sized>(&mut self, sink: &mut S) {
        if let Some(v) = self.pending.rst55.take() {
            if v {
                sink.set_int(InterruptLine::Rst55);
            } else {
                sink.clear_int(InterruptLine::Rst55);
            }
        }
        if let Some(v) = self.pending.rst65.take() {
            if v {
                sink.set_int(InterruptLine::Rst65);
            } else {
                sink.clear_int(InterruptLine::Rst65);
            }
        }
        if let Some(v) = self.pending.rst75.take() {
            if v {
                sink.set_int(InterruptLine::Rst75);
            } else {
                sink.clear_int(InterruptLine::Rst75);
            }
        }
    }

    /// Advances the devices whose timebase is the 5ms outer tick (spec
    /// §4.11 step 2).
    pub fn tick_devices(&mut self) {
        self.timer.tick(&mut self.pending);
        self.rtc.tick(&mut self.pending);
        self.video.tick();
    }

    /// Runs the DMA engine for up to `budget` T-states, arming channel 3
    /// first if the floppy engine has data pending (spec §4.5, §4.11).
    pub fn run_dma(&mut self, budget: i32) -> i32 {
        self.dma.arm_channel3(self.fdc.engine.dma_pending());
        self.dma.run(budget, &mut self.memory, &mut self.fdc.engine)
    }
}

impl SystemBus for Bus {
    fn mem_read(&mut self, addr: u16) -> u8 {
        let v = self.memory.read(addr);
        if self.trace & TRACE_MEM != 0 {
            log::trace!("mem read {addr:#06x} -> {v:#04x}");
        }
        v
    }

    fn mem_write(&mut self, addr: u16, val: u8) {
        if self.trace & TRACE_MEM != 0 {
            log::trace!("mem write {addr:#06x} <- {val:#04x}");
        }
        self.memory.write(addr, val);
    }

    fn io_read(&mut self, port: u8) -> u8 {
        if self.trace & TRACE_IO != 0 {
            log::trace!("io read port {port:#04x}");
        }
        match port {
            0x00 => {
                let v = self.acia.read_status();
                if self.trace & TRACE_ACIA != 0 {
                    log::trace!("acia status -> {v:#04x}");
                }
                v
            }
            0x01 => self.acia.read_data(),
            0x10..=0x17 => self.ide.read(port - 0x10),
            0x18..=0x1f => {
                if self.trace & TRACE_FDC != 0 {
                    log::trace!("fdc read offset {}", port - 0x18);
                }
                self.fdc.read(port - 0x18)
            }
            0x20..=0x2f => {
                if self.trace & TRACE_DMA != 0 {
                    log::trace!("dma read offset {:#04x}", port - 0x20);
                }
                self.dma.read_port(port - 0x20, &mut self.fdc.engine)
            }
            0xc6 => {
                let v = self.mdrive.read_data();
                if self.trace & TRACE_MDRIVE != 0 {
                    log::trace!("mdrive read -> {v:#04x}, pointer now {:#08x}", self.mdrive.pointer());
                }
                v
            }
            0xe0..=0xe3 => self.video.read(port - 0xe0),
            0xf0 => {
                let v = self.rtc.read_data();
                if self.trace & TRACE_RTC != 0 {
                    log::trace!("rtc read -> {v:#04x}");
                }
                v
            }
            0xfe => self.timer.read_control(),
            _ => {
                if self.trace & TRACE_UNK != 0 {
                    log::trace!("unknown io read port {port:#04x}");
                }
                0xff
            }
        }
    }

    fn io_write(&mut self, port: u8, val: u8) {
        if self.trace & TRACE_IO != 0 {
            log::trace!("io write port {port:#04x} <- {val:#04x}");
        }
        match port {
            0x00 => {
                if self.trace & TRACE_ACIA != 0 {
                    log::trace!("acia config write {val:#04x}");
                }
                self.acia.write_config(val, &mut self.pending);
            }
            0x01 => {
                self.tx_pending = Some(val);
                self.acia.write_data(&mut self.pending);
            }
            0x10..=0x17 => self.ide.write(port - 0x10, val),
            0x18..=0x1f => {
                if self.trace & TRACE_FDC != 0 {
                    log::trace!("fdc write offset {} <- {val:#04x}", port - 0x18);
                }
                self.fdc.write(port - 0x18, val);
            }
            0x20..=0x2f => {
                if self.trace & TRACE_DMA != 0 {
                    log::trace!("dma write offset {:#04x} <- {val:#04x}", port - 0x20);
                }
                self.dma.write_port(port - 0x20, val);
            }
            0x40 => {
                if self.trace & TRACE_BANK != 0 {
                    log::trace!("bank select {val:#04x}");
                }
                self.memory.select_bank(val);
            }
            0xc6 => {
                self.mdrive.write_data(val);
                if self.trace & TRACE_MDRIVE != 0 {
                    log::trace!("mdrive write {val:#04x}, pointer now {:#08x}", self.mdrive.pointer());
                }
            }
            0xc7 => self.mdrive.write_pointer_byte(val),
            0xe0..=0xe3 => self.video.write(port - 0xe0, val),
            0xf1 => {
                if self.trace & TRACE_RTC != 0 {
                    log::trace!("rtc control write {val:#04x}");
                }
                self.rtc.write_control(val, &mut self.pending);
            }
            0xfd => self.trace = (self.trace & 0xff00) | val as u16,
            0xfe => self.timer.write_control(val, &mut self.pending),
            _ => {
                if self.trace & TRACE_UNK != 0 {
                    log::trace!("unknown io write port {port:#04x} <- {val:#04x}");
                }
            }
        }
    }
}
