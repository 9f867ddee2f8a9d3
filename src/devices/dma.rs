//! 8237-style four-channel DMA controller, co-scheduled with the CPU (spec
//! §3 "DMA state", §4.5).
//!
//! Register offsets within the controller's port window (0x20-0x2F) follow
//! the real 8237 map, which is also what the distilled spec's port numbers
//! (0x0C clear flip-flop, 0x0D master clear) assume.

use crate::devices::fdc::FloppyEngine;
use crate::memory::MemoryMap;

const CMD_MEM_TO_MEM: u8 = 0x01;
const CMD_HOLD_SOURCE: u8 = 0x02;
const CMD_DISABLE: u8 = 0x04;

const MODE_AUTOINIT: u8 = 0x10;
const MODE_DECREMENT: u8 = 0x20;
const MODE_TRANSFER_MASK: u8 = 0x0C;

#[derive(Default, Clone, Copy)]
struct Channel {
    base_addr: u16,
    base_count: u16,
    cur_addr: u16,
    cur_count: u16,
    mode: u8,
}

pub struct DmaController {
    channels: [Channel; 4],
    command: u8,
    status: u8,
    request: u8,
    mask: u8,
    temp: u8,
    flipflop: bool,
    channel3_armed: bool,
}

impl DmaController {
    pub fn new() -> Self {
        let mut dma = Self {
            channels: [Channel::default(); 4],
            command: 0,
            status: 0,
            request: 0xF0,
            mask: 0x0F,
            temp: 0,
            flipflop: false,
            channel3_armed: false,
        };
        dma.master_clear();
        dma
    }

    fn master_clear(&mut self) {
        self.command = 0;
        self.status = 0;
        self.temp = 0;
        self.mask = 0x0F;
        self.request = 0xF0;
        self.flipflop = false;
    }

    fn access16(flipflop: &mut bool, reg: &mut u16, write: Option<u8>) -> u8 {
        let use_low = !*flipflop;
        let result = if use_low { (*reg & 0xff) as u8 } else { (*reg >> 8) as u8 };
        if let Some(v) = write {
            if use_low {
                *reg = (*reg & 0xff00) | v as u16;
            } else {
                *reg = (*reg & 0x00ff) | ((v as u16) << 8);
            }
        }
        *flipflop = !*flipflop;
        result
    }

    /// Before each CPU slice, the scheduler asks the floppy model for
    /// pending DMA data and arms channel 3 accordingly (spec §4.5).
    pub fn arm_channel3(&mut self, armed: bool) {
        self.channel3_armed = armed;
    }

    pub fn read_port(&mut self, offset: u8, floppy: &mut FloppyEngine) -> u8 {
        match offset & 0x0f {
            0..=7 => {
                let idx = (offset / 2) as usize;
                let reg = if offset % 2 == 0 { &mut self.channels[idx].cur_addr } else { &mut self.channels[idx].cur_count };
                Self::access16(&mut self.flipflop, reg, None)
            }
            0x08 => {
                let v = self.status;
                self.status &= 0x0f;
                floppy.set_terminal_count_input(0);
                v
            }
            0x0d => self.temp,
            _ => 0xff,
        }
    }

    pub fn write_port(&mut self, offset: u8, val: u8) {
        match offset & 0x0f {
            0..=7 => {
                let idx = (offset / 2) as usize;
                let reg = if offset % 2 == 0 { &mut self.channels[idx].cur_addr } else { &mut self.channels[idx].cur_count };
                Self::access16(&mut self.flipflop, reg, Some(val));
                // Writing the register loads both the base and current
                // value (autoinit reload target + live pointer).
                if offset % 2 == 0 {
                    self.channels[idx].base_addr = self.channels[idx].cur_addr;
                } else {
                    self.channels[idx].base_count = self.channels[idx].cur_count;
                }
            }
            0x08 => self.command = val,
            0x09 => self.request = val | 0xf0,
            0x0a => {
                let ch = (val & 0x03) as usize;
                if val & 0x04 != 0 {
                    self.mask |= 1 << ch;
                } else {
                    self.mask &= !(1 << ch);
                }
            }
            0x0b => {
                let ch = (val & 0x03) as usize;
                self.channels[ch].mode = val;
            }
            0x0c => self.flipflop = false,
            0x0d => self.master_clear(),
            0x0e => self.mask = 0,
            0x0f => self.mask = val & 0x0f,
            _ => {}
        }
    }

    fn channel_skipped(&self, ch: usize) -> bool {
        self.command & CMD_DISABLE != 0 || self.mask & (1 << ch) != 0 || self.status & (0x10 << ch) != 0
    }

    fn terminate(&mut self, ch: usize, floppy: &mut FloppyEngine) {
        self.status |= 0x10 << ch;
        if ch == 3 {
            floppy.pulse_terminal_count();
        }
        if self.channels[ch].mode & MODE_AUTOINIT != 0 {
            self.channels[ch].cur_addr = self.channels[ch].base_addr;
            self.channels[ch].cur_count = self.channels[ch].base_count;
            self.status &= !(0x10 << ch);
        }
    }

    fn step_address(addr: &mut u16, mode: u8, hold: bool) {
        if hold {
            return;
        }
        if mode & MODE_DECREMENT != 0 {
            *addr = addr.wrapping_sub(1);
        } else {
            *addr = addr.wrapping_add(1);
        }
    }

    fn mem_to_mem_transfer(&mut self, mem: &mut MemoryMap, floppy: &mut FloppyEngine) {
        let src = self.channels[0].cur_addr;
        self.temp = mem.read(src);
        Self::step_address(&mut self.channels[0].cur_addr, self.channels[0].mode, self.command & CMD_HOLD_SOURCE != 0);
        self.channels[0].cur_count = self.channels[0].cur_count.wrapping_sub(1);
        if self.channels[0].cur_count == 0xffff {
            self.terminate(0, floppy);
        }

        let dst = self.channels[1].cur_addr;
        mem.write(dst, self.temp);
        Self::step_address(&mut self.channels[1].cur_addr, self.channels[1].mode, false);
        self.channels[1].cur_count = self.channels[1].cur_count.wrapping_sub(1);
        if self.channels[1].cur_count == 0xffff {
            self.terminate(1, floppy);
        }
    }

    fn single_transfer(&mut self, mem: &mut MemoryMap, floppy: &mut FloppyEngine) {
        let transfer_type = self.channels[3].mode & MODE_TRANSFER_MASK;
        let addr = self.channels[3].cur_addr;
        match transfer_type {
            0x00 => {
                let _ = floppy.read_data(); // verify: read and discard
            }
            0x04 => {
                // write to floppy: memory -> peripheral
                let byte = mem.read(addr);
                floppy.write_data(byte);
            }
            0x08 => {
                // read from floppy: peripheral -> memory
                let byte = floppy.read_data();
                mem.write(addr, byte);
            }
            _ => return, // 0x0C invalid, no-op
        }
        Self::step_address(&mut self.channels[3].cur_addr, self.channels[3].mode, false);
        self.channels[3].cur_count = self.channels[3].cur_count.wrapping_sub(1);
        if self.channels[3].cur_count == 0xffff {
            self.terminate(3, floppy);
        }
    }

    /// Runs DMA cycles until either a sweep does no work or `budget` T-states
    /// are exhausted, charging 4 T-states per executed transfer (spec §4.5).
    pub fn run(&mut self, budget: i32, mem: &mut MemoryMap, floppy: &mut FloppyEngine) -> i32 {
        let mut remaining = budget;
        loop {
            if remaining <= 0 {
                break;
            }
            let mut did_work = false;

            let mem_to_mem_enabled = self.command & CMD_MEM_TO_MEM != 0 && self.request & 0x01 != 0;
            if mem_to_mem_enabled && !self.channel_skipped(0) && !self.channel_skipped(1) {
                self.mem_to_mem_transfer(mem, floppy);
                did_work = true;
                remaining -= 4;
            }

            if self.channel3_armed && !self.channel_skipped(3) {
                self.single_transfer(mem, floppy);
                did_work = true;
                remaining -= 4;
            }

            if !did_work {
                break;
            }
        }
        remaining
    }

    pub fn status(&self) -> u8 {
        self.status
    }
}

impl Default for DmaController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_mem_to_mem(dma: &mut DmaController, src: u16, dst: u16, n: u16) {
        dma.write_port(0x0c, 0); // clear flip-flop
        dma.write_port(0x00, (src & 0xff) as u8);
        dma.write_port(0x00, (src >> 8) as u8);
        dma.write_port(0x0c, 0);
        dma.write_port(0x01, ((n - 1) & 0xff) as u8);
        dma.write_port(0x01, ((n - 1) >> 8) as u8);
        dma.write_port(0x0c, 0);
        dma.write_port(0x02, (dst & 0xff) as u8);
        dma.write_port(0x02, (dst >> 8) as u8);
        dma.write_port(0x0c, 0);
        dma.write_port(0x03, ((n - 1) & 0xff) as u8);
        dma.write_port(0x03, ((n - 1) >> 8) as u8);
        dma.write_port(0x08, CMD_MEM_TO_MEM); // command bit 0
        dma.write_port(0x09, 0x01); // request bit 0
        dma.write_port(0x0f, 0x00); // unmask all
    }

    #[test]
    fn memory_to_memory_copies_n_bytes() {
        let mut dma = DmaController::new();
        let mut mem = MemoryMap::new(0xff);
        let mut floppy = FloppyEngine::new();
        mem.select_bank(1);
        for i in 0..16u16 {
            mem.write(0x1000 + i, i as u8 + 1);
        }
        setup_mem_to_mem(&mut dma, 0x1000, 0x2000, 16);
        let leftover = dma.run(10_000, &mut mem, &mut floppy);
        assert!(leftover < 10_000);
        for i in 0..16u16 {
            assert_eq!(mem.read(0x2000 + i), mem.read(0x1000 + i));
        }
        assert_eq!(dma.status() & 0x20, 0x20); // channel 1 terminal count
    }

    #[test]
    fn held_source_address_does_not_advance() {
        let mut dma = DmaController::new();
        let mut mem = MemoryMap::new(0xff);
        let mut floppy = FloppyEngine::new();
        mem.select_bank(1);
        mem.write(0x1000, 0x7a);
        setup_mem_to_mem(&mut dma, 0x1000, 0x2000, 4);
        dma.write_port(0x08, CMD_MEM_TO_MEM | CMD_HOLD_SOURCE);
        dma.run(10_000, &mut mem, &mut floppy);
        for i in 0..4u16 {
            assert_eq!(mem.read(0x2000 + i), 0x7a);
        }
    }

    #[test]
    fn flipflop_toggles_and_resets_on_port_0x0c() {
        let mut dma = DmaController::new();
        let mut floppy = FloppyEngine::new();
        dma.write_port(0x00, 0x34);
        dma.write_port(0x00, 0x12);
        assert_eq!(dma.read_port(0x00, &mut floppy), 0x34);
        assert_eq!(dma.read_port(0x00, &mut floppy), 0x12);
        dma.write_port(0x0c, 0); // clear flip-flop
        assert_eq!(dma.read_port(0x00, &mut floppy), 0x34);
    }

    #[test]
    fn master_clear_resets_controller() {
        let mut dma = DmaController::new();
        dma.write_port(0x08, 0xff);
        dma.write_port(0x0d, 0); // master clear
        assert_eq!(dma.command, 0);
        assert_eq!(dma.mask, 0x0f);
        assert_eq!(dma.request, 0xf0);
    }
}
