//! Countdown timer driving RST6.5 roughly every 100ms (spec §4.9).

use crate::interrupts::{InterruptLine, InterruptSink};

const TICKS_PER_PERIOD: u32 = 20;

const CTRL_ENABLE: u8 = 0x40;
const CTRL_ACK: u8 = 0x10;
const CTRL_ACK_MASK: u8 = CTRL_ACK | CTRL_ENABLE;

pub struct Timer {
    control: u8,
    tick_counter: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self { control: 0, tick_counter: 0 }
    }

    pub fn read_control(&self) -> u8 {
        self.control
    }

    /// Writing with bit 4 or bit 6 set immediately lowers RST6.5 (spec
    /// §4.9: "if bits 4 or 6 of the written value are set").
    pub fn write_control(&mut self, val: u8, irq: &mut dyn InterruptSink) {
        self.control = val;
        if val & CTRL_ACK_MASK != 0 {
            irq.clear_int(InterruptLine::Rst65);
        }
        if val & CTRL_ENABLE == 0 {
            self.tick_counter = 0;
        }
    }

    /// Called once per 5ms outer tick (spec §4.11).
    pub fn tick(&mut self, irq: &mut dyn InterruptSink) {
        if self.control & CTRL_ENABLE == 0 {
            return;
        }
        self.tick_counter += 1;
        if self.tick_counter >= TICKS_PER_PERIOD {
            self.tick_counter = 0;
            irq.set_int(InterruptLine::Rst65);
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink {
        asserted: bool,
    }
    impl InterruptSink for Sink {
        fn set_int(&mut self, _line: InterruptLine) {
            self.asserted = true;
        }
        fn clear_int(&mut self, _line: InterruptLine) {
            self.asserted = false;
        }
    }

    #[test]
    fn fires_every_twenty_ticks_when_enabled() {
        let mut timer = Timer::new();
        let mut sink = Sink { asserted: false };
        timer.write_control(CTRL_ENABLE, &mut sink);
        for _ in 0..19 {
            timer.tick(&mut sink);
        }
        assert!(!sink.asserted);
        timer.tick(&mut sink);
        assert!(sink.asserted);
    }

    #[test]
    fn disabled_timer_never_fires() {
        let mut timer = Timer::new();
        let mut sink = Sink { asserted: false };
        for _ in 0..100 {
            timer.tick(&mut sink);
        }
        assert!(!sink.asserted);
    }

    #[test]
    fn ack_bit_clears_pending_interrupt() {
        let mut timer = Timer::new();
        let mut sink = Sink { asserted: true };
        timer.write_control(CTRL_ENABLE | CTRL_ACK, &mut sink);
        assert!(!sink.asserted);
    }

    #[test]
    fn either_ack_bit_alone_clears_pending_interrupt() {
        let mut timer = Timer::new();
        let mut sink = Sink { asserted: true };
        timer.write_control(CTRL_ACK, &mut sink);
        assert!(!sink.asserted, "bit 4 alone must ack");

        let mut timer = Timer::new();
        let mut sink = Sink { asserted: true };
        timer.write_control(CTRL_ENABLE, &mut sink);
        assert!(!sink.asserted, "bit 6 alone must ack");
    }
}
