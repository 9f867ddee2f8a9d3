//! MSM5832-style real-time clock (spec §4.7).
//!
//! Thirteen nibble-addressable BCD digits are sampled from the host wall
//! clock. The first read after any previous hold has elapsed resamples the
//! clock into a snapshot; if the control byte's hold bit is clear at that
//! point, a 10-tick (~half second) auto-expiring hold window is armed so a
//! reader stepping through all 13 registers one nibble at a time doesn't
//! see the clock roll over mid-read. Setting the hold bit manually holds
//! the snapshot indefinitely until cleared. A tick interrupt on RST5.5
//! fires every 20 outer ticks, gated by an enable latch armed by writing
//! the selector sequence 0x8F then any further selector write, and
//! acknowledged (RST5.5 lowered) by writing 0x8E.

use chrono::{Datelike, Local, Timelike};

use crate::interrupts::{InterruptLine, InterruptSink};

const HOLD_TICKS: u8 = 10;
const IRQ_TICKS: u32 = 20;

const SEL_SEC1: u8 = 0;
const SEL_YEAR10: u8 = 12;

fn digits(n: u32) -> [u8; 2] {
    [(n % 10) as u8, (n / 10 % 10) as u8]
}

pub struct Rtc {
    selector: u8,
    hold_manual: bool,
    auto_hold_remaining: u8,
    snapshot: [u8; 13],
    pending_arm: bool,
    irq_enabled: bool,
    tick_counter: u32,
}

impl Rtc {
    pub fn new() -> Self {
        let mut rtc = Self {
            selector: 0,
            hold_manual: false,
            auto_hold_remaining: 0,
            snapshot: [0; 13],
            pending_arm: false,
            irq_enabled: false,
            tick_counter: 0,
        };
        rtc.snapshot = rtc.sample_now();
        rtc
    }

    fn sample_now(&self) -> [u8; 13] {
        let now = Local::now();
        let [sec1, sec10] = digits(now.second());
        let [min1, min10] = digits(now.minute());
        let hour = now.hour();
        let [hour1, _] = digits(hour);
        let hour10 = (hour / 10) as u8 | 0x08 | if hour >= 12 { 0x04 } else { 0 };
        let week = now.weekday().num_days_from_sunday() as u8;
        let [day1, day10] = digits(now.day());
        // 0-based, matching the original `msm5832_read`'s `tm->tm_mon`
        // (January is register value 0, not 1).
        let [month1, month10] = digits(now.month0());
        let [year1, year10] = digits((now.year() % 100) as u32);
        [sec1, sec10, min1, min10, hour1, hour10, week, day1, day10, month1, month10, year1, year10]
    }

    /// Port 0xF1 write: selector (low nibble) plus hold bit (bit 7). The
    /// selector values 0x8F/0x8E additionally arm/acknowledge the tick
    /// interrupt latch.
    pub fn write_control(&mut self, val: u8, irq: &mut dyn InterruptSink) {
        if self.pending_arm {
            self.irq_enabled = true;
            self.pending_arm = false;
        }
        self.selector = val & 0x0f;
        self.hold_manual = val & 0x80 != 0;
        if val == 0x8f {
            self.pending_arm = true;
        } else if val == 0x8e {
            irq.clear_int(InterruptLine::Rst55);
        }
    }

    /// Port 0xF0 read: the currently selected nibble (or the hybrid-encoded
    /// hour-tens byte for selector 5).
    pub fn read_data(&mut self) -> u8 {
        let active_hold = self.hold_manual || self.auto_hold_remaining > 0;
        if !active_hold {
            self.snapshot = self.sample_now();
            self.auto_hold_remaining = HOLD_TICKS;
        }
        match self.selector {
            SEL_SEC1..=SEL_YEAR10 => self.snapshot[self.selector as usize],
            _ => 0x0f,
        }
    }

    pub fn tick(&mut self, irq: &mut dyn InterruptSink) {
        if !self.hold_manual && self.auto_hold_remaining > 0 {
            self.auto_hold_remaining -= 1;
        }

        self.tick_counter += 1;
        if self.tick_counter >= IRQ_TICKS {
            self.tick_counter = 0;
            if self.irq_enabled {
                irq.set_int(InterruptLine::Rst55);
            }
        }
    }
}

impl Default for Rtc {
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
    fn digits_are_valid_bcd_nibbles() {
        let mut sink = Sink { asserted: false };
        for sel in 0..=SEL_YEAR10 {
            let mut rtc = Rtc::new();
            rtc.write_control(sel, &mut sink); // hold bit clear: auto-hold window
            let v = rtc.read_data();
            if sel == 5 {
                assert_eq!(v & 0x08, 0x08, "hour-tens marker bit must be set");
            } else {
                assert!(v <= 9, "register {sel} holds non-BCD byte {v:#x}");
            }
        }
    }

    #[test]
    fn auto_hold_freezes_snapshot_for_ten_ticks() {
        let mut rtc = Rtc::new();
        let mut sink = Sink { asserted: false };
        rtc.write_control(0x00, &mut sink); // selector 0, hold bit clear
        let first = rtc.read_data(); // arms the auto-hold window
        for _ in 0..9 {
            rtc.tick(&mut sink);
            assert_eq!(rtc.read_data(), first, "snapshot must stay frozen inside the hold window");
        }
        rtc.tick(&mut sink);
        // window has now fully elapsed; a fresh sample is taken on the next read
        let _ = rtc.read_data();
    }

    #[test]
    fn manual_hold_does_not_auto_expire() {
        let mut rtc = Rtc::new();
        let mut sink = Sink { asserted: false };
        rtc.write_control(0x80, &mut sink); // hold bit set, selector 0
        let first = rtc.read_data();
        for _ in 0..50 {
            rtc.tick(&mut sink);
        }
        assert_eq!(rtc.read_data(), first);
    }

    #[test]
    fn irq_fires_every_twenty_ticks_once_armed() {
        let mut rtc = Rtc::new();
        let mut sink = Sink { asserted: false };
        rtc.write_control(0x8f, &mut sink); // arm sequence, step 1
        rtc.write_control(0x00, &mut sink); // any further selector write commits
        assert!(rtc.irq_enabled);
        for _ in 0..19 {
            rtc.tick(&mut sink);
        }
        assert!(!sink.asserted);
        rtc.tick(&mut sink);
        assert!(sink.asserted);
    }

    #[test]
    fn ack_clears_pending_irq() {
        let mut rtc = Rtc::new();
        let mut sink = Sink { asserted: true };
        rtc.write_control(0x8e, &mut sink);
        assert!(!sink.asserted);
    }
}
