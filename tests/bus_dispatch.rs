//! Integration coverage for the bus fabric's port-range table (spec §4.10)
//! and the memory-banking/bank-select path end to end through `Platform`.

use v85::cpu::SystemBus;
use v85::platform::{Config, Platform};

fn sample_rom() -> Vec<u8> {
    vec![0xaa; 8]
}

fn test_config() -> Config {
    Config { trace: 0, fast: true, bank_enable: 0xff }
}

#[test]
fn bank_select_port_is_visible_through_the_bus() {
    let mut platform = Platform::new(test_config(), &sample_rom());
    platform.bus.io_write(0x40, 0x01); // select bank 0
    platform.bus.memory.write(0x1000, 0x42);
    platform.bus.io_write(0x40, 0x02); // select bank 1
    assert_ne!(platform.bus.memory.read(0x1000), 0x42);
    platform.bus.io_write(0x40, 0x01); // back to bank 0
    assert_eq!(platform.bus.memory.read(0x1000), 0x42);
}

#[test]
fn unknown_port_reads_return_0xff_and_writes_are_ignored() {
    let mut platform = Platform::new(test_config(), &sample_rom());
    assert_eq!(platform.bus.io_read(0x80), 0xff);
    platform.bus.io_write(0x80, 0x55); // must not panic or corrupt state
    assert_eq!(platform.bus.io_read(0x80), 0xff);
}

#[test]
fn acia_status_round_trips_through_the_bus() {
    let mut platform = Platform::new(test_config(), &sample_rom());
    platform.bus.io_write(0x00, 0x80); // enable IRQ
    platform.bus.acia_receive(b'Z');
    assert_eq!(platform.bus.io_read(0x01), b'Z');
}
