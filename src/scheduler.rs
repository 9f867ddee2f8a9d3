//! Main pacing loop: nested CPU/DMA slicing bound to a 5ms outer wall-clock
//! tick (spec §4.11).

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::platform::Platform;
use crate::terminal::Terminal;

const INNER_ITERATIONS: u32 = 200;
const DMA_BUDGET_PER_ITERATION: i32 = 150;
const OUTER_TICK: Duration = Duration::from_millis(5);

/// Runs until `shutdown` is observed set, checked once per outer iteration
/// (spec §5: "the shutdown signal tears the entire process down between
/// outer ticks"). Any terminal-readiness error other than EINTR is fatal
/// (spec §7 "Host terminal errors").
pub fn run(platform: &mut Platform, terminal: &Terminal, shutdown: &AtomicBool) -> Result<()> {
    let mut carry: i32 = 0;

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        for _ in 0..INNER_ITERATIONS {
            let budget = DMA_BUDGET_PER_ITERATION + carry;
            let after_dma = platform.bus.run_dma(budget);
            carry = platform.cpu.exec(after_dma, &mut platform.bus);
            platform.bus.drain_interrupts(&mut *platform.cpu);

            poll_acia(platform, terminal)?;
        }

        if !platform.fast {
            thread::sleep(OUTER_TICK);
        }
        platform.bus.tick_devices();
        platform.bus.drain_interrupts(&mut *platform.cpu);
    }

    Ok(())
}

fn poll_acia(platform: &mut Platform, terminal: &Terminal) -> Result<()> {
    if terminal.readable()? {
        if let Some(byte) = terminal.read_byte() {
            platform.bus.acia_receive(byte);
            platform.bus.drain_interrupts(&mut *platform.cpu);
        }
    }
    if terminal.writable()? {
        if let Some(byte) = platform.bus.take_tx_pending() {
            terminal.write_byte(byte);
        }
        platform.bus.acia_writable();
        platform.bus.drain_interrupts(&mut *platform.cpu);
    }
    Ok(())
}
