//! Command-line surface (spec §6), modelled as a `clap` derive struct.
//! Positional arguments are rejected by clap's own usage/exit-code-2
//! behavior without any extra code.

use clap::Parser;

use crate::bus;
use crate::platform::Config;

fn parse_trace_mask(s: &str) -> Result<u16, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u16::from_str_radix(hex, 16).map_err(|e| e.to_string());
    }
    if let Ok(n) = s.parse::<u16>() {
        return Ok(n);
    }
    let mut mask = 0u16;
    for name in s.split(',') {
        mask |= match name.trim() {
            "mem" => bus::TRACE_MEM,
            "io" => bus::TRACE_IO,
            "unk" => bus::TRACE_UNK,
            "acia" => bus::TRACE_ACIA,
            "bank" => bus::TRACE_BANK,
            "fdc" => bus::TRACE_FDC,
            "dma" => bus::TRACE_DMA,
            "mdrive" => bus::TRACE_MDRIVE,
            "rtc" => bus::TRACE_RTC,
            "cpu" => bus::TRACE_CPU,
            other => return Err(format!("unknown trace name '{other}' (expected a bitmask integer or a comma-separated list of mem,io,unk,acia,bank,fdc,dma,mdrive,rtc,cpu)")),
        };
    }
    Ok(mask)
}

/// Cycle-paced emulator for a small 8085-based single-board computer.
#[derive(Parser, Debug)]
#[command(name = "v85", version, about)]
pub struct Cli {
    /// Trace bitmask: a raw integer (decimal or 0x-prefixed hex), or a
    /// comma-separated list of mem,io,unk,acia,bank,fdc,dma,mdrive,rtc,cpu.
    #[arg(short = 'd', long = "trace", default_value = "0", value_parser = parse_trace_mask)]
    pub trace: u16,

    /// Disable the 5ms host sleep.
    #[arg(short = 'f', long = "fast")]
    pub fast: bool,

    /// Bank-enable mask (bit 0 is always forced on).
    #[arg(short = 'b', long = "bank-enable", default_value_t = 0xffu8)]
    pub bank_enable: u8,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config { trace: cli.trace, fast: cli.fast, bank_enable: cli.bank_enable }
    }
}
