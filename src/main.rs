//! Entry point: CLI parsing, device-file loading, signal handling, and
//! scheduler invocation (spec §6, §7).

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use v85::cli::Cli;
use v85::error::ConfigError;
use v85::platform::{self, Platform};
use v85::scheduler;
use v85::terminal::Terminal;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_signal(_: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGINT, handle_signal as libc::sighandler_t);
        libc::signal(libc::SIGQUIT, handle_signal as libc::sighandler_t);
        libc::signal(libc::SIGPIPE, handle_signal as libc::sighandler_t);
    }
}

fn load_rom(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let mut file = File::open(path).map_err(|source| ConfigError::RomNotFound { path: path.to_path_buf(), source })?;
    let mut buf = Vec::new();
    let _ = file.read_to_end(&mut buf);
    if buf.len() < 8 {
        return Err(ConfigError::RomTooShort { path: path.to_path_buf() });
    }
    Ok(buf)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let rom = load_rom(Path::new("v85.rom"))?;
    let config: platform::Config = cli.into();
    let mut machine = Platform::new(config, &rom);

    let ide_path = PathBuf::from("v85.ide");
    let ide = File::options()
        .read(true)
        .write(true)
        .open(&ide_path)
        .map_err(|source| ConfigError::IdeImageNotFound { path: ide_path, source })?;
    machine.attach_ide(ide);

    if let Ok(f) = File::options().read(true).write(true).open("drivea.dsk") {
        log::info!("drivea.dsk attached");
        machine.attach_drive_a(f);
    }
    if let Ok(f) = File::options().read(true).write(true).open("driveb.dsk") {
        log::info!("driveb.dsk attached");
        machine.attach_drive_b(f);
    }

    install_signal_handlers();
    let terminal = Terminal::enter_raw_mode()?;
    scheduler::run(&mut machine, &terminal, &SHUTDOWN)?;
    log::info!("shutdown requested, exiting cleanly");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    env_logger::init();

    if let Err(err) = run(cli) {
        if let Some(cfg_err) = err.downcast_ref::<ConfigError>() {
            log::error!("{cfg_err}");
            std::process::exit(cfg_err.exit_code());
        }
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
