//! Host terminal bridge: raw-mode acquisition with scoped restore, a
//! non-blocking zero-timeout readiness poll, and LF->CR input translation
//! (spec §5, §6).

use std::io;

use termios::{tcgetattr, tcsetattr, Termios, ECHO, ICANON, TCSANOW, VINTR, VMIN, VSTOP, VSUSP, VTIME};

const STDIN: i32 = 0;
const STDOUT: i32 = 1;

/// Raw-mode stdin/stdout bridge. Original terminal attributes are restored
/// on drop, covering every exit path (normal, signal-driven, or panicking)
/// per spec §5's "terminal attributes are a scoped acquisition" contract.
pub struct Terminal {
    original: Termios,
}

impl Terminal {
    pub fn enter_raw_mode() -> io::Result<Self> {
        let mut attrs = Termios::from_fd(STDIN)?;
        tcgetattr(STDIN, &mut attrs)?;
        let original = attrs;

        let mut raw = attrs;
        raw.c_lflag &= !(ICANON | ECHO);
        // VTIME in tenths of a second: 0.1s polling granularity (spec §6).
        raw.c_cc[VMIN] = 0;
        raw.c_cc[VTIME] = 1;
        // Disable the three special characters without touching ISIG, so
        // Ctrl-C/Ctrl-Z/Ctrl-S reach the guest as plain bytes instead of
        // being intercepted by the tty driver (spec §6).
        raw.c_cc[VINTR] = 0;
        raw.c_cc[VSUSP] = 0;
        raw.c_cc[VSTOP] = 0;
        tcsetattr(STDIN, TCSANOW, &raw)?;

        Ok(Self { original })
    }

    fn poll(fd: i32, events: i16) -> io::Result<bool> {
        let mut pfd = libc::pollfd { fd, events, revents: 0 };
        let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false); // EINTR: treated as no-event (spec §7)
            }
            return Err(err);
        }
        Ok(rc > 0 && pfd.revents & events != 0)
    }

    pub fn readable(&self) -> io::Result<bool> {
        Self::poll(STDIN, libc::POLLIN)
    }

    pub fn writable(&self) -> io::Result<bool> {
        Self::poll(STDOUT, libc::POLLOUT)
    }

    /// Reads one byte, translating LF (0x0A) to CR (0x0D) on the way in
    /// (spec §4.3, §6). Returns `None` on EOF or a transient read error.
    pub fn read_byte(&self) -> Option<u8> {
        let mut buf = [0u8; 1];
        let n = unsafe { libc::read(STDIN, buf.as_mut_ptr() as *mut libc::c_void, 1) };
        if n != 1 {
            return None;
        }
        Some(if buf[0] == 0x0a { 0x0d } else { buf[0] })
    }

    pub fn write_byte(&self, byte: u8) {
        let buf = [byte];
        unsafe {
            libc::write(STDOUT, buf.as_ptr() as *const libc::c_void, 1);
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = tcsetattr(STDIN, TCSANOW, &self.original);
    }
}
