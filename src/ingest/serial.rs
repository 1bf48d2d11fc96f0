//! Serial device byte source (Linux).
//!
//! Opens the device in raw mode at the configured speed and implements
//! timeout-bounded reads with `poll(2)`. Paths that are not terminals
//! (a capture file, a FIFO) are read as-is without termios setup, which makes
//! recorded streams replayable through the same code path.

use anyhow::{anyhow, Context, Result};
use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::{Duration, Instant};

use super::ByteSource;

/// Configuration for a serial source.
#[derive(Clone, Debug)]
pub struct SerialConfig {
    /// Device path (e.g., "/dev/ttyUSB0").
    pub path: String,
    /// Line speed in baud.
    pub baud: u32,
    /// Upper bound on a single read.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: "/dev/ttyUSB0".to_string(),
            baud: 2_000_000,
            timeout: Duration::from_secs(1),
        }
    }
}

/// An open serial device. The descriptor is closed on drop.
pub struct SerialPort {
    fd: OwnedFd,
    timeout: Duration,
    is_tty: bool,
    eof: bool,
}

impl SerialPort {
    pub fn open(config: &SerialConfig) -> Result<Self> {
        if config.timeout.is_zero() {
            return Err(anyhow!("serial timeout must be greater than zero"));
        }
        let speed = baud_constant(config.baud)
            .ok_or_else(|| anyhow!("unsupported baud rate {}", config.baud))?;
        let c_path = CString::new(config.path.as_str())
            .with_context(|| format!("invalid serial path {:?}", config.path))?;

        // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
        let raw = unsafe {
            libc::open(
                c_path.as_ptr(),
                libc::O_RDWR | libc::O_NOCTTY | libc::O_NONBLOCK | libc::O_CLOEXEC,
            )
        };
        if raw < 0 {
            return Err(io::Error::last_os_error())
                .with_context(|| format!("failed to open serial device {}", config.path));
        }
        // SAFETY: raw is a freshly opened descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        // SAFETY: fd is open.
        let is_tty = unsafe { libc::isatty(fd.as_raw_fd()) } == 1;
        if is_tty {
            configure_raw(&fd, speed)
                .with_context(|| format!("failed to configure {}", config.path))?;
            log::info!("serial {} opened at {} baud", config.path, config.baud);
        } else {
            log::info!("{} is not a terminal; reading it as a capture", config.path);
        }

        Ok(Self {
            fd,
            timeout: config.timeout,
            is_tty,
            eof: false,
        })
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    fn poll_readable(&self, wait: Duration) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.fd.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let ms = wait.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        loop {
            // SAFETY: pfd points to one valid pollfd.
            let rc = unsafe { libc::poll(&mut pfd, 1, ms) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if pfd.revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "serial device reported an error",
                ));
            }
            return Ok(rc > 0);
        }
    }
}

impl ByteSource for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let deadline = Instant::now()
            .checked_add(self.timeout)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "serial timeout out of range")
            })?;
        let mut filled = 0;
        while filled < buf.len() && !self.eof {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if !self.poll_readable(deadline - now)? {
                break;
            }
            let rest = &mut buf[filled..];
            // SAFETY: rest is a valid writable region of rest.len() bytes.
            let n = unsafe {
                libc::read(
                    self.fd.as_raw_fd(),
                    rest.as_mut_ptr() as *mut libc::c_void,
                    rest.len(),
                )
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => continue,
                    _ => return Err(err),
                }
            }
            if n == 0 {
                if self.is_tty {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "serial device hung up",
                    ));
                }
                self.eof = true;
                break;
            }
            filled += n as usize;
        }
        Ok(filled)
    }

    fn is_exhausted(&self) -> bool {
        self.eof
    }
}

fn configure_raw(fd: &OwnedFd, speed: libc::speed_t) -> io::Result<()> {
    let raw = fd.as_raw_fd();
    // SAFETY: termios is plain old data; tcgetattr fills it before use.
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };
    // SAFETY: raw is an open terminal descriptor and tio is writable.
    if unsafe { libc::tcgetattr(raw, &mut tio) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: tio was initialised by tcgetattr.
    unsafe {
        libc::cfmakeraw(&mut tio);
        if libc::cfsetispeed(&mut tio, speed) != 0 || libc::cfsetospeed(&mut tio, speed) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    tio.c_cflag |= libc::CLOCAL | libc::CREAD;
    // Reads are bounded by poll(2), not by VTIME.
    tio.c_cc[libc::VMIN] = 0;
    tio.c_cc[libc::VTIME] = 0;
    // SAFETY: raw is an open terminal descriptor and tio is fully initialised.
    unsafe {
        if libc::tcsetattr(raw, libc::TCSANOW, &tio) != 0 {
            return Err(io::Error::last_os_error());
        }
        libc::tcflush(raw, libc::TCIFLUSH);
    }
    Ok(())
}

fn baud_constant(baud: u32) -> Option<libc::speed_t> {
    let speed = match baud {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        460_800 => libc::B460800,
        500_000 => libc::B500000,
        921_600 => libc::B921600,
        1_000_000 => libc::B1000000,
        1_500_000 => libc::B1500000,
        2_000_000 => libc::B2000000,
        3_000_000 => libc::B3000000,
        4_000_000 => libc::B4000000,
        _ => return None,
    };
    Some(speed)
}
