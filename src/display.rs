//! Presentation surface and operator commands.
//!
//! The viewer talks to a `DisplaySurface`: it presents overlaid frames and
//! polls for keyboard commands with a bounded wait.
//!
//! `TerminalSurface` (Linux) is the shipped surface:
//! - Status line with frame count and size (see `ui`)
//! - Optional preview JPEG rewritten atomically on every frame, for any image
//!   viewer that reloads on change
//! - Single-key commands read from stdin in non-canonical mode
//! - Ctrl-C reported as a quit command through a shared flag

use anyhow::Result;
use std::time::Duration;

use crate::decode::DecodedImage;

#[cfg(target_os = "linux")]
pub use terminal::TerminalSurface;

/// Operator keyboard commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorCommand {
    Quit,
    Save,
}

const KEY_QUIT: u8 = b'q';
const KEY_SAVE: u8 = b's';

impl OperatorCommand {
    /// Map a key code; anything unrecognized is ignored.
    pub fn from_key(key: u8) -> Option<Self> {
        match key.to_ascii_lowercase() {
            KEY_QUIT => Some(OperatorCommand::Quit),
            KEY_SAVE => Some(OperatorCommand::Save),
            _ => None,
        }
    }

    /// First recognized command in a burst of key presses.
    pub fn from_keys(keys: &[u8]) -> Option<Self> {
        keys.iter().find_map(|&key| Self::from_key(key))
    }
}

pub trait DisplaySurface {
    fn present(&mut self, image: &DecodedImage) -> Result<()>;

    /// Wait at most `wait` for an operator command.
    fn poll_command(&mut self, wait: Duration) -> Result<Option<OperatorCommand>>;
}

#[cfg(target_os = "linux")]
mod terminal {
    use anyhow::{Context, Result};
    use image::ImageFormat;
    use std::io;
    use std::os::fd::RawFd;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::{DisplaySurface, OperatorCommand};
    use crate::decode::DecodedImage;
    use crate::ui::{StatusLine, UiMode};

    const STDIN_FD: RawFd = libc::STDIN_FILENO;

    pub struct TerminalSurface {
        status: StatusLine,
        preview: Option<PathBuf>,
        shutdown: Arc<AtomicBool>,
        _raw: Option<RawStdin>,
        stdin_open: bool,
        frames: u64,
    }

    impl TerminalSurface {
        /// Set up the surface. `shutdown` is raised by the Ctrl-C handler.
        pub fn new(
            title: &str,
            mode: UiMode,
            preview: Option<PathBuf>,
            shutdown: Arc<AtomicBool>,
        ) -> Result<Self> {
            // SAFETY: isatty only inspects the descriptor.
            let stdin_tty = unsafe { libc::isatty(STDIN_FD) } == 1;
            // SAFETY: as above.
            let stderr_tty = unsafe { libc::isatty(libc::STDERR_FILENO) } == 1;
            let raw = if stdin_tty {
                Some(RawStdin::enable().context("switch stdin to single-key mode")?)
            } else {
                None
            };
            if let Some(path) = &preview {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("create preview directory {}", parent.display())
                    })?;
                }
            }

            let status = StatusLine::new(title, mode, stderr_tty);
            status.println("Streaming... press S to save, Q to quit");
            Ok(Self {
                status,
                preview,
                shutdown,
                _raw: raw,
                stdin_open: true,
                frames: 0,
            })
        }

        fn read_keys(&mut self, wait: Duration) -> Result<Vec<u8>> {
            if !self.stdin_open {
                std::thread::sleep(wait);
                return Ok(Vec::new());
            }
            let mut pfd = libc::pollfd {
                fd: STDIN_FD,
                events: libc::POLLIN,
                revents: 0,
            };
            let ms = wait.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
            // SAFETY: pfd points to one valid pollfd.
            let rc = unsafe { libc::poll(&mut pfd, 1, ms) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    return Ok(Vec::new());
                }
                return Err(err).context("poll stdin");
            }
            if rc == 0 {
                return Ok(Vec::new());
            }

            let mut buf = [0u8; 32];
            // SAFETY: buf is a valid writable region of buf.len() bytes.
            let n = unsafe {
                libc::read(STDIN_FD, buf.as_mut_ptr() as *mut libc::c_void, buf.len())
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                return match err.kind() {
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(Vec::new()),
                    _ => Err(err).context("read stdin"),
                };
            }
            if n == 0 {
                log::debug!("stdin closed; keyboard commands disabled");
                self.stdin_open = false;
                return Ok(Vec::new());
            }
            Ok(buf[..n as usize].to_vec())
        }
    }

    impl DisplaySurface for TerminalSurface {
        fn present(&mut self, image: &DecodedImage) -> Result<()> {
            self.frames += 1;
            self.status.update(format!(
                "frame #{} {}x{}",
                self.frames,
                image.width(),
                image.height()
            ));
            if let Some(path) = &self.preview {
                write_preview(image, path)?;
            }
            Ok(())
        }

        fn poll_command(&mut self, wait: Duration) -> Result<Option<OperatorCommand>> {
            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(Some(OperatorCommand::Quit));
            }
            let keys = self.read_keys(wait)?;
            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(Some(OperatorCommand::Quit));
            }
            Ok(OperatorCommand::from_keys(&keys))
        }
    }

    /// Replace the preview file without exposing a half-written image.
    fn write_preview(image: &DecodedImage, path: &Path) -> Result<()> {
        let tmp = path.with_extension("partial");
        image
            .save_with_format(&tmp, ImageFormat::Jpeg)
            .with_context(|| format!("write preview {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("publish preview {}", path.display()))?;
        Ok(())
    }

    /// Non-canonical, no-echo stdin for the lifetime of the guard.
    struct RawStdin {
        original: libc::termios,
    }

    impl RawStdin {
        fn enable() -> io::Result<Self> {
            // SAFETY: termios is plain old data; tcgetattr fills it before use.
            let mut original: libc::termios = unsafe { std::mem::zeroed() };
            // SAFETY: STDIN_FD is open and original is writable.
            if unsafe { libc::tcgetattr(STDIN_FD, &mut original) } != 0 {
                return Err(io::Error::last_os_error());
            }
            let mut raw = original;
            raw.c_lflag &= !(libc::ICANON | libc::ECHO);
            raw.c_cc[libc::VMIN] = 0;
            raw.c_cc[libc::VTIME] = 0;
            // SAFETY: raw is a fully initialised termios.
            if unsafe { libc::tcsetattr(STDIN_FD, libc::TCSANOW, &raw) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(Self { original })
        }
    }

    impl Drop for RawStdin {
        fn drop(&mut self) {
            // SAFETY: restores the settings captured in enable().
            unsafe {
                libc::tcsetattr(STDIN_FD, libc::TCSANOW, &self.original);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(OperatorCommand::from_key(b'q'), Some(OperatorCommand::Quit));
        assert_eq!(OperatorCommand::from_key(b'Q'), Some(OperatorCommand::Quit));
        assert_eq!(OperatorCommand::from_key(b's'), Some(OperatorCommand::Save));
        assert_eq!(OperatorCommand::from_key(b'S'), Some(OperatorCommand::Save));
        assert_eq!(OperatorCommand::from_key(b'x'), None);
        assert_eq!(OperatorCommand::from_key(0x1b), None);
    }

    #[test]
    fn first_recognized_key_wins() {
        assert_eq!(
            OperatorCommand::from_keys(b"\x1b[As q"),
            Some(OperatorCommand::Save)
        );
        assert_eq!(OperatorCommand::from_keys(b"abc"), None);
    }
}
