//! Terminal device.
//!
//! Presents the canvas in a character terminal: every cell shows two
//! vertically stacked pixels through the upper-half-block glyph, with the
//! top pixel as foreground and the bottom as background. Input, resize and
//! bracketed paste come from crossterm events; the external command channel
//! and the signal flags are polled between event waits.

use std::io::Write;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::{cursor, event, execute, queue, style, terminal};

use crate::device::canvas::Canvas;
use crate::device::font::UiFont;
use crate::device::{Device, InputBuffer, Key, TimeoutMs, NO_TIMEOUT};
use crate::error::{Error, Result};
use crate::signals::SignalFlags;

/// How often the input wait wakes up to look at signal flags and the
/// command channel.
const POLL_SLICE_MS: u64 = 100;

/// Non-blocking reader for the external command fifo.
pub(crate) struct CommandChannel {
    fd: i32,
    partial: Vec<u8>,
}

impl CommandChannel {
    /// Open a fifo (or any readable path) without blocking on it.
    pub(crate) fn open(path: &str) -> Result<Self> {
        let cpath = std::ffi::CString::new(path).map_err(|_| Error::DeviceInit {
            device: path.to_string(),
            reason: "invalid path".to_string(),
        })?;
        // O_RDWR so an idle fifo does not report end-of-file.
        let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_RDWR | libc::O_NONBLOCK) };
        if fd < 0 {
            return Err(Error::DeviceInit {
                device: path.to_string(),
                reason: std::io::Error::last_os_error().to_string(),
            });
        }
        Ok(Self {
            fd,
            partial: Vec::new(),
        })
    }

    /// Return the next newline-terminated command, if one is available.
    pub(crate) fn poll(&mut self) -> Option<String> {
        let mut buf = [0u8; 512];
        loop {
            let n = unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
            if n <= 0 {
                break;
            }
            self.partial.extend_from_slice(&buf[..n as usize]);
        }
        let pos = self.partial.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.partial.drain(..=pos).collect();
        let text = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
        Some(text)
    }
}

impl Drop for CommandChannel {
    fn drop(&mut self) {
        unsafe { libc::close(self.fd) };
    }
}

/// Map a crossterm key event to the viewer's key set.
pub(crate) fn map_key(key: KeyEvent) -> Key {
    if key.kind == KeyEventKind::Release {
        return Key::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Key::Exit;
    }
    match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::F(n) => Key::Function(n),
        _ => Key::None,
    }
}

/// Shared input wait for terminal-driven devices.
///
/// Order of checks per wake-up, matching the reference device: external
/// command first, then suspend, then pending redraw, then actual events,
/// then timeout.
pub(crate) struct EventReader {
    pub(crate) command: Option<CommandChannel>,
    pub(crate) flags: SignalFlags,
}

impl EventReader {
    pub(crate) fn wait(&mut self, timeout: TimeoutMs, buffer: &mut InputBuffer) -> InputEvent {
        let deadline = if timeout > 0 {
            Some(Instant::now() + Duration::from_millis(timeout as u64))
        } else {
            None
        };
        loop {
            if let Some(channel) = &mut self.command {
                if let Some(line) = channel.poll() {
                    buffer.text = line;
                    return InputEvent::Key(Key::External);
                }
            }
            if self.flags.suspended() && timeout != 0 {
                return InputEvent::Key(Key::Suspend);
            }
            if self.flags.take_redraw() {
                return InputEvent::Key(Key::Redraw);
            }

            let slice = match (timeout, deadline) {
                (0, _) => Duration::from_millis(0),
                (_, Some(d)) => {
                    let now = Instant::now();
                    if now >= d {
                        return InputEvent::Key(Key::Timeout);
                    }
                    (d - now).min(Duration::from_millis(POLL_SLICE_MS))
                }
                (_, None) => Duration::from_millis(POLL_SLICE_MS),
            };

            match event::poll(slice) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        let mapped = map_key(key);
                        if mapped != Key::None {
                            return InputEvent::Key(mapped);
                        }
                    }
                    Ok(Event::Resize(cols, rows)) => return InputEvent::Resize(cols, rows),
                    Ok(Event::Paste(text)) => {
                        buffer.text = text;
                        return InputEvent::Key(Key::Paste);
                    }
                    Ok(_) => {}
                    Err(_) => return InputEvent::Key(Key::Signal),
                },
                Ok(false) => {
                    if timeout == 0 {
                        return InputEvent::Key(Key::Timeout);
                    }
                    if let Some(d) = deadline {
                        if Instant::now() >= d {
                            return InputEvent::Key(Key::Timeout);
                        }
                    }
                }
                Err(_) => return InputEvent::Key(Key::Signal),
            }
        }
    }
}

pub(crate) enum InputEvent {
    Key(Key),
    Resize(u16, u16),
}

/// The terminal device.
pub struct TerminalDevice {
    canvas: Canvas,
    reader: EventReader,
    cols: u16,
    rows: u16,
    finished: bool,
}

impl TerminalDevice {
    /// Enter raw mode and the alternate screen. A non-positive
    /// `font_size` selects the default (one twenty-fifth of the screen
    /// height).
    pub fn open(
        command_path: Option<&str>,
        font_size: f64,
        flags: SignalFlags,
    ) -> Result<TerminalDevice> {
        terminal::enable_raw_mode().map_err(|e| Error::DeviceInit {
            device: "terminal".to_string(),
            reason: e.to_string(),
        })?;
        let mut out = std::io::stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            event::EnableBracketedPaste,
            cursor::Hide
        )
        .map_err(|e| Error::DeviceInit {
            device: "terminal".to_string(),
            reason: e.to_string(),
        })?;

        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        let command = match command_path {
            Some(path) => Some(CommandChannel::open(path)?),
            None => None,
        };
        let font_size = if font_size > 0.0 {
            font_size
        } else {
            (rows as f64 * 2.0) / 25.0
        };
        let font = UiFont::monospace(font_size);
        Ok(TerminalDevice {
            canvas: Canvas::new(cols as u32, rows as u32 * 2, font),
            reader: EventReader { command, flags },
            cols,
            rows,
            finished: false,
        })
    }
}

impl Device for TerminalDevice {
    fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    fn width(&self) -> f64 {
        self.cols as f64
    }

    fn height(&self) -> f64 {
        self.rows as f64 * 2.0
    }

    fn screen_width(&self) -> f64 {
        self.width()
    }

    fn screen_height(&self) -> f64 {
        self.height()
    }

    fn double_buffering(&self) -> bool {
        true
    }

    fn clear(&mut self) {
        self.canvas.clear(crate::device::rgb(1.0, 1.0, 1.0));
    }

    fn blank(&mut self) {
        self.canvas.clear(crate::device::rgb(0.0, 0.0, 0.0));
    }

    fn flush(&mut self) {
        let mut out = std::io::stdout();
        let pixmap = self.canvas.pixmap();
        let width = pixmap.width().min(self.cols as u32);
        let mut last: Option<(style::Color, style::Color)> = None;
        for row in 0..self.rows.min((pixmap.height() / 2) as u16) {
            if queue!(out, cursor::MoveTo(0, row)).is_err() {
                return;
            }
            for x in 0..width {
                let top = pixmap.pixel(x, row as u32 * 2);
                let bottom = pixmap.pixel(x, row as u32 * 2 + 1);
                let fg = top
                    .map(|p| style::Color::Rgb {
                        r: p.red(),
                        g: p.green(),
                        b: p.blue(),
                    })
                    .unwrap_or(style::Color::Black);
                let bg = bottom
                    .map(|p| style::Color::Rgb {
                        r: p.red(),
                        g: p.green(),
                        b: p.blue(),
                    })
                    .unwrap_or(style::Color::Black);
                if last != Some((fg, bg)) {
                    let _ = queue!(
                        out,
                        style::SetForegroundColor(fg),
                        style::SetBackgroundColor(bg)
                    );
                    last = Some((fg, bg));
                }
                let _ = queue!(out, style::Print('\u{2580}'));
            }
        }
        let _ = queue!(out, style::ResetColor);
        let _ = out.flush();
    }

    fn is_active(&self) -> bool {
        !self.reader.flags.suspended()
    }

    fn input(&mut self, timeout: TimeoutMs, buffer: &mut InputBuffer) -> Key {
        debug_assert!(timeout >= NO_TIMEOUT);
        match self.reader.wait(timeout, buffer) {
            InputEvent::Key(key) => key,
            InputEvent::Resize(cols, rows) => {
                self.cols = cols;
                self.rows = rows;
                self.canvas.resize(cols as u32, rows as u32 * 2);
                Key::Resize
            }
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let mut out = std::io::stdout();
        let _ = execute!(
            out,
            style::ResetColor,
            cursor::Show,
            event::DisableBracketedPaste,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for TerminalDevice {
    fn drop(&mut self) {
        self.finish();
    }
}
