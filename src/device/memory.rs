//! Off-screen device with scripted input.
//!
//! Backs the integration tests and the label pre-initialization: draws into
//! a pixmap nobody shows, and replays a prepared input sequence. When the
//! script runs out it reports `q`, so a test loop always terminates.

use crate::device::canvas::Canvas;
use crate::device::font::UiFont;
use crate::device::{Device, InputBuffer, Key, TimeoutMs};

/// One scripted input event.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    /// The key to report.
    pub key: Key,
    /// Text delivered with it (paste or external command).
    pub text: String,
}

impl ScriptedInput {
    /// A bare key.
    pub fn key(key: Key) -> Self {
        Self {
            key,
            text: String::new(),
        }
    }

    /// A paste of the given text.
    pub fn paste(text: &str) -> Self {
        Self {
            key: Key::Paste,
            text: text.to_string(),
        }
    }
}

/// An off-screen device.
pub struct MemoryDevice {
    canvas: Canvas,
    inputs: std::collections::VecDeque<ScriptedInput>,
    active: bool,
    flushes: usize,
    clears: usize,
}

impl MemoryDevice {
    /// Create a device with an empty input script.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width, height, UiFont::metrics_only(16.0)),
            inputs: std::collections::VecDeque::new(),
            active: true,
            flushes: 0,
            clears: 0,
        }
    }

    /// Append keys to the input script.
    pub fn push_keys<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
        self.inputs.extend(keys.into_iter().map(ScriptedInput::key));
    }

    /// Append characters to the input script.
    pub fn type_str(&mut self, s: &str) {
        self.push_keys(s.chars().map(Key::Char));
    }

    /// Append a scripted event.
    pub fn push(&mut self, input: ScriptedInput) {
        self.inputs.push_back(input);
    }

    /// Simulate VT switch-out/in.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Number of flushes so far.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Number of clears so far.
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Device for MemoryDevice {
    fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    fn width(&self) -> f64 {
        self.canvas.width()
    }

    fn height(&self) -> f64 {
        self.canvas.height()
    }

    fn screen_width(&self) -> f64 {
        self.canvas.width()
    }

    fn screen_height(&self) -> f64 {
        self.canvas.height()
    }

    fn double_buffering(&self) -> bool {
        false
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.canvas.clear(crate::device::rgb(1.0, 1.0, 1.0));
    }

    fn blank(&mut self) {
        self.canvas.clear(crate::device::rgb(0.0, 0.0, 0.0));
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn input(&mut self, _timeout: TimeoutMs, buffer: &mut InputBuffer) -> Key {
        match self.inputs.pop_front() {
            Some(input) => {
                buffer.text = input.text;
                input.key
            }
            None => Key::Char('q'),
        }
    }

    fn finish(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_replay_and_exhaustion() {
        let mut dev = MemoryDevice::new(80, 60);
        dev.type_str("hi");
        dev.push(ScriptedInput::paste("llo"));
        let mut buf = InputBuffer::default();
        assert_eq!(dev.input(-1, &mut buf), Key::Char('h'));
        assert_eq!(dev.input(-1, &mut buf), Key::Char('i'));
        assert_eq!(dev.input(-1, &mut buf), Key::Paste);
        assert_eq!(buf.text, "llo");
        assert_eq!(dev.input(-1, &mut buf), Key::Char('q'));
    }
}
