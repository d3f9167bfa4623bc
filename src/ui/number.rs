//! Numeric field.
//!
//! Wraps [`FieldState`] with numeric validation: only digits pass through,
//! a leading minus is accepted when the range allows negatives, and the
//! arrow keys step the value within the range. On Enter the parsed value
//! is written to the destination, or [`Outcome::Invalid`] is reported when
//! out of range.

use crate::device::{Canvas, Key};
use crate::ui::{FieldState, Outcome, UiContext};

/// A textfield editing one number.
#[derive(Debug, Clone, Default)]
pub struct NumberState {
    field: FieldState,
}

impl NumberState {
    /// An empty numeric field.
    pub fn new() -> Self {
        Self::default()
    }

    /// The inner field content.
    pub fn text(&self) -> String {
        self.field.text()
    }

    /// Empty the field.
    pub fn clear(&mut self) {
        self.field.clear();
    }

    /// Preload the field content.
    pub fn set_text(&mut self, text: &str) {
        self.field.set_text(text);
    }

    /// Process a key. On [`Outcome::Done`] the parsed value has been
    /// written to `destination`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        key: Key,
        ui: &mut UiContext,
        canvas: &mut Canvas,
        prompt: &str,
        error: Option<&str>,
        destination: &mut f64,
        min: f64,
        max: f64,
    ) -> Outcome {
        let key = match key {
            Key::Char('q') => Key::Exit,
            Key::Init => {
                self.field.set_text(&format_number(*destination));
                Key::Init
            }
            Key::Up | Key::Down => {
                let current = self.field.text();
                let mut n: f64 = if current.is_empty() {
                    *destination
                } else {
                    current.parse().unwrap_or(*destination)
                };
                n += if key == Key::Down { 1.0 } else { -1.0 };
                if n < min {
                    if key == Key::Down {
                        n = min;
                    } else {
                        return Outcome::Unchanged;
                    }
                }
                if n > max {
                    if key == Key::Up {
                        n = max;
                    } else {
                        return Outcome::Unchanged;
                    }
                }
                self.field.set_text(&format_number(n));
                Key::Refresh
            }
            Key::Char(c) if c.is_ascii_digit() => key,
            Key::Char('-') if self.field.is_empty() && min < 0.0 => key,
            Key::Char(_) => return Outcome::Unchanged,
            other => other,
        };

        let res = self.field.handle(key, ui, canvas, prompt, error);
        if res != Outcome::Done {
            return res;
        }

        let text = self.field.text();
        if text.is_empty() {
            return Outcome::Leave;
        }
        let n: f64 = match text.parse() {
            Ok(n) => n,
            Err(_) => return Outcome::Invalid,
        };
        if n < min || n > max {
            return Outcome::Invalid;
        }
        *destination = n;
        Outcome::Done
    }
}

fn format_number(n: f64) -> String {
    if n == n.trunc() {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
