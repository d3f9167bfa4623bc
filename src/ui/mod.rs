//! Overlay user interface: primitives and the main loop.
//!
//! Windows receive input, labels do not. A window preprocesses the key if
//! needed, delegates to one of the generic primitives (field, number,
//! list, rectangle), and maps the primitive's outcome to the next window.
//! The main loop in [`runtime`] owns the draw/input/dispatch cycle and the
//! redraw/flush discipline.

pub mod field;
pub mod label;
pub mod list;
pub mod number;
pub mod rectangle;
pub mod runtime;

pub use field::FieldState;
pub use label::draw_label;
pub use list::{ListOutcome, ListState};
pub use number::NumberState;
pub use rectangle::RectangleEditor;
pub use runtime::{run, App, WindowReply};

use crate::device::{FontExtents, TimeoutMs, NO_TIMEOUT};
use crate::geometry::Rect;
use crate::signals::SignalFlags;

/// Return protocol of the UI primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Input accepted (Enter).
    Done,
    /// Abandoned (Escape).
    Leave,
    /// Input rejected by validation; the primitive stays open.
    Invalid,
    /// The key changed nothing.
    Unchanged,
    /// State changed and was repainted.
    Changed,
    /// The caller must request a document redraw and call back.
    Refresh,
}

/// Shared state of the interface, passed to every window and label.
pub struct UiContext {
    /// The drawable area minus the margin, in device coordinates.
    pub dest: Rect,
    /// Margin around the drawable area.
    pub margin: f64,
    /// Metrics of the UI font.
    pub extents: FontExtents,
    /// Whether the output must be flushed after this cycle's drawing.
    pub flush: bool,
    /// Whether the document must be repainted. Only the document window
    /// may raise this from its handler.
    pub redraw: bool,
    /// Whether the document must be reloaded before the next cycle.
    pub reload: bool,
    /// Timeout for the next input wait.
    pub timeout: TimeoutMs,
    /// Pasted text or external command, from the device.
    pub paste: String,
    /// Run the labels once invisibly before a modal first window, so
    /// show-on-change labels do not fire on the first real paint.
    pub init_labels: bool,
    /// Signal flags consulted at the top of each cycle.
    pub flags: SignalFlags,
}

impl UiContext {
    /// A context over the given signal flags.
    pub fn new(flags: SignalFlags) -> Self {
        Self {
            dest: Rect::default(),
            margin: 10.0,
            extents: FontExtents {
                ascent: 0.0,
                descent: 0.0,
                height: 1.0,
                max_x_advance: 1.0,
            },
            flush: false,
            redraw: false,
            reload: false,
            timeout: NO_TIMEOUT,
            paste: String::new(),
            init_labels: true,
            flags,
        }
    }
}
