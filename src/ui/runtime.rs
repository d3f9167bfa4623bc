//! The main loop: draw, input, dispatch.
//!
//! Each cycle runs three phases. Draw: skipped entirely while the output
//! is suspended; otherwise the document is clear-and-drawn when a redraw
//! is due (and the cycle is not carrying a redraw key), every label runs,
//! and the device is flushed if requested. Input: skipped when an
//! imaginary key is carried over from the previous cycle; the timeout is
//! reset after any read except a redraw. Dispatch: the active window (or
//! the external command callback) maps the key to the next window.
//!
//! The document window is repainted lazily: overlays draw on top of it and
//! stay until something requests a redraw. Only the document window may
//! raise the redraw flag from its handler; every other window goes through
//! the refresh reply, which redraws the document first and then calls the
//! window back with the refresh key so it can repaint itself on top.
//!
//! Every non-document window receives exactly one init key when entered
//! and one finish key when left; the finish return value is ignored.

use crate::device::{Canvas, Device, InputBuffer, Key, UiFont, NO_TIMEOUT};
use crate::geometry::Rect;
use crate::ui::UiContext;

/// What a window handler asks the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowReply<W> {
    /// Activate this window (possibly the current one: no transition).
    To(W),
    /// Redraw the document, then call this window back with
    /// [`Key::Refresh`].
    Refresh,
    /// Leave the main loop.
    Exit,
}

/// The application driven by the main loop: a window set, labels and the
/// document callbacks.
pub trait App {
    /// Window identifier.
    type WindowId: Copy + PartialEq + std::fmt::Debug;

    /// The document window: the fallback window, the only one allowed to
    /// raise the redraw flag directly.
    const DOCUMENT: Self::WindowId;

    /// Dispatch a key to a window.
    fn handle(
        &mut self,
        window: Self::WindowId,
        key: Key,
        canvas: &mut Canvas,
        ui: &mut UiContext,
    ) -> WindowReply<Self::WindowId>;

    /// Paint the document.
    fn draw(&mut self, canvas: &mut Canvas, ui: &mut UiContext);

    /// Run every label; labels decide for themselves whether to paint.
    fn labels(&mut self, canvas: &mut Canvas, ui: &mut UiContext);

    /// The drawable area changed.
    fn resize(&mut self, canvas: &mut Canvas, ui: &mut UiContext);

    /// Reload the document (the reload flag or signal was raised).
    fn update(&mut self, ui: &mut UiContext);

    /// An external command arrived.
    fn external(
        &mut self,
        command: &str,
        window: Self::WindowId,
        canvas: &mut Canvas,
        ui: &mut UiContext,
    ) -> WindowReply<Self::WindowId>;
}

fn resize_ui<A: App, D: Device>(app: &mut A, device: &mut D, ui: &mut UiContext) {
    ui.dest = Rect::new(
        ui.margin,
        ui.margin,
        device.width() - ui.margin,
        device.height() - ui.margin,
    );
    let canvas = device.canvas();
    canvas.set_identity();
    canvas.reset_clip();
    ui.extents = canvas.font_extents();
    app.resize(device.canvas(), ui);
}

/// Run labels once against a throwaway canvas, so show-on-change labels
/// seed their last-shown state without painting anything visible.
fn init_labels<A: App>(app: &mut A, ui: &mut UiContext) {
    let mut temp = Canvas::new(1, 1, UiFont::metrics_only(16.0));
    app.labels(&mut temp, ui);
}

/// Drive the application until a window replies with
/// [`WindowReply::Exit`].
pub fn run<A: App, D: Device>(app: &mut A, device: &mut D, ui: &mut UiContext, first: A::WindowId) {
    let doc = A::DOCUMENT;
    let mut buffer = InputBuffer::default();

    resize_ui(app, device, ui);
    if first != doc && ui.init_labels {
        init_labels(app, ui);
    }

    let mut window = first;
    ui.reload = false;
    ui.redraw = true;
    ui.flush = true;
    ui.timeout = NO_TIMEOUT;
    let mut c = if first == doc { Key::None } else { Key::Init };

    loop {
        log::trace!(
            target: "blockview::ui",
            "cycle window={:?} key={:?} timeout={} redraw={} flush={}",
            window, c, ui.timeout, ui.redraw, ui.flush
        );

        // draw the document and the labels

        let signaled = ui.flags.take_reload();
        if ui.reload || signaled {
            if signaled {
                ui.redraw = true;
            }
            ui.reload = false;
            app.update(ui);
            c = if ui.redraw { Key::Redraw } else { Key::None };
        }
        if !device.is_active() {
            c = Key::None;
        } else if c != Key::Init || ui.redraw {
            if ui.redraw && c != Key::Redraw {
                device.clear();
                ui.redraw = false;
                app.draw(device.canvas(), ui);
            }
            app.labels(device.canvas(), ui);
            if ui.flush {
                device.flush();
                ui.flush = false;
            }
            if ui.reload {
                continue;
            }
        }

        // read input

        let mut pending = false;
        if c == Key::None {
            pending = ui.timeout != NO_TIMEOUT && ui.timeout != 0;
            c = device.input(ui.timeout, &mut buffer);
            if c == Key::Paste || c == Key::External {
                ui.paste = std::mem::take(&mut buffer.text);
            }
            if c != Key::Redraw {
                ui.timeout = NO_TIMEOUT;
            }
            log::trace!(target: "blockview::ui", "input key={:?}", c);
        }
        if matches!(c, Key::Suspend | Key::Signal | Key::None)
            || matches!(c, Key::Function(n) if n == 3 || n == 4)
        {
            c = Key::None;
            continue;
        }
        if c == Key::Redraw && device.double_buffering() && !ui.redraw {
            // the back buffer still holds the image, a flush suffices
            ui.flush = true;
            c = Key::None;
            continue;
        }
        if c == Key::Resize || c == Key::Redraw || pending {
            if c == Key::Resize {
                resize_ui(app, device, ui);
            }
            ui.redraw = true;
            ui.flush = false;
            if pending && c == Key::Timeout {
                ui.timeout = NO_TIMEOUT;
                c = Key::Refresh;
                continue;
            }
            if c == Key::Resize || c == Key::Redraw {
                c = Key::Refresh;
                continue;
            }
        }

        // dispatch to the active window or the external callback

        let reply = if c == Key::External {
            let command = ui.paste.clone();
            app.external(&command, window, device.canvas(), ui)
        } else {
            app.handle(window, c, device.canvas(), ui)
        };
        log::trace!(target: "blockview::ui", "window={:?} reply={:?}", window, reply);
        c = Key::None;

        match reply {
            WindowReply::To(next) if next == window => {}
            WindowReply::Refresh => {
                ui.redraw = true;
                if window == doc {
                    ui.flush = true;
                } else {
                    ui.flush = false;
                    c = Key::Refresh;
                }
            }
            reply => {
                // the outgoing window takes a last look; its reply is
                // ignored
                let _ = app.handle(window, Key::Finish, device.canvas(), ui);
                match reply {
                    WindowReply::Exit => break,
                    WindowReply::To(next) if next == doc => {
                        ui.redraw = true;
                        ui.flush = true;
                        window = doc;
                    }
                    WindowReply::To(next) => {
                        if window != doc {
                            ui.redraw = true;
                        }
                        window = next;
                        c = Key::Init;
                    }
                    WindowReply::Refresh => unreachable!(),
                }
            }
        }
    }

    device.finish();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemoryDevice;
    use crate::signals::SignalFlags;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Win {
        Doc,
        Modal,
    }

    struct TestApp {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl TestApp {
        fn log(&self, s: &str) {
            self.events.borrow_mut().push(s.to_string());
        }
    }

    impl App for TestApp {
        type WindowId = Win;
        const DOCUMENT: Win = Win::Doc;

        fn handle(
            &mut self,
            window: Win,
            key: Key,
            _canvas: &mut Canvas,
            _ui: &mut UiContext,
        ) -> WindowReply<Win> {
            match (window, key) {
                (Win::Doc, Key::Finish) => {
                    self.log("doc:finish");
                    WindowReply::To(Win::Doc)
                }
                (Win::Doc, Key::Char('m')) => WindowReply::To(Win::Modal),
                (Win::Doc, Key::Char('q')) => WindowReply::Exit,
                (Win::Doc, _) => WindowReply::To(Win::Doc),
                (Win::Modal, Key::Init) => {
                    self.log("modal:init");
                    WindowReply::To(Win::Modal)
                }
                (Win::Modal, Key::Finish) => {
                    self.log("modal:finish");
                    WindowReply::To(Win::Modal)
                }
                (Win::Modal, Key::Refresh) => {
                    self.log("modal:refresh");
                    WindowReply::To(Win::Modal)
                }
                (Win::Modal, Key::Char('x')) => WindowReply::Refresh,
                (Win::Modal, Key::Char('d')) => WindowReply::To(Win::Doc),
                (Win::Modal, _) => WindowReply::To(Win::Modal),
            }
        }

        fn draw(&mut self, _canvas: &mut Canvas, _ui: &mut UiContext) {
            self.log("draw");
        }

        fn labels(&mut self, _canvas: &mut Canvas, _ui: &mut UiContext) {
            self.log("labels");
        }

        fn resize(&mut self, _canvas: &mut Canvas, _ui: &mut UiContext) {}

        fn update(&mut self, _ui: &mut UiContext) {
            self.log("update");
        }

        fn external(
            &mut self,
            command: &str,
            _window: Win,
            _canvas: &mut Canvas,
            _ui: &mut UiContext,
        ) -> WindowReply<Win> {
            self.log(&format!("external:{command}"));
            WindowReply::Refresh
        }
    }

    fn run_script(keys: &[Key]) -> Vec<String> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut app = TestApp {
            events: events.clone(),
        };
        let mut device = MemoryDevice::new(320, 240);
        device.push_keys(keys.iter().copied());
        let mut ui = UiContext::new(SignalFlags::new());
        run(&mut app, &mut device, &mut ui, Win::Doc);
        let out = events.borrow().clone();
        out
    }

    #[test]
    fn test_init_and_finish_exactly_once() {
        let events = run_script(&[Key::Char('m'), Key::Char('d')]);
        assert_eq!(events.iter().filter(|e| *e == "modal:init").count(), 1);
        assert_eq!(events.iter().filter(|e| *e == "modal:finish").count(), 1);
        let init = events.iter().position(|e| e == "modal:init").unwrap();
        let finish = events.iter().position(|e| e == "modal:finish").unwrap();
        assert!(init < finish);
    }

    #[test]
    fn test_refresh_redraws_then_reenters() {
        let events = run_script(&[Key::Char('m'), Key::Char('x'), Key::Char('d')]);
        // After the refresh reply: a document draw, then the modal receives
        // the refresh key.
        let refresh = events.iter().position(|e| e == "modal:refresh").unwrap();
        let draw_before = events[..refresh].iter().rev().position(|e| e == "draw");
        assert!(draw_before.is_some(), "no draw before refresh re-entry");
        // And the draw belongs to the refresh cycle, not the initial paint:
        // there are at least two draws by then.
        assert!(events[..refresh].iter().filter(|e| *e == "draw").count() >= 2);
    }

    #[test]
    fn test_document_redraw_on_return() {
        let events = run_script(&[Key::Char('m'), Key::Char('d')]);
        // Returning to the document redraws it: two draws at least (startup
        // and return).
        assert!(events.iter().filter(|e| *e == "draw").count() >= 2);
    }

    #[test]
    fn test_reload_flag_calls_update() {
        let events = {
            let events = Rc::new(RefCell::new(Vec::new()));
            let mut app = TestApp {
                events: events.clone(),
            };
            let mut device = MemoryDevice::new(320, 240);
            device.push_keys([Key::Char('z')]);
            let flags = SignalFlags::new();
            flags.request_reload();
            let mut ui = UiContext::new(flags);
            run(&mut app, &mut device, &mut ui, Win::Doc);
            let out = events.borrow().clone();
            out
        };
        assert_eq!(events[0], "update");
    }

    #[test]
    fn test_labels_run_every_cycle() {
        let events = run_script(&[Key::Char('m'), Key::Char('d')]);
        assert!(events.iter().filter(|e| *e == "labels").count() >= 3);
    }

    #[test]
    fn test_suspended_device_skips_draw() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut app = TestApp {
            events: events.clone(),
        };
        let mut device = MemoryDevice::new(320, 240);
        device.set_active(false);
        device.push_keys([Key::Suspend]);
        let mut ui = UiContext::new(SignalFlags::new());
        // The scripted Suspend is discarded; the script then runs out and
        // reports 'q', which exits.
        run(&mut app, &mut device, &mut ui, Win::Doc);
        assert!(!events.borrow().iter().any(|e| e == "draw"));
    }

    #[test]
    fn test_external_command_dispatch() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut app = TestApp {
            events: events.clone(),
        };
        let mut device = MemoryDevice::new(320, 240);
        device.push(crate::device::ScriptedInput {
            key: Key::External,
            text: "next".to_string(),
        });
        let mut ui = UiContext::new(SignalFlags::new());
        run(&mut app, &mut device, &mut ui, Win::Doc);
        assert!(events.borrow().iter().any(|e| e == "external:next"));
    }
}
