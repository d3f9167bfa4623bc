//! The windows: document, menus, fields.
//!
//! Each window preprocesses its key, calls a UI primitive, and maps the
//! outcome to the next window. The document window draws nothing itself
//! (the main loop paints the document) and handles the navigation keys.

use crate::backend::DocumentBackend;
use crate::device::{Canvas, Key, NO_TIMEOUT};
use crate::ui::{ListOutcome, Outcome, UiContext, WindowReply};
use crate::viewer::position::first_block;
use crate::viewer::view::Fit;
use crate::viewer::{Viewer, WindowId};

/// Route a key to the active window.
pub(crate) fn dispatch<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    window: WindowId,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    match window {
        WindowId::Document => document(viewer, key, ui),
        WindowId::Help => help(viewer, key, canvas, ui),
        WindowId::Tutorial => tutorial(viewer, key, canvas, ui),
        WindowId::Menu => menu(viewer, key, canvas, ui),
        WindowId::GotoPage => goto_page(viewer, key, canvas, ui),
        WindowId::Search => search(viewer, key, canvas, ui),
        WindowId::ViewMode => view_mode(viewer, key, canvas, ui),
        WindowId::FitDirection => fit_direction(viewer, key, canvas, ui),
        WindowId::Order => order(viewer, key, canvas, ui),
        WindowId::Width => min_width(viewer, key, canvas, ui),
        WindowId::Distance => distance(viewer, key, canvas, ui),
    }
}

fn document<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    match key {
        Key::Init | Key::Timeout | Key::Redraw | Key::Resize | Key::Refresh | Key::Finish => {
            return WindowReply::To(WindowId::Document)
        }
        Key::Char('q') | Key::Exit => return WindowReply::Exit,
        Key::Char('h') => return WindowReply::To(WindowId::Help),
        Key::Char('m') => return WindowReply::To(WindowId::Menu),
        Key::Char('g') => return WindowReply::To(WindowId::GotoPage),
        Key::Char('w') => return WindowReply::To(WindowId::Width),
        Key::Char('t') => return WindowReply::To(WindowId::Distance),
        Key::Char('o') => return WindowReply::To(WindowId::Order),
        Key::Char('/') => {
            viewer.view.forward = true;
            return WindowReply::To(WindowId::Search);
        }
        Key::Char('?') => {
            viewer.view.forward = false;
            return WindowReply::To(WindowId::Search);
        }
        Key::Char('r') => ui.reload = true,
        Key::Char('n') => {
            viewer.view.forward = true;
            viewer.next_match(ui);
        }
        Key::Char('p') => {
            viewer.view.forward = false;
            viewer.next_match(ui);
        }
        Key::Char(' ') => match viewer.view.fit {
            Fit::Horizontal => viewer.scroll_down(ui),
            Fit::Vertical => viewer.scroll_right(ui),
            _ => viewer.next_block(ui),
        },
        Key::Down => viewer.scroll_down(ui),
        Key::Up => viewer.scroll_up(ui),
        Key::Left => viewer.scroll_left(ui),
        Key::Right => viewer.scroll_right(ui),
        Key::Home => viewer.first_block(ui),
        Key::End => viewer.last_block(ui),
        Key::PageDown => viewer.next_page(ui),
        Key::PageUp => viewer.prev_page(ui),
        Key::Char('v') => {
            viewer.view.mode = viewer.view.mode.next();
            viewer.pos.box_index = 0;
            viewer.read_page(ui);
            first_block(&mut viewer.pos, &viewer.view, &ui.dest);
        }
        Key::Char('f') => {
            viewer.view.fit = viewer.view.fit.next();
            viewer.pos.scroll_x = 0.0;
            viewer.pos.scroll_y = 0.0;
        }
        Key::Char('z') => {
            if viewer.view.min_width > 0.0 {
                viewer.view.min_width -= 10.0;
                match viewer.view.fit {
                    Fit::Horizontal | Fit::Both => viewer.pos.scroll_x = 0.0,
                    Fit::Vertical => viewer.pos.scroll_y = 0.0,
                    Fit::None => {}
                }
            }
        }
        Key::Char('Z') => {
            if !viewer.boundingbox_in_screen(ui) {
                viewer.view.min_width += 10.0;
            }
        }
        Key::Char('s') => {
            ui.timeout = 3000;
            viewer.view.show_page_number = true;
            viewer.view.show_mode = true;
            viewer.view.show_fit = true;
            viewer.view.show_filename = true;
        }
        _ => {}
    }

    ui.redraw = true;
    ui.flush = true;
    WindowReply::To(WindowId::Document)
}

const HELP_TEXT: &[&str] = &[
    "blockview - pdf viewer with autozoom to text",
    "PageUp     previous page",
    "PageDown   next page",
    "Home       top of page",
    "End        bottom of page",
    "m          main menu",
    "v          change view mode:",
    "           textarea, boundingbox, page",
    "f          change fitting direction:",
    "           horizontal, vertical, both",
    "w z Z      minimal width: set, -, +",
    "           (determines the maximal zoom)",
    "t          text-to-text distance",
    "o          order of the blocks of text",
    "g          go to page",
    "/ ?        search forward or backward",
    "n p        next or previous search match",
    "s          show current mode and page",
    "r          reload the current document",
    "h          help",
    "q          quit",
    "",
    "any key to continue",
];

fn help<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    match viewer.help_list.handle(key, ui, canvas, HELP_TEXT, false) {
        ListOutcome::Kept => WindowReply::To(WindowId::Help),
        _ => WindowReply::To(WindowId::Document),
    }
}

fn tutorial<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    if key == Key::Char('h') {
        return WindowReply::To(WindowId::Help);
    }
    let cursor = match viewer.view.fit {
        Fit::Horizontal => "move by cursor Up/Down and PageUp/PageDown",
        Fit::Vertical => "move by cursor Left/Right and PageUp/PageDown",
        _ => "move by cursor and PageUp/PageDown",
    };
    let items = [
        "blockview - pdf viewer with autozoom to text",
        "blockview displays a block of text at time",
        "the current block is bordered in blue",
        "",
        "zoom is automatic",
        cursor,
        "",
        "key h for help",
        "key m for menu",
        "key v for whole page view",
        "",
        "space bar to view document",
    ];
    match viewer.tutorial_list.handle(key, ui, canvas, &items, false) {
        ListOutcome::Kept => WindowReply::To(WindowId::Tutorial),
        _ => WindowReply::To(WindowId::Document),
    }
}

const MENU_TEXT: &[&str] = &[
    "blockview - menu",
    "(g) go to page",
    "(/) search",
    "(v) view mode",
    "(f) fit direction",
    "(w) minimal width",
    "(t) text distance",
    "(o) block order",
    "(h) help",
    "(q) quit",
];

const MENU_SHORTCUTS: &str = "g/vfwtohq";

const MENU_TARGETS: &[WindowId] = &[
    WindowId::GotoPage,
    WindowId::Search,
    WindowId::ViewMode,
    WindowId::FitDirection,
    WindowId::Width,
    WindowId::Distance,
    WindowId::Order,
    WindowId::Help,
];

fn menu<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    if key == Key::Init {
        viewer.menu_list.select(1);
    }

    let selected = match key {
        Key::Char(c) if MENU_SHORTCUTS.contains(c) => {
            MENU_SHORTCUTS.chars().position(|s| s == c).map(|i| i + 1)
        }
        _ => match viewer.menu_list.handle(key, ui, canvas, MENU_TEXT, true) {
            ListOutcome::Kept => return WindowReply::To(WindowId::Menu),
            ListOutcome::Closed => None,
            ListOutcome::Selected(i) => Some(i),
        },
    };

    match selected {
        None => WindowReply::To(WindowId::Document),
        Some(i) if i <= MENU_TARGETS.len() => WindowReply::To(MENU_TARGETS[i - 1]),
        Some(i) if i == MENU_TARGETS.len() + 1 => WindowReply::Exit,
        Some(_) => {
            viewer.view.help = "unimplemented".to_string();
            WindowReply::To(WindowId::Document)
        }
    }
}

fn goto_page<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    let total = viewer.doc.page_count() as f64;
    let key = match key {
        Key::Init => {
            viewer.view.help =
                "c=current l=last up=previous down=next enter=go".to_string();
            Key::Redraw
        }
        Key::PageUp => Key::Up,
        Key::PageDown => Key::Down,
        Key::Char('c') => {
            viewer
                .goto_field
                .set_text(&format!("{}", viewer.pos.page_index + 1));
            Key::Redraw
        }
        Key::Char('l') => {
            viewer.goto_field.set_text(&format!("{}", total as usize));
            Key::Redraw
        }
        other => other,
    };

    let mut n = (viewer.pos.page_index + 1) as f64;
    let res = viewer
        .goto_field
        .handle(key, ui, canvas, "go to page: ", None, &mut n, 1.0, total);
    match res {
        Outcome::Done => {
            let target = n as usize - 1;
            if viewer.pos.page_index != target {
                viewer.pos.page_index = target;
                viewer.read_page(ui);
                first_block(&mut viewer.pos, &viewer.view, &ui.dest);
            }
            if viewer.view.immediate {
                return WindowReply::Refresh;
            }
            viewer.goto_field.clear();
            WindowReply::To(WindowId::Document)
        }
        Outcome::Leave => {
            viewer.goto_field.clear();
            WindowReply::To(WindowId::Document)
        }
        Outcome::Invalid => {
            let mut n = (viewer.pos.page_index + 1) as f64;
            let _ = viewer.goto_field.handle(
                Key::Redraw,
                ui,
                canvas,
                "go to page: ",
                Some("no such page"),
                &mut n,
                1.0,
                total,
            );
            WindowReply::To(WindowId::GotoPage)
        }
        _ => WindowReply::To(WindowId::GotoPage),
    }
}

fn search<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    let res = viewer.search_field.handle(key, ui, canvas, "find: ", None);

    match res {
        Outcome::Leave => {
            viewer.search_field.clear();
            WindowReply::To(WindowId::Document)
        }
        Outcome::Done => {
            viewer.view.search = viewer.search_field.text();
            if viewer.view.search.is_empty() {
                viewer.page_match();
                return WindowReply::To(WindowId::Document);
            }
            if viewer.first_match(ui).is_none() {
                let _ = viewer
                    .search_field
                    .handle(Key::Redraw, ui, canvas, "find: ", Some("no match"));
                return WindowReply::To(WindowId::Search);
            }
            viewer.search_field.clear();
            viewer.view.help = "n=next matches p=previous matches".to_string();
            ui.timeout = 2000;
            WindowReply::To(WindowId::Document)
        }
        _ => WindowReply::To(WindowId::Search),
    }
}

fn view_mode<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    const ITEMS: &[&str] = &["view mode", "auto", "text area", "boundingbox", "page"];
    if key == Key::Init {
        let current = match viewer.view.mode {
            crate::viewer::ViewMode::Auto => 1,
            crate::viewer::ViewMode::TextArea => 2,
            crate::viewer::ViewMode::BoundingBox => 3,
            crate::viewer::ViewMode::Page => 4,
        };
        viewer.mode_list.select(current);
    }
    match viewer.mode_list.handle(key, ui, canvas, ITEMS, true) {
        ListOutcome::Kept => WindowReply::To(WindowId::ViewMode),
        ListOutcome::Closed => WindowReply::To(WindowId::Document),
        ListOutcome::Selected(i) => {
            viewer.view.mode = match i {
                1 => crate::viewer::ViewMode::Auto,
                2 => crate::viewer::ViewMode::TextArea,
                3 => crate::viewer::ViewMode::BoundingBox,
                _ => crate::viewer::ViewMode::Page,
            };
            viewer.refresh_area();
            first_block(&mut viewer.pos, &viewer.view, &ui.dest);
            if viewer.view.immediate {
                WindowReply::Refresh
            } else {
                WindowReply::To(WindowId::Document)
            }
        }
    }
}

fn fit_direction<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    const ITEMS: &[&str] = &["fit direction", "none", "horizontal", "vertical", "both"];
    if key == Key::Init {
        let current = match viewer.view.fit {
            Fit::None => 1,
            Fit::Horizontal => 2,
            Fit::Vertical => 3,
            Fit::Both => 4,
        };
        viewer.fit_list.select(current);
    }
    match viewer.fit_list.handle(key, ui, canvas, ITEMS, true) {
        ListOutcome::Kept => WindowReply::To(WindowId::FitDirection),
        ListOutcome::Closed => WindowReply::To(WindowId::Document),
        ListOutcome::Selected(i) => {
            viewer.view.fit = match i {
                1 => Fit::None,
                2 => Fit::Horizontal,
                3 => Fit::Vertical,
                _ => Fit::Both,
            };
            first_block(&mut viewer.pos, &viewer.view, &ui.dest);
            if viewer.view.immediate {
                WindowReply::Refresh
            } else {
                WindowReply::To(WindowId::Document)
            }
        }
    }
}

fn order<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    const ITEMS: &[&str] = &["block ordering algorithm", "quick", "two-step", "char"];
    if key == Key::Init {
        let current = match viewer.view.order {
            crate::geometry::BlockOrder::Quick => 1,
            crate::geometry::BlockOrder::TwoStep => 2,
            crate::geometry::BlockOrder::CharStream => 3,
        };
        viewer.order_list.select(current);
    }
    match viewer.order_list.handle(key, ui, canvas, ITEMS, true) {
        ListOutcome::Kept => WindowReply::To(WindowId::Order),
        ListOutcome::Closed => WindowReply::To(WindowId::Document),
        ListOutcome::Selected(i) => {
            viewer.view.order = match i {
                1 => crate::geometry::BlockOrder::Quick,
                2 => crate::geometry::BlockOrder::TwoStep,
                _ => crate::geometry::BlockOrder::CharStream,
            };
            viewer.refresh_area();
            first_block(&mut viewer.pos, &viewer.view, &ui.dest);
            if viewer.view.immediate {
                WindowReply::Refresh
            } else {
                WindowReply::To(WindowId::Document)
            }
        }
    }
}

fn min_width<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    if key == Key::Init {
        viewer.view.help = "up=increase down=decrease enter=set".to_string();
    }
    let mut value = viewer.view.min_width;
    let res = viewer.width_field.handle(
        key,
        ui,
        canvas,
        "minimal width: ",
        None,
        &mut value,
        0.0,
        1000.0,
    );
    match res {
        Outcome::Done => {
            viewer.view.min_width = value;
            viewer.read_page(ui);
            first_block(&mut viewer.pos, &viewer.view, &ui.dest);
            if viewer.view.immediate {
                WindowReply::Refresh
            } else {
                WindowReply::To(WindowId::Document)
            }
        }
        Outcome::Leave => WindowReply::To(WindowId::Document),
        _ => WindowReply::To(WindowId::Width),
    }
}

fn distance<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    key: Key,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    if key == Key::Init {
        viewer.view.help = "up=increase down=decrease enter=set".to_string();
    }
    let mut value = viewer.view.distance;
    let res = viewer.distance_field.handle(
        key,
        ui,
        canvas,
        "text distance: ",
        None,
        &mut value,
        0.0,
        1000.0,
    );
    match res {
        Outcome::Done => {
            viewer.view.distance = value;
            viewer.read_page(ui);
            first_block(&mut viewer.pos, &viewer.view, &ui.dest);
            if viewer.view.immediate {
                WindowReply::Refresh
            } else {
                WindowReply::To(WindowId::Document)
            }
        }
        Outcome::Leave => WindowReply::To(WindowId::Document),
        _ => WindowReply::To(WindowId::Distance),
    }
}

/// Dispatch a command from the external channel.
pub(crate) fn external<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    command: &str,
    window: WindowId,
    _canvas: &mut Canvas,
    ui: &mut UiContext,
) -> WindowReply<WindowId> {
    let command = command.trim();
    log::debug!("external command: {command}");
    match command.split_once(' ').unwrap_or((command, "")) {
        ("quit", _) => return WindowReply::Exit,
        ("document", _) => return WindowReply::To(WindowId::Document),
        ("reload", _) => ui.reload = true,
        ("next", _) => viewer.next_page(ui),
        ("previous", _) => viewer.prev_page(ui),
        ("goto", n) => {
            if let Ok(n) = n.trim().parse::<usize>() {
                if n >= 1 && n <= viewer.doc.page_count() {
                    viewer.pos.page_index = n - 1;
                    viewer.read_page(ui);
                    first_block(&mut viewer.pos, &viewer.view, &ui.dest);
                }
            }
        }
        ("search", text) if !text.is_empty() => {
            viewer.view.search = text.to_string();
            viewer.view.forward = true;
            viewer.first_match(ui);
        }
        _ => viewer.view.help = "unknown command".to_string(),
    }
    let _ = window;
    if ui.timeout == NO_TIMEOUT && !viewer.view.help.is_empty() {
        ui.timeout = 1200;
    }
    WindowReply::Refresh
}
