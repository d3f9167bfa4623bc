//! End-to-end scenarios: the viewer driven through the main loop with
//! scripted input on an off-screen device.

use blockview::backend::sim::{SimDocument, SimPage};
use blockview::backend::DocumentBackend;
use blockview::config::Settings;
use blockview::device::{Device, Key, MemoryDevice, ScriptedInput};
use blockview::signals::SignalFlags;
use blockview::ui::{self, UiContext};
use blockview::viewer::{Fit, Viewer, ViewMode, WindowId};

fn two_column_page() -> SimPage {
    let mut page = SimPage::new(612.0, 792.0);
    for line in 0..12 {
        let y = 100.0 + line as f64 * 14.0;
        page = page
            .text_line(50.0, y, "this is the left side column")
            .text_line(320.0, y, "and this the right side one x");
    }
    page
}

fn hello_page() -> SimPage {
    let mut page = SimPage::new(612.0, 792.0);
    for line in 0..12 {
        let y = 100.0 + line as f64 * 14.0;
        if line == 6 {
            page = page.text_line(50.0, y, "here hello appears in the text");
        } else {
            page = page.text_line(50.0, y, "ordinary body text on the page");
        }
    }
    page
}

fn viewer_for(doc: SimDocument) -> (Viewer<SimDocument>, MemoryDevice, UiContext) {
    let device = MemoryDevice::new(640, 480);
    let mut settings = Settings::default();
    settings.tutorial = false;
    settings.distance = 9.0;
    let view = settings.view(device.screen_width(), device.screen_height());
    let viewer = Viewer::open(doc, view).unwrap();
    let ui = UiContext::new(SignalFlags::new());
    (viewer, device, ui)
}

#[test]
fn test_two_column_page_decomposition() {
    let (mut viewer, mut device, mut ui) = viewer_for(SimDocument::new(vec![two_column_page()]));
    // The script runs out immediately and the loop exits on the implied q.
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);

    // Auto mode keeps the two-column decomposition (high inter-overlap).
    assert_eq!(viewer.view.mode, ViewMode::Auto);
    assert_eq!(viewer.pos.textarea.len(), 2);
    assert!(viewer.pos.textarea[0].x1 < 300.0);
    assert!(viewer.pos.textarea[1].x1 > 300.0);
    // The document was painted and flushed at least once.
    assert!(device.clears() >= 1);
    assert!(device.flushes() >= 1);
}

#[test]
fn test_space_advances_through_blocks() {
    let (mut viewer, mut device, mut ui) = viewer_for(SimDocument::new(vec![two_column_page()]));
    // Space under fit=h scrolls down within the block and eventually
    // transitions to the second block.
    device.push_keys(std::iter::repeat(Key::Char(' ')).take(12));
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);
    assert_eq!(viewer.view.fit, Fit::Horizontal);
    assert_eq!(viewer.pos.box_index, 1);
}

#[test]
fn test_search_window_with_paste() {
    // Scenario: open search, type "he", paste "llo", Enter. The field
    // submits "hello" and the viewer jumps to the match on page 2.
    let pages = vec![two_column_page(), two_column_page(), hello_page()];
    let (mut viewer, mut device, mut ui) = viewer_for(SimDocument::new(pages));
    device.push_keys([Key::Char('/'), Key::Char('h'), Key::Char('e')]);
    device.push(ScriptedInput::paste("llo"));
    device.push_keys([Key::Enter]);
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);

    assert_eq!(viewer.view.search, "hello");
    assert_eq!(viewer.pos.page_index, 2);
    assert!(!viewer.view.found.is_empty());
}

#[test]
fn test_reload_clamps_position() {
    // Scenario: the viewer sits deep in a long document; the file is
    // replaced by a short one and a reload is requested. The next cycle
    // clamps the page and block.
    let mut doc = SimDocument::uniform(20, |_| two_column_page());
    doc.stage_replacement(vec![hello_page(); 5]);
    let (mut viewer, mut device, mut ui) = viewer_for(doc);

    // go to page 16, then request a reload
    device.push_keys([
        Key::Char('g'),
        Key::Char('1'),
        Key::Char('6'),
        Key::Enter,
        Key::Char('r'),
        Key::Home,
    ]);
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);

    assert_eq!(viewer.document().page_count(), 5);
    assert_eq!(viewer.pos.page_index, 4);
    assert!(viewer.pos.box_index < viewer.pos.textarea.len());
}

#[test]
fn test_sighup_flag_reloads() {
    let mut doc = SimDocument::uniform(10, |_| two_column_page());
    doc.stage_replacement(vec![hello_page(); 3]);

    let device = MemoryDevice::new(640, 480);
    let mut settings = Settings::default();
    settings.tutorial = false;
    let view = settings.view(device.screen_width(), device.screen_height());
    let mut viewer = Viewer::open(doc, view).unwrap();

    let flags = SignalFlags::new();
    flags.request_reload();
    let mut ui = UiContext::new(flags);
    let mut device = device;
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);

    assert_eq!(viewer.document().page_count(), 3);
}

#[test]
fn test_tutorial_then_document() {
    let (mut viewer, mut device, mut ui) = viewer_for(SimDocument::new(vec![two_column_page()]));
    // Space leaves the tutorial (a plain list closes on any key).
    device.push_keys([Key::Char(' ')]);
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Tutorial);
    // The implied trailing q exited from the document window.
    assert_eq!(viewer.pos.page_index, 0);
}

#[test]
fn test_menu_changes_view_mode() {
    let (mut viewer, mut device, mut ui) = viewer_for(SimDocument::new(vec![two_column_page()]));
    // m opens the menu, v jumps to the view-mode list, Down selects
    // "text area" from "auto", Enter confirms.
    device.push_keys([
        Key::Char('m'),
        Key::Char('v'),
        Key::Down,
        Key::Enter,
    ]);
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);
    assert_eq!(viewer.view.mode, ViewMode::TextArea);
}

#[test]
fn test_goto_page_invalid_keeps_window() {
    let (mut viewer, mut device, mut ui) = viewer_for(SimDocument::uniform(5, |_| two_column_page()));
    // 99 is out of range: the field reports the error and stays open;
    // Escape then abandons it.
    device.push_keys([
        Key::Char('g'),
        Key::Char('9'),
        Key::Char('9'),
        Key::Enter,
        Key::Escape,
    ]);
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);
    assert_eq!(viewer.pos.page_index, 0);
}

#[test]
fn test_fit_cycle_key() {
    let (mut viewer, mut device, mut ui) = viewer_for(SimDocument::new(vec![two_column_page()]));
    device.push_keys([Key::Char('f')]);
    ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);
    assert_eq!(viewer.view.fit, Fit::Vertical);
}
