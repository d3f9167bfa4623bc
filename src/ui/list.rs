//! Scrollable list of strings.
//!
//! A titled vertical list, optionally with a selected line. Up and Down
//! move the selection (or scroll when nothing is selectable), skipping
//! empty rows; Enter confirms a selection. The list paints a title bar, a
//! clipped scrollable region, and a proportional scrollbar when the rows
//! overflow.

use crate::device::{rgb, Canvas, Key};
use crate::geometry::Rect;
use crate::ui::UiContext;

/// What a key did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// Selection confirmed: the index into the items (1-based, the title
    /// is item 0).
    Selected(usize),
    /// The list was closed.
    Closed,
    /// The key changed nothing worth reporting.
    Kept,
}

/// Scrolling state of a list: the first visible row and the selected one.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    top: usize,
    selected: usize,
}

impl ListState {
    /// A list scrolled to the top with the first row selected.
    pub fn new() -> Self {
        Self {
            top: 0,
            selected: 1,
        }
    }

    /// Set the selected row (1-based).
    pub fn select(&mut self, row: usize) {
        self.selected = row.max(1);
    }

    /// The selected row.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Process a key and repaint. `items[0]` is the title; `selectable`
    /// chooses between selection and plain scrolling.
    pub fn handle(
        &mut self,
        key: Key,
        ui: &mut UiContext,
        canvas: &mut Canvas,
        items: &[&str],
        selectable: bool,
    ) -> ListOutcome {
        if items.len() < 2 {
            return ListOutcome::Closed;
        }
        let n = items.len();
        let rows = n - 1;

        let percent = 0.8;
        let width = ui.dest.width();
        let height = ui.dest.height();
        let margin_x = width * (1.0 - percent) / 2.0;
        let margin_y = height * (1.0 - percent) / 2.0;
        let border = 10.0;
        let title_h = ui.extents.height + 2.0 * border;
        let start_x = ui.dest.x1 + margin_x;
        let start_y = ui.dest.y1 + margin_y;
        let start_list = start_y + title_h + border;

        let lines = (((height * percent - title_h - border * 2.0) / ui.extents.height) as usize)
            .max(1);
        let text_h = rows.min(lines) as f64 * ui.extents.height;
        let list_h = text_h + 2.0 * border;

        match key {
            Key::Down => {
                if selectable {
                    let mut next = self.selected;
                    loop {
                        next += 1;
                        if next >= n || !items[next].is_empty() {
                            break;
                        }
                    }
                    if next >= n {
                        return ListOutcome::Kept;
                    }
                    self.selected = next;
                    if self.selected >= self.top + lines {
                        self.top = self.selected - lines;
                    }
                } else if self.top + lines + 1 >= n {
                    return ListOutcome::Kept;
                } else {
                    self.top += 1;
                }
            }
            Key::Up => {
                if selectable {
                    let mut next = self.selected;
                    loop {
                        if next <= 1 {
                            return ListOutcome::Kept;
                        }
                        next -= 1;
                        if !items[next].is_empty() {
                            break;
                        }
                    }
                    self.selected = next;
                    if self.selected <= self.top {
                        self.top = self.selected.saturating_sub(1);
                    }
                } else if self.top == 0 {
                    return ListOutcome::Kept;
                } else {
                    self.top -= 1;
                }
            }
            Key::Init | Key::Redraw | Key::Resize | Key::Refresh => {}
            Key::Escape | Key::Exit | Key::Finish => return ListOutcome::Closed,
            Key::Enter => {
                return if selectable {
                    ListOutcome::Selected(self.selected)
                } else {
                    ListOutcome::Closed
                };
            }
            _ => {
                return if selectable {
                    ListOutcome::Kept
                } else {
                    ListOutcome::Closed
                };
            }
        }

        canvas.set_identity();

        // title bar
        canvas.fill_rect(
            Rect::new(start_x, start_y, ui.dest.x2 - margin_x, start_y + title_h),
            rgb(0.6, 0.6, 0.8),
        );
        let black = rgb(0.0, 0.0, 0.0);
        canvas.show_text(
            start_x + border,
            start_y + border + ui.extents.ascent,
            items[0],
            black,
        );

        // list background
        canvas.fill_rect(
            Rect::new(
                start_x,
                start_y + title_h,
                ui.dest.x2 - margin_x,
                start_y + title_h + list_h,
            ),
            rgb(0.8, 0.8, 0.8),
        );

        // rows, clipped to the scrollable region
        canvas.clip_rect(Rect::new(
            start_x,
            start_list,
            ui.dest.x2 - margin_x,
            start_list + text_h,
        ));
        for (l, item) in items.iter().enumerate().skip(1) {
            let row_y = start_list + ui.extents.height * (l as f64 - 1.0 - self.top as f64);
            let color = if selectable && l == self.selected {
                canvas.fill_rect(
                    Rect::new(
                        start_x,
                        row_y,
                        ui.dest.x2 - margin_x,
                        row_y + ui.extents.height,
                    ),
                    rgb(0.3, 0.3, 0.3),
                );
                rgb(0.8, 0.8, 0.8)
            } else {
                black
            };
            canvas.show_text(start_x + border, row_y + ui.extents.ascent, item, color);
        }
        canvas.reset_clip();

        // proportional scrollbar
        if lines < rows {
            let bar_y = start_y + title_h + self.top as f64 / rows as f64 * list_h;
            let bar_h = lines as f64 / rows as f64 * list_h;
            canvas.fill_rect(
                Rect::new(
                    ui.dest.x2 - margin_x - border,
                    bar_y,
                    ui.dest.x2 - margin_x,
                    bar_y + bar_h,
                ),
                black,
            );
        }

        ui.flush = true;
        ListOutcome::Kept
    }
}
