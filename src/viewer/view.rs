//! Viewer state: modes, fits, thresholds and the search/label slots.

use crate::geometry::{BlockOrder, Rect};

/// What region of the page the viewer zooms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// The text-area decomposition, falling back to the bounding box on
    /// pages that do not look multi-column.
    #[default]
    Auto,
    /// Always the text-area decomposition.
    TextArea,
    /// The bounding box of the page's text.
    BoundingBox,
    /// The whole page.
    Page,
}

impl ViewMode {
    /// Cycle to the next mode (the `v` key).
    pub fn next(self) -> ViewMode {
        match self {
            ViewMode::Auto => ViewMode::TextArea,
            ViewMode::TextArea => ViewMode::BoundingBox,
            ViewMode::BoundingBox => ViewMode::Page,
            ViewMode::Page => ViewMode::Auto,
        }
    }

    /// Parse the single-letter option value.
    pub fn from_letter(letter: char) -> Option<ViewMode> {
        match letter {
            'a' => Some(ViewMode::Auto),
            't' => Some(ViewMode::TextArea),
            'b' => Some(ViewMode::BoundingBox),
            'p' => Some(ViewMode::Page),
            _ => None,
        }
    }
}

/// How the viewbox relates to the destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fit {
    /// No fitting: fixed zoom given by the minimal width, free panning.
    None,
    /// Fit the viewbox width, aspect preserved.
    #[default]
    Horizontal,
    /// Fit the viewbox height, aspect preserved.
    Vertical,
    /// Non-uniform scale to exactly the destination rectangle.
    Both,
}

impl Fit {
    /// Cycle to the next fit (the `f` key).
    pub fn next(self) -> Fit {
        match self {
            Fit::None => Fit::Horizontal,
            Fit::Horizontal => Fit::Vertical,
            Fit::Vertical => Fit::Both,
            Fit::Both => Fit::None,
        }
    }

    /// Parse the single-letter option value.
    pub fn from_letter(letter: char) -> Option<Fit> {
        match letter {
            'n' => Some(Fit::None),
            'h' => Some(Fit::Horizontal),
            'v' => Some(Fit::Vertical),
            'b' => Some(Fit::Both),
            _ => None,
        }
    }
}

/// The viewer's display state and tunables.
#[derive(Debug, Clone)]
pub struct View {
    /// Width of the underlying screen.
    pub screen_width: f64,
    /// Height of the underlying screen.
    pub screen_height: f64,
    /// Pixel aspect correction factor.
    pub aspect: f64,
    /// Block separation distance of the text-area decomposition.
    pub distance: f64,
    /// Minimal displayed width in screen points; caps the zoom on narrow
    /// blocks.
    pub min_width: f64,
    /// Zoom target.
    pub mode: ViewMode,
    /// Fit policy.
    pub fit: Fit,
    /// Block ordering.
    pub order: BlockOrder,
    /// Scroll step as a fraction of the viewport.
    pub scroll_frac: f64,
    /// Apply menu changes immediately, redrawing under the menu.
    pub immediate: bool,

    /// The last searched string, kept for highlighting across pages.
    pub search: String,
    /// Search direction.
    pub forward: bool,
    /// Matches on the current page, top-left origin.
    pub found: Vec<Rect>,

    /// One-shot message label.
    pub help: String,
    /// Show the page-number label on the next draw.
    pub show_page_number: bool,
    /// Include the page count in the page-number label.
    pub total_pages: bool,
    /// Show the view-mode label on the next draw.
    pub show_mode: bool,
    /// Show the fit label on the next draw.
    pub show_fit: bool,
    /// Show the file name label on the next draw.
    pub show_filename: bool,

    /// Screen-space tolerance when testing whether a block edge reached
    /// the viewport.
    pub edge_tolerance: f64,
    /// Distance from the viewport edge where a search match lands.
    pub search_anchor: f64,
    /// Inter-overlap index below which auto mode falls back to the
    /// bounding box.
    pub overlap_threshold: f64,
    /// Rank cutoff divisor of the recurring-block detector.
    pub recurring_cutoff: i32,
    /// Clip recurring blocks out of the rendered page.
    pub clip_recurring: bool,
}

impl View {
    /// The defaults of the reference configuration.
    pub fn new() -> Self {
        Self {
            screen_width: 1.0,
            screen_height: 1.0,
            aspect: 1.0,
            distance: 15.0,
            min_width: 400.0,
            mode: ViewMode::Auto,
            fit: Fit::Horizontal,
            order: BlockOrder::TwoStep,
            scroll_frac: 0.25,
            immediate: false,
            search: String::new(),
            forward: true,
            found: Vec::new(),
            help: String::new(),
            show_page_number: false,
            total_pages: false,
            show_mode: false,
            show_fit: false,
            show_filename: false,
            edge_tolerance: 0.3,
            search_anchor: 40.0,
            overlap_threshold: 0.8,
            recurring_cutoff: 6,
            clip_recurring: false,
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}
