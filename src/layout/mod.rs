//! Page analysis: text blocks and recurring elements.
//!
//! [`text_area`] decomposes a page into disjoint blocks of text from its
//! character rectangles alone; [`recurring`] finds the blocks that repeat
//! across pages (page numbers, running heads) and derives the main text
//! region.

pub mod recurring;
pub mod text_area;

pub use recurring::{blocks_to_clip, frequent, main_region, RecurringParams};
pub use text_area::{bounding_box, character_rects, inter_overlap, rows, text_area};
