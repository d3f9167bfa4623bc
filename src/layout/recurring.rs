//! Recurring blocks of text: page numbers, running headers and footers.
//!
//! Recurring text is short and sits at the same vertical position on most
//! pages, while its horizontal extent wobbles (a page number grows from one
//! digit to three). Sampled pages feed their short text blocks into a
//! frequency vector that matches on equal vertical extent with horizontal
//! containment either way; after sampling, only well-ranked entries count
//! as recurring. A heuristic, not a guarantee.

use rand::rngs::StdRng;
use rand::Rng;

use crate::backend::{page_rect, DocumentBackend};
use crate::geometry::{FrequencyVector, Rect, RectUnion, SizeBound};
use crate::layout::text_area;

/// Default maximal height of a block considered recurring, in points.
pub const DEFAULT_MAX_HEIGHT: f64 = 20.0;

/// Divisor of the rank cutoff: entries ranked above `iterations / cutoff`
/// survive.
pub const DEFAULT_CUTOFF_DIVISOR: i32 = 6;

/// Tuning of the detector.
#[derive(Debug, Clone, Copy)]
pub struct RecurringParams {
    /// Blocks taller than this are never recurring.
    pub max_height: f64,
    /// Block separation distance for the per-page decomposition; negative
    /// selects the automatic threshold.
    pub distance: f64,
    /// Rank cutoff divisor.
    pub cutoff_divisor: i32,
}

impl Default for RecurringParams {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_MAX_HEIGHT,
            distance: -1.0,
            cutoff_divisor: DEFAULT_CUTOFF_DIVISOR,
        }
    }
}

/// Percentage of pages sampled, by document size.
pub fn sample_rate(pages: usize) -> u32 {
    if pages < 40 {
        100
    } else if pages < 100 {
        50
    } else {
        25
    }
}

/// Rectangles recurring across the document's pages, best ranked first.
///
/// Every recurring text contains at least one of the returned rectangles.
/// Large documents are sampled, so with an entropy-seeded generator the
/// result may differ between runs.
pub fn frequent<B: DocumentBackend>(
    doc: &B,
    params: &RecurringParams,
    rng: &mut StdRng,
) -> Vec<Rect> {
    let mut vector = FrequencyVector::new();
    let pages = doc.page_count();
    let rate = sample_rate(pages);

    let mut iterations = 0;
    for n in 0..pages {
        if rng.gen_range(0..100) >= rate {
            continue;
        }
        iterations += 1;
        let Ok(page) = doc.load_page(n) else {
            continue;
        };
        let area = text_area::text_area(&page, params.distance);
        log::trace!("page {n}: {} blocks", area.len());
        for block in &area {
            if block.height() <= params.max_height {
                vector.add(*block);
            }
        }
    }

    vector.retain_above(iterations / params.cutoff_divisor);
    log::debug!(
        "{} recurring rectangles in {} sampled pages",
        vector.len(),
        iterations
    );
    vector.to_rects()
}

/// The largest rectangle of the first page not covering any recurring
/// rectangle: the page minus headers and footers.
pub fn main_region<B: DocumentBackend>(doc: &B, recurring: &[Rect]) -> Option<Rect> {
    let page = doc.load_page(0).ok()?;
    let rect = page_rect(&page);
    let sub = RectUnion::from_rects(recurring.to_vec());
    let remaining =
        RectUnion::subtract_from(rect, &sub, None, Some(&SizeBound::ZERO)).ok()?;
    remaining.largest().copied()
}

/// Indices of the text blocks that contain a recurring rectangle; the
/// renderer clips these out of the page.
///
/// Containment keeps the removal surgical: a block merely overlapping a
/// recurring rectangle is ordinary text that happens to reach into the
/// header band, and stays.
pub fn blocks_to_clip(textarea: &[Rect], recurring: &[Rect]) -> Vec<usize> {
    textarea
        .iter()
        .enumerate()
        .filter(|(_, block)| recurring.iter().any(|r| block.contains(r)))
        .map(|(i, _)| i)
        .collect()
}
