//! # blockview
//!
//! A PDF viewer for small screens. Instead of rendering whole pages and
//! panning, blockview decomposes every page into its blocks of text
//! (paragraphs, columns, captions) from the raw character rectangles, and
//! shows one block at a time at the maximal readable zoom, so navigation
//! follows the text rather than the page geometry.
//!
//! ## Structure
//!
//! - [`geometry`]: rectangle algebra, area unions with subtraction,
//!   reading orders, the frequency vector, transforms
//! - [`layout`]: the per-page text-area engine and the recurring-block
//!   detector (page numbers, running heads)
//! - [`backend`]: the interface to the PDF renderer, plus a synthetic
//!   backend for tests
//! - [`viewer`]: position, fit and scroll policies, navigation, search,
//!   and the viewer windows
//! - [`extract`]: paragraph-aware text extraction into roff, HTML, TeX or
//!   plain text
//! - [`ui`]: overlay primitives and the draw/input/dispatch main loop
//! - [`device`]: canvas plus input devices (off-screen, terminal,
//!   framebuffer) and the DRM mode planner
//!
//! ## Quick start
//!
//! ```no_run
//! use blockview::backend::sim::{SimDocument, SimPage};
//! use blockview::config::Settings;
//! use blockview::device::{Device, MemoryDevice};
//! use blockview::signals::SignalFlags;
//! use blockview::ui::{self, UiContext};
//! use blockview::viewer::{Viewer, WindowId};
//!
//! # fn main() -> blockview::error::Result<()> {
//! let doc = SimDocument::uniform(3, |_| {
//!     SimPage::new(612.0, 792.0).text_line(50.0, 100.0, "hello world")
//! });
//! let mut device = MemoryDevice::new(640, 480);
//! let flags = SignalFlags::new();
//! let settings = Settings::default();
//! let view = settings.view(device.screen_width(), device.screen_height());
//! let mut viewer = Viewer::open(doc, view)?;
//! let mut ui = UiContext::new(flags);
//! ui::run(&mut viewer, &mut device, &mut ui, WindowId::Document);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod layout;
pub mod signals;
pub mod ui;
pub mod viewer;
