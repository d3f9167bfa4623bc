//! Error types for the viewer library.
//!
//! Setup failures (document, device) propagate to the binary and terminate
//! the process; everything else is handled locally by the main loop.

/// Result type alias for viewer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while opening documents, initializing devices
/// or analyzing pages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cannot open the document
    #[error("cannot open {path}: {reason}")]
    DocumentOpen {
        /// Path of the document
        path: String,
        /// Reason reported by the backend
        reason: String,
    },

    /// The document contains no pages
    #[error("no page in document")]
    EmptyDocument,

    /// Page index outside the document
    #[error("page {0} does not exist")]
    PageOutOfRange(usize),

    /// The page handle became invalid (document replaced underneath us)
    #[error("page no longer valid, reload required")]
    StalePage,

    /// Cannot initialize the output device
    #[error("cannot open device {device}: {reason}")]
    DeviceInit {
        /// Device path or name
        device: String,
        /// Reason for the failure
        reason: String,
    },

    /// The binary was built without a PDF backend
    #[error("no PDF backend compiled in (enable the `mupdf` feature)")]
    NoBackend,

    /// A rectangle list exceeded its entry cap.
    ///
    /// Internal: the text-area engine converts this into the whole-page
    /// fallback, it never reaches the user.
    #[error("rectangle list exceeded {0} entries")]
    RectOverflow(usize),

    /// Malformed output format description
    #[error("invalid format string: {0}")]
    InvalidFormat(String),

    /// Extraction met a character that belongs to no block of the text
    /// area
    #[error("character outside every text block: {0}")]
    OutsideBlocks(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
