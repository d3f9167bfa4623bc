//! Startup configuration.
//!
//! One directive per line, `#` starts a comment, unrecognized lines are
//! ignored: parsing is total and never aborts startup. The command line
//! overrides the file. The empirical constants of the analysis (overlap
//! threshold, search anchor, edge tolerance, recurring cutoff) are
//! directives too rather than hidden in code.

use std::path::{Path, PathBuf};

use crate::geometry::BlockOrder;
use crate::viewer::{Fit, View, ViewMode};

/// Everything the config file and command line control.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Zoom target.
    pub mode: ViewMode,
    /// Fit policy.
    pub fit: Fit,
    /// Minimal displayed width; negative selects the default.
    pub min_width: f64,
    /// Block ordering.
    pub order: BlockOrder,
    /// Block separation distance.
    pub distance: f64,
    /// Screen aspect; negative selects square pixels.
    pub aspect: f64,
    /// Scroll step as a viewport fraction.
    pub scroll: f64,
    /// UI font size in pixels; negative selects the default.
    pub font_size: f64,
    /// Margin around the drawable area.
    pub margin: f64,
    /// Output device path.
    pub device: Option<String>,
    /// Apply menu changes immediately.
    pub immediate: bool,
    /// Open with the tutorial window.
    pub tutorial: bool,
    /// Show the page count in the page label.
    pub total_pages: bool,
    /// Pre-initialize the labels when starting on a modal window.
    pub init_labels: bool,
    /// Clip recurring blocks out of the rendered page.
    pub clip_recurring: bool,
    /// Screen-space tolerance on block edges.
    pub edge_tolerance: f64,
    /// Distance of a search match from the viewport edge.
    pub search_anchor: f64,
    /// Auto-mode fallback threshold.
    pub overlap_threshold: f64,
    /// Recurring-detector rank cutoff divisor.
    pub recurring_cutoff: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ViewMode::Auto,
            fit: Fit::Horizontal,
            min_width: -1.0,
            order: BlockOrder::TwoStep,
            distance: 15.0,
            aspect: -1.0,
            scroll: 0.25,
            font_size: -1.0,
            margin: 10.0,
            device: None,
            immediate: false,
            tutorial: true,
            total_pages: false,
            init_labels: true,
            clip_recurring: false,
            edge_tolerance: 0.3,
            search_anchor: 40.0,
            overlap_threshold: 0.8,
            recurring_cutoff: 6,
        }
    }
}

impl Settings {
    /// The per-user configuration file.
    pub fn config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(
            Path::new(&home)
                .join(".config")
                .join("blockview")
                .join("blockview.conf"),
        )
    }

    /// Load the defaults, overridden by the config file when it exists.
    pub fn load() -> Settings {
        let mut settings = Settings::default();
        if let Some(path) = Self::config_path() {
            if let Ok(content) = std::fs::read_to_string(&path) {
                settings.parse(&content);
            }
        }
        settings
    }

    /// Apply the directives of a configuration text.
    pub fn parse(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (directive, value) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let value = value.trim();
            match directive {
                "mode" => {
                    if let Some(mode) =
                        value.chars().next().and_then(ViewMode::from_letter)
                    {
                        self.mode = mode;
                    }
                }
                "fit" => {
                    if let Some(fit) = value.chars().next().and_then(Fit::from_letter) {
                        self.fit = fit;
                    }
                }
                "minwidth" => {
                    if let Ok(v) = value.parse() {
                        self.min_width = v;
                    }
                }
                "order" => {
                    self.order = match value.chars().next() {
                        Some('q') => BlockOrder::Quick,
                        Some('t') => BlockOrder::TwoStep,
                        Some('c') => BlockOrder::CharStream,
                        _ => self.order,
                    };
                }
                "distance" => {
                    if let Ok(v) = value.parse() {
                        self.distance = v;
                    }
                }
                "aspect" => {
                    if let Some(v) = parse_fraction(value) {
                        self.aspect = v;
                    }
                }
                "scroll" => {
                    if let Some(v) = parse_fraction(value) {
                        self.scroll = v;
                    }
                }
                "fontsize" => {
                    if let Ok(v) = value.parse() {
                        self.font_size = v;
                    }
                }
                "margin" => {
                    if let Ok(v) = value.parse() {
                        self.margin = v;
                    }
                }
                "device" => {
                    if !value.is_empty() {
                        self.device = Some(value.to_string());
                    }
                }
                "immediate" => self.immediate = true,
                "notutorial" => self.tutorial = false,
                "totalpages" => self.total_pages = true,
                "noinitlabels" => self.init_labels = false,
                "recurring" => self.clip_recurring = true,
                "edgetolerance" => {
                    if let Ok(v) = value.parse() {
                        self.edge_tolerance = v;
                    }
                }
                "searchanchor" => {
                    if let Ok(v) = value.parse() {
                        self.search_anchor = v;
                    }
                }
                "overlapthreshold" => {
                    if let Ok(v) = value.parse() {
                        self.overlap_threshold = v;
                    }
                }
                "recurringcutoff" => {
                    if let Ok(v) = value.parse() {
                        self.recurring_cutoff = v;
                    }
                }
                _ => log::debug!("ignoring config directive: {directive}"),
            }
        }
    }

    /// Build the viewer state for a screen of the given size.
    pub fn view(&self, screen_width: f64, screen_height: f64) -> View {
        let mut view = View::new();
        view.mode = self.mode;
        view.fit = self.fit;
        view.order = self.order;
        view.distance = self.distance;
        view.scroll_frac = self.scroll;
        view.immediate = self.immediate;
        view.total_pages = self.total_pages;
        view.clip_recurring = self.clip_recurring;
        view.edge_tolerance = self.edge_tolerance;
        view.search_anchor = self.search_anchor;
        view.overlap_threshold = self.overlap_threshold;
        view.recurring_cutoff = self.recurring_cutoff;
        view.screen_width = screen_width;
        view.screen_height = screen_height;
        view.min_width = if self.min_width < 0.0 {
            400.0
        } else {
            self.min_width
        };
        view.aspect = if self.aspect < 0.0 {
            1.0
        } else {
            self.aspect * screen_height / screen_width
        };
        view
    }
}

/// Parse `W:H`, `W/H` or a plain float.
pub fn parse_fraction(s: &str) -> Option<f64> {
    let (num, den) = match s.split_once(':').or_else(|| s.split_once('/')) {
        Some((n, d)) => (n, Some(d)),
        None => (s, None),
    };
    let num: f64 = num.trim().parse().ok()?;
    match den {
        None => Some(num),
        Some(d) => {
            let d: f64 = d.trim().parse().ok()?;
            if d == 0.0 {
                None
            } else {
                Some(num / d)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_fraction("4:3"), Some(4.0 / 3.0));
        assert_eq!(parse_fraction("16/9"), Some(16.0 / 9.0));
        assert_eq!(parse_fraction("1.25"), Some(1.25));
        assert_eq!(parse_fraction("x"), None);
        assert_eq!(parse_fraction("1:0"), None);
    }

    #[test]
    fn test_parse_directives() {
        let mut settings = Settings::default();
        settings.parse(
            "# comment\n\
             mode t\n\
             fit v\n\
             minwidth 250\n\
             order q\n\
             distance 12\n\
             aspect 4:3\n\
             scroll 1/2\n\
             immediate\n\
             notutorial\n\
             totalpages\n\
             garbage directive that is ignored\n",
        );
        assert_eq!(settings.mode, ViewMode::TextArea);
        assert_eq!(settings.fit, Fit::Vertical);
        assert_eq!(settings.min_width, 250.0);
        assert_eq!(settings.order, BlockOrder::Quick);
        assert_eq!(settings.distance, 12.0);
        assert!((settings.aspect - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(settings.scroll, 0.5);
        assert!(settings.immediate);
        assert!(!settings.tutorial);
        assert!(settings.total_pages);
    }

    #[test]
    fn test_parse_is_total() {
        let mut settings = Settings::default();
        settings.parse("mode zz\nminwidth notanumber\nfit\n");
        // Bad values leave the defaults in place.
        assert_eq!(settings.mode, ViewMode::Auto);
        assert_eq!(settings.min_width, -1.0);
    }

    #[test]
    fn test_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode b\ndevice /dev/fb1").unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        let mut settings = Settings::default();
        settings.parse(&content);
        assert_eq!(settings.mode, ViewMode::BoundingBox);
        assert_eq!(settings.device.as_deref(), Some("/dev/fb1"));
    }

    #[test]
    fn test_view_defaults() {
        let settings = Settings::default();
        let view = settings.view(640.0, 480.0);
        assert_eq!(view.min_width, 400.0);
        assert_eq!(view.aspect, 1.0);
        let mut wide = Settings::default();
        wide.parse("aspect 4:3");
        let view = wide.view(1920.0, 1080.0);
        assert!((view.aspect - (4.0 / 3.0) * 1080.0 / 1920.0).abs() < 1e-9);
    }
}
