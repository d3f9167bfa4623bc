//! Output formats for text extraction.
//!
//! A format bundles the paragraph delimiters, face markers and escape
//! substitutions of one output language. The built-in formats cover roff,
//! HTML, TeX and plain text; arbitrary formats parse from a
//! comma-separated string.

use crate::error::{Error, Result};

/// The output strings of one format.
#[derive(Debug, Clone)]
pub struct Format {
    /// Paragraph opening.
    pub par_start: String,
    /// Paragraph closing.
    pub par_end: String,
    /// Template for announcing font names (`%s` is the name), empty for
    /// none.
    pub font_name: String,
    /// Select the plain face.
    pub plain: String,
    /// Select the italic face.
    pub italic: String,
    /// Select the bold face.
    pub bold: String,
    /// Select the bold italic face.
    pub bold_italic: String,
    /// Open an italic span.
    pub italic_begin: String,
    /// Close an italic span.
    pub italic_end: String,
    /// Open a bold span.
    pub bold_begin: String,
    /// Close a bold span.
    pub bold_end: String,
    /// Close all faces at a paragraph break and reopen them after.
    pub reset: bool,
    /// Substitute for a backslash.
    pub backslash: String,
    /// Substitute for a dot at the start of a paragraph.
    pub first_dot: String,
    /// Substitute for `<`.
    pub less: String,
    /// Substitute for `>`.
    pub greater: String,
    /// Substitute for `&`.
    pub and: String,
}

fn s(v: &str) -> String {
    v.to_string()
}

impl Format {
    /// roff output.
    pub fn roff() -> Format {
        Format {
            par_start: s(".ti 1\n"),
            par_end: s("\n"),
            font_name: s(""),
            plain: s("\\fR"),
            italic: s("\\fI"),
            bold: s("\\fB"),
            bold_italic: s("\\f[BI]"),
            italic_begin: s(""),
            italic_end: s(""),
            bold_begin: s(""),
            bold_end: s(""),
            reset: false,
            backslash: s("\\"),
            first_dot: s("\\[char46]"),
            less: s("<"),
            greater: s(">"),
            and: s("&"),
        }
    }

    /// HTML output.
    pub fn html() -> Format {
        Format {
            par_start: s("\n<p>"),
            par_end: s("</p>\n"),
            font_name: s(""),
            plain: s(""),
            italic: s(""),
            bold: s(""),
            bold_italic: s(""),
            italic_begin: s("<i>"),
            italic_end: s("</i>"),
            bold_begin: s("<b>"),
            bold_end: s("</b>"),
            reset: true,
            backslash: s("\\"),
            first_dot: s("."),
            less: s("&lt;"),
            greater: s("&gt;"),
            and: s("&amp;"),
        }
    }

    /// TeX output.
    pub fn tex() -> Format {
        Format {
            par_start: s(""),
            par_end: s("\n\n"),
            font_name: s(""),
            plain: s("\\rm "),
            italic: s("\\it "),
            bold: s("\\bf "),
            bold_italic: s("\\bf "),
            italic_begin: s(""),
            italic_end: s(""),
            bold_begin: s(""),
            bold_end: s(""),
            reset: false,
            backslash: s("\\backslash "),
            first_dot: s("."),
            less: s("<"),
            greater: s(">"),
            and: s("\\& "),
        }
    }

    /// Plain text.
    pub fn text() -> Format {
        Format {
            par_start: s(""),
            par_end: s("\n"),
            font_name: s(""),
            plain: s(""),
            italic: s(""),
            bold: s(""),
            bold_italic: s(""),
            italic_begin: s(""),
            italic_end: s(""),
            bold_begin: s(""),
            bold_end: s(""),
            reset: false,
            backslash: s("\\"),
            first_dot: s("."),
            less: s("<"),
            greater: s(">"),
            and: s("&"),
        }
    }

    /// Plain text with font-name markers.
    pub fn text_font() -> Format {
        Format {
            font_name: s("\\[%s]"),
            backslash: s("\\\\"),
            ..Format::text()
        }
    }

    /// Parse a format from seventeen comma-separated fields:
    /// `parstart,parend,fontname,plain,italic,bold,bolditalic,italicbegin,
    /// italicend,boldbegin,boldend,reset,backslash,firstdot,less,greater,
    /// and`.
    pub fn parse(input: &str) -> Result<Format> {
        let fields: Vec<&str> = input.split(',').collect();
        if fields.len() != 17 {
            return Err(Error::InvalidFormat(format!(
                "expected 17 fields, found {}",
                fields.len()
            )));
        }
        Ok(Format {
            par_start: s(fields[0]),
            par_end: s(fields[1]),
            font_name: s(fields[2]),
            plain: s(fields[3]),
            italic: s(fields[4]),
            bold: s(fields[5]),
            bold_italic: s(fields[6]),
            italic_begin: s(fields[7]),
            italic_end: s(fields[8]),
            bold_begin: s(fields[9]),
            bold_end: s(fields[10]),
            reset: fields[11] == "true",
            backslash: s(fields[12]),
            first_dot: s(fields[13]),
            less: s(fields[14]),
            greater: s(fields[15]),
            and: s(fields[16]),
        })
    }

    /// Look up a built-in format by name.
    pub fn by_name(name: &str) -> Option<Format> {
        match name {
            "roff" => Some(Format::roff()),
            "html" => Some(Format::html()),
            "tex" => Some(Format::tex()),
            "text" => Some(Format::text()),
            "textfont" => Some(Format::text_font()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let f = Format::parse(",\n,,,,,,<i>,</i>,<b>,</b>,true,\\,.,<,>,&").unwrap();
        assert!(f.reset);
        assert_eq!(f.italic_begin, "<i>");
        assert_eq!(f.par_end, "\n");
    }

    #[test]
    fn test_parse_wrong_arity() {
        assert!(Format::parse("a,b,c").is_err());
    }

    #[test]
    fn test_by_name() {
        assert!(Format::by_name("roff").is_some());
        assert!(Format::by_name("nope").is_none());
    }
}
