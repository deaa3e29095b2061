//! Channel metadata (`<handle>.toml`).
//!
//! The metadata file records the format tag, the raw label string and an
//! outer range for every non-time label:
//!
//! ```text
//! format = 'mv1'
//! labels = 'x, t; u'
//! [ranges]
//! 'x' = [0.000000e+00, 1.000000e+00]
//! 'u' = false
//! ```
//!
//! Only this subset of TOML is written or read back.
//!
//! ## Examples
//!
//! ```rust
//! use mv1::{LabelSpec, Metadata, Range};
//!
//! let spec = LabelSpec::parse("x, t; u").unwrap();
//! let meta = Metadata::new("x, t; u", &spec, &[0.0, 1.0, 0.0, 0.0]).unwrap();
//! assert_eq!(meta.ranges["x"], Range::Interval(0.0, 1.0));
//! assert_eq!(meta.ranges["u"], Range::Disabled);
//!
//! let back: Metadata = meta.to_string().parse().unwrap();
//! assert_eq!(back, meta);
//! ```

use crate::format::{push_exp, FORMAT_TAG};
use crate::{Error, LabelSpec, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outer range of one variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Range {
    /// `[low, high]` with `low < high`.
    Interval(f64, f64),
    /// No range recorded.
    Disabled,
}

impl Range {
    /// Builds a range from a bound pair.
    ///
    /// Pairs with `low >= high`, including `(0, 0)` and NaN pairs, are disabled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::Range;
    ///
    /// assert_eq!(Range::from_bounds(1.0, 2.0), Range::Interval(1.0, 2.0));
    /// assert_eq!(Range::from_bounds(0.0, 0.0), Range::Disabled);
    /// assert_eq!(Range::from_bounds(f64::NAN, f64::NAN), Range::Disabled);
    /// ```
    #[must_use]
    pub fn from_bounds(low: f64, high: f64) -> Self {
        if low < high {
            Range::Interval(low, high)
        } else {
            Range::Disabled
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Range::Interval(..))
    }
}

/// Contents of a metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Format tag, `mv1`.
    pub format: String,
    /// The raw label string, as given by the caller.
    pub labels: String,
    /// One range per label, inputs then outputs, time excluded.
    pub ranges: IndexMap<String, Range>,
}

impl Metadata {
    /// Pairs each label of `spec` with `(low, high)` bounds from `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] unless `bounds.len() == 2 * spec.width()`,
    /// and [`Error::Custom`] if a label appears twice.
    pub fn new(labels: &str, spec: &LabelSpec, bounds: &[f64]) -> Result<Self> {
        let expected = 2 * spec.width();
        if bounds.len() != expected {
            return Err(Error::shape("range bounds", expected, bounds.len()));
        }

        let mut ranges = IndexMap::with_capacity(spec.width());
        for (label, pair) in spec.labels().zip(bounds.chunks_exact(2)) {
            let range = Range::from_bounds(pair[0], pair[1]);
            if !range.is_enabled() {
                tracing::debug!(label, low = pair[0], high = pair[1], "range disabled");
            }
            if ranges.insert(label.to_string(), range).is_some() {
                return Err(Error::custom(format!("label {:?} appears more than once", label)));
            }
        }

        Ok(Metadata {
            format: FORMAT_TAG.to_string(),
            labels: labels.to_string(),
            ranges,
        })
    }

    /// Parses `labels` and builds its metadata.
    pub fn from_labels(labels: &str, bounds: &[f64]) -> Result<Self> {
        let spec = LabelSpec::parse(labels)?;
        Self::new(labels, &spec, bounds)
    }

    /// Renders the file text with `precision` fractional digits.
    #[must_use]
    pub fn render(&self, precision: usize) -> String {
        let mut out = String::with_capacity(64 + self.ranges.len() * 48);
        out.push_str("format = ");
        push_toml_string(&mut out, &self.format);
        out.push_str("\nlabels = ");
        push_toml_string(&mut out, &self.labels);
        out.push_str("\n[ranges]\n");
        for (label, range) in &self.ranges {
            push_toml_string(&mut out, label);
            out.push_str(" = ");
            match range {
                Range::Interval(low, high) => {
                    out.push('[');
                    push_exp(&mut out, *low, precision);
                    out.push_str(", ");
                    push_exp(&mut out, *high, precision);
                    out.push(']');
                }
                Range::Disabled => out.push_str("false"),
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(crate::options::DEFAULT_PRECISION))
    }
}

#[inline]
fn needs_basic_string(s: &str) -> bool {
    s.chars().any(|c| c == '\'' || c.is_control())
}

/// Appends `s` as a TOML literal string, or as an escaped basic string when
/// it holds a quote or a control character.
fn push_toml_string(out: &mut String, s: &str) {
    if !needs_basic_string(s) {
        out.push('\'');
        out.push_str(s);
        out.push('\'');
        return;
    }

    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Cursor over one line of metadata text.
struct LineCursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        LineCursor { text, pos: 0, line }
    }

    fn error(&self, msg: &str) -> Error {
        Error::parse(self.line, self.text[..self.pos].chars().count() + 1, msg)
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_spaces();
        match self.bump() {
            Some(ch) if ch == want => Ok(()),
            _ => Err(self.error(&format!("expected '{}'", want))),
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_spaces();
        matches!(self.peek(), None | Some('#'))
    }

    fn key(&mut self) -> Result<String> {
        self.skip_spaces();
        match self.peek() {
            Some('\'') | Some('"') => self.string(),
            _ => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                    self.pos += 1;
                }
                if start == self.pos {
                    return Err(self.error("expected a key"));
                }
                Ok(self.text[start..self.pos].to_string())
            }
        }
    }

    fn string(&mut self) -> Result<String> {
        self.skip_spaces();
        match self.bump() {
            Some('\'') => {
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some('\'') => return Ok(self.text[start..self.pos - 1].to_string()),
                        Some(_) => {}
                        None => return Err(self.error("unterminated string")),
                    }
                }
            }
            Some('"') => {
                let mut out = String::new();
                loop {
                    match self.bump() {
                        Some('"') => return Ok(out),
                        Some('\\') => out.push(self.escape()?),
                        Some(c) => out.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
            }
            _ => Err(self.error("expected a string")),
        }
    }

    fn escape(&mut self) -> Result<char> {
        match self.bump() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{0008}'),
            Some('f') => Ok('\u{000C}'),
            Some('u') => {
                let start = self.pos;
                for _ in 0..4 {
                    self.bump();
                }
                u32::from_str_radix(&self.text[start..self.pos], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("invalid unicode escape"))
            }
            _ => Err(self.error("invalid escape")),
        }
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_spaces();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !matches!(c, ',' | ']' | ' ' | '\t')) {
            self.bump();
        }
        self.text[start..self.pos]
            .parse()
            .map_err(|_| self.error("expected a number"))
    }

    fn range(&mut self) -> Result<Range> {
        self.skip_spaces();
        if self.text[self.pos..].starts_with("false") {
            self.pos += "false".len();
            return Ok(Range::Disabled);
        }
        self.expect('[')?;
        let low = self.number()?;
        self.expect(',')?;
        let high = self.number()?;
        self.expect(']')?;
        Ok(Range::Interval(low, high))
    }
}

impl FromStr for Metadata {
    type Err = Error;

    /// Reads metadata text written by [`Metadata::render`].
    fn from_str(s: &str) -> Result<Self> {
        let mut format = None;
        let mut labels = None;
        let mut ranges = IndexMap::new();
        let mut in_ranges = false;

        for (i, text) in s.lines().enumerate() {
            let mut cur = LineCursor::new(text, i + 1);
            if cur.at_end() {
                continue;
            }
            if cur.peek() == Some('[') {
                cur.bump();
                let table = cur.key()?;
                cur.expect(']')?;
                if table != "ranges" {
                    return Err(cur.error(&format!("unknown table [{}]", table)));
                }
                in_ranges = true;
            } else {
                let key = cur.key()?;
                cur.expect('=')?;
                if in_ranges {
                    let range = cur.range()?;
                    ranges.insert(key, range);
                } else {
                    match key.as_str() {
                        "format" => format = Some(cur.string()?),
                        "labels" => labels = Some(cur.string()?),
                        other => return Err(cur.error(&format!("unknown key {:?}", other))),
                    }
                }
            }
            if !cur.at_end() {
                return Err(cur.error("trailing characters"));
            }
        }

        let format = format.ok_or_else(|| Error::parse(1, 1, "missing 'format'"))?;
        if format != FORMAT_TAG {
            return Err(Error::parse(1, 1, &format!("unsupported format {:?}", format)));
        }
        let labels = labels.ok_or_else(|| Error::parse(1, 1, "missing 'labels'"))?;
        Ok(Metadata {
            format,
            labels,
            ranges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let meta = Metadata::from_labels("x, y; u", &[0.0, 1.0, -1.0, 1.0, 0.0, 0.0]).unwrap();
        assert_eq!(
            meta.to_string(),
            "format = 'mv1'\n\
             labels = 'x, y; u'\n\
             [ranges]\n\
             'x' = [0.000000e+00, 1.000000e+00]\n\
             'y' = [-1.000000e+00, 1.000000e+00]\n\
             'u' = false\n"
        );
    }

    #[test]
    fn test_time_has_no_range() {
        let meta = Metadata::from_labels("t, x; u", &[0.0, 2.0, f64::NAN, f64::NAN]).unwrap();
        let keys: Vec<_> = meta.ranges.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "u"]);
        assert_eq!(meta.ranges["u"], Range::Disabled);
    }

    #[test]
    fn test_inverted_range_disabled() {
        let meta = Metadata::from_labels("x; u", &[2.0, 1.0, 0.0, 1.0]).unwrap();
        assert_eq!(meta.ranges["x"], Range::Disabled);
    }

    #[test]
    fn test_bounds_length_checked() {
        assert!(matches!(
            Metadata::from_labels("x; u", &[0.0, 1.0]),
            Err(Error::Shape { expected: 4, found: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_label_rejected() {
        assert!(Metadata::from_labels("x, x; u", &[0.0; 6]).is_err());
    }

    #[test]
    fn test_multiline_labels_use_basic_string() {
        let labels = "x,\n y; u";
        let meta = Metadata::from_labels(labels, &[0.0; 6]).unwrap();
        let text = meta.to_string();
        assert!(text.contains("labels = \"x,\\n y; u\""));
        let back: Metadata = text.parse().unwrap();
        assert_eq!(back.labels, labels);
    }

    #[test]
    fn test_quote_in_label() {
        let meta = Metadata::from_labels("x'; u", &[0.0, 1.0, 0.0, 0.0]).unwrap();
        let text = meta.to_string();
        assert!(text.contains("\"x'\" = [0.000000e+00, 1.000000e+00]"));
        let back: Metadata = text.parse().unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_parse_accepts_comments_and_bare_keys() {
        let text = "# written by hand\nformat = \"mv1\"\nlabels = 'x; u'\n\n[ranges]\nx = [0.5, 1.5] # inner\nu = false\n";
        let meta: Metadata = text.parse().unwrap();
        assert_eq!(meta.ranges["x"], Range::Interval(0.5, 1.5));
        assert_eq!(meta.ranges["u"], Range::Disabled);
    }

    #[test]
    fn test_parse_errors_have_position() {
        let err = "format = 'mv1'\nlabels = 'x; u'\n[ranges]\n'x' = [1.0 2.0]\n"
            .parse::<Metadata>()
            .unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected {:?}", other),
        }
        assert!("format = 'mv2'\nlabels = 'x; u'\n".parse::<Metadata>().is_err());
        assert!("labels = 'x; u'\n".parse::<Metadata>().is_err());
    }

    #[test]
    fn test_serde_json() {
        let meta = Metadata::from_labels("x; u", &[0.0, 1.0, 0.0, 0.0]).unwrap();
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["format"], "mv1");
        assert_eq!(json["ranges"]["u"], "Disabled");
    }
}
