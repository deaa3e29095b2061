//! Label grammar parsing.
//!
//! A label string names the inputs and outputs of one output channel:
//!
//! ```text
//! labels     := inputs ';' outputs
//! inputs     := identifier (',' identifier)*
//! outputs    := identifier (',' identifier)*
//! identifier := one or more characters other than whitespace, ',', ';', '_', '-'
//! ```
//!
//! Whitespace around identifiers is insignificant. The identifier `t` is
//! reserved for time: as a standalone input it sets [`LabelSpec::has_time`] and
//! is left out of [`LabelSpec::inputs`]; as an output it is an error. Tokens
//! that merely contain a `t` (`at`, `theta`) are ordinary labels.
//!
//! Parsing runs as two pure passes: [`scan`] validates the string with a small
//! state machine and records where the semicolon and the time token sit, then
//! [`extract`] splits the tokens out. Both passes are linear in the length.
//!
//! ## Examples
//!
//! ```rust
//! use mv1::LabelSpec;
//!
//! let spec = LabelSpec::parse("x, t; u, v").unwrap();
//! assert_eq!(spec.inputs, vec!["x"]);
//! assert_eq!(spec.outputs, vec!["u", "v"]);
//! assert!(spec.has_time);
//! assert_eq!(spec.to_labels_string(), "x, t; u, v");
//! ```

use crate::error::GrammarFault;
use crate::options::{DEFAULT_MAX_LABEL_LEN, LEGACY_MAX_LABEL_LEN};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The reserved time label.
pub const TIME_LABEL: &str = "t";

/// Parsed decomposition of a label string.
///
/// Constructed by [`LabelSpec::parse`]; the fields are public so hosts can
/// inspect them, but a spec is treated as immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelSpec {
    /// Input labels in order of appearance, without time.
    pub inputs: Vec<String>,
    /// Output labels in order of appearance.
    pub outputs: Vec<String>,
    /// Whether `t` appeared among the inputs.
    pub has_time: bool,
}

impl LabelSpec {
    /// Parses a label string with the current grammar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] if the string is malformed or longer than
    /// 512 bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::LabelSpec;
    ///
    /// assert!(LabelSpec::parse("x, y; u").is_ok());
    /// assert!(LabelSpec::parse("x_1; u").is_err());
    /// assert!(LabelSpec::parse("x, y, u").is_err());
    /// ```
    pub fn parse(labels: &str) -> Result<Self> {
        Self::parse_with_limit(labels, DEFAULT_MAX_LABEL_LEN)
    }

    /// Parses a label string, rejecting strings longer than `max_len` bytes.
    pub fn parse_with_limit(labels: &str, max_len: usize) -> Result<Self> {
        let scanned = scan(labels, max_len)?;
        Ok(extract(labels, &scanned))
    }

    /// Parses with the deprecated grammar.
    ///
    /// See [`LegacyGrammar`] for what it accepts.
    #[deprecated(note = "use `LabelSpec::parse`; the legacy grammar has no time label and no character checks")]
    pub fn parse_legacy(labels: &str) -> Result<Self> {
        parse_legacy(labels, LEGACY_MAX_LABEL_LEN)
    }

    /// Number of input labels, not counting time.
    #[inline]
    #[must_use]
    pub fn indim(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output labels.
    #[inline]
    #[must_use]
    pub fn outdim(&self) -> usize {
        self.outputs.len()
    }

    /// Number of data columns: inputs then outputs, time excluded.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.indim() + self.outdim()
    }

    /// Iterates all labels, inputs then outputs, time excluded.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .map(String::as_str)
    }

    /// Renders the canonical label string.
    ///
    /// Time, if present, is always the last input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::LabelSpec;
    ///
    /// let spec = LabelSpec::parse("t,x ;u").unwrap();
    /// assert_eq!(spec.to_labels_string(), "x, t; u");
    /// ```
    #[must_use]
    pub fn to_labels_string(&self) -> String {
        let mut inputs: Vec<&str> = self.inputs.iter().map(String::as_str).collect();
        if self.has_time {
            inputs.push(TIME_LABEL);
        }
        let outputs: Vec<&str> = self.outputs.iter().map(String::as_str).collect();
        format!("{}; {}", inputs.join(", "), outputs.join(", "))
    }
}

impl fmt::Display for LabelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_labels_string())
    }
}

impl std::str::FromStr for LabelSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LabelSpec::parse(s)
    }
}

/// A label grammar.
///
/// [`Mv1Grammar`] is the default. [`LegacyGrammar`] exists only to read
/// label strings written for the deprecated grammar and must be chosen
/// explicitly.
pub trait Grammar {
    /// Length cap applied when the caller does not set one.
    const MAX_LEN: usize;

    /// Parses `labels`, rejecting strings longer than `max_len` bytes.
    fn parse(labels: &str, max_len: usize) -> Result<LabelSpec>;
}

/// The current grammar: `inputs; outputs` with the time convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mv1Grammar;

impl Grammar for Mv1Grammar {
    const MAX_LEN: usize = DEFAULT_MAX_LABEL_LEN;

    fn parse(labels: &str, max_len: usize) -> Result<LabelSpec> {
        LabelSpec::parse_with_limit(labels, max_len)
    }
}

/// The deprecated grammar.
///
/// The semicolon is optional (no semicolon means every label is an output),
/// either side may be empty, `t` is an ordinary label, and `_`/`-` are not
/// checked. Handles derived from such labels may not decode cleanly.
#[derive(Debug, Clone, Copy, Default)]
#[deprecated(note = "use `Mv1Grammar`")]
pub struct LegacyGrammar;

#[allow(deprecated)]
impl Grammar for LegacyGrammar {
    const MAX_LEN: usize = LEGACY_MAX_LABEL_LEN;

    fn parse(labels: &str, max_len: usize) -> Result<LabelSpec> {
        parse_legacy(labels, max_len)
    }
}

/// Separator characters: whitespace, vertical tab, `,` and `;`.
#[inline]
pub(crate) fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\u{000B}' || c == ',' || c == ';'
}

#[inline]
fn is_forbidden(c: char) -> bool {
    c == '_' || c == '-'
}

/// 1-based character column of a byte offset.
fn column(labels: &str, byte: usize) -> usize {
    labels.char_indices().take_while(|(i, _)| *i < byte).count() + 1
}

/// Result of the validating pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    /// Byte offset of the semicolon.
    pub semicolon: usize,
    /// Byte offset of the standalone time token, if any.
    pub time_at: Option<usize>,
    /// Input labels, time excluded.
    pub inputs: usize,
    /// Output labels.
    pub outputs: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting an identifier.
    ItemStart,
    /// Inside an identifier that began at the given byte offset.
    InToken(usize),
    /// After an identifier, expecting `,`, `;` or the end.
    TokenEnd,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Segment {
    Inputs,
    Outputs,
}

/// Validates a label string without allocating.
///
/// # Errors
///
/// Returns [`Error::Grammar`] on the first violation found.
pub fn scan(labels: &str, max_len: usize) -> Result<Scan> {
    let fail = |byte: usize, fault: GrammarFault| -> Result<Scan> {
        Err(Error::grammar(labels, column(labels, byte), fault))
    };

    if labels.len() > max_len {
        return fail(max_len, GrammarFault::TooLong { max: max_len });
    }

    let mut state = State::ItemStart;
    let mut segment = Segment::Inputs;
    let mut semicolon = None;
    let mut time_at = None;
    let mut counts = [0usize; 2];
    // any token started in the current segment
    let mut seen = false;

    // Closes the token spanning `start..end`; time tokens are counted separately.
    let mut finish = |start: usize,
                      end: usize,
                      segment: Segment,
                      time_at: &mut Option<usize>|
     -> std::result::Result<(), (usize, GrammarFault)> {
        if &labels[start..end] == TIME_LABEL {
            match (segment, *time_at) {
                (Segment::Outputs, _) => return Err((start, GrammarFault::TimeAsOutput)),
                (Segment::Inputs, Some(_)) => return Err((start, GrammarFault::DuplicateTime)),
                (Segment::Inputs, None) => *time_at = Some(start),
            }
        } else {
            counts[segment as usize] += 1;
        }
        Ok(())
    };

    for (i, c) in labels.char_indices() {
        if is_forbidden(c) {
            return fail(i, GrammarFault::ForbiddenChar(c));
        }

        if c == ',' || c == ';' {
            match state {
                State::ItemStart => {
                    let fault = match (c, segment) {
                        (';', Segment::Inputs) if !seen => GrammarFault::EmptyInputs,
                        (';', Segment::Outputs) => GrammarFault::MultipleSemicolons,
                        _ => GrammarFault::EmptyLabel,
                    };
                    return fail(i, fault);
                }
                State::InToken(start) => {
                    if let Err((at, fault)) = finish(start, i, segment, &mut time_at) {
                        return fail(at, fault);
                    }
                }
                State::TokenEnd => {}
            }
            if c == ';' {
                if segment == Segment::Outputs {
                    return fail(i, GrammarFault::MultipleSemicolons);
                }
                segment = Segment::Outputs;
                semicolon = Some(i);
                seen = false;
            }
            state = State::ItemStart;
            continue;
        }

        if is_separator(c) {
            if let State::InToken(start) = state {
                if let Err((at, fault)) = finish(start, i, segment, &mut time_at) {
                    return fail(at, fault);
                }
                state = State::TokenEnd;
            }
            continue;
        }

        match state {
            State::ItemStart => {
                state = State::InToken(i);
                seen = true;
            }
            State::InToken(_) => {}
            State::TokenEnd => return fail(i, GrammarFault::MissingSeparator),
        }
    }

    if let State::InToken(start) = state {
        if let Err((at, fault)) = finish(start, labels.len(), segment, &mut time_at) {
            return fail(at, fault);
        }
        state = State::TokenEnd;
    }

    let semicolon = match semicolon {
        Some(at) => at,
        None => return fail(labels.len(), GrammarFault::MissingSemicolon),
    };
    if state == State::ItemStart {
        let fault = if counts[Segment::Outputs as usize] == 0 {
            GrammarFault::EmptyOutputs
        } else {
            GrammarFault::EmptyLabel
        };
        return fail(labels.len(), fault);
    }

    Ok(Scan {
        semicolon,
        time_at,
        inputs: counts[Segment::Inputs as usize],
        outputs: counts[Segment::Outputs as usize],
    })
}

/// Splits a validated label string into a [`LabelSpec`].
///
/// `scanned` must come from [`scan`] on the same string.
#[must_use]
pub fn extract(labels: &str, scanned: &Scan) -> LabelSpec {
    let mut spec = LabelSpec {
        inputs: Vec::with_capacity(scanned.inputs),
        outputs: Vec::with_capacity(scanned.outputs),
        has_time: scanned.time_at.is_some(),
    };

    for (start, token) in tokens(labels) {
        if Some(start) == scanned.time_at {
            continue;
        }
        if start < scanned.semicolon {
            spec.inputs.push(token.to_string());
        } else {
            spec.outputs.push(token.to_string());
        }
    }

    spec
}

/// Iterates `(byte offset, token)` pairs between separators.
fn tokens(labels: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut rest = labels.char_indices().peekable();
    std::iter::from_fn(move || {
        while let Some(&(_, c)) = rest.peek() {
            if !is_separator(c) {
                break;
            }
            rest.next();
        }
        let (start, _) = rest.next()?;
        let mut end = labels.len();
        while let Some(&(i, c)) = rest.peek() {
            if is_separator(c) {
                end = i;
                break;
            }
            rest.next();
        }
        Some((start, &labels[start..end]))
    })
}

/// The deprecated grammar, kept for label strings that predate the time label.
fn parse_legacy(labels: &str, max_len: usize) -> Result<LabelSpec> {
    if labels.len() > max_len {
        let col = column(labels, max_len);
        return Err(Error::grammar(labels, col, GrammarFault::TooLong { max: max_len }));
    }

    let mut semicolon = None;
    for (i, c) in labels.char_indices() {
        if c == ';' {
            if semicolon.is_some() {
                let col = column(labels, i);
                return Err(Error::grammar(labels, col, GrammarFault::MultipleSemicolons));
            }
            semicolon = Some(i);
        }
    }

    let mut spec = LabelSpec {
        inputs: Vec::new(),
        outputs: Vec::new(),
        has_time: false,
    };
    for (start, token) in tokens(labels) {
        match semicolon {
            Some(at) if start < at => spec.inputs.push(token.to_string()),
            _ => spec.outputs.push(token.to_string()),
        }
    }

    if spec.outputs.is_empty() {
        return Err(Error::grammar(labels, labels.chars().count() + 1, GrammarFault::EmptyOutputs));
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fault(labels: &str) -> GrammarFault {
        match LabelSpec::parse(labels) {
            Err(Error::Grammar { fault, .. }) => fault,
            other => panic!("expected grammar error for {:?}, got {:?}", labels, other),
        }
    }

    #[test]
    fn test_parse_basic() {
        let spec = LabelSpec::parse("x, y; u").unwrap();
        assert_eq!(spec.inputs, vec!["x", "y"]);
        assert_eq!(spec.outputs, vec!["u"]);
        assert!(!spec.has_time);
        assert_eq!(spec.width(), 3);
    }

    #[test]
    fn test_parse_time() {
        let spec = LabelSpec::parse("t, x; u").unwrap();
        assert_eq!(spec.inputs, vec!["x"]);
        assert_eq!(spec.outputs, vec!["u"]);
        assert!(spec.has_time);

        let spec = LabelSpec::parse("t; a, b, c").unwrap();
        assert!(spec.inputs.is_empty());
        assert_eq!(spec.outputs, vec!["a", "b", "c"]);
        assert!(spec.has_time);
    }

    #[test]
    fn test_time_must_be_standalone() {
        let spec = LabelSpec::parse("at, tx; ut").unwrap();
        assert_eq!(spec.inputs, vec!["at", "tx"]);
        assert_eq!(spec.outputs, vec!["ut"]);
        assert!(!spec.has_time);
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        let spec = LabelSpec::parse("\n x ,\ty\u{000B};\r\n u ,v ").unwrap();
        assert_eq!(spec.inputs, vec!["x", "y"]);
        assert_eq!(spec.outputs, vec!["u", "v"]);
    }

    #[test]
    fn test_unicode_labels() {
        let spec = LabelSpec::parse("θ, φ; ψ").unwrap();
        assert_eq!(spec.inputs, vec!["θ", "φ"]);
        assert_eq!(spec.outputs, vec!["ψ"]);
    }

    #[test]
    fn test_grammar_faults() {
        assert_eq!(fault("x; t"), GrammarFault::TimeAsOutput);
        assert_eq!(fault("x; u, t"), GrammarFault::TimeAsOutput);
        assert_eq!(fault("x_1; u"), GrammarFault::ForbiddenChar('_'));
        assert_eq!(fault("x; u-v"), GrammarFault::ForbiddenChar('-'));
        assert_eq!(fault("x, y, u"), GrammarFault::MissingSemicolon);
        assert_eq!(fault(""), GrammarFault::MissingSemicolon);
        assert_eq!(fault(";"), GrammarFault::EmptyInputs);
        assert_eq!(fault("; u"), GrammarFault::EmptyInputs);
        assert_eq!(fault("x;"), GrammarFault::EmptyOutputs);
        assert_eq!(fault("x;  \n"), GrammarFault::EmptyOutputs);
        assert_eq!(fault("x; u; v"), GrammarFault::MultipleSemicolons);
        assert_eq!(fault("x;; u"), GrammarFault::MultipleSemicolons);
        assert_eq!(fault("x y; u"), GrammarFault::MissingSeparator);
        assert_eq!(fault("x,,y; u"), GrammarFault::EmptyLabel);
        assert_eq!(fault("x,; u"), GrammarFault::EmptyLabel);
        assert_eq!(fault("t,; u"), GrammarFault::EmptyLabel);
        assert_eq!(fault("x, ;u"), GrammarFault::EmptyLabel);
        assert_eq!(fault("x; u,"), GrammarFault::EmptyLabel);
        assert_eq!(fault("t, x, t; u"), GrammarFault::DuplicateTime);
    }

    #[test]
    fn test_error_column() {
        match LabelSpec::parse("x, y; t") {
            Err(Error::Grammar { col, .. }) => assert_eq!(col, 7),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_length_cap() {
        let long = format!("{}; u", "x".repeat(DEFAULT_MAX_LABEL_LEN));
        assert_eq!(fault(&long), GrammarFault::TooLong { max: DEFAULT_MAX_LABEL_LEN });

        let fits = format!("{}; u", "x".repeat(DEFAULT_MAX_LABEL_LEN - 3));
        assert_eq!(fits.len(), DEFAULT_MAX_LABEL_LEN);
        assert!(LabelSpec::parse(&fits).is_ok());
        assert!(LabelSpec::parse_with_limit("x; u", 3).is_err());
    }

    #[test]
    fn test_scan_counts() {
        let scanned = scan("x, t, y; u, v", DEFAULT_MAX_LABEL_LEN).unwrap();
        assert_eq!(scanned.inputs, 2);
        assert_eq!(scanned.outputs, 2);
        assert_eq!(scanned.semicolon, 7);
        assert_eq!(scanned.time_at, Some(3));
    }

    #[test]
    fn test_labels_string_roundtrip() {
        let spec = LabelSpec::parse(" t ,x,y;u ").unwrap();
        let canonical = spec.to_labels_string();
        assert_eq!(canonical, "x, y, t; u");
        assert_eq!(LabelSpec::parse(&canonical).unwrap(), spec);
        assert_eq!(spec.to_string(), canonical);
    }

    #[test]
    fn test_from_str() {
        let spec: LabelSpec = "x; u".parse().unwrap();
        assert_eq!(spec.labels().collect::<Vec<_>>(), vec!["x", "u"]);
    }

    #[test]
    #[allow(deprecated)]
    fn test_legacy_grammar() {
        let spec = LabelSpec::parse_legacy("f").unwrap();
        assert!(spec.inputs.is_empty());
        assert_eq!(spec.outputs, vec!["f"]);

        let spec = LabelSpec::parse_legacy("; u").unwrap();
        assert!(spec.inputs.is_empty());
        assert_eq!(spec.outputs, vec!["u"]);

        let spec = LegacyGrammar::parse("x_1, t; u", LEGACY_MAX_LABEL_LEN).unwrap();
        assert_eq!(spec.inputs, vec!["x_1", "t"]);
        assert!(!spec.has_time);

        assert!(LabelSpec::parse_legacy("x; u; v").is_err());
        assert!(LabelSpec::parse_legacy("x;").is_err());
        assert!(LabelSpec::parse_legacy(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_serde_json() {
        let spec = LabelSpec::parse("x, t; u").unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"inputs":["x"],"outputs":["u"],"has_time":true}"#);
        let back: LabelSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
