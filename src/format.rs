//! The mv1 on-disk layout and numeric rendering.
//!
//! # Overview
//!
//! A *channel* is one label string, e.g. `"x, y; u"`, and every file it produces
//! shares the channel's handle (`x-y--u`, see [`Handle`](crate::Handle)).
//!
//! | File | Content | Open mode |
//! |------|---------|-----------|
//! | `<handle>.toml` | metadata: format tag, raw labels, ranges | truncate |
//! | `<handle>.t.dat` | `<step> <time>` per output event | truncate at step 0, else append |
//! | `<handle>.t<step>.dat` | one row per point or array row | truncate |
//! | `<handle>.dat` | `<time> <out1> ... <outk>` time series | truncate at step 0, else append |
//!
//! # Rows
//!
//! Rows are space-separated values terminated by `\n`. Column order is inputs
//! in parsed order, then outputs in parsed order. Time is never a column of a
//! snapshot or array file; it lives in the time log instead.
//!
//! ```text
//! 0.000000e+00 1.000000e+00 3.500000e-01
//! 5.000000e-01 1.000000e+00 3.412000e-01
//! ```
//!
//! # Numbers
//!
//! Reals render like C `printf("%e")`: one leading digit, a fixed number of
//! fractional digits (six by default, so seven significant digits), `e`, an
//! explicit exponent sign, and at least two exponent digits. Non-finite values
//! render as `nan`, `-nan`, `inf` and `-inf`. Consumers split on whitespace; the
//! columns are not fixed-width.
//!
//! # Metadata
//!
//! ```text
//! format = 'mv1'
//! labels = 'x, y; u'
//! [ranges]
//! 'x' = [0.000000e+00, 1.000000e+00]
//! 'y' = [0.000000e+00, 1.000000e+00]
//! 'u' = false
//! ```
//!
//! A range renders as `false` when `low >= high` or either bound is NaN.

/// Format tag written to every metadata file.
pub const FORMAT_TAG: &str = "mv1";

/// Appends `value` to `out` in C `%e` notation.
///
/// # Examples
///
/// ```rust
/// use mv1::format::push_exp;
///
/// let mut out = String::new();
/// push_exp(&mut out, 1234.5, 6);
/// assert_eq!(out, "1.234500e+03");
/// ```
pub fn push_exp(out: &mut String, value: f64, precision: usize) {
    if value.is_nan() {
        out.push_str(if value.is_sign_negative() { "-nan" } else { "nan" });
        return;
    }
    if value.is_infinite() {
        out.push_str(if value < 0.0 { "-inf" } else { "inf" });
        return;
    }

    let rendered = format!("{:.*e}", precision, value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            out.push_str(mantissa);
            out.push('e');
            out.push(if exponent < 0 { '-' } else { '+' });
            out.push_str(&format!("{:02}", exponent.unsigned_abs()));
        }
        None => out.push_str(&rendered),
    }
}

/// Renders `value` in C `%e` notation.
#[must_use]
pub fn format_exp(value: f64, precision: usize) -> String {
    let mut out = String::with_capacity(precision + 8);
    push_exp(&mut out, value, precision);
    out
}

/// Appends one space-separated, newline-terminated row.
pub fn push_row(out: &mut String, values: &[f64], precision: usize) {
    push_values(out, values, precision);
    out.push('\n');
}

/// Appends space-separated values, with no trailing separator.
pub(crate) fn push_values(out: &mut String, values: &[f64], precision: usize) {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        push_exp(out, *v, precision);
    }
}

/// Upper bound on the rendered width of one value.
#[inline]
pub(crate) fn value_width(precision: usize) -> usize {
    // sign, digit, point, digits, 'e', sign, three exponent digits, separator
    precision + 9
}
