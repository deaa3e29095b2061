//! # mv1
//!
//! Label-driven writer for the mv1 multi-variable text format.
//!
//! ## What is mv1?
//!
//! mv1 is the layout a numerical simulation uses to hand its output to
//! downstream tooling. A compact label string such as `"x, y; u"` says which
//! variables are inputs (`x`, `y`) and which are outputs (`u`). From it this
//! crate derives a file handle (`x-y--u`) and writes whitespace-delimited
//! data files plus a small TOML metadata file.
//!
//! ## Key Features
//!
//! - **Strict label grammar**: one semicolon, comma-separated identifiers, the
//!   reserved time label `t`, no `_` or `-` in labels
//! - **Deterministic file names**: every file of a channel shares one handle
//! - **Three record kinds**: per-point snapshots, dense arrays, time series
//! - **Explicit errors**: grammar, shape, capacity and I/O failures are
//!   distinct, and none of them leaves a half-written file
//!
//! ## Quick Start
//!
//! ```rust
//! use mv1::{Channel, Mv1Options};
//!
//! let dir = std::env::temp_dir();
//! let channel = Channel::open_with_options("x, t; u", Mv1Options::new().with_dir(&dir)).unwrap();
//! assert_eq!(channel.handle().as_str(), "x-t--u");
//!
//! // x in [0, 1], no range for u
//! channel.write_metadata(&[0.0, 1.0, 0.0, 0.0]).unwrap();
//!
//! // step 0 at t = 0: three points of (x, u)
//! channel.write_array(&[0.0, 1.0, 0.5, 0.5, 1.0, 0.0], 3, 0, 0.0).unwrap();
//! ```
//!
//! ## Files
//!
//! | File | Written by |
//! |------|------------|
//! | `<handle>.toml` | [`output_init`], [`Channel::write_metadata`] |
//! | `<handle>.t.dat` | every snapshot, array and time-series write |
//! | `<handle>.t<step>.dat` | [`output_snapshot`], [`output_array`] |
//! | `<handle>.dat` | [`output_timeseries`] |
//!
//! See [`format`] for the exact layout.

pub mod de;
pub mod error;
pub mod format;
pub mod handle;
pub mod labels;
pub mod meta;
pub mod options;
pub mod search;
pub mod ser;

pub use de::TimeLogEntry;
pub use error::{Error, GrammarFault, Result};
pub use handle::Handle;
#[allow(deprecated)]
pub use labels::LegacyGrammar;
pub use labels::{Grammar, LabelSpec, Mv1Grammar};
pub use meta::{Metadata, Range};
pub use options::Mv1Options;
pub use ser::{Channel, Point, PointCloud, PointSource};

/// Writes the `<handle>.toml` metadata file for a channel.
///
/// `ranges` holds one `(low, high)` pair per label, inputs then outputs, time
/// excluded. A pair with `low >= high` (for example `0, 0` or NaN) records no
/// range.
///
/// # Examples
///
/// ```rust
/// use mv1::{output_init_with_options, Mv1Options};
///
/// let options = Mv1Options::new().with_dir(std::env::temp_dir());
/// output_init_with_options("x, y; f", &[0.0, 1.0, 0.0, 2.0, 0.0, 0.0], options).unwrap();
/// ```
///
/// # Errors
///
/// Returns [`Error::Grammar`] for a malformed label string, [`Error::Shape`]
/// for the wrong number of bounds, and [`Error::Io`] if the file cannot be
/// written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn output_init(labels: &str, ranges: &[f64]) -> Result<()> {
    output_init_with_options(labels, ranges, Mv1Options::default())
}

/// Writes channel metadata with custom options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn output_init_with_options(labels: &str, ranges: &[f64], options: Mv1Options) -> Result<()> {
    Channel::open_with_options(labels, options)?.write_metadata(ranges)?;
    Ok(())
}

/// Dumps every point of a host domain for step `ti` at time `t`.
///
/// Each row holds the point's first `indim` coordinates, then its fields.
///
/// # Errors
///
/// Returns [`Error::Grammar`], [`Error::Shape`], [`Error::Capacity`], [`Error::FileName`] or
/// [`Error::Io`]. Grammar and shape errors leave every file untouched.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn output_snapshot<P>(labels: &str, points: &P, ti: u64, t: f64) -> Result<()>
where
    P: PointSource + ?Sized,
{
    output_snapshot_with_options(labels, points, ti, t, Mv1Options::default())
}

/// Dumps a host domain with custom options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn output_snapshot_with_options<P>(
    labels: &str,
    points: &P,
    ti: u64,
    t: f64,
    options: Mv1Options,
) -> Result<()>
where
    P: PointSource + ?Sized,
{
    Channel::open_with_options(labels, options)?.write_snapshot(points, ti, t)
}

/// Dumps a row-major `nrow x (indim + outdim)` table for step `ti`.
///
/// # Examples
///
/// ```rust
/// use mv1::{output_array_with_options, Mv1Options};
///
/// let options = Mv1Options::new().with_dir(std::env::temp_dir());
/// // "x, y; f" has three columns
/// let data = [0.0, 0.0, 1.0, 1.0, 0.0, 2.0];
/// output_array_with_options("x, y; f", &data, 2, 0, 0.0, options).unwrap();
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn output_array(labels: &str, data: &[f64], nrow: usize, ti: u64, t: f64) -> Result<()> {
    output_array_with_options(labels, data, nrow, ti, t, Mv1Options::default())
}

/// Dumps a table with custom options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn output_array_with_options(
    labels: &str,
    data: &[f64],
    nrow: usize,
    ti: u64,
    t: f64,
    options: Mv1Options,
) -> Result<()> {
    Channel::open_with_options(labels, options)?.write_array(data, nrow, ti, t)
}

/// Appends `<t> <values...>` to the channel's time series.
///
/// Typical labels are `"t; x"` or `"t; a, b, c"`, with one value per output.
/// Step 0 starts a new series.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn output_timeseries(labels: &str, values: &[f64], ti: u64, t: f64) -> Result<()> {
    output_timeseries_with_options(labels, values, ti, t, Mv1Options::default())
}

/// Appends a time-series row with custom options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn output_timeseries_with_options(
    labels: &str,
    values: &[f64],
    ti: u64,
    t: f64,
    options: Mv1Options,
) -> Result<()> {
    Channel::open_with_options(labels, options)?.write_timeseries(values, ti, t)
}
