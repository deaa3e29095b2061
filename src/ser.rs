//! mv1 record writing.
//!
//! This module provides [`Channel`], which binds a parsed label string to its
//! [`Handle`] and writes the channel's files:
//!
//! - **Snapshots**: one row per domain point, from a [`PointSource`]
//! - **Arrays**: a dense `nrow x width` table
//! - **Time series**: one `<t> <outputs...>` row appended per step
//! - **Time log**: one `<step> <t>` row per output event
//! - **Metadata**: the `<handle>.toml` companion file
//!
//! Every record is rendered in memory first, so a shape error never leaves a
//! half-written file. Files are opened, written, flushed and closed within
//! each call; nothing is held open between calls.
//!
//! ## Usage
//!
//! ```rust
//! use mv1::{Channel, Mv1Options};
//!
//! let dir = std::env::temp_dir();
//! let channel = Channel::open_with_options("x; u", Mv1Options::new().with_dir(&dir)).unwrap();
//!
//! // two rows of (x, u)
//! channel.write_array(&[0.0, 1.0, 0.5, 0.25], 2, 0, 0.0).unwrap();
//! ```
//!
//! ## Pure rendering
//!
//! The `render_*` functions return the exact text a writer would emit:
//!
//! ```rust
//! use mv1::{ser::render_series_row, LabelSpec};
//!
//! let spec = LabelSpec::parse("t; a, b").unwrap();
//! let row = render_series_row(&spec, 0.5, &[1.0, 2.0], 6).unwrap();
//! assert_eq!(row, "5.000000e-01 1.000000e+00 2.000000e+00\n");
//! ```

use crate::format::{push_exp, push_row, push_values, value_width};
use crate::labels::{Grammar, Mv1Grammar};
use crate::meta::Metadata;
use crate::{Error, Handle, LabelSpec, Mv1Options, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Most coordinates a snapshot row can carry.
pub const MAX_COORDS: usize = 3;

/// One point of a host domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<'a> {
    /// Spatial coordinates; at least as many as the channel has inputs.
    pub coords: &'a [f64],
    /// Field values, exactly one per output label in output order.
    pub fields: &'a [f64],
}

/// A host domain that can be walked point by point.
///
/// Implemented by the simulation host over its own grid. The writer only
/// reads from it.
pub trait PointSource {
    /// Calls `visitor` once per point in iteration order, stopping at the
    /// first error.
    fn visit(&self, visitor: &mut dyn FnMut(Point<'_>) -> Result<()>) -> Result<()>;
}

/// An owned list of points.
///
/// # Examples
///
/// ```rust
/// use mv1::PointCloud;
///
/// let mut cloud = PointCloud::new(2, 1);
/// cloud.push(&[0.0, 0.0], &[1.0]).unwrap();
/// cloud.push(&[0.5, 0.0], &[0.8]).unwrap();
/// assert_eq!(cloud.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    dim: usize,
    fields: usize,
    coords: Vec<f64>,
    values: Vec<f64>,
}

impl PointCloud {
    /// Creates an empty cloud of `dim` coordinates and `fields` values per point.
    #[must_use]
    pub fn new(dim: usize, fields: usize) -> Self {
        PointCloud {
            dim,
            fields,
            coords: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends a point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if either slice has the wrong length.
    pub fn push(&mut self, coords: &[f64], fields: &[f64]) -> Result<()> {
        if coords.len() != self.dim {
            return Err(Error::shape("point coordinates", self.dim, coords.len()));
        }
        if fields.len() != self.fields {
            return Err(Error::shape("point fields", self.fields, fields.len()));
        }
        self.coords.extend_from_slice(coords);
        self.values.extend_from_slice(fields);
        Ok(())
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.fields > 0 {
            self.values.len() / self.fields
        } else if self.dim > 0 {
            self.coords.len() / self.dim
        } else {
            0
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PointSource for PointCloud {
    fn visit(&self, visitor: &mut dyn FnMut(Point<'_>) -> Result<()>) -> Result<()> {
        for i in 0..self.len() {
            visitor(Point {
                coords: &self.coords[i * self.dim..(i + 1) * self.dim],
                fields: &self.values[i * self.fields..(i + 1) * self.fields],
            })?;
        }
        Ok(())
    }
}

/// Renders one time-log row, `<ti> <t>\n`.
#[must_use]
pub fn render_time_entry(ti: u64, t: f64, precision: usize) -> String {
    let mut out = format!("{} ", ti);
    push_exp(&mut out, t, precision);
    out.push('\n');
    out
}

/// Renders a dense row-major table of `nrow` rows, `spec.width()` columns.
///
/// # Errors
///
/// Returns [`Error::Shape`] unless `data.len() == nrow * spec.width()`.
///
/// # Examples
///
/// ```rust
/// use mv1::{ser::render_array, LabelSpec};
///
/// let spec = LabelSpec::parse("x; u").unwrap();
/// let text = render_array(&spec, &[0.0, 1.0, 1.0, 2.0], 2, 6).unwrap();
/// assert_eq!(text, "0.000000e+00 1.000000e+00\n1.000000e+00 2.000000e+00\n");
/// ```
pub fn render_array(spec: &LabelSpec, data: &[f64], nrow: usize, precision: usize) -> Result<String> {
    let width = spec.width();
    let expected = nrow
        .checked_mul(width)
        .ok_or_else(|| Error::capacity(usize::MAX, data.len()))?;
    if data.len() != expected {
        return Err(Error::shape("array", expected, data.len()));
    }

    let mut out = String::with_capacity(data.len() * value_width(precision));
    if width > 0 {
        for row in data.chunks_exact(width) {
            push_row(&mut out, row, precision);
        }
    }
    Ok(out)
}

/// Renders one snapshot row per point: `indim` coordinates, then the fields.
///
/// # Errors
///
/// Returns [`Error::Shape`] if the channel has more than [`MAX_COORDS`]
/// inputs, or a point has too few coordinates or the wrong number of fields.
pub fn render_snapshot<P>(spec: &LabelSpec, points: &P, precision: usize) -> Result<String>
where
    P: PointSource + ?Sized,
{
    let indim = spec.indim();
    let outdim = spec.outdim();
    if indim > MAX_COORDS {
        return Err(Error::shape("snapshot coordinates", MAX_COORDS, indim));
    }

    let mut out = String::new();
    points.visit(&mut |point: Point<'_>| {
        if point.coords.len() < indim {
            return Err(Error::shape("point coordinates", indim, point.coords.len()));
        }
        if point.fields.len() != outdim {
            return Err(Error::shape("point fields", outdim, point.fields.len()));
        }
        push_values(&mut out, &point.coords[..indim], precision);
        if indim > 0 {
            out.push(' ');
        }
        push_row(&mut out, point.fields, precision);
        Ok(())
    })?;
    Ok(out)
}

/// Renders one time-series row, `<t> <v1> ... <vk>\n`.
///
/// # Errors
///
/// Returns [`Error::Shape`] unless there is one value per output label.
pub fn render_series_row(spec: &LabelSpec, t: f64, values: &[f64], precision: usize) -> Result<String> {
    if values.len() != spec.outdim() {
        return Err(Error::shape("time series values", spec.outdim(), values.len()));
    }
    let mut out = String::with_capacity((values.len() + 1) * value_width(precision));
    push_exp(&mut out, t, precision);
    for v in values {
        out.push(' ');
        push_exp(&mut out, *v, precision);
    }
    out.push('\n');
    Ok(out)
}

/// Writes `text` to `path`, appending or truncating, then flushes and closes.
fn write_file(path: &Path, text: &str, append: bool) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| Error::io(path, &e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| Error::io(path, &e))?;
    file.flush().map_err(|e| Error::io(path, &e))?;
    Ok(())
}

/// One output channel: a parsed label string and the files it owns.
///
/// Writing the same channel from several threads or processes at once is not
/// supported; callers serialize access themselves.
#[derive(Debug, Clone)]
pub struct Channel {
    labels: String,
    spec: LabelSpec,
    handle: Handle,
    options: Mv1Options,
}

impl Channel {
    /// Parses `labels` and binds the channel to the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] for a malformed label string.
    pub fn open(labels: &str) -> Result<Self> {
        Self::open_with_options(labels, Mv1Options::default())
    }

    /// Parses `labels` with the current grammar and the given options.
    pub fn open_with_options(labels: &str, options: Mv1Options) -> Result<Self> {
        Self::open_with::<Mv1Grammar>(labels, options)
    }

    /// Parses `labels` with an explicit grammar.
    ///
    /// Without [`Mv1Options::with_max_label_len`] the grammar's own length cap
    /// applies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// #![allow(deprecated)]
    /// use mv1::{Channel, LegacyGrammar, Mv1Options};
    ///
    /// let channel = Channel::open_with::<LegacyGrammar>("f", Mv1Options::new()).unwrap();
    /// assert_eq!(channel.handle().as_str(), "--f");
    /// ```
    pub fn open_with<G: Grammar>(labels: &str, options: Mv1Options) -> Result<Self> {
        let spec = G::parse(labels, options.max_label_len.unwrap_or(G::MAX_LEN))?;
        let handle = Handle::new(&spec);
        Ok(Channel {
            labels: labels.to_string(),
            spec,
            handle,
            options,
        })
    }

    /// The raw label string.
    #[must_use]
    pub fn labels(&self) -> &str {
        &self.labels
    }

    #[must_use]
    pub fn spec(&self) -> &LabelSpec {
        &self.spec
    }

    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    #[must_use]
    pub fn options(&self) -> &Mv1Options {
        &self.options
    }

    /// Full path of a channel file, checked against the file name limit.
    fn path(&self, file_name: String) -> Result<PathBuf> {
        if file_name.len() > self.options.max_file_name {
            return Err(Error::capacity(file_name.len(), self.options.max_file_name));
        }
        self.options.path_for(&file_name)
    }

    /// Path of the snapshot or array file for step `ti`.
    pub fn snapshot_path(&self, ti: u64) -> Result<PathBuf> {
        self.path(self.handle.snapshot_file(ti))
    }

    pub fn time_log_path(&self) -> Result<PathBuf> {
        self.path(self.handle.time_log_file())
    }

    pub fn series_path(&self) -> Result<PathBuf> {
        self.path(self.handle.series_file())
    }

    pub fn metadata_path(&self) -> Result<PathBuf> {
        self.path(self.handle.metadata_file())
    }

    /// Records `(ti, t)` in `<handle>.t.dat`; step 0 starts a new log.
    pub fn write_time_log(&self, ti: u64, t: f64) -> Result<()> {
        let path = self.time_log_path()?;
        write_file(&path, &render_time_entry(ti, t, self.options.precision), ti != 0)
    }

    /// Dumps every point of `points` to `<handle>.t<ti>.dat` and logs the step.
    ///
    /// # Errors
    ///
    /// Shape errors are raised before any file is written. I/O errors are
    /// returned as [`Error::Io`].
    pub fn write_snapshot<P>(&self, points: &P, ti: u64, t: f64) -> Result<()>
    where
        P: PointSource + ?Sized,
    {
        let text = render_snapshot(&self.spec, points, self.options.precision)?;
        self.write_step(&text, ti, t)?;
        tracing::debug!(handle = %self.handle, ti, t, bytes = text.len(), "wrote snapshot");
        Ok(())
    }

    /// Dumps a row-major `nrow x width` table to `<handle>.t<ti>.dat` and logs
    /// the step.
    pub fn write_array(&self, data: &[f64], nrow: usize, ti: u64, t: f64) -> Result<()> {
        let text = render_array(&self.spec, data, nrow, self.options.precision)?;
        self.write_step(&text, ti, t)?;
        tracing::debug!(handle = %self.handle, ti, t, rows = nrow, "wrote array");
        Ok(())
    }

    /// Appends `<t> <values...>` to `<handle>.dat` and logs the step; step 0
    /// starts a new series.
    pub fn write_timeseries(&self, values: &[f64], ti: u64, t: f64) -> Result<()> {
        let row = render_series_row(&self.spec, t, values, self.options.precision)?;
        let path = self.series_path()?;
        let log = self.time_log_path()?;
        write_file(&path, &row, ti != 0)?;
        write_file(&log, &render_time_entry(ti, t, self.options.precision), ti != 0)?;
        tracing::debug!(handle = %self.handle, ti, t, "appended time series row");
        Ok(())
    }

    /// Writes `<handle>.toml` from `2 * width` range bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if `ranges` has the wrong length.
    pub fn write_metadata(&self, ranges: &[f64]) -> Result<Metadata> {
        let meta = Metadata::new(&self.labels, &self.spec, ranges)?;
        let path = self.metadata_path()?;
        write_file(&path, &meta.render(self.options.precision), false)?;
        tracing::debug!(handle = %self.handle, ranges = meta.ranges.len(), "wrote metadata");
        Ok(meta)
    }

    /// Replaces the step's data file, then logs the step.
    ///
    /// Both paths are checked first, and the log only records a step whose
    /// data file was written.
    fn write_step(&self, text: &str, ti: u64, t: f64) -> Result<()> {
        let path = self.snapshot_path(ti)?;
        let log = self.time_log_path()?;
        write_file(&path, text, false)?;
        write_file(&log, &render_time_entry(ti, t, self.options.precision), ti != 0)
    }
}
