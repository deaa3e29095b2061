//! Reading mv1 files back.
//!
//! The consumer side of the layout described in [`format`](crate::format):
//! whitespace-delimited tables, the `(step, time)` log, and metadata.
//!
//! ```rust
//! use mv1::de::parse_table;
//!
//! let rows = parse_table("1.0e+00 2.0e+00\n3.0e+00 4.0e+00\n", 2).unwrap();
//! assert_eq!(rows, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
//! ```

use crate::{Error, Metadata, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One row of a `<handle>.t.dat` time log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeLogEntry {
    pub step: u64,
    pub time: f64,
}

/// Splits a line into `(column, token)` pairs.
fn fields(line: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut col = 1;
    let mut pending = None;
    let mut chars = line.char_indices();
    std::iter::from_fn(move || loop {
        match chars.next() {
            Some((i, c)) if c.is_whitespace() => {
                col += 1;
                if let Some((start_col, start)) = pending.take() {
                    return Some((start_col, &line[start..i]));
                }
            }
            Some((i, _)) => {
                if pending.is_none() {
                    pending = Some((col, i));
                }
                col += 1;
            }
            None => {
                return pending.take().map(|(start_col, start)| (start_col, &line[start..]));
            }
        }
    })
}

fn number(token: &str, line: usize, col: usize) -> Result<f64> {
    token
        .parse()
        .map_err(|_| Error::parse(line, col, &format!("expected a number, found {:?}", token)))
}

/// Parses whitespace-delimited rows of exactly `ncol` reals.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns [`Error::Parse`] with the line and column of the first bad token
/// or short/long row.
pub fn parse_table(text: &str, ncol: usize) -> Result<Vec<Vec<f64>>> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut row = Vec::with_capacity(ncol);
        for (col, token) in fields(line) {
            if row.len() == ncol {
                return Err(Error::parse(i + 1, col, &format!("more than {} columns", ncol)));
            }
            row.push(number(token, i + 1, col)?);
        }
        if row.len() != ncol {
            let msg = format!("expected {} columns, found {}", ncol, row.len());
            return Err(Error::parse(i + 1, line.chars().count() + 1, &msg));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parses `<step> <time>` rows.
pub fn parse_time_log(text: &str) -> Result<Vec<TimeLogEntry>> {
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let mut parts = fields(line);
        let Some((col, step)) = parts.next() else {
            continue;
        };
        let step = step
            .parse()
            .map_err(|_| Error::parse(i + 1, col, &format!("expected a step index, found {:?}", step)))?;
        let time = match parts.next() {
            Some((col, token)) => number(token, i + 1, col)?,
            None => return Err(Error::parse(i + 1, line.chars().count() + 1, "missing time")),
        };
        if let Some((col, _)) = parts.next() {
            return Err(Error::parse(i + 1, col, "trailing characters"));
        }
        entries.push(TimeLogEntry { step, time });
    }
    Ok(entries)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, &e))
}

/// Reads a snapshot, array or time-series file of `ncol` columns.
pub fn read_table(path: impl AsRef<Path>, ncol: usize) -> Result<Vec<Vec<f64>>> {
    parse_table(&read(path.as_ref())?, ncol)
}

/// Reads a `<handle>.t.dat` time log.
pub fn read_time_log(path: impl AsRef<Path>) -> Result<Vec<TimeLogEntry>> {
    parse_time_log(&read(path.as_ref())?)
}

/// Reads a `<handle>.toml` metadata file.
pub fn read_metadata(path: impl AsRef<Path>) -> Result<Metadata> {
    read(path.as_ref())?.parse()
}
