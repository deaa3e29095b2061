//! Configuration options for mv1 channels.
//!
//! [`Mv1Options`] controls where channel files land and how values are rendered.
//!
//! ## Examples
//!
//! ```rust
//! use mv1::Mv1Options;
//!
//! let options = Mv1Options::new()
//!     .with_dir("out")
//!     .with_precision(10);
//! assert_eq!(options.precision, 10);
//! ```

use crate::{Error, Result};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Default grammar length cap, in bytes.
pub const DEFAULT_MAX_LABEL_LEN: usize = 512;

/// Length cap of the deprecated grammar, in bytes.
pub const LEGACY_MAX_LABEL_LEN: usize = 200;

/// Default number of digits after the decimal point (C `%e`).
pub const DEFAULT_PRECISION: usize = 6;

/// Longest file name most filesystems accept.
pub const DEFAULT_MAX_FILE_NAME: usize = 255;

/// Configuration options for writing mv1 channels.
///
/// # Examples
///
/// ```rust
/// use mv1::Mv1Options;
///
/// let options = Mv1Options::new();
/// assert_eq!(options.precision, 6);
/// assert_eq!(options.max_label_len, None);
/// ```
#[derive(Clone, Debug)]
pub struct Mv1Options {
    /// Directory receiving every file of a channel.
    pub dir: PathBuf,
    /// Digits after the decimal point in exponential notation.
    pub precision: usize,
    /// Label strings longer than this many bytes are rejected. `None` uses the
    /// grammar's own cap ([`DEFAULT_MAX_LABEL_LEN`] or [`LEGACY_MAX_LABEL_LEN`]).
    pub max_label_len: Option<usize>,
    /// Derived file names longer than this many bytes are rejected.
    pub max_file_name: usize,
}

impl Default for Mv1Options {
    fn default() -> Self {
        Mv1Options {
            dir: PathBuf::from("."),
            precision: DEFAULT_PRECISION,
            max_label_len: None,
            max_file_name: DEFAULT_MAX_FILE_NAME,
        }
    }
}

impl Mv1Options {
    /// Creates default options (current directory, `%e` precision).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output directory.
    ///
    /// The directory must already exist; it is never created.
    #[must_use]
    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the number of digits after the decimal point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::Mv1Options;
    ///
    /// let options = Mv1Options::new().with_precision(3);
    /// assert_eq!(options.precision, 3);
    /// ```
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the grammar length cap.
    #[must_use]
    pub fn with_max_label_len(mut self, max: usize) -> Self {
        self.max_label_len = Some(max);
        self
    }

    /// Sets the file name length limit.
    #[must_use]
    pub fn with_max_file_name(mut self, max: usize) -> Self {
        self.max_file_name = max;
        self
    }

    /// Joins a file name onto the output directory.
    ///
    /// Fails unless the name is one plain path component, so the result always
    /// stays directly inside [`dir`](Self::dir).
    pub(crate) fn path_for(&self, file_name: &str) -> Result<PathBuf> {
        let mut parts = Path::new(file_name).components();
        let plain = matches!(parts.next(), Some(Component::Normal(_))) && parts.next().is_none();
        if !plain || file_name.contains('/') || file_name.contains(MAIN_SEPARATOR) {
            return Err(Error::file_name(file_name));
        }
        Ok(self.dir.join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for_plain_name() {
        let options = Mv1Options::new().with_dir("out");
        assert_eq!(options.path_for("x--u.t0.dat").unwrap(), Path::new("out").join("x--u.t0.dat"));
        assert!(options.path_for("..--u.dat").is_ok());
    }

    #[test]
    fn test_path_for_rejects_escapes() {
        let options = Mv1Options::new().with_dir("out");
        for name in ["/tmp/x--u.dat", "a/b--u.dat", "..", ".", ""] {
            assert!(
                matches!(options.path_for(name), Err(Error::FileName { .. })),
                "{:?} should be rejected",
                name
            );
        }
    }
}
