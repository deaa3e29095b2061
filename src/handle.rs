//! File handles derived from parsed labels.
//!
//! A handle is the base name shared by every file of a channel. Each input is
//! followed by `-`, time adds `t-`, one more `-` marks the input/output
//! boundary, and outputs are joined by `-`:
//!
//! | Labels | Handle |
//! |--------|--------|
//! | `x, y; u` | `x-y--u` |
//! | `x, t; u, v` | `x-t--u-v` |
//! | `t; f` | `t--f` |
//!
//! A channel with neither inputs nor time still starts with `--` (`f` gives
//! `--f`). Labels never contain `-`, so the first `--` always marks the
//! boundary and [`Handle::decode`] can recover the labels.

use crate::labels::TIME_LABEL;
use crate::{Error, LabelSpec, Result};
use std::fmt;

/// Base file name of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle(String);

impl Handle {
    /// Encodes a spec into its handle.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::{Handle, LabelSpec};
    ///
    /// let spec = LabelSpec::parse("x, y; u").unwrap();
    /// assert_eq!(Handle::new(&spec).as_str(), "x-y--u");
    /// ```
    #[must_use]
    pub fn new(spec: &LabelSpec) -> Self {
        let mut out = String::with_capacity(Self::encoded_len(spec));
        for label in &spec.inputs {
            out.push_str(label);
            out.push('-');
        }
        if spec.has_time {
            out.push_str(TIME_LABEL);
            out.push('-');
        }
        if out.is_empty() {
            out.push('-');
        }
        out.push('-');
        out.push_str(&spec.outputs.join("-"));
        Handle(out)
    }

    /// Exact length in bytes of the encoded handle.
    #[must_use]
    pub fn encoded_len(spec: &LabelSpec) -> usize {
        let inputs: usize = spec.inputs.iter().map(|l| l.len() + 1).sum();
        let time = if spec.has_time { TIME_LABEL.len() + 1 } else { 0 };
        let lead = if inputs + time == 0 { 1 } else { 0 };
        let outputs: usize = spec.outputs.iter().map(String::len).sum();
        inputs + time + lead + 1 + outputs + spec.outputs.len().saturating_sub(1)
    }

    /// Buffer size that always fits the handle: one byte per label character,
    /// one separator per label, plus three.
    #[must_use]
    pub fn capacity_bound(spec: &LabelSpec) -> usize {
        spec.labels().map(|l| l.len() + 1).sum::<usize>() + 3
    }

    /// Encodes a spec into a caller-provided buffer.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Capacity`] if `buf` is too small; nothing is written.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::{Handle, LabelSpec};
    ///
    /// let spec = LabelSpec::parse("x; u").unwrap();
    /// let mut buf = [0u8; 8];
    /// let n = Handle::encode_into(&spec, &mut buf).unwrap();
    /// assert_eq!(&buf[..n], b"x--u");
    ///
    /// let mut small = [0u8; 3];
    /// assert!(Handle::encode_into(&spec, &mut small).is_err());
    /// ```
    pub fn encode_into(spec: &LabelSpec, buf: &mut [u8]) -> Result<usize> {
        let needed = Self::encoded_len(spec);
        if buf.len() < needed {
            return Err(Error::capacity(needed, buf.len()));
        }
        let handle = Self::new(spec);
        buf[..needed].copy_from_slice(handle.0.as_bytes());
        Ok(needed)
    }

    /// Recovers the labels a handle was encoded from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Custom`] if the text has no `--` boundary, an empty
    /// label, or `t` among the outputs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::Handle;
    ///
    /// let spec = Handle::decode("x-t--u-v").unwrap();
    /// assert_eq!(spec.inputs, vec!["x"]);
    /// assert_eq!(spec.outputs, vec!["u", "v"]);
    /// assert!(spec.has_time);
    /// ```
    pub fn decode(text: &str) -> Result<LabelSpec> {
        let Some((inputs, outputs)) = text.split_once("--") else {
            return Err(Error::custom(format!("handle {:?} has no '--' boundary", text)));
        };

        let mut spec = LabelSpec {
            inputs: Vec::new(),
            outputs: Vec::new(),
            has_time: false,
        };
        if !inputs.is_empty() {
            for label in inputs.split('-') {
                if label.is_empty() {
                    return Err(Error::custom(format!("handle {:?} has an empty input", text)));
                }
                if label == TIME_LABEL && !spec.has_time {
                    spec.has_time = true;
                } else {
                    spec.inputs.push(label.to_string());
                }
            }
        }
        for label in outputs.split('-') {
            if label.is_empty() || label == TIME_LABEL {
                return Err(Error::custom(format!("handle {:?} has a bad output {:?}", text, label)));
            }
            spec.outputs.push(label.to_string());
        }
        Ok(spec)
    }

    /// The handle text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<handle>.t<ti>.dat`: one snapshot or array dump per step.
    #[must_use]
    pub fn snapshot_file(&self, ti: u64) -> String {
        format!("{}.t{}.dat", self.0, ti)
    }

    /// `<handle>.t.dat`: the `(step, time)` log.
    #[must_use]
    pub fn time_log_file(&self) -> String {
        format!("{}.t.dat", self.0)
    }

    /// `<handle>.dat`: the append-only time series.
    #[must_use]
    pub fn series_file(&self) -> String {
        format!("{}.dat", self.0)
    }

    /// `<handle>.toml`: channel metadata.
    #[must_use]
    pub fn metadata_file(&self) -> String {
        format!("{}.toml", self.0)
    }
}

impl From<&LabelSpec> for Handle {
    fn from(spec: &LabelSpec) -> Self {
        Handle::new(spec)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(labels: &str) -> String {
        Handle::new(&LabelSpec::parse(labels).unwrap()).0
    }

    #[test]
    fn test_encoding() {
        assert_eq!(handle("x, y; u"), "x-y--u");
        assert_eq!(handle("x, v; f"), "x-v--f");
        assert_eq!(handle("t, x; u"), "x-t--u");
        assert_eq!(handle("t; a, b, c"), "t--a-b-c");
        assert_eq!(handle("x, y, z; u, v, T, P"), "x-y-z--u-v-T-P");
    }

    #[test]
    fn test_partition_changes_handle() {
        assert_eq!(handle("x; y"), "x--y");
        assert_eq!(handle("y; x"), "y--x");
        assert_ne!(handle("x, y; u"), handle("x; y, u"));
    }

    #[test]
    #[allow(deprecated)]
    fn test_empty_inputs() {
        let spec = LabelSpec::parse_legacy("f").unwrap();
        assert_eq!(Handle::new(&spec).as_str(), "--f");
        assert_eq!(Handle::decode("--f").unwrap(), spec);
        assert_eq!(Handle::encoded_len(&spec), 3);
        assert!(Handle::encoded_len(&spec) <= Handle::capacity_bound(&spec));

        let mut buf = [0u8; 3];
        let n = Handle::encode_into(&spec, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"--f");
    }

    #[test]
    fn test_lengths() {
        for labels in ["x, y; u", "t; f", "abc, t, d; uu, v", "θ; φ"] {
            let spec = LabelSpec::parse(labels).unwrap();
            let h = Handle::new(&spec);
            assert_eq!(h.as_str().len(), Handle::encoded_len(&spec));
            assert!(Handle::encoded_len(&spec) <= Handle::capacity_bound(&spec));
        }
    }

    #[test]
    fn test_encode_into_exact_fit() {
        let spec = LabelSpec::parse("x, t; u, v").unwrap();
        let mut buf = vec![0u8; Handle::encoded_len(&spec)];
        let n = Handle::encode_into(&spec, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"x-t--u-v");

        let mut short = vec![0u8; n - 1];
        match Handle::encode_into(&spec, &mut short) {
            Err(Error::Capacity { needed, capacity }) => {
                assert_eq!(needed, n);
                assert_eq!(capacity, n - 1);
            }
            other => panic!("expected capacity error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_roundtrip() {
        for labels in ["x, y; u", "t; f", "x, t; u, v", "a, b, c; d"] {
            let spec = LabelSpec::parse(labels).unwrap();
            assert_eq!(Handle::decode(Handle::new(&spec).as_str()).unwrap(), spec);
        }
    }

    #[test]
    fn test_decode_rejects() {
        assert!(Handle::decode("x-y-u").is_err());
        assert!(Handle::decode("x--").is_err());
        assert!(Handle::decode("x--t").is_err());
        assert!(Handle::decode("x---u").is_err());
    }

    #[test]
    fn test_file_names() {
        let h = Handle::new(&LabelSpec::parse("x; u").unwrap());
        assert_eq!(h.snapshot_file(12), "x--u.t12.dat");
        assert_eq!(h.time_log_file(), "x--u.t.dat");
        assert_eq!(h.series_file(), "x--u.dat");
        assert_eq!(h.metadata_file(), "x--u.toml");
    }
}
