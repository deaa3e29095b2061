//! Exact-match search over an ascending array of reals.
//!
//! Used to find a grid coordinate (or a recorded time) in an ascending table.
//! When the value is absent, [`locate`] returns the lower-bound insertion
//! point: the first index whose element is not less than the query.

/// Index of `x` in the ascending slice `xs`, or the lower-bound insertion
/// point when `x` is absent.
///
/// The result is always in `0..=xs.len()`. An empty slice returns 0 and a NaN
/// query returns 0. When `x` occurs several times, the first occurrence is
/// returned. Runs in `O(log n)` comparisons.
///
/// # Examples
///
/// ```rust
/// use mv1::search::locate;
///
/// let xs = [0.0, 0.5, 1.0, 1.5];
/// assert_eq!(locate(&xs, 1.0), 2);
/// assert_eq!(locate(&xs, 0.75), 2);
/// assert_eq!(locate(&xs, 9.0), 4);
/// assert_eq!(locate(&[], 1.0), 0);
/// ```
#[must_use]
pub fn locate(xs: &[f64], x: f64) -> usize {
    let mut lo = 0;
    let mut hi = xs.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if xs[mid] < x {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Index of an element exactly equal to `x`, if any.
///
/// # Examples
///
/// ```rust
/// use mv1::search::find_exact;
///
/// assert_eq!(find_exact(&[1.0, 2.0, 3.0], 2.0), Some(1));
/// assert_eq!(find_exact(&[1.0, 2.0, 3.0], 2.5), None);
/// ```
#[must_use]
pub fn find_exact(xs: &[f64], x: f64) -> Option<usize> {
    let i = locate(xs, x);
    match xs.get(i) {
        Some(v) if *v == x => Some(i),
        _ => None,
    }
}
