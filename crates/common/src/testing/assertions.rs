//! Assertion helpers

/// Assert that two floats are within `epsilon` of each other
///
/// # Examples
///
/// ```
/// use interconnect_common::testing::assertions::assert_approx_eq;
///
/// assert_approx_eq(4.545, 4.5, 0.05);
/// ```
///
/// # Panics
///
/// Panics when the values differ by `epsilon` or more.
#[allow(clippy::panic)]
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff < epsilon,
        "Values not approximately equal: {actual} vs {expected} (diff: {diff})"
    );
}
