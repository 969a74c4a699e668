//! Period-over-period change percentages.

/// Percent change from `previous` to `current`, rounded to one decimal.
///
/// 0.0 when `previous` is 0. With `invert` the sign is flipped, for metrics
/// where a decrease is the favorable direction.
#[allow(clippy::cast_precision_loss)]
pub fn change_percent(previous: u64, current: u64, invert: bool) -> f64 {
    if previous == 0 {
        return 0.0;
    }

    let raw = (current as f64 - previous as f64) / previous as f64 * 100.0;
    let rounded = (raw * 10.0).round() / 10.0;
    let signed = if invert { -rounded } else { rounded };

    // adding +0.0 turns -0.0 into 0.0, which would otherwise print as "-0"
    signed + 0.0
}
