/// Tolerance under which two values compare equal.
pub const EPSILON: f64 = 1e-7;

/// Three-way comparison with absolute tolerance.
///
/// Returns `0` when `|b - a| < EPSILON`, otherwise the sign of `b - a`.
/// A NaN difference has no sign and yields `0`, which includes `INF - INF`.
pub fn compare(a: f64, b: f64) -> i8 {
    let diff = b - a;
    if diff.is_nan() || diff.abs() < EPSILON {
        0
    } else if diff > 0.0 {
        1
    } else {
        -1
    }
}
