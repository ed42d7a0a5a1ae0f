//! # Numeric Primitives
//!
//! Tolerance-aware comparison, guarded division and interpolation helpers
//! shared by every calculation module.
//!
//! All tolerances use [`EPSILON`]. Any value closer than that to a
//! singularity (zero divisor, zero depth, coincident points) is treated as
//! sitting on it.

/// Absolute tolerance for floating point comparisons and singularity guards.
pub const EPSILON: f64 = 1e-9;

/// True when `a` and `b` differ by less than [`EPSILON`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// True when `value` is within [`EPSILON`] of zero.
#[inline]
pub fn is_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Divide, returning `None` when the divisor is within [`EPSILON`] of zero
/// or the quotient is not finite.
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if is_zero(denominator) {
        return None;
    }
    let q = numerator / denominator;
    q.is_finite().then_some(q)
}

/// Clamp into `[min, max]`. NaN collapses to `min`.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Linear interpolation of y at `x` between (x1, y1) and (x2, y2).
///
/// Coincident abscissae return the mean of the two ordinates.
#[inline]
pub fn lerp(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    match safe_div(x - x1, x2 - x1) {
        Some(t) => y1 + t * (y2 - y1),
        None => 0.5 * (y1 + y2),
    }
}

/// Interpolate the abscissa where a segment crosses `y`, working in log10(x).
///
/// Used for grain diameters: the curve is linear in log(aperture) against
/// percent passing. Equal ordinates return the geometric mean of the two
/// abscissae. Both abscissae must be positive.
pub fn log_interp_x(y: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> Option<f64> {
    if x1 <= 0.0 || x2 <= 0.0 {
        return None;
    }
    let (l1, l2) = (x1.log10(), x2.log10());
    let log_x = if approx_eq(y1, y2) {
        0.5 * (l1 + l2)
    } else {
        l1 + (y - y1) * (l2 - l1) / (y2 - y1)
    };
    let x = 10f64.powf(log_x);
    x.is_finite().then_some(x)
}

/// Piecewise-linear interpolation over a table sorted by ascending x.
///
/// Outside the table the end ordinates are returned.
pub fn interp_table(x: f64, table: &[(f64, f64)]) -> Option<f64> {
    let (first, last) = (table.first()?, table.last()?);
    if x <= first.0 {
        return Some(first.1);
    }
    if x >= last.0 {
        return Some(last.1);
    }
    table
        .windows(2)
        .find(|w| x >= w[0].0 && x <= w[1].0)
        .map(|w| lerp(x, w[0].0, w[0].1, w[1].0, w[1].1))
}

/// Solve the dense system `a · x = b` by Gaussian elimination with partial
/// pivoting. Returns `None` when a pivot falls below [`EPSILON`].
///
/// Intended for the small normal-equation systems of polynomial fits.
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return None;
    }

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot_row][col].abs() < EPSILON {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}
