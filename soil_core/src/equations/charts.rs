//! # Digitized Influence Charts
//!
//! Tabulated influence values as printed in soil mechanics textbooks, for
//! users who want to reproduce a hand calculation read off a chart instead
//! of the exact closed form.
//!
//! - Newmark rectangle chart: I(m, n) on an 18 × 18 grid, read at the nearest
//!   tabulated m and n (no interpolation, like reading a chart).
//! - Love circle chart: σ/q against r/R for five z/R curves, interpolated
//!   linearly between curves and along each curve.

use crate::numeric::{clamp, interp_table, lerp};

/// Tabulated m and n values of the Newmark chart. `f64::INFINITY` is the
/// column for sides much longer than the depth.
pub const NEWMARK_CHART_AXIS: [f64; 18] = [
    0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.2, 1.5, 2.0, 2.5, 3.0, 5.0, 10.0, f64::INFINITY,
];

/// Newmark corner influence factors, rows by n and columns by m.
#[rustfmt::skip]
pub const NEWMARK_CHART: [[f64; 18]; 18] = [
    [0.005, 0.009, 0.013, 0.017, 0.020, 0.022, 0.024, 0.026, 0.027, 0.028, 0.029, 0.030, 0.031, 0.031, 0.032, 0.032, 0.032, 0.032],
    [0.009, 0.018, 0.026, 0.033, 0.039, 0.043, 0.047, 0.050, 0.053, 0.055, 0.057, 0.059, 0.061, 0.062, 0.062, 0.062, 0.062, 0.062],
    [0.013, 0.026, 0.037, 0.047, 0.056, 0.063, 0.069, 0.073, 0.077, 0.079, 0.083, 0.086, 0.089, 0.090, 0.090, 0.090, 0.090, 0.090],
    [0.017, 0.033, 0.047, 0.060, 0.071, 0.080, 0.087, 0.093, 0.098, 0.101, 0.106, 0.110, 0.113, 0.115, 0.115, 0.115, 0.115, 0.115],
    [0.020, 0.039, 0.056, 0.071, 0.084, 0.095, 0.103, 0.110, 0.116, 0.120, 0.126, 0.131, 0.135, 0.137, 0.137, 0.137, 0.137, 0.137],
    [0.022, 0.043, 0.063, 0.080, 0.095, 0.107, 0.117, 0.125, 0.131, 0.136, 0.143, 0.149, 0.153, 0.155, 0.156, 0.156, 0.156, 0.156],
    [0.024, 0.047, 0.069, 0.087, 0.103, 0.117, 0.128, 0.137, 0.144, 0.149, 0.157, 0.164, 0.169, 0.170, 0.171, 0.172, 0.172, 0.172],
    [0.026, 0.050, 0.073, 0.093, 0.110, 0.125, 0.137, 0.146, 0.154, 0.160, 0.168, 0.176, 0.181, 0.183, 0.184, 0.185, 0.185, 0.185],
    [0.027, 0.053, 0.077, 0.098, 0.116, 0.131, 0.144, 0.154, 0.162, 0.168, 0.178, 0.186, 0.192, 0.194, 0.195, 0.196, 0.196, 0.196],
    [0.028, 0.055, 0.079, 0.101, 0.120, 0.136, 0.149, 0.160, 0.168, 0.175, 0.185, 0.193, 0.200, 0.202, 0.203, 0.204, 0.205, 0.205],
    [0.029, 0.057, 0.083, 0.106, 0.126, 0.143, 0.157, 0.168, 0.178, 0.185, 0.196, 0.205, 0.212, 0.215, 0.216, 0.217, 0.218, 0.218],
    [0.030, 0.059, 0.086, 0.110, 0.131, 0.149, 0.164, 0.176, 0.186, 0.193, 0.205, 0.215, 0.223, 0.226, 0.228, 0.229, 0.230, 0.230],
    [0.031, 0.061, 0.089, 0.113, 0.135, 0.153, 0.169, 0.181, 0.192, 0.200, 0.212, 0.223, 0.232, 0.236, 0.238, 0.239, 0.240, 0.240],
    [0.031, 0.062, 0.090, 0.115, 0.137, 0.155, 0.170, 0.183, 0.194, 0.202, 0.215, 0.226, 0.236, 0.240, 0.242, 0.244, 0.244, 0.244],
    [0.032, 0.062, 0.090, 0.115, 0.137, 0.156, 0.171, 0.184, 0.195, 0.203, 0.216, 0.228, 0.238, 0.242, 0.244, 0.246, 0.247, 0.247],
    [0.032, 0.062, 0.090, 0.115, 0.137, 0.156, 0.172, 0.185, 0.196, 0.204, 0.217, 0.229, 0.239, 0.244, 0.246, 0.249, 0.249, 0.249],
    [0.032, 0.062, 0.090, 0.115, 0.137, 0.156, 0.172, 0.185, 0.196, 0.205, 0.218, 0.230, 0.240, 0.244, 0.247, 0.250, 0.250, 0.250],
    [0.032, 0.062, 0.090, 0.115, 0.137, 0.156, 0.172, 0.185, 0.196, 0.205, 0.218, 0.230, 0.240, 0.244, 0.247, 0.250, 0.250, 0.250],
];

/// Index of the tabulated value nearest to `value`. Anything above 10 reads
/// the infinite column.
pub fn newmark_chart_index(value: f64) -> usize {
    let last = NEWMARK_CHART_AXIS.len() - 1;
    if value > 10.0 {
        return last;
    }
    NEWMARK_CHART_AXIS[..last]
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
        .map(|(i, _)| i)
        .unwrap_or(last)
}

/// Corner influence factor read off the Newmark chart
pub fn newmark_chart_influence(m: f64, n: f64) -> f64 {
    NEWMARK_CHART[newmark_chart_index(n)][newmark_chart_index(m)]
}

/// One z/R curve of the Love chart: (r/R, σ/q) pairs
struct LoveCurve {
    z_over_r: f64,
    points: &'static [(f64, f64)],
}

static LOVE_CHART: &[LoveCurve] = &[
    LoveCurve {
        z_over_r: 0.5,
        points: &[(0.0, 0.91), (0.5, 0.85), (0.75, 0.75), (1.0, 0.50), (1.25, 0.23), (1.5, 0.10)],
    },
    LoveCurve {
        z_over_r: 1.0,
        points: &[(0.0, 0.6465), (0.5, 0.60), (0.75, 0.52), (1.0, 0.365), (1.25, 0.22), (1.5, 0.12)],
    },
    LoveCurve {
        z_over_r: 1.5,
        points: &[(0.0, 0.42), (0.5, 0.40), (0.75, 0.36), (1.0, 0.29), (1.25, 0.20), (1.5, 0.13)],
    },
    LoveCurve {
        z_over_r: 2.0,
        points: &[(0.0, 0.29), (0.5, 0.28), (0.75, 0.26), (1.0, 0.22), (1.25, 0.17), (1.5, 0.12)],
    },
    LoveCurve {
        z_over_r: 3.0,
        points: &[(0.0, 0.14), (0.5, 0.14), (0.75, 0.13), (1.0, 0.12), (1.25, 0.10), (1.5, 0.08)],
    },
];

/// Influence σ/q read off the Love chart.
///
/// Outside the charted z/R and r/R ranges the nearest edge of the chart is
/// used. Never negative.
pub fn love_chart_influence(z_over_r: f64, r_over_r: f64) -> f64 {
    let read = |curve: &LoveCurve| interp_table(r_over_r, curve.points).unwrap_or(0.0);

    let (first, last) = match (LOVE_CHART.first(), LOVE_CHART.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };

    let value = if z_over_r <= first.z_over_r {
        read(first)
    } else if z_over_r >= last.z_over_r {
        read(last)
    } else {
        LOVE_CHART
            .windows(2)
            .find(|w| z_over_r >= w[0].z_over_r && z_over_r <= w[1].z_over_r)
            .map(|w| lerp(z_over_r, w[0].z_over_r, read(&w[0]), w[1].z_over_r, read(&w[1])))
            .unwrap_or(0.0)
    };

    clamp(value, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::elasticity::newmark_corner_influence;

    #[test]
    fn test_chart_is_symmetric() {
        for i in 0..18 {
            for j in 0..18 {
                assert_eq!(NEWMARK_CHART[i][j], NEWMARK_CHART[j][i], "({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_nearest_index() {
        assert_eq!(newmark_chart_index(0.04), 0);
        assert_eq!(newmark_chart_index(1.09), 9);
        assert_eq!(newmark_chart_index(1.11), 10);
        assert_eq!(newmark_chart_index(7.0), 15);
        assert_eq!(newmark_chart_index(8.0), 16);
        assert_eq!(newmark_chart_index(25.0), 17);
    }

    #[test]
    fn test_chart_agrees_with_formula() {
        for &(m, n) in &[(0.5, 0.5), (1.0, 1.0), (2.0, 1.0), (3.0, 0.3)] {
            let chart = newmark_chart_influence(m, n);
            let exact = newmark_corner_influence(m, n, 1.0);
            assert!((chart - exact).abs() < 0.002, "m={} n={}: {} vs {}", m, n, chart, exact);
        }
    }

    #[test]
    fn test_love_chart_nodes_and_blend() {
        assert!((love_chart_influence(1.0, 0.0) - 0.6465).abs() < 1e-12);
        assert!((love_chart_influence(2.0, 1.0) - 0.22).abs() < 1e-12);
        // Halfway between the z/R = 1.5 and 2.0 curves on the axis
        assert!((love_chart_influence(1.75, 0.0) - 0.355).abs() < 1e-12);
    }

    #[test]
    fn test_love_chart_clamps_outside_range() {
        assert_eq!(love_chart_influence(0.1, 0.0), 0.91);
        assert_eq!(love_chart_influence(10.0, 5.0), 0.08);
    }
}
