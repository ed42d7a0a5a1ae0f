//! # Elastic Half-Space Stress Formulas
//!
//! Vertical stress increment Δσv below surface loads on a homogeneous,
//! isotropic, linear-elastic, semi-infinite mass.
//!
//! ## Notation
//!
//! - `z` = Depth below the loaded surface (m), positive downward
//! - `r` = Horizontal distance from the load axis (m)
//! - `P` = Point load (kN)
//! - `q` = Surface pressure (kPa)
//! - `B` = Strip width (m)
//! - `R` = Radius of a circular load (m)
//! - `m`, `n` = Rectangle sides divided by depth (a/z, b/z)
//!
//! ## References
//!
//! - Boussinesq, J. (1885). Application des potentiels à l'étude de l'équilibre
//!   et du mouvement des solides élastiques
//! - Carothers, S.D. (1920). Direct determination of stresses
//! - Love, A.E.H. (1929). The stress produced in a semi-infinite solid by
//!   pressure on part of the boundary
//! - Newmark, N.M. (1935). Simplified computation of vertical pressures in
//!   elastic foundations
//!
//! Every function here is a pure formula. Guarding against zero depth and
//! non-positive loads is the caller's job (see `calculations::stress`).

use std::f64::consts::{FRAC_PI_2, PI};

use crate::numeric::{approx_eq, EPSILON};

// =============================================================================
// POINT LOAD (BOUSSINESQ)
// =============================================================================

/// Vertical stress below a point load
///
/// ```text
///          P
///          ↓
///   ───────●──────── surface
///          │╲
///        z │  ╲ R
///          │    ╲
///          └─────● (r, z)
///             r
/// ```
///
/// # Formula
/// Δσv = 3Pz³ / (2πR⁵),  R = √(r² + z²)
///
/// # Arguments
/// * `p` - Point load (kN)
/// * `r` - Horizontal distance from the load (m)
/// * `z` - Depth (m)
///
/// # Returns
/// Δσv in kPa. Infinite when R = 0; callers check before calling.
#[inline]
pub fn boussinesq_point(p: f64, r: f64, z: f64) -> f64 {
    let r2 = r * r + z * z;
    3.0 * p * z.powi(3) / (2.0 * PI * r2.powf(2.5))
}

/// Boussinesq influence factor Iσ = Δσv·z²/P = 3 / (2π[1 + (r/z)²]^{5/2})
#[inline]
pub fn boussinesq_influence(r_over_z: f64) -> f64 {
    3.0 / (2.0 * PI * (1.0 + r_over_z * r_over_z).powf(2.5))
}

// =============================================================================
// STRIP LOAD (CAROTHERS)
// =============================================================================

/// Edge angles α1, α2 subtended at the point by a strip of width B.
///
/// `x` is measured from the strip centreline.
///
/// # Formulas
/// - α1 = atan((B/2 − x)/z)
/// - α2 = atan((−B/2 − x)/z)
#[inline]
pub fn strip_edge_angles(b: f64, x: f64, z: f64) -> (f64, f64) {
    let half = b / 2.0;
    (((half - x) / z).atan(), ((-half - x) / z).atan())
}

/// Vertical stress below a uniformly loaded strip of infinite length
///
/// ```text
///        ←── B ──→
///   ─────▓▓▓▓▓▓▓▓▓───── q
///          ╲   ╱
///         α1 ╲╱ α2
///             ● (x, z)
/// ```
///
/// # Formula
/// Δσv = (q/π)·[Δα + sin Δα · cos Σα]
///
/// with Δα = α1 − α2 (angle subtended by the strip) and Σα = α1 + α2.
#[inline]
pub fn carothers_strip(q: f64, b: f64, x: f64, z: f64) -> f64 {
    let (a1, a2) = strip_edge_angles(b, x, z);
    let delta = a1 - a2;
    let sum = a1 + a2;
    q / PI * (delta + delta.sin() * sum.cos())
}

// =============================================================================
// CIRCULAR LOAD (LOVE)
// =============================================================================

/// Vertical stress on the axis of a uniformly loaded circle
///
/// # Formula
/// Δσv = q·[1 − (1 / (1 + (R/z)²))^{3/2}]
#[inline]
pub fn love_circular_axis(q: f64, radius: f64, z: f64) -> f64 {
    let ratio = radius / z;
    q * (1.0 - (1.0 / (1.0 + ratio * ratio)).powf(1.5))
}

/// Vertical stress under a uniformly loaded circle at horizontal offset `r`
/// from its centre.
///
/// # Formula
/// The Boussinesq kernel integrates in closed form along a ray leaving the
/// point of interest, so only the ray angle φ is integrated numerically:
///
/// Δσv = (q/π) ∫₀^π [g(s₁) − g(s₂)] dφ,  g(s) = z³ / (s² + z²)^{3/2}
///
/// where [s₁, s₂] is the chord of the ray inside the disk,
/// s = −r cos φ ± √(R² − r² sin² φ), clipped at zero. Inside the disk
/// s₁ = 0. Outside, only rays within the tangent angle asin(R/r) of the
/// centre direction cross the disk; that range is remapped with
/// φ = π − φₜ(1 − u²) so the square-root tangency becomes smooth.
///
/// Composite Simpson with `steps` intervals (rounded up to even). The
/// integrand stays bounded by one as z → 0, which gives the surface limits
/// q inside, q/2 on the edge and 0 outside.
pub fn love_circular_integrated(q: f64, radius: f64, r: f64, z: f64, steps: usize) -> f64 {
    let n = even_steps(steps);
    let z3 = z.powi(3);
    let g = |s: f64| z3 / (s * s + z * z).powf(1.5);

    let chord = |phi: f64| -> f64 {
        let (sin, cos) = phi.sin_cos();
        let disc = radius * radius - r * r * sin * sin;
        if disc < 0.0 {
            return 0.0;
        }
        let root = disc.sqrt();
        let near = (-r * cos - root).max(0.0);
        let far = (-r * cos + root).max(0.0);
        g(near) - g(far)
    };

    let integral = if r < radius {
        let h = PI / n as f64;
        (0..=n).map(|i| simpson_weight(i, n) * chord(i as f64 * h)).sum::<f64>() * h / 3.0
    } else {
        let tangent = (radius / r).min(1.0).asin();
        let h = 1.0 / n as f64;
        (0..=n)
            .map(|i| {
                let u = i as f64 * h;
                simpson_weight(i, n) * chord(PI - tangent * (1.0 - u * u)) * 2.0 * tangent * u
            })
            .sum::<f64>()
            * h
            / 3.0
    };

    q / PI * integral
}

fn even_steps(n: usize) -> usize {
    let n = n.max(2);
    n + n % 2
}

fn simpson_weight(i: usize, n: usize) -> f64 {
    if i == 0 || i == n {
        1.0
    } else if i % 2 == 1 {
        4.0
    } else {
        2.0
    }
}

// =============================================================================
// RECTANGULAR LOAD (NEWMARK)
// =============================================================================

/// Influence factor below the corner of a uniformly loaded rectangle
///
/// ```text
///   ●───────── a ─────────┐
///   │                     │
///   b          q          │
///   │                     │
///   └─────────────────────┘
///   ● = point of interest at depth z below this corner
/// ```
///
/// # Formula (Newmark 1935)
/// I = 1/(4π)·[ 2mn√(m²+n²+1)(m²+n²+2) / ((m²+n²+1+m²n²)(m²+n²+1))
///            + atan2(2mn√(m²+n²+1), m²+n²+1−m²n²) ]
///
/// with m = a/z and n = b/z. The two-argument arctangent keeps the angle in
/// (0, π) when m²n² > m²+n²+1, which the single-argument form gets wrong.
/// A vanishing denominator (m²n² = m²+n²+1) gives exactly π/2.
///
/// # Returns
/// I in [0, 0.25]. Zero when a side or the depth is not positive.
pub fn newmark_corner_influence(a: f64, b: f64, z: f64) -> f64 {
    if a <= EPSILON || b <= EPSILON || z <= EPSILON {
        return 0.0;
    }
    let m = a / z;
    let n = b / z;
    let m2 = m * m;
    let n2 = n * n;
    let v = m2 + n2 + 1.0;
    let sqrt_v = v.sqrt();

    let term1 = (2.0 * m * n * sqrt_v * (v + 1.0)) / ((v + m2 * n2) * v);
    let term2 = if approx_eq(v, m2 * n2) {
        FRAC_PI_2
    } else {
        (2.0 * m * n * sqrt_v).atan2(v - m2 * n2)
    };

    (term1 + term2) / (4.0 * PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_boussinesq_on_axis() {
        // 3·100·8 / (2π·32) = 11.937
        assert_relative_eq!(boussinesq_point(100.0, 0.0, 2.0), 11.9366, epsilon = 1e-4);
        assert_relative_eq!(boussinesq_influence(0.0), 3.0 / (2.0 * PI));
    }

    #[test]
    fn test_carothers_below_centre() {
        // Under the centre at z = B/2: α1 = 45°, α2 = -45°, Δα = π/2
        // Δσ/q = (π/2 + 1)/π = 0.8183
        let sigma = carothers_strip(100.0, 2.0, 0.0, 1.0);
        assert_relative_eq!(sigma, 81.83, epsilon = 0.01);
    }

    #[test]
    fn test_carothers_symmetric() {
        let left = carothers_strip(50.0, 3.0, -1.2, 2.0);
        let right = carothers_strip(50.0, 3.0, 1.2, 2.0);
        assert_relative_eq!(left, right, epsilon = 1e-12);
    }

    #[test]
    fn test_love_axis_limits() {
        // z = R: 1 - (1/2)^1.5 = 0.6464
        assert_relative_eq!(love_circular_axis(1.0, 1.0, 1.0), 0.6464, epsilon = 1e-4);
        // Very shallow point approaches q
        assert!(love_circular_axis(100.0, 1.0, 1e-4) > 99.99);
    }

    #[test]
    fn test_integration_matches_axis_closed_form() {
        let closed = love_circular_axis(100.0, 1.5, 2.0);
        let integrated = love_circular_integrated(100.0, 1.5, 0.0, 2.0, 256);
        assert_relative_eq!(integrated, closed, max_relative = 1e-6);
    }

    #[test]
    fn test_integration_off_axis_influence() {
        // Love influence table: z/R = 1 gives 0.332 at r/R = 1 and 0.560 at r/R = 0.5
        assert_relative_eq!(love_circular_integrated(1.0, 1.0, 1.0, 1.0, 256), 0.3322, epsilon = 1e-3);
        assert_relative_eq!(love_circular_integrated(1.0, 1.0, 0.5, 1.0, 256), 0.5622, epsilon = 1e-3);
        // Outside the disk
        assert_relative_eq!(love_circular_integrated(1.0, 1.0, 2.0, 1.0, 256), 0.0418, epsilon = 1e-3);
    }

    #[test]
    fn test_integration_surface_limits() {
        // z/R well below 1: q inside, q/2 on the edge, nothing outside
        let z = 0.001;
        assert_relative_eq!(love_circular_integrated(100.0, 1.5, 0.75, z, 1024), 100.0, epsilon = 1e-3);
        assert_relative_eq!(love_circular_integrated(100.0, 1.5, 1.5, z, 1024), 50.0, epsilon = 0.05);
        assert!(love_circular_integrated(100.0, 1.5, 2.0, z, 1024) < 1e-3);
    }

    #[test]
    fn test_newmark_table_values() {
        // m = n = 1 gives 0.1752
        assert_relative_eq!(newmark_corner_influence(1.0, 1.0, 1.0), 0.1752, epsilon = 1e-4);
        // m = n = 2 gives 0.2325 (atan branch past the singular line)
        assert_relative_eq!(newmark_corner_influence(2.0, 2.0, 1.0), 0.2325, epsilon = 1e-4);
    }

    #[test]
    fn test_newmark_upper_bound() {
        let i = newmark_corner_influence(1e4, 1e4, 1.0);
        assert!(i < 0.25 && i > 0.2499);
    }

    #[test]
    fn test_newmark_degenerate_sides() {
        assert_eq!(newmark_corner_influence(0.0, 2.0, 1.0), 0.0);
        assert_eq!(newmark_corner_influence(2.0, 2.0, 0.0), 0.0);
    }

    #[test]
    fn test_newmark_symmetric_in_sides() {
        assert_relative_eq!(
            newmark_corner_influence(1.3, 0.4, 0.9),
            newmark_corner_influence(0.4, 1.3, 0.9),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_newmark_continuous_where_denominator_vanishes() {
        // m = n = sqrt(1 + sqrt 2) gives m²n² = m² + n² + 1
        let m = (1.0 + 2.0_f64.sqrt()).sqrt();
        let at = newmark_corner_influence(m, m, 1.0);
        assert_relative_eq!(at, 0.218231, epsilon = 1e-6);
        assert_relative_eq!(at, newmark_corner_influence(m + 1e-6, m, 1.0), epsilon = 1e-7);
        assert_relative_eq!(at, newmark_corner_influence(m - 1e-6, m, 1.0), epsilon = 1e-7);
    }
}
