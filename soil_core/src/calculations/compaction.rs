//! # Compaction Curve (Proctor)
//!
//! Reduces Proctor test points to moisture and dry unit weight, fits a
//! polynomial compaction curve and reports the optimum moisture content and
//! maximum dry unit weight, plus the zero-air-voids curve.
//!
//! ## Assumptions
//!
//! - One mould of known volume and mass for all points
//! - Moisture from a tared sample (wet and dry gross masses) unless a direct
//!   reading is given
//! - The curve is an ordinary least-squares polynomial solved directly from
//!   the normal equations; the optimum is its interior stationary maximum
//!
//! A fit that cannot honour the raw data (no maximum, maximum outside the
//! tested moisture range, or a peak below a measured point) is reported as a
//! failure rather than extrapolated.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::calculations::compaction::{analyze_compaction, CompactionInput, CompactionPoint};
//!
//! let point = |w: f64, gamma_d: f64| CompactionPoint {
//!     cylinder_sample_mass_g: 4000.0 + gamma_d * (1.0 + w / 100.0) * 100.0,
//!     wet_gross_mass_g: 200.0 + w,
//!     dry_gross_mass_g: 200.0,
//!     tare_mass_g: 100.0,
//!     direct_moisture_pct: None,
//! };
//!
//! let input = CompactionInput {
//!     points: vec![point(10.0, 17.0), point(14.0, 18.2), point(18.0, 17.8)],
//!     cylinder_volume_cm3: 1000.0,
//!     cylinder_mass_g: 4000.0,
//!     ..Default::default()
//! };
//!
//! let curve = analyze_compaction(&input);
//! assert!(curve.error.is_none());
//! println!("w_opt = {:?} %, γd,max = {:?} kN/m³", curve.optimum_moisture_pct, curve.max_dry_unit_weight);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::numeric::{is_zero, solve_linear_system, EPSILON};
use crate::units::{dry_unit_weight, CubicCm, Grams, KnPerM3, WATER_UNIT_WEIGHT_KN_M3};

/// Points on the zero-air-voids curve
pub const ZERO_AIR_VOIDS_POINTS: usize = 20;

const METHOD: &str = "Compaction curve";

fn default_water_unit_weight() -> f64 {
    WATER_UNIT_WEIGHT_KN_M3
}

/// Polynomial used for the compaction curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveFit {
    /// Parabola for three points, cubic for four or more
    #[default]
    Auto,
    /// Parabola regardless of the number of points
    Quadratic,
}

impl CurveFit {
    /// Polynomial degree for `n` points
    pub fn degree(&self, n: usize) -> usize {
        match self {
            CurveFit::Auto if n >= 4 => 3,
            _ => 2,
        }
    }
}

/// One Proctor point as weighed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionPoint {
    /// Mould plus compacted soil (g)
    pub cylinder_sample_mass_g: f64,
    /// Moisture tin plus wet soil (g)
    pub wet_gross_mass_g: f64,
    /// Moisture tin plus dry soil (g)
    pub dry_gross_mass_g: f64,
    /// Empty moisture tin (g)
    pub tare_mass_g: f64,
    /// Moisture content (%) read directly; overrides the tin masses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_moisture_pct: Option<f64>,
}

/// Input for a compaction curve.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Proctor normal - jazida 2",
///   "cylinder_volume_cm3": 1000.0,
///   "cylinder_mass_g": 4000.0,
///   "specific_gravity": 2.65,
///   "points": [
///     { "cylinder_sample_mass_g": 5870.0, "wet_gross_mass_g": 210.0, "dry_gross_mass_g": 200.0, "tare_mass_g": 100.0 },
///     { "cylinder_sample_mass_g": 6074.8, "wet_gross_mass_g": 214.0, "dry_gross_mass_g": 200.0, "tare_mass_g": 100.0 },
///     { "cylinder_sample_mass_g": 6100.4, "wet_gross_mass_g": 218.0, "dry_gross_mass_g": 200.0, "tare_mass_g": 100.0 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionInput {
    #[serde(default)]
    pub label: String,
    pub points: Vec<CompactionPoint>,
    /// Mould volume (cm³)
    pub cylinder_volume_cm3: f64,
    /// Empty mould mass (g)
    pub cylinder_mass_g: f64,
    /// Specific gravity of solids, for the zero-air-voids curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_gravity: Option<f64>,
    /// Unit weight of water (kN/m³)
    #[serde(default = "default_water_unit_weight")]
    pub water_unit_weight: f64,
    #[serde(default)]
    pub fit: CurveFit,
}

impl Default for CompactionInput {
    fn default() -> Self {
        Self {
            label: String::new(),
            points: Vec::new(),
            cylinder_volume_cm3: 0.0,
            cylinder_mass_g: 0.0,
            specific_gravity: None,
            water_unit_weight: WATER_UNIT_WEIGHT_KN_M3,
            fit: CurveFit::Auto,
        }
    }
}

impl CompactionInput {
    /// Validate the mould and material constants.
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.cylinder_volume_cm3 > 0.0) {
            return Err(CalcError::invalid_input(
                "cylinder_volume_cm3",
                self.cylinder_volume_cm3.to_string(),
                "Mould volume must be positive",
            ));
        }
        if !(self.cylinder_mass_g >= 0.0) {
            return Err(CalcError::invalid_input(
                "cylinder_mass_g",
                self.cylinder_mass_g.to_string(),
                "Mould mass cannot be negative",
            ));
        }
        if let Some(gs) = self.specific_gravity {
            if !(gs > 0.0) {
                return Err(CalcError::invalid_input(
                    "specific_gravity",
                    gs.to_string(),
                    "Specific gravity must be positive",
                ));
            }
        }
        if !(self.water_unit_weight > 0.0) {
            return Err(CalcError::invalid_input(
                "water_unit_weight",
                self.water_unit_weight.to_string(),
                "Unit weight of water must be positive",
            ));
        }
        Ok(())
    }

    /// Reduce one point to moisture and unit weights.
    fn reduce_point(&self, index: usize, point: &CompactionPoint) -> CalcResult<ReducedPoint> {
        let field = |name: &str| format!("points[{}].{}", index, name);

        if point.cylinder_sample_mass_g <= self.cylinder_mass_g {
            return Err(CalcError::invalid_input(
                field("cylinder_sample_mass_g"),
                point.cylinder_sample_mass_g.to_string(),
                "Mould with soil must weigh more than the empty mould",
            ));
        }

        let moisture_pct = match point.direct_moisture_pct {
            Some(w) if w.is_finite() && w >= 0.0 => w,
            Some(w) => {
                return Err(CalcError::invalid_input(
                    field("direct_moisture_pct"),
                    w.to_string(),
                    "Moisture content cannot be negative",
                ))
            }
            None => {
                if !(point.tare_mass_g < point.dry_gross_mass_g && point.dry_gross_mass_g < point.wet_gross_mass_g) {
                    return Err(CalcError::invalid_input(
                        field("dry_gross_mass_g"),
                        point.dry_gross_mass_g.to_string(),
                        "Masses must satisfy tare < dry < wet",
                    ));
                }
                let net_wet = Grams(point.wet_gross_mass_g - point.tare_mass_g);
                let net_dry = Grams(point.dry_gross_mass_g - point.tare_mass_g);
                (net_wet - net_dry).value() / net_dry.value() * 100.0
            }
        };

        let wet_density =
            Grams(point.cylinder_sample_mass_g - self.cylinder_mass_g) / CubicCm(self.cylinder_volume_cm3);
        let wet_unit_weight = wet_density.to_unit_weight(KnPerM3(self.water_unit_weight));

        Ok(ReducedPoint {
            source_index: index,
            moisture_pct,
            wet_density_g_cm3: wet_density.value(),
            wet_unit_weight,
            dry_unit_weight: dry_unit_weight(wet_unit_weight, moisture_pct),
        })
    }
}

/// A Proctor point after reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedPoint {
    /// Position of the point in the input
    pub source_index: usize,
    pub moisture_pct: f64,
    pub wet_density_g_cm3: f64,
    pub wet_unit_weight: KnPerM3,
    pub dry_unit_weight: KnPerM3,
}

/// Point on the zero-air-voids curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZeroAirVoidsPoint {
    pub moisture_pct: f64,
    pub dry_unit_weight: f64,
}

/// Reduced compaction test.
///
/// `optimum_moisture_pct` and `max_dry_unit_weight` come from the fitted
/// curve and are only reported when the fit succeeded, in which case the
/// maximum is at least every measured dry unit weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompactionCurve {
    /// Points sorted by moisture content
    pub points: Vec<ReducedPoint>,
    /// Fitted polynomial in moisture (%), constant term first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimum_moisture_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dry_unit_weight: Option<f64>,
    /// Index into `points` of the highest measured dry unit weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_point_index: Option<usize>,
    /// Index into `points` of the point closest in moisture to the optimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_point_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zero_air_voids: Vec<ZeroAirVoidsPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CalcError>,
}

impl CompactionCurve {
    /// Dry unit weight on the fitted curve, if a curve was fitted
    pub fn fitted_dry_unit_weight(&self, moisture_pct: f64) -> Option<f64> {
        if self.coefficients.is_empty() {
            return None;
        }
        Some(
            self.coefficients
                .iter()
                .rev()
                .fold(0.0, |acc, c| acc * moisture_pct + c),
        )
    }

    fn failed(mut self, error: CalcError) -> Self {
        tracing::warn!("compaction curve not fitted: {}", error);
        self.error = Some(error);
        self
    }
}

/// Zero-air-voids curve: γd = Gs·γw / (1 + Gs·w/100).
///
/// Sampled at [`ZERO_AIR_VOIDS_POINTS`] evenly spaced moistures from
/// max(0, w_min − 5) to w_max + 10.
pub fn zero_air_voids_curve(
    specific_gravity: f64,
    water_unit_weight: f64,
    min_moisture_pct: f64,
    max_moisture_pct: f64,
) -> Vec<ZeroAirVoidsPoint> {
    let start = (min_moisture_pct - 5.0).max(0.0);
    let end = max_moisture_pct + 10.0;
    let step = (end - start) / (ZERO_AIR_VOIDS_POINTS - 1) as f64;

    (0..ZERO_AIR_VOIDS_POINTS)
        .map(|i| {
            let w = start + step * i as f64;
            ZeroAirVoidsPoint {
                moisture_pct: w,
                dry_unit_weight: specific_gravity * water_unit_weight / (1.0 + specific_gravity * w / 100.0),
            }
        })
        .collect()
}

// ============================================================================
// Polynomial fit
// ============================================================================

/// Least-squares polynomial in x − center, constant term first
struct CenteredPolynomial {
    center: f64,
    coefficients: Vec<f64>,
}

impl CenteredPolynomial {
    fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Self> {
        let center = xs.iter().sum::<f64>() / xs.len() as f64;
        let size = degree + 1;
        let mut normal = vec![vec![0.0; size]; size];
        let mut rhs = vec![0.0; size];
        for (&x, &y) in xs.iter().zip(ys) {
            let dx = x - center;
            for i in 0..size {
                for j in 0..size {
                    normal[i][j] += dx.powi((i + j) as i32);
                }
                rhs[i] += dx.powi(i as i32) * y;
            }
        }
        let coefficients = solve_linear_system(normal, rhs)?;
        Some(Self { center, coefficients })
    }

    fn coefficient(&self, power: usize) -> f64 {
        self.coefficients.get(power).copied().unwrap_or(0.0)
    }

    fn eval(&self, x: f64) -> f64 {
        let dx = x - self.center;
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * dx + c)
    }

    /// Interior maximum of a parabola or cubic, as an x value.
    fn stationary_maximum(&self) -> Result<f64, &'static str> {
        let (a1, a2, a3) = (self.coefficient(1), self.coefficient(2), self.coefficient(3));

        let dx = if is_zero(a3) {
            if is_zero(a2) {
                return Err("Points are collinear; the curve has no curvature");
            }
            if a2 > 0.0 {
                return Err("Fitted curve opens upward and has no maximum");
            }
            -a1 / (2.0 * a2)
        } else {
            // p'(x) = a1 + 2·a2·x + 3·a3·x²
            let (qa, qb, qc) = (3.0 * a3, 2.0 * a2, a1);
            let discriminant = qb * qb - 4.0 * qa * qc;
            if discriminant < 0.0 {
                return Err("Fitted curve has no stationary point");
            }
            let sqrt_d = discriminant.sqrt();
            [(-qb + sqrt_d) / (2.0 * qa), (-qb - sqrt_d) / (2.0 * qa)]
                .into_iter()
                .find(|x| 2.0 * a2 + 6.0 * a3 * x < 0.0)
                .ok_or("Fitted curve has no maximum")?
        };

        Ok(dx + self.center)
    }

    /// Coefficients expanded into powers of x, constant term first
    fn expanded(&self) -> Vec<f64> {
        let n = self.coefficients.len();
        let mut out = vec![0.0; n];
        for (k, a) in self.coefficients.iter().enumerate() {
            // a·(x − c)^k = a·Σ C(k, j)·x^j·(−c)^(k−j)
            let mut binomial = 1.0;
            for (j, slot) in out.iter_mut().enumerate().take(k + 1) {
                *slot += a * binomial * (-self.center).powi((k - j) as i32);
                binomial = binomial * (k - j) as f64 / (j + 1) as f64;
            }
        }
        out
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Reduce a Proctor test and fit the compaction curve.
///
/// Never fails outright: invalid input, too few points and fit failures are
/// reported in [`CompactionCurve::error`] with whatever could be computed.
pub fn analyze_compaction(input: &CompactionInput) -> CompactionCurve {
    let mut curve = CompactionCurve::default();

    if let Err(e) = input.validate() {
        return curve.failed(e);
    }

    let mut points = Vec::with_capacity(input.points.len());
    for (i, point) in input.points.iter().enumerate() {
        match input.reduce_point(i, point) {
            Ok(reduced) => points.push(reduced),
            Err(e) => return curve.failed(e),
        }
    }
    points.sort_by(|a, b| a.moisture_pct.total_cmp(&b.moisture_pct));

    curve.peak_point_index = points
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.dry_unit_weight.0.total_cmp(&b.dry_unit_weight.0))
        .map(|(i, _)| i);

    let (w_min, w_max) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.moisture_pct, last.moisture_pct),
        _ => (0.0, 0.0),
    };
    if let Some(gs) = input.specific_gravity {
        if !points.is_empty() {
            curve.zero_air_voids = zero_air_voids_curve(gs, input.water_unit_weight, w_min, w_max);
        }
    }
    curve.points = points;

    if curve.points.len() < 3 {
        let provided = curve.points.len();
        return curve.failed(CalcError::insufficient_data(
            3,
            provided,
            "A compaction curve needs at least three points",
        ));
    }

    let xs: Vec<f64> = curve.points.iter().map(|p| p.moisture_pct).collect();
    let ys: Vec<f64> = curve.points.iter().map(|p| p.dry_unit_weight.0).collect();
    let degree = input.fit.degree(xs.len());

    let poly = match CenteredPolynomial::fit(&xs, &ys, degree) {
        Some(p) => p,
        None => {
            return curve.failed(CalcError::calculation_failed(
                METHOD,
                "Normal equations are singular; moisture contents must differ",
            ))
        }
    };
    tracing::debug!(degree, center = poly.center, coefficients = ?poly.coefficients, "compaction fit");

    let optimum = match poly.stationary_maximum() {
        Ok(w) => w,
        Err(reason) => return curve.failed(CalcError::calculation_failed(METHOD, reason)),
    };
    if optimum < w_min - EPSILON || optimum > w_max + EPSILON {
        return curve.failed(CalcError::calculation_failed(
            METHOD,
            format!(
                "Optimum at {:.2}% lies outside the tested range {:.2}% to {:.2}%",
                optimum, w_min, w_max
            ),
        ));
    }

    let max_dry = poly.eval(optimum);
    let highest_measured = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_dry + EPSILON < highest_measured {
        return curve.failed(CalcError::calculation_failed(
            METHOD,
            format!(
                "Fitted peak {:.3} kN/m³ is below the measured {:.3} kN/m³",
                max_dry, highest_measured
            ),
        ));
    }

    curve.coefficients = poly.expanded();
    curve.optimum_moisture_pct = Some(optimum);
    curve.max_dry_unit_weight = Some(max_dry);
    curve.nearest_point_index = curve
        .points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (a.moisture_pct - optimum)
                .abs()
                .total_cmp(&(b.moisture_pct - optimum).abs())
        })
        .map(|(i, _)| i);

    curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Point built to reduce to moisture `w` and dry unit weight `gamma_d`
    /// in a 1000 cm³ mould weighing 4000 g.
    fn point(w: f64, gamma_d: f64) -> CompactionPoint {
        CompactionPoint {
            cylinder_sample_mass_g: 4000.0 + gamma_d * (1.0 + w / 100.0) * 100.0,
            wet_gross_mass_g: 200.0 + w,
            dry_gross_mass_g: 200.0,
            tare_mass_g: 100.0,
            direct_moisture_pct: None,
        }
    }

    fn input(points: &[(f64, f64)]) -> CompactionInput {
        CompactionInput {
            label: "Test".to_string(),
            points: points.iter().map(|&(w, g)| point(w, g)).collect(),
            cylinder_volume_cm3: 1000.0,
            cylinder_mass_g: 4000.0,
            ..Default::default()
        }
    }

    fn four_points() -> CompactionInput {
        input(&[(10.0, 17.0), (14.0, 18.2), (18.0, 17.8), (22.0, 16.5)])
    }

    #[test]
    fn test_point_reduction() {
        let curve = analyze_compaction(&four_points());
        let p = &curve.points[1];
        assert_relative_eq!(p.moisture_pct, 14.0, epsilon = 1e-9);
        assert_relative_eq!(p.wet_density_g_cm3, 2.0748, epsilon = 1e-9);
        assert_relative_eq!(p.wet_unit_weight.0, 20.748, epsilon = 1e-9);
        assert_relative_eq!(p.dry_unit_weight.0, 18.2, epsilon = 1e-9);
    }

    #[test]
    fn test_four_point_cubic() {
        let curve = analyze_compaction(&four_points());
        assert!(curve.error.is_none(), "{:?}", curve.error);
        let w_opt = curve.optimum_moisture_pct.unwrap();
        let gamma_max = curve.max_dry_unit_weight.unwrap();
        assert_relative_eq!(w_opt, 14.74, epsilon = 0.05);
        assert_relative_eq!(gamma_max, 18.23, epsilon = 0.05);
        assert!(gamma_max >= 18.2);
        assert_eq!(curve.coefficients.len(), 4);
        assert_eq!(curve.peak_point_index, Some(1));
        assert_eq!(curve.nearest_point_index, Some(1));
    }

    #[test]
    fn test_expanded_coefficients_match_fit() {
        let curve = analyze_compaction(&four_points());
        let w_opt = curve.optimum_moisture_pct.unwrap();
        assert_relative_eq!(
            curve.fitted_dry_unit_weight(w_opt).unwrap(),
            curve.max_dry_unit_weight.unwrap(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_three_point_parabola() {
        let curve = analyze_compaction(&input(&[(10.0, 17.0), (14.0, 18.2), (18.0, 17.8)]));
        assert!(curve.error.is_none());
        // Exact parabola through three points
        assert_relative_eq!(curve.optimum_moisture_pct.unwrap(), 15.0, epsilon = 1e-6);
        assert_relative_eq!(curve.max_dry_unit_weight.unwrap(), 18.25, epsilon = 1e-6);
        assert_eq!(curve.coefficients.len(), 3);
    }

    #[test]
    fn test_optimum_dominates_raw_points() {
        for points in [
            vec![(10.0, 17.0), (14.0, 18.2), (18.0, 17.8)],
            vec![(10.0, 17.0), (14.0, 18.2), (18.0, 17.8), (22.0, 16.5)],
        ] {
            let curve = analyze_compaction(&input(&points));
            let gamma_max = curve.max_dry_unit_weight.unwrap();
            assert!(curve.points.iter().all(|p| gamma_max >= p.dry_unit_weight.0));
        }
    }

    #[test]
    fn test_quadratic_below_raw_peak_fails() {
        // Least-squares parabola peaks at 18.17, under the measured 18.2
        let mut input = four_points();
        input.fit = CurveFit::Quadratic;
        let curve = analyze_compaction(&input);
        assert!(curve.optimum_moisture_pct.is_none());
        assert!(matches!(curve.error, Some(CalcError::CalculationFailed { .. })));
        assert_eq!(curve.points.len(), 4);
    }

    #[test]
    fn test_too_few_points() {
        let curve = analyze_compaction(&input(&[(10.0, 17.0), (14.0, 18.2)]));
        assert_eq!(curve.points.len(), 2);
        assert!(matches!(
            curve.error,
            Some(CalcError::InsufficientData { required: 3, provided: 2, .. })
        ));
    }

    #[test]
    fn test_collinear_points_fail() {
        let curve = analyze_compaction(&input(&[(10.0, 17.0), (14.0, 17.4), (18.0, 17.8)]));
        assert!(curve.max_dry_unit_weight.is_none());
        assert_eq!(curve.error.unwrap().error_code(), "CALCULATION_FAILED");
    }

    #[test]
    fn test_optimum_outside_range_fails() {
        // Still rising at the wettest point; vertex at 20%
        let curve = analyze_compaction(&input(&[(10.0, 16.0), (14.0, 17.0), (18.0, 17.5)]));
        assert!(curve.optimum_moisture_pct.is_none());
        assert!(curve.error.is_some());
    }

    #[test]
    fn test_zero_air_voids() {
        let mut input = four_points();
        input.specific_gravity = Some(2.65);
        let curve = analyze_compaction(&input);
        assert_eq!(curve.zero_air_voids.len(), ZERO_AIR_VOIDS_POINTS);
        let first = curve.zero_air_voids[0];
        assert_relative_eq!(first.moisture_pct, 5.0, epsilon = 1e-9);
        assert_relative_eq!(first.dry_unit_weight, 23.3996, epsilon = 1e-3);
        assert_relative_eq!(curve.zero_air_voids[19].moisture_pct, 32.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_air_voids_starts_at_zero() {
        let zav = zero_air_voids_curve(2.7, 10.0, 3.0, 10.0);
        assert_eq!(zav[0].moisture_pct, 0.0);
        assert_relative_eq!(zav[0].dry_unit_weight, 27.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validation_names_point() {
        let mut input = four_points();
        input.points[2].dry_gross_mass_g = 250.0;
        let curve = analyze_compaction(&input);
        match curve.error {
            Some(CalcError::InvalidInput { field, .. }) => assert_eq!(field, "points[2].dry_gross_mass_g"),
            other => panic!("unexpected {:?}", other),
        }

        let mut input = four_points();
        input.cylinder_volume_cm3 = 0.0;
        assert!(analyze_compaction(&input).error.unwrap().is_input_error());

        let mut input = four_points();
        input.points[0].cylinder_sample_mass_g = 3900.0;
        assert!(analyze_compaction(&input).error.is_some());
    }

    #[test]
    fn test_direct_moisture_overrides_tin() {
        let mut input = four_points();
        input.points[0].direct_moisture_pct = Some(10.0);
        input.points[0].wet_gross_mass_g = 0.0;
        let curve = analyze_compaction(&input);
        assert!(curve.error.is_none());
        assert_relative_eq!(curve.points[0].moisture_pct, 10.0);
    }

    #[test]
    fn test_serialization() {
        let json = r#"{
            "cylinder_volume_cm3": 1000.0,
            "cylinder_mass_g": 4000.0,
            "points": [
                { "cylinder_sample_mass_g": 5870.0, "wet_gross_mass_g": 210.0, "dry_gross_mass_g": 200.0, "tare_mass_g": 100.0 }
            ]
        }"#;
        let input: CompactionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.water_unit_weight, 10.0);
        assert_eq!(input.fit, CurveFit::Auto);

        let curve = analyze_compaction(&four_points());
        let roundtrip: CompactionCurve = serde_json::from_str(&serde_json::to_string(&curve).unwrap()).unwrap();
        assert_eq!(curve, roundtrip);
    }
}
