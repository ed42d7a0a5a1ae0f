//! # Grain-Size Analysis
//!
//! Reduces a sieve analysis (mass retained on each sieve) to a grain-size
//! curve, the characteristic diameters D10/D30/D60, the grading coefficients
//! and the gravel/sand/fines split, then classifies the soil.
//!
//! ## Assumptions
//!
//! - Masses retained are on each individual sieve, not cumulative
//! - Material passing the finest sieve is the pan, never entered
//! - Diameters are interpolated linearly in log10(aperture) against percent
//!   passing, between the two sieves that bracket the threshold
//!
//! ## Example
//!
//! ```rust
//! use soil_core::calculations::grain_size::{analyze_grain_size, GrainSizeInput, SievePoint};
//!
//! let input = GrainSizeInput {
//!     label: "S-1".to_string(),
//!     total_mass_g: 1000.0,
//!     sieves: vec![
//!         SievePoint::new(4.75, 50.0),
//!         SievePoint::new(2.0, 150.0),
//!         SievePoint::new(0.42, 300.0),
//!         SievePoint::new(0.075, 400.0),
//!     ],
//!     non_plastic: true,
//!     ..Default::default()
//! };
//!
//! let result = analyze_grain_size(&input).unwrap();
//! assert!((result.fines_pct - 10.0).abs() < 1e-9);
//! println!("D60 = {:?} mm, Cu = {:?}", result.d60, result.cu);
//! ```

use serde::{Deserialize, Serialize};

use super::classification::{classify, ClassificationInput, ClassificationResult};
use crate::errors::{CalcError, CalcResult};
use crate::numeric::{lerp, log_interp_x, safe_div, EPSILON};
use crate::sieves::{self, APERTURE_TOLERANCE_MM, NO_10_MM, NO_200_MM, NO_40_MM, NO_4_MM};

/// Mass retained on one sieve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SievePoint {
    /// Sieve aperture in mm
    pub aperture_mm: f64,
    /// Mass retained on this sieve in grams
    pub mass_retained_g: f64,
    /// Sieve designation (e.g. "#40"); looked up from the catalogue when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SievePoint {
    pub fn new(aperture_mm: f64, mass_retained_g: f64) -> Self {
        Self {
            aperture_mm,
            mass_retained_g,
            label: None,
        }
    }
}

/// Input for a sieve analysis.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Borrow pit B-3",
///   "total_mass_g": 1000.0,
///   "sieves": [
///     { "aperture_mm": 4.75, "mass_retained_g": 50.0 },
///     { "aperture_mm": 2.0, "mass_retained_g": 150.0 },
///     { "aperture_mm": 0.42, "mass_retained_g": 300.0 },
///     { "aperture_mm": 0.075, "mass_retained_g": 400.0 }
///   ],
///   "liquid_limit": 32.0,
///   "plastic_limit": 21.0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrainSizeInput {
    /// User label for this sample
    #[serde(default)]
    pub label: String,

    /// Total dry mass of the sample in grams
    pub total_mass_g: f64,

    /// Sieves in any order
    pub sieves: Vec<SievePoint>,

    /// Liquid limit (%) for classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_limit: Option<f64>,

    /// Plastic limit (%) for classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plastic_limit: Option<f64>,

    #[serde(default)]
    pub non_plastic: bool,

    #[serde(default)]
    pub organic: bool,

    #[serde(default)]
    pub highly_organic: bool,
}

impl GrainSizeInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.total_mass_g > 0.0) {
            return Err(CalcError::invalid_input(
                "total_mass_g",
                self.total_mass_g.to_string(),
                "Total mass must be positive",
            ));
        }
        if self.sieves.is_empty() {
            return Err(CalcError::invalid_input("sieves", "[]", "At least one sieve is required"));
        }
        for (i, sieve) in self.sieves.iter().enumerate() {
            if !(sieve.aperture_mm > 0.0) || !sieve.aperture_mm.is_finite() {
                return Err(CalcError::invalid_input(
                    format!("sieves[{}].aperture_mm", i),
                    sieve.aperture_mm.to_string(),
                    "Aperture must be positive",
                ));
            }
            if !(sieve.mass_retained_g >= 0.0) || !sieve.mass_retained_g.is_finite() {
                return Err(CalcError::invalid_input(
                    format!("sieves[{}].mass_retained_g", i),
                    sieve.mass_retained_g.to_string(),
                    "Mass retained cannot be negative",
                ));
            }
        }
        let retained = self.total_retained_g();
        if retained > self.total_mass_g + EPSILON {
            return Err(CalcError::invalid_input(
                "sieves",
                retained.to_string(),
                format!("Total retained exceeds sample mass of {} g", self.total_mass_g),
            ));
        }
        Ok(())
    }

    /// Sum of the masses retained on all sieves
    pub fn total_retained_g(&self) -> f64 {
        self.sieves.iter().map(|s| s.mass_retained_g).sum()
    }
}

/// One point of the grain-size curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    pub aperture_mm: f64,
    pub mass_retained_g: f64,
    pub percent_retained: f64,
    pub percent_retained_cumulative: f64,
    pub percent_passing: f64,
}

/// Grain-size curve, coarsest sieve first. Percent passing never increases
/// down the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrainSizeCurve {
    pub points: Vec<CurvePoint>,
}

impl GrainSizeCurve {
    /// Percent passing a given aperture.
    ///
    /// A sieve within the aperture tolerance is read directly; otherwise the
    /// value is interpolated linearly between the bracketing sieves. Above
    /// the largest sieve everything passes; below the finest sieve its
    /// passing is returned.
    pub fn passing_at(&self, aperture_mm: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return 100.0,
        };

        if let Some(p) = self
            .points
            .iter()
            .find(|p| (p.aperture_mm - aperture_mm).abs() <= APERTURE_TOLERANCE_MM)
        {
            return p.percent_passing;
        }
        if aperture_mm > first.aperture_mm {
            return 100.0;
        }
        if aperture_mm < last.aperture_mm {
            return last.percent_passing;
        }

        self.points
            .windows(2)
            .find(|w| aperture_mm <= w[0].aperture_mm && aperture_mm >= w[1].aperture_mm)
            .map(|w| {
                lerp(
                    aperture_mm,
                    w[0].aperture_mm,
                    w[0].percent_passing,
                    w[1].aperture_mm,
                    w[1].percent_passing,
                )
            })
            .unwrap_or(last.percent_passing)
    }

    /// Diameter at which `percent` of the sample passes; see
    /// [`characteristic_diameter`].
    pub fn diameter_at(&self, percent: f64) -> Option<f64> {
        characteristic_diameter(&self.points, percent)
    }
}

/// Results of a sieve analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrainSizeResult {
    pub curve: GrainSizeCurve,

    /// Effective size D10 (mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d10: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d30: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d60: Option<f64>,

    /// Coefficient of uniformity D60/D10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cu: Option<f64>,
    /// Coefficient of curvature D30²/(D10·D60)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<f64>,

    pub passing_no4: f64,
    pub passing_no10: f64,
    pub passing_no40: f64,
    pub passing_no200: f64,

    /// Retained on #4 (%)
    pub gravel_pct: f64,
    /// Between #4 and #200 (%)
    pub sand_pct: f64,
    /// Passing #200 (%)
    pub fines_pct: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
}

/// Diameter at which a given percentage passes.
///
/// Formula: log D = log D₁ + (P − P₁)(log D₂ − log D₁)/(P₂ − P₁)
///
/// D₁, P₁ and D₂, P₂ are the consecutive sieves (coarsest first) whose
/// passing brackets P. Equal passing on both gives the geometric mean of the
/// apertures. Returns `None` when no pair brackets P, for instance D10 when
/// more than 10% passes the finest sieve.
pub fn characteristic_diameter(points: &[CurvePoint], percent: f64) -> Option<f64> {
    points
        .windows(2)
        .find(|w| w[0].percent_passing + EPSILON >= percent && percent >= w[1].percent_passing - EPSILON)
        .and_then(|w| {
            log_interp_x(
                percent,
                w[0].aperture_mm,
                w[0].percent_passing,
                w[1].aperture_mm,
                w[1].percent_passing,
            )
        })
}

/// Coefficients of uniformity and curvature.
///
/// Formulas:
/// - Cu = D60 / D10
/// - Cc = D30² / (D10 · D60)
///
/// Cu needs D10 and D60; Cc needs all three. A D10 at or below EPSILON gives
/// neither.
pub fn grading_coefficients(d10: Option<f64>, d30: Option<f64>, d60: Option<f64>) -> (Option<f64>, Option<f64>) {
    let d10 = d10.filter(|d| *d > EPSILON);
    let cu = match (d10, d60) {
        (Some(d10), Some(d60)) => safe_div(d60, d10),
        _ => None,
    };
    let cc = match (d10, d30, d60) {
        (Some(d10), Some(d30), Some(d60)) => safe_div(d30 * d30, d10 * d60),
        _ => None,
    };
    (cu, cc)
}

/// Build the grain-size curve from validated input.
fn build_curve(input: &GrainSizeInput) -> GrainSizeCurve {
    let mut sorted = input.sieves.clone();
    sorted.sort_by(|a, b| b.aperture_mm.total_cmp(&a.aperture_mm));

    let mut cumulative = 0.0;
    let points = sorted
        .into_iter()
        .map(|s| {
            let percent_retained = s.mass_retained_g / input.total_mass_g * 100.0;
            cumulative += percent_retained;
            let designation = s.label.or_else(|| {
                sieves::find_by_aperture(s.aperture_mm).map(|info| info.designation.to_string())
            });
            CurvePoint {
                designation,
                aperture_mm: s.aperture_mm,
                mass_retained_g: s.mass_retained_g,
                percent_retained,
                percent_retained_cumulative: cumulative,
                percent_passing: (100.0 - cumulative).clamp(0.0, 100.0),
            }
        })
        .collect();

    GrainSizeCurve { points }
}

/// Run a sieve analysis and classify the soil.
///
/// # Returns
///
/// * `Ok(GrainSizeResult)` - Curve, diameters and classification
/// * `Err(CalcError)` - If the sieve data is invalid
///
/// Classification problems (missing limits, for instance) never fail the
/// analysis; they are listed in the classification record.
pub fn analyze_grain_size(input: &GrainSizeInput) -> CalcResult<GrainSizeResult> {
    input.validate()?;

    let curve = build_curve(input);
    let d10 = curve.diameter_at(10.0);
    let d30 = curve.diameter_at(30.0);
    let d60 = curve.diameter_at(60.0);
    let (cu, cc) = grading_coefficients(d10, d30, d60);

    let passing_no4 = curve.passing_at(NO_4_MM);
    let passing_no10 = curve.passing_at(NO_10_MM);
    let passing_no40 = curve.passing_at(NO_40_MM);
    let passing_no200 = curve.passing_at(NO_200_MM);

    tracing::debug!(?d10, ?d30, ?d60, ?cu, ?cc, "grain-size curve reduced");

    let mut result = GrainSizeResult {
        curve,
        d10,
        d30,
        d60,
        cu,
        cc,
        passing_no4,
        passing_no10,
        passing_no40,
        passing_no200,
        gravel_pct: 100.0 - passing_no4,
        sand_pct: (passing_no4 - passing_no200).max(0.0),
        fines_pct: passing_no200,
        classification: None,
    };

    let classification_input = ClassificationInput::from_curve(
        &result,
        input.liquid_limit,
        input.plastic_limit,
        input.non_plastic,
    )
    .with_organic(input.organic, input.highly_organic);
    result.classification = Some(classify(&classification_input));

    Ok(result)
}

impl ClassificationInput {
    /// Classification input from a reduced grain-size curve and the
    /// consistency limits.
    pub fn from_curve(
        result: &GrainSizeResult,
        liquid_limit: Option<f64>,
        plastic_limit: Option<f64>,
        non_plastic: bool,
    ) -> Self {
        ClassificationInput {
            passing_no4: Some(result.passing_no4),
            passing_no10: Some(result.passing_no10),
            passing_no40: Some(result.passing_no40),
            passing_no200: Some(result.passing_no200),
            cu: result.cu,
            cc: result.cc,
            liquid_limit,
            plastic_limit,
            non_plastic,
            organic: false,
            highly_organic: false,
        }
    }

    pub fn with_organic(mut self, organic: bool, highly_organic: bool) -> Self {
        self.organic = organic;
        self.highly_organic = highly_organic;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_input() -> GrainSizeInput {
        GrainSizeInput {
            label: "Test".to_string(),
            total_mass_g: 1000.0,
            // Deliberately out of order
            sieves: vec![
                SievePoint::new(0.42, 350.0),
                SievePoint::new(4.75, 50.0),
                SievePoint::new(0.075, 350.0),
                SievePoint::new(2.0, 150.0),
            ],
            non_plastic: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_curve_percentages() {
        let result = analyze_grain_size(&test_input()).unwrap();
        let passing: Vec<f64> = result.curve.points.iter().map(|p| p.percent_passing).collect();
        assert_relative_eq!(passing[0], 95.0, epsilon = 1e-9);
        assert_relative_eq!(passing[1], 80.0, epsilon = 1e-9);
        assert_relative_eq!(passing[2], 45.0, epsilon = 1e-9);
        assert_relative_eq!(passing[3], 10.0, epsilon = 1e-9);
        assert_eq!(result.curve.points[3].designation.as_deref(), Some("#200"));
    }

    #[test]
    fn test_passing_non_increasing() {
        let result = analyze_grain_size(&test_input()).unwrap();
        assert!(result
            .curve
            .points
            .windows(2)
            .all(|w| w[0].aperture_mm > w[1].aperture_mm && w[0].percent_passing >= w[1].percent_passing));
    }

    #[test]
    fn test_passing_at() {
        let curve = analyze_grain_size(&test_input()).unwrap().curve;
        assert_eq!(curve.passing_at(50.0), 100.0);
        assert_relative_eq!(curve.passing_at(0.01), 10.0, epsilon = 1e-9);
        assert_relative_eq!(curve.passing_at(4.76), 95.0, epsilon = 1e-9);
        // Halfway between 2.0 mm (80%) and 0.42 mm (45%)
        assert_relative_eq!(curve.passing_at(1.21), 62.5, epsilon = 1e-9);
    }

    #[test]
    fn test_characteristic_diameters() {
        let result = analyze_grain_size(&test_input()).unwrap();
        let d10 = result.d10.unwrap();
        let d30 = result.d30.unwrap();
        let d60 = result.d60.unwrap();
        assert_relative_eq!(d10, 0.075, max_relative = 1e-9);
        // 15 of the 35 points between 0.42 mm and 0.075 mm, in log space
        let expected_d30 = 10f64.powf(0.42f64.log10() + 15.0 / 35.0 * (0.075f64.log10() - 0.42f64.log10()));
        assert_relative_eq!(d30, expected_d30, max_relative = 1e-9);
        assert!(d60 > 0.42 && d60 < 2.0);
        assert_relative_eq!(result.cu.unwrap(), d60 / d10, max_relative = 1e-12);
        assert_relative_eq!(result.cc.unwrap(), d30 * d30 / (d10 * d60), max_relative = 1e-12);
    }

    #[test]
    fn test_fractions_and_classification() {
        let result = analyze_grain_size(&test_input()).unwrap();
        assert_relative_eq!(result.gravel_pct, 5.0, epsilon = 1e-9);
        assert_relative_eq!(result.sand_pct, 85.0, epsilon = 1e-9);
        assert_relative_eq!(result.fines_pct, 10.0, epsilon = 1e-9);

        let classification = result.classification.unwrap();
        // Cc below 1: poorly graded sand with non-plastic fines
        assert_eq!(classification.uscs_code.as_deref(), Some("SP-SM"));
        assert_eq!(classification.hrb_subgroup.as_deref(), Some("A-1-b"));
    }

    #[test]
    fn test_d10_undetermined_when_fines_high() {
        let input = GrainSizeInput {
            total_mass_g: 500.0,
            sieves: vec![SievePoint::new(2.0, 100.0), SievePoint::new(0.075, 200.0)],
            ..Default::default()
        };
        let result = analyze_grain_size(&input).unwrap();
        // 40% passes the finest sieve
        assert!(result.d10.is_none());
        assert!(result.d30.is_none());
        assert!(result.d60.is_some());
        assert!(result.cu.is_none() && result.cc.is_none());
    }

    #[test]
    fn test_uniformity_without_d30() {
        let (cu, cc) = grading_coefficients(Some(0.15), None, Some(2.0));
        assert_relative_eq!(cu.unwrap(), 13.333, epsilon = 0.001);
        assert!(cc.is_none());
    }

    #[test]
    fn test_zero_d10_gives_no_coefficients() {
        assert_eq!(grading_coefficients(Some(0.0), Some(0.5), Some(2.0)), (None, None));
    }

    #[test]
    fn test_validation() {
        let mut input = test_input();
        input.total_mass_g = 0.0;
        assert!(matches!(analyze_grain_size(&input), Err(CalcError::InvalidInput { .. })));

        let mut input = test_input();
        input.sieves.clear();
        assert!(analyze_grain_size(&input).is_err());

        let mut input = test_input();
        input.sieves[0].aperture_mm = -1.0;
        assert!(analyze_grain_size(&input).is_err());

        let mut input = test_input();
        input.sieves[1].mass_retained_g = -5.0;
        assert!(analyze_grain_size(&input).is_err());

        let mut input = test_input();
        input.total_mass_g = 800.0;
        let err = analyze_grain_size(&input).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_missing_limits_do_not_fail_analysis() {
        let mut input = test_input();
        input.non_plastic = false;
        let result = analyze_grain_size(&input).unwrap();
        let classification = result.classification.unwrap();
        assert!(classification.uscs_code.is_none());
        assert!(!classification.errors.is_empty());
    }

    #[test]
    fn test_serialization() {
        let result = analyze_grain_size(&test_input()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let roundtrip: GrainSizeResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, roundtrip);
    }
}
