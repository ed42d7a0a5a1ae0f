//! # Atterberg Limits
//!
//! Liquid limit from the Casagrande flow curve, plastic limit, plasticity
//! index and consistency index, with the descriptive ratings used on lab
//! reports.
//!
//! ## Assumptions
//!
//! - Liquid limit trials use the Casagrande cup (blow count per trial)
//! - The flow curve is a straight line of moisture against log10(blows)
//! - Masses include the container; the container mass is entered separately

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::numeric::EPSILON;

/// Blow count at which the liquid limit is read off the flow curve
pub const LIQUID_LIMIT_BLOWS: f64 = 25.0;

/// Moisture-content sample: container with wet soil, after oven drying, and
/// the empty container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoistureSample {
    /// Container plus wet soil (g)
    pub wet_mass_g: f64,
    /// Container plus dry soil (g)
    pub dry_mass_g: f64,
    /// Empty container (g)
    pub container_mass_g: f64,
}

impl MoistureSample {
    /// Water content w = (wet − dry) / (dry − container) × 100.
    ///
    /// `field` names the sample in error messages.
    pub fn moisture_pct(&self, field: &str) -> CalcResult<f64> {
        if self.wet_mass_g < self.dry_mass_g {
            return Err(CalcError::invalid_input(
                format!("{}.wet_mass_g", field),
                self.wet_mass_g.to_string(),
                "Wet mass cannot be less than dry mass",
            ));
        }
        if self.dry_mass_g < self.container_mass_g {
            return Err(CalcError::invalid_input(
                format!("{}.dry_mass_g", field),
                self.dry_mass_g.to_string(),
                "Dry mass cannot be less than the container",
            ));
        }
        let solids = self.dry_mass_g - self.container_mass_g;
        if solids <= EPSILON {
            return Err(CalcError::invalid_input(
                format!("{}.dry_mass_g", field),
                self.dry_mass_g.to_string(),
                "No dry soil in the container",
            ));
        }
        Ok((self.wet_mass_g - self.dry_mass_g) / solids * 100.0)
    }
}

/// One Casagrande cup trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidLimitTrial {
    /// Blows to close the groove
    pub blows: u32,
    #[serde(flatten)]
    pub sample: MoistureSample,
}

/// Input for consistency limits.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "B-3 @ 2.0 m",
///   "liquid_limit_trials": [
///     { "blows": 18, "wet_mass_g": 38.9, "dry_mass_g": 31.2, "container_mass_g": 12.0 },
///     { "blows": 31, "wet_mass_g": 37.1, "dry_mass_g": 30.4, "container_mass_g": 11.8 }
///   ],
///   "plastic_limit_trials": [
///     { "wet_mass_g": 17.2, "dry_mass_g": 15.0, "container_mass_g": 5.0 }
///   ],
///   "natural_moisture_pct": 28.0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtterbergInput {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub liquid_limit_trials: Vec<LiquidLimitTrial>,
    #[serde(default)]
    pub plastic_limit_trials: Vec<MoistureSample>,
    /// Natural moisture content (%) for the consistency index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_moisture_pct: Option<f64>,
}

impl AtterbergInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        for (i, trial) in self.liquid_limit_trials.iter().enumerate() {
            if trial.blows == 0 {
                return Err(CalcError::invalid_input(
                    format!("liquid_limit_trials[{}].blows", i),
                    "0",
                    "Blow count must be positive",
                ));
            }
        }
        if let Some(w) = self.natural_moisture_pct {
            if !w.is_finite() || w < 0.0 {
                return Err(CalcError::invalid_input(
                    "natural_moisture_pct",
                    w.to_string(),
                    "Moisture content cannot be negative",
                ));
            }
        }
        Ok(())
    }
}

/// Plasticity rating by plasticity index (Burmister)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plasticity {
    NonPlastic,
    Slight,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Plasticity {
    pub fn from_pi(pi: f64) -> Self {
        if pi <= EPSILON {
            Plasticity::NonPlastic
        } else if pi <= 5.0 {
            Plasticity::Slight
        } else if pi <= 10.0 {
            Plasticity::Low
        } else if pi <= 20.0 {
            Plasticity::Medium
        } else if pi <= 40.0 {
            Plasticity::High
        } else {
            Plasticity::VeryHigh
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Plasticity::NonPlastic => "Non-plastic",
            Plasticity::Slight => "Slightly plastic",
            Plasticity::Low => "Low plasticity",
            Plasticity::Medium => "Medium plasticity",
            Plasticity::High => "High plasticity",
            Plasticity::VeryHigh => "Very high plasticity",
        }
    }
}

/// Consistency of a fine soil by consistency index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    VerySoft,
    Soft,
    Medium,
    Stiff,
    Hard,
}

impl Consistency {
    pub fn from_ic(ic: f64) -> Self {
        if ic < 0.0 {
            Consistency::VerySoft
        } else if ic <= 0.5 {
            Consistency::Soft
        } else if ic <= 0.75 {
            Consistency::Medium
        } else if ic <= 1.0 {
            Consistency::Stiff
        } else {
            Consistency::Hard
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Consistency::VerySoft => "Very soft",
            Consistency::Soft => "Soft",
            Consistency::Medium => "Medium",
            Consistency::Stiff => "Stiff",
            Consistency::Hard => "Hard",
        }
    }
}

/// Point of the flow curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowPoint {
    pub blows: u32,
    pub moisture_pct: f64,
}

/// Consistency limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtterbergResult {
    /// Liquid limit (%); absent with fewer than two cup trials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_limit: Option<f64>,
    /// Plastic limit (%); absent without trials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plastic_limit: Option<f64>,
    /// PI = LL − PL, never negative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plasticity_index: Option<f64>,
    /// IC = (LL − w) / PI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency_index: Option<f64>,
    /// Moisture lost per log cycle of blows (slope of the flow curve)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plasticity: Option<Plasticity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<Consistency>,
    #[serde(default)]
    pub flow_curve: Vec<FlowPoint>,
}

/// Liquid limit and flow index from (blows, moisture %) pairs.
///
/// Least-squares line of w against log10(N), evaluated at N = 25:
///
/// LL = w̄ + b · (log10 25 − x̄),  b = Σ(x − x̄)(w − w̄) / Σ(x − x̄)²
///
/// Returns `Ok(None)` with fewer than two points. The liquid limit is
/// clamped at zero.
///
/// # Errors
///
/// `CalculationFailed` when every trial has the same blow count, since the
/// line is then undefined.
pub fn liquid_limit_from_flow_curve(points: &[(f64, f64)]) -> CalcResult<Option<(f64, f64)>> {
    if points.len() < 2 {
        return Ok(None);
    }
    let n = points.len() as f64;
    let xs: Vec<f64> = points.iter().map(|(blows, _)| blows.log10()).collect();
    let x_mean = xs.iter().sum::<f64>() / n;
    let w_mean = points.iter().map(|(_, w)| w).sum::<f64>() / n;

    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if sxx < EPSILON {
        return Err(CalcError::calculation_failed(
            "Liquid limit",
            "All trials have the same blow count; the flow curve is undefined",
        ));
    }
    let sxy: f64 = xs
        .iter()
        .zip(points)
        .map(|(x, (_, w))| (x - x_mean) * (w - w_mean))
        .sum();
    let slope = sxy / sxx;
    let ll = w_mean + slope * (LIQUID_LIMIT_BLOWS.log10() - x_mean);

    Ok(Some((ll.max(0.0), -slope)))
}

/// Reduce Atterberg trials to the consistency limits.
///
/// # Returns
///
/// * `Ok(AtterbergResult)` - Limits that could be determined
/// * `Err(CalcError)` - If a trial is invalid or the flow curve is undefined
pub fn analyze_atterberg(input: &AtterbergInput) -> CalcResult<AtterbergResult> {
    input.validate()?;

    let mut flow_curve = Vec::with_capacity(input.liquid_limit_trials.len());
    for (i, trial) in input.liquid_limit_trials.iter().enumerate() {
        let moisture_pct = trial.sample.moisture_pct(&format!("liquid_limit_trials[{}]", i))?;
        flow_curve.push(FlowPoint {
            blows: trial.blows,
            moisture_pct,
        });
    }

    let plastic_moistures = input
        .plastic_limit_trials
        .iter()
        .enumerate()
        .map(|(i, s)| s.moisture_pct(&format!("plastic_limit_trials[{}]", i)))
        .collect::<CalcResult<Vec<f64>>>()?;

    let pairs: Vec<(f64, f64)> = flow_curve.iter().map(|p| (p.blows as f64, p.moisture_pct)).collect();
    let (liquid_limit, flow_index) = match liquid_limit_from_flow_curve(&pairs)? {
        Some((ll, fi)) => (Some(ll), Some(fi)),
        None => (None, None),
    };

    let plastic_limit = if plastic_moistures.is_empty() {
        None
    } else {
        Some(plastic_moistures.iter().sum::<f64>() / plastic_moistures.len() as f64)
    };

    let plasticity_index = match (liquid_limit, plastic_limit) {
        (Some(ll), Some(pl)) => Some((ll - pl).max(0.0)),
        _ => None,
    };

    let consistency_index = match (liquid_limit, plasticity_index, input.natural_moisture_pct) {
        (Some(ll), Some(pi), Some(w)) if pi > EPSILON => Some((ll - w) / pi),
        _ => None,
    };

    tracing::debug!(?liquid_limit, ?plastic_limit, ?plasticity_index, "consistency limits");

    Ok(AtterbergResult {
        liquid_limit,
        plastic_limit,
        plasticity_index,
        consistency_index,
        flow_index,
        plasticity: plasticity_index.map(Plasticity::from_pi),
        consistency: consistency_index.map(Consistency::from_ic),
        flow_curve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Sample of 20 g dry soil at the given moisture
    fn sample(moisture_pct: f64) -> MoistureSample {
        MoistureSample {
            wet_mass_g: 30.0 + 20.0 * moisture_pct / 100.0,
            dry_mass_g: 30.0,
            container_mass_g: 10.0,
        }
    }

    fn test_input() -> AtterbergInput {
        AtterbergInput {
            label: "Test".to_string(),
            liquid_limit_trials: vec![
                LiquidLimitTrial { blows: 50, sample: sample(35.0) },
                LiquidLimitTrial { blows: 12, sample: sample(45.0) },
            ],
            plastic_limit_trials: vec![sample(22.0), sample(24.0)],
            natural_moisture_pct: Some(30.0),
        }
    }

    #[test]
    fn test_moisture_content() {
        let s = MoistureSample {
            wet_mass_g: 30.0,
            dry_mass_g: 25.0,
            container_mass_g: 10.0,
        };
        assert_relative_eq!(s.moisture_pct("s").unwrap(), 33.333, epsilon = 0.001);
    }

    #[test]
    fn test_flow_curve_symmetric_trials() {
        let (ll, fi) = liquid_limit_from_flow_curve(&[(12.5, 45.0), (50.0, 35.0)]).unwrap().unwrap();
        assert_relative_eq!(ll, 40.0, epsilon = 1e-9);
        // 10 points over log10(4)
        assert_relative_eq!(fi, 10.0 / 4f64.log10(), epsilon = 1e-9);
    }

    #[test]
    fn test_flow_curve_needs_two_trials() {
        assert_eq!(liquid_limit_from_flow_curve(&[(25.0, 40.0)]).unwrap(), None);
    }

    #[test]
    fn test_flow_curve_identical_blows_fail() {
        let err = liquid_limit_from_flow_curve(&[(25.0, 40.0), (25.0, 42.0)]).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }

    #[test]
    fn test_full_analysis() {
        let result = analyze_atterberg(&test_input()).unwrap();
        let ll = result.liquid_limit.unwrap();
        // 12 blows instead of 12.5 pulls LL just under 40
        assert!(ll > 39.5 && ll < 41.0);
        assert_relative_eq!(result.plastic_limit.unwrap(), 23.0, epsilon = 1e-9);
        let pi = result.plasticity_index.unwrap();
        assert_relative_eq!(pi, ll - 23.0, epsilon = 1e-9);
        assert_eq!(result.plasticity, Some(Plasticity::Medium));
        assert_relative_eq!(result.consistency_index.unwrap(), (ll - 30.0) / pi, epsilon = 1e-9);
        assert_eq!(result.consistency, Some(Consistency::Medium));
        assert_eq!(result.flow_curve.len(), 2);
    }

    #[test]
    fn test_pi_never_negative() {
        let mut input = test_input();
        input.plastic_limit_trials = vec![sample(50.0)];
        let result = analyze_atterberg(&input).unwrap();
        assert_eq!(result.plasticity_index, Some(0.0));
        assert_eq!(result.plasticity, Some(Plasticity::NonPlastic));
        assert!(result.consistency_index.is_none());
    }

    #[test]
    fn test_ratings() {
        assert_eq!(Plasticity::from_pi(5.0), Plasticity::Slight);
        assert_eq!(Plasticity::from_pi(10.5), Plasticity::Medium);
        assert_eq!(Plasticity::from_pi(45.0), Plasticity::VeryHigh);
        assert_eq!(Consistency::from_ic(-0.2), Consistency::VerySoft);
        assert_eq!(Consistency::from_ic(0.9), Consistency::Stiff);
        assert_eq!(Consistency::from_ic(1.2), Consistency::Hard);
    }

    #[test]
    fn test_invalid_trials() {
        let mut input = test_input();
        input.liquid_limit_trials[0].sample.wet_mass_g = 20.0;
        assert!(matches!(analyze_atterberg(&input), Err(CalcError::InvalidInput { .. })));

        let mut input = test_input();
        input.plastic_limit_trials[0].dry_mass_g = 10.0;
        assert!(analyze_atterberg(&input).is_err());

        let mut input = test_input();
        input.liquid_limit_trials[1].blows = 0;
        assert!(analyze_atterberg(&input).is_err());
    }

    #[test]
    fn test_serialization() {
        let json = r#"{"label":"x","liquid_limit_trials":[{"blows":20,"wet_mass_g":39.0,"dry_mass_g":30.0,"container_mass_g":10.0}]}"#;
        let input: AtterbergInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.liquid_limit_trials[0].blows, 20);
        let result = analyze_atterberg(&input).unwrap();
        assert!(result.liquid_limit.is_none());
        let roundtrip: AtterbergResult = serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
        assert_eq!(result, roundtrip);
    }
}
