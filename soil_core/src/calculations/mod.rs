//! # Geotechnical Calculations
//!
//! This module contains all laboratory and stress calculation types. Each
//! calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - a pure function from input to result
//!
//! Analyses that can produce a useful partial record (classification,
//! compaction curve, stress increments) report problems inside the record;
//! the sieve, Atterberg, phase-index, geostatic and settlement reductions
//! return `Err` for malformed input.
//!
//! ## Available Calculations
//!
//! - [`grain_size`] - Sieve analysis, D10/D30/D60, Cu, Cc
//! - [`atterberg`] - Liquid and plastic limits, plasticity and consistency
//! - [`classification`] - USCS and HRB/AASHTO classification
//! - [`compaction`] - Proctor compaction curve and zero-air-voids line
//! - [`phase_indices`] - Weight-volume relations, relative density
//! - [`geostatic`] - Total, neutral and effective stresses down a profile
//! - [`stress`] - Vertical stress increments under surface loads
//! - [`settlement`] - Primary consolidation settlement

pub mod atterberg;
pub mod classification;
pub mod compaction;
pub mod geostatic;
pub mod grain_size;
pub mod phase_indices;
pub mod settlement;
pub mod stress;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;

// Re-export commonly used types
pub use atterberg::{AtterbergInput, AtterbergResult};
pub use classification::{ClassificationInput, ClassificationResult};
pub use compaction::{CompactionCurve, CompactionInput};
pub use geostatic::{GeostaticInput, GeostaticProfile};
pub use grain_size::{GrainSizeInput, GrainSizeResult};
pub use phase_indices::{PhaseIndicesInput, PhaseIndicesResult};
pub use settlement::{SettlementInput, SettlementResult};
pub use stress::{StressInput, StressOutput};

/// Enum wrapper for all calculation types.
///
/// This allows storing heterogeneous calculations in a single collection
/// while maintaining type safety and clean serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    /// Sieve analysis with classification
    GrainSize(GrainSizeInput),
    /// Consistency limits
    Atterberg(AtterbergInput),
    /// Proctor compaction curve
    Compaction(CompactionInput),
    /// Weight-volume relations of one specimen
    PhaseIndices(PhaseIndicesInput),
    /// Stresses under self weight
    Geostatic(GeostaticInput),
    /// Stress increments under a surface load
    Stress(StressInput),
    /// Primary consolidation settlement
    Settlement(SettlementInput),
}

impl CalculationItem {
    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::GrainSize(g) => &g.label,
            CalculationItem::Atterberg(a) => &a.label,
            CalculationItem::Compaction(c) => &c.label,
            CalculationItem::PhaseIndices(p) => &p.label,
            CalculationItem::Geostatic(g) => &g.label,
            CalculationItem::Stress(s) => &s.label,
            CalculationItem::Settlement(s) => &s.label,
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::GrainSize(_) => "GrainSize",
            CalculationItem::Atterberg(_) => "Atterberg",
            CalculationItem::Compaction(_) => "Compaction",
            CalculationItem::PhaseIndices(_) => "PhaseIndices",
            CalculationItem::Geostatic(_) => "Geostatic",
            CalculationItem::Stress(_) => "Stress",
            CalculationItem::Settlement(_) => "Settlement",
        }
    }

    /// Run the calculation.
    ///
    /// Compaction and stress carry their problems inside the output; the
    /// other calculations return `Err` for malformed input.
    pub fn run(&self) -> CalcResult<CalculationOutput> {
        tracing::debug!(calc_type = self.calc_type(), label = self.label(), "running calculation");
        Ok(match self {
            CalculationItem::GrainSize(input) => CalculationOutput::GrainSize(grain_size::analyze_grain_size(input)?),
            CalculationItem::Atterberg(input) => CalculationOutput::Atterberg(atterberg::analyze_atterberg(input)?),
            CalculationItem::Compaction(input) => CalculationOutput::Compaction(compaction::analyze_compaction(input)),
            CalculationItem::PhaseIndices(input) => {
                CalculationOutput::PhaseIndices(phase_indices::analyze_phase_indices(input)?)
            }
            CalculationItem::Geostatic(input) => CalculationOutput::Geostatic(geostatic::geostatic_profile(input)?),
            CalculationItem::Stress(input) => CalculationOutput::Stress(stress::calculate(input)),
            CalculationItem::Settlement(input) => {
                CalculationOutput::Settlement(settlement::consolidation_settlement(input)?)
            }
        })
    }
}

/// Output of [`CalculationItem::run`], tagged like the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    GrainSize(GrainSizeResult),
    Atterberg(AtterbergResult),
    Compaction(CompactionCurve),
    PhaseIndices(PhaseIndicesResult),
    Geostatic(GeostaticProfile),
    Stress(StressOutput),
    Settlement(SettlementResult),
}

impl CalculationOutput {
    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationOutput::GrainSize(_) => "GrainSize",
            CalculationOutput::Atterberg(_) => "Atterberg",
            CalculationOutput::Compaction(_) => "Compaction",
            CalculationOutput::PhaseIndices(_) => "PhaseIndices",
            CalculationOutput::Geostatic(_) => "Geostatic",
            CalculationOutput::Stress(_) => "Stress",
            CalculationOutput::Settlement(_) => "Settlement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_from_json() {
        let json = r#"{
            "type": "Stress",
            "label": "F-1",
            "geometry": { "type": "Point", "load_kn": 100.0, "x": 0.0, "y": 0.0 },
            "points": [ { "x": 0.0, "y": 0.0, "z": 2.0 } ]
        }"#;
        let item: CalculationItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.label(), "F-1");
        assert_eq!(item.calc_type(), "Stress");

        let output = item.run().unwrap();
        assert_eq!(output.calc_type(), "Stress");
        match output {
            CalculationOutput::Stress(out) => {
                let sigma = out.points[0].result.delta_sigma_v.unwrap();
                assert!((sigma - 11.94).abs() < 0.01);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_grain_size_error_propagates() {
        let item = CalculationItem::GrainSize(GrainSizeInput {
            total_mass_g: -1.0,
            ..Default::default()
        });
        assert!(item.run().is_err());
    }

    #[test]
    fn test_output_roundtrip() {
        let item = CalculationItem::Atterberg(AtterbergInput::default());
        let output = item.run().unwrap();
        let json = serde_json::to_string(&output).unwrap();
        let roundtrip: CalculationOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, roundtrip);
    }

    #[test]
    fn test_settlement_item_from_json() {
        let json = r#"{
            "type": "Settlement",
            "label": "Clay",
            "layer_thickness_m": 5.0,
            "initial_void_ratio": 1.0,
            "compression_index": 0.4,
            "recompression_index": 0.05,
            "initial_effective_stress_kpa": 100.0,
            "preconsolidation_stress_kpa": 100.0,
            "stress_increment_kpa": 100.0
        }"#;
        let item: CalculationItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.calc_type(), "Settlement");
        let CalculationOutput::Settlement(result) = item.run().unwrap() else {
            panic!("expected settlement output");
        };
        assert!((result.settlement_m - 0.30103).abs() < 1e-5);
    }

    #[test]
    fn test_geostatic_error_propagates() {
        let item = CalculationItem::Geostatic(GeostaticInput {
            label: "Empty".to_string(),
            layers: vec![],
            water_table_depth_m: None,
            capillary_rise_m: 0.0,
            water_unit_weight_kn_m3: 10.0,
        });
        assert_eq!(item.run().unwrap_err().error_code(), "INSUFFICIENT_DATA");
    }
}
