//! # Primary Consolidation Settlement
//!
//! One-dimensional settlement of a clay layer from the e-log σ' line
//! (Terzaghi). The state of the layer follows from the overconsolidation
//! ratio OCR = σ'p / σ'v0:
//!
//! | State                 | Strain εv                                                     |
//! |-----------------------|---------------------------------------------------------------|
//! | Normally consolidated | Cc/(1+e0) · log(σ'f/σ'v0)                                     |
//! | Overconsolidated      | Cr/(1+e0) · log(σ'f/σ'v0), while σ'f ≤ σ'p                    |
//! |                       | Cr/(1+e0) · log(σ'p/σ'v0) + Cc/(1+e0) · log(σ'f/σ'p), beyond |
//! | Underconsolidated     | treated as normally consolidated                              |
//!
//! Settlement ρ = εv · H0. Stresses in kPa, thickness and settlement in m.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// OCR within this distance of 1 counts as normally consolidated
pub const NORMALLY_CONSOLIDATED_OCR_TOLERANCE: f64 = 0.1;

/// Clay layer and its loading.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Soft clay 4-9 m",
///   "layer_thickness_m": 5.0,
///   "initial_void_ratio": 1.0,
///   "compression_index": 0.4,
///   "recompression_index": 0.05,
///   "initial_effective_stress_kpa": 100.0,
///   "preconsolidation_stress_kpa": 100.0,
///   "stress_increment_kpa": 100.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementInput {
    #[serde(default)]
    pub label: String,
    /// H0 (m)
    pub layer_thickness_m: f64,
    /// e0
    pub initial_void_ratio: f64,
    /// Cc, slope of the virgin compression line
    pub compression_index: f64,
    /// Cr, slope of the unload-reload line
    pub recompression_index: f64,
    /// σ'v0 at mid-layer (kPa)
    pub initial_effective_stress_kpa: f64,
    /// σ'p (kPa)
    pub preconsolidation_stress_kpa: f64,
    /// Δσ' at mid-layer (kPa)
    pub stress_increment_kpa: f64,
}

impl SettlementInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("layer_thickness_m", self.layer_thickness_m),
            ("initial_void_ratio", self.initial_void_ratio),
            ("compression_index", self.compression_index),
            ("recompression_index", self.recompression_index),
            ("initial_effective_stress_kpa", self.initial_effective_stress_kpa),
            ("preconsolidation_stress_kpa", self.preconsolidation_stress_kpa),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be a positive number"));
            }
        }
        if !self.stress_increment_kpa.is_finite() || self.stress_increment_kpa < 0.0 {
            return Err(CalcError::invalid_input(
                "stress_increment_kpa",
                self.stress_increment_kpa.to_string(),
                "Stress increment cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Consolidation state of the layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationState {
    NormallyConsolidated,
    Overconsolidated,
    Underconsolidated,
}

impl ConsolidationState {
    pub fn from_ocr(ocr: f64) -> Self {
        if (ocr - 1.0).abs() < NORMALLY_CONSOLIDATED_OCR_TOLERANCE {
            ConsolidationState::NormallyConsolidated
        } else if ocr > 1.0 {
            ConsolidationState::Overconsolidated
        } else {
            ConsolidationState::Underconsolidated
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConsolidationState::NormallyConsolidated => "Normally consolidated",
            ConsolidationState::Overconsolidated => "Overconsolidated",
            ConsolidationState::Underconsolidated => "Underconsolidated (computed as normally consolidated)",
        }
    }
}

/// Primary consolidation settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// ρ (m)
    pub settlement_m: f64,
    /// εv
    pub volumetric_strain: f64,
    /// σ'f = σ'v0 + Δσ' (kPa)
    pub final_effective_stress_kpa: f64,
    pub overconsolidation_ratio: f64,
    pub state: ConsolidationState,
    /// True when an overconsolidated layer is loaded past σ'p
    pub exceeds_preconsolidation: bool,
}

/// Compute primary consolidation settlement.
pub fn consolidation_settlement(input: &SettlementInput) -> CalcResult<SettlementResult> {
    input.validate()?;

    let sigma_0 = input.initial_effective_stress_kpa;
    let sigma_p = input.preconsolidation_stress_kpa;
    let sigma_f = sigma_0 + input.stress_increment_kpa;
    let ocr = sigma_p / sigma_0;
    let state = ConsolidationState::from_ocr(ocr);

    let virgin = input.compression_index / (1.0 + input.initial_void_ratio);
    let recompression = input.recompression_index / (1.0 + input.initial_void_ratio);

    let (volumetric_strain, exceeds_preconsolidation) = match state {
        ConsolidationState::Overconsolidated if sigma_f <= sigma_p => {
            (recompression * (sigma_f / sigma_0).log10(), false)
        }
        ConsolidationState::Overconsolidated => (
            recompression * (sigma_p / sigma_0).log10() + virgin * (sigma_f / sigma_p).log10(),
            true,
        ),
        ConsolidationState::NormallyConsolidated | ConsolidationState::Underconsolidated => {
            (virgin * (sigma_f / sigma_0).log10(), false)
        }
    };

    if state == ConsolidationState::Underconsolidated {
        tracing::warn!(ocr, "underconsolidated layer computed as normally consolidated");
    }
    tracing::debug!(ocr, volumetric_strain, ?state, "consolidation settlement");

    Ok(SettlementResult {
        settlement_m: volumetric_strain * input.layer_thickness_m,
        volumetric_strain,
        final_effective_stress_kpa: sigma_f,
        overconsolidation_ratio: ocr,
        state,
        exceeds_preconsolidation,
    })
}
