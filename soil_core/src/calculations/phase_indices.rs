//! # Phase Indices
//!
//! Weight-volume relations of a three-phase soil element. Any consistent
//! subset of bench readings (masses, volume) and indices (w, e, n, S, Gs,
//! unit weights) is accepted; the rest is derived through the fundamental
//! relations until nothing new follows:
//!
//! - e = n / (1 − n)
//! - S·e = w·Gs
//! - γd = Gs·γw / (1 + e) = γ / (1 + w)
//! - γsat = γw (Gs + e) / (1 + e),  γsub = γsat − γw
//!
//! Indices that cannot be reached are left empty and listed in
//! [`PhaseIndicesResult::unresolved`].
//!
//! ## Units
//!
//! Masses in g and volumes in cm³ as weighed; unit weights in kN/m³;
//! w, n, S and relative density in percent.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::numeric::{is_zero, EPSILON};
use crate::units::{CubicCm, Grams, KnPerM3, WATER_DENSITY_G_CM3, WATER_UNIT_WEIGHT_KN_M3};

/// Relative tolerance between Gs·γw and a separately entered γs
const SOLIDS_CONSISTENCY_TOLERANCE: f64 = 1e-3;

fn default_water_unit_weight() -> f64 {
    WATER_UNIT_WEIGHT_KN_M3
}

/// Known quantities of one specimen. Every field is optional except the
/// unit weight of water.
///
/// ## JSON Example
///
/// ```json
/// { "label": "Shelby T-2", "wet_mass_g": 185.0, "dry_mass_g": 160.0, "total_volume_cm3": 100.0, "specific_gravity": 2.65 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseIndicesInput {
    #[serde(default)]
    pub label: String,
    /// Moist specimen mass (g)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wet_mass_g: Option<f64>,
    /// Oven-dry specimen mass (g)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_mass_g: Option<f64>,
    /// Specimen volume (cm³)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume_cm3: Option<f64>,
    /// Gs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_gravity: Option<f64>,
    /// γs (kN/m³)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solids_unit_weight_kn_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub porosity_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation_pct: Option<f64>,
    /// Natural (moist) unit weight γ (kN/m³)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_weight_kn_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_unit_weight_kn_m3: Option<f64>,
    #[serde(default = "default_water_unit_weight")]
    pub water_unit_weight_kn_m3: f64,
    /// Loosest void ratio, for relative density
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_ratio_max: Option<f64>,
    /// Densest void ratio, for relative density
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_ratio_min: Option<f64>,
}

impl Default for PhaseIndicesInput {
    fn default() -> Self {
        PhaseIndicesInput {
            label: String::new(),
            wet_mass_g: None,
            dry_mass_g: None,
            total_volume_cm3: None,
            specific_gravity: None,
            solids_unit_weight_kn_m3: None,
            moisture_pct: None,
            void_ratio: None,
            porosity_pct: None,
            saturation_pct: None,
            unit_weight_kn_m3: None,
            dry_unit_weight_kn_m3: None,
            water_unit_weight_kn_m3: WATER_UNIT_WEIGHT_KN_M3,
            void_ratio_max: None,
            void_ratio_min: None,
        }
    }
}

impl PhaseIndicesInput {
    /// Validate ranges of the supplied fields.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("wet_mass_g", self.wet_mass_g),
            ("dry_mass_g", self.dry_mass_g),
            ("total_volume_cm3", self.total_volume_cm3),
            ("specific_gravity", self.specific_gravity),
            ("solids_unit_weight_kn_m3", self.solids_unit_weight_kn_m3),
            ("unit_weight_kn_m3", self.unit_weight_kn_m3),
            ("dry_unit_weight_kn_m3", self.dry_unit_weight_kn_m3),
            ("water_unit_weight_kn_m3", Some(self.water_unit_weight_kn_m3)),
            ("void_ratio_max", self.void_ratio_max),
        ];
        for (field, value) in positive {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(CalcError::invalid_input(field, v.to_string(), "Must be a positive number"));
                }
            }
        }

        let ranged = [
            ("moisture_pct", self.moisture_pct, f64::INFINITY),
            ("void_ratio", self.void_ratio, f64::INFINITY),
            ("void_ratio_min", self.void_ratio_min, f64::INFINITY),
            ("saturation_pct", self.saturation_pct, 100.0),
        ];
        for (field, value, max) in ranged {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 || v > max {
                    return Err(CalcError::invalid_input(field, v.to_string(), "Out of range"));
                }
            }
        }
        if let Some(n) = self.porosity_pct {
            if !n.is_finite() || !(0.0..100.0).contains(&n) {
                return Err(CalcError::invalid_input(
                    "porosity_pct",
                    n.to_string(),
                    "Porosity must lie in [0, 100)",
                ));
            }
        }

        if let (Some(wet), Some(dry)) = (self.wet_mass_g, self.dry_mass_g) {
            if wet < dry - EPSILON {
                return Err(CalcError::invalid_input(
                    "wet_mass_g",
                    wet.to_string(),
                    "Wet mass cannot be less than dry mass",
                ));
            }
        }
        if let (Some(e_max), Some(e_min)) = (self.void_ratio_max, self.void_ratio_min) {
            if e_min >= e_max - EPSILON {
                return Err(CalcError::invalid_input(
                    "void_ratio_min",
                    e_min.to_string(),
                    "Minimum void ratio must be below the maximum",
                ));
            }
        }
        Ok(())
    }
}

/// Relative density rating (Lambe and Whitman)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compactness {
    VeryLoose,
    Loose,
    MediumDense,
    Dense,
    VeryDense,
}

impl Compactness {
    pub fn from_relative_density(dr_pct: f64) -> Self {
        if dr_pct <= 15.0 {
            Compactness::VeryLoose
        } else if dr_pct <= 35.0 {
            Compactness::Loose
        } else if dr_pct <= 65.0 {
            Compactness::MediumDense
        } else if dr_pct <= 85.0 {
            Compactness::Dense
        } else {
            Compactness::VeryDense
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Compactness::VeryLoose => "Very loose",
            Compactness::Loose => "Loose",
            Compactness::MediumDense => "Medium dense",
            Compactness::Dense => "Dense",
            Compactness::VeryDense => "Very dense",
        }
    }
}

/// Phase diagram normalised to a unit volume of solids (Vs = 1 cm³).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDiagram {
    pub solids_volume: f64,
    /// Vv = e
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_volume: Option<f64>,
    /// Ms = Gs·ρw (g)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solids_mass_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_mass_g: Option<f64>,
}

/// Phase quantities of the specimen itself, when a mass or volume was given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecimenPhases {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume_cm3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solids_volume_cm3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_volume_cm3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_volume_cm3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_mass_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solids_mass_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_mass_g: Option<f64>,
}

/// Derived phase indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseIndicesResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_weight_kn_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_unit_weight_kn_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_unit_weight_kn_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submerged_unit_weight_kn_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solids_unit_weight_kn_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_gravity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub porosity_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_pct: Option<f64>,
    /// Dr = (emax − e) / (emax − emin) × 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_density_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compactness: Option<Compactness>,
    pub phase_diagram: PhaseDiagram,
    #[serde(default)]
    pub specimen: SpecimenPhases,
    /// Indices that the supplied data does not determine
    #[serde(default)]
    pub unresolved: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// n = e / (1 + e)
fn porosity_from_void_ratio(e: f64) -> f64 {
    e / (1.0 + e)
}

/// Reject a derived void ratio below zero; round-off just under zero is
/// clamped.
fn non_negative_void_ratio(e: f64, source: &str) -> CalcResult<f64> {
    if e < -EPSILON {
        return Err(CalcError::calculation_failed(
            "Phase indices",
            format!("Void ratio from {} is negative ({:.4}); check the inputs", source, e),
        ));
    }
    Ok(e.max(0.0))
}

/// Derive every reachable phase index from the supplied quantities.
///
/// # Returns
///
/// * `Ok(PhaseIndicesResult)` - Derived indices; unreachable ones are empty
/// * `Err(CalcError)` - Out-of-range input, Gs inconsistent with γs, or
///   relations that contradict each other
pub fn analyze_phase_indices(input: &PhaseIndicesInput) -> CalcResult<PhaseIndicesResult> {
    input.validate()?;

    let gamma_w = input.water_unit_weight_kn_m3;
    let mut w = input.moisture_pct.map(|v| v / 100.0);
    let mut n = input.porosity_pct.map(|v| v / 100.0);
    let mut s = input.saturation_pct.map(|v| v / 100.0);
    let mut e = input.void_ratio;
    let mut gs = input.specific_gravity;
    let mut gamma_s = input.solids_unit_weight_kn_m3;
    let mut gamma = input.unit_weight_kn_m3;
    let mut gamma_d = input.dry_unit_weight_kn_m3;

    // Bench readings first
    if let (None, Some(wet), Some(dry)) = (w, input.wet_mass_g, input.dry_mass_g) {
        w = Some((wet - dry) / dry);
    }
    if let Some(volume) = input.total_volume_cm3 {
        if gamma.is_none() {
            gamma = input
                .wet_mass_g
                .map(|m| (Grams(m) / CubicCm(volume)).to_unit_weight(KnPerM3(gamma_w)).value());
        }
        if gamma_d.is_none() {
            gamma_d = input
                .dry_mass_g
                .map(|m| (Grams(m) / CubicCm(volume)).to_unit_weight(KnPerM3(gamma_w)).value());
        }
    }
    if let (None, Some(g), Some(w)) = (gamma_d, gamma, w) {
        gamma_d = Some(g / (1.0 + w));
    }

    match (gs, gamma_s) {
        (None, Some(gs_kn)) => gs = Some(gs_kn / gamma_w),
        (Some(g), None) => gamma_s = Some(g * gamma_w),
        (Some(g), Some(gs_kn)) => {
            if (gs_kn - g * gamma_w).abs() > SOLIDS_CONSISTENCY_TOLERANCE * gamma_w {
                return Err(CalcError::invalid_input(
                    "solids_unit_weight_kn_m3",
                    gs_kn.to_string(),
                    format!("Inconsistent with Gs = {} for γw = {} kN/m³", g, gamma_w),
                ));
            }
        }
        (None, None) => {}
    }

    match (e, n) {
        (None, Some(n_val)) => e = Some(n_val / (1.0 - n_val)),
        (Some(e_val), None) => n = Some(porosity_from_void_ratio(e_val)),
        _ => {}
    }

    if let (None, Some(gd), Some(g)) = (e, gamma_d, gs) {
        e = Some(non_negative_void_ratio(g * gamma_w / gd - 1.0, "γd and Gs")?);
    }
    if let (None, Some(e_val)) = (n, e) {
        n = Some(porosity_from_void_ratio(e_val));
    }
    if let (None, Some(gd), Some(e_val)) = (gs, gamma_d, e) {
        let g = gd * (1.0 + e_val) / gamma_w;
        gs = Some(g);
        gamma_s.get_or_insert(g * gamma_w);
    }

    // S·e = w·Gs, solved for whichever of the three is missing
    match (s, w, e, gs) {
        (None, Some(w_val), Some(e_val), Some(g)) => {
            let sat = if e_val <= EPSILON { 0.0 } else { w_val * g / e_val };
            s = Some(sat.clamp(0.0, 1.0));
        }
        (Some(s_val), None, Some(e_val), Some(g)) => {
            w = Some((s_val * e_val / g).max(0.0));
        }
        (Some(s_val), Some(w_val), None, Some(g)) => {
            if is_zero(s_val) {
                if w_val > EPSILON {
                    return Err(CalcError::invalid_input(
                        "saturation_pct",
                        "0",
                        "A dry specimen cannot have a positive moisture content",
                    ));
                }
            } else {
                e = Some(w_val * g / s_val);
            }
        }
        _ => {}
    }
    if let (None, Some(e_val)) = (n, e) {
        n = Some(porosity_from_void_ratio(e_val));
    }

    if gamma.is_none() {
        gamma = match (gamma_d, w, gs, e, s) {
            (Some(gd), Some(w_val), ..) => Some(gd * (1.0 + w_val)),
            (_, _, Some(g), Some(e_val), Some(s_val)) => Some(gamma_w * (g + s_val * e_val) / (1.0 + e_val)),
            _ => None,
        };
    }
    if gamma_d.is_none() {
        gamma_d = match (gamma, w, gs, e) {
            (Some(g), Some(w_val), ..) => Some(g / (1.0 + w_val)),
            (_, _, Some(g), Some(e_val)) => Some(g * gamma_w / (1.0 + e_val)),
            _ => None,
        };
    }
    let gamma_sat = match (gs, gamma_d, e) {
        (Some(g), _, Some(e_val)) => Some(gamma_w * (g + e_val) / (1.0 + e_val)),
        (None, Some(gd), Some(e_val)) => Some(gd + gamma_w * e_val / (1.0 + e_val)),
        _ => None,
    };
    let gamma_sub = gamma_sat.map(|g| (g - gamma_w).max(0.0));

    let mut warnings = Vec::new();
    let (relative_density_pct, compactness) = match (e, input.void_ratio_max, input.void_ratio_min) {
        (Some(e_val), Some(e_max), Some(e_min)) => {
            if e_val < e_min - EPSILON || e_val > e_max + EPSILON {
                warnings.push(format!(
                    "Void ratio {:.4} lies outside [{}, {}]; relative density not computed",
                    e_val, e_min, e_max
                ));
                (None, None)
            } else {
                let dr = ((e_max - e_val) / (e_max - e_min) * 100.0).clamp(0.0, 100.0);
                (Some(dr), Some(Compactness::from_relative_density(dr)))
            }
        }
        _ => (None, None),
    };

    let specimen = specimen_phases(input, w, n, s, e, gs, gamma);
    let phase_diagram = normalized_diagram(w, s, e, gs);

    let unresolved: Vec<String> = [
        ("moisture_pct", w.is_some()),
        ("void_ratio", e.is_some()),
        ("porosity_pct", n.is_some()),
        ("saturation_pct", s.is_some()),
        ("specific_gravity", gs.is_some()),
        ("unit_weight_kn_m3", gamma.is_some()),
        ("dry_unit_weight_kn_m3", gamma_d.is_some()),
        ("saturated_unit_weight_kn_m3", gamma_sat.is_some()),
    ]
    .into_iter()
    .filter(|(_, known)| !known)
    .map(|(name, _)| name.to_string())
    .collect();
    if gs.is_none() && e.is_none() {
        warnings.push(
            "Void relations need the specific gravity of solids (typically 2.65 for sands, 2.70-2.75 for clays)"
                .to_string(),
        );
    }
    if !unresolved.is_empty() {
        tracing::info!(?unresolved, "phase indices partially determined");
    }

    Ok(PhaseIndicesResult {
        unit_weight_kn_m3: gamma,
        dry_unit_weight_kn_m3: gamma_d,
        saturated_unit_weight_kn_m3: gamma_sat,
        submerged_unit_weight_kn_m3: gamma_sub,
        solids_unit_weight_kn_m3: gamma_s,
        specific_gravity: gs,
        void_ratio: e,
        porosity_pct: n.map(|v| v * 100.0),
        saturation_pct: s.map(|v| v * 100.0),
        moisture_pct: w.map(|v| v * 100.0),
        relative_density_pct,
        compactness,
        phase_diagram,
        specimen,
        unresolved,
        warnings,
    })
}

fn normalized_diagram(w: Option<f64>, s: Option<f64>, e: Option<f64>, gs: Option<f64>) -> PhaseDiagram {
    let solids_mass_g = gs.map(|g| g * WATER_DENSITY_G_CM3);
    let water_volume = match (e, s, w, solids_mass_g) {
        (Some(e_val), Some(s_val), ..) => Some(s_val * e_val),
        (Some(_), None, Some(w_val), Some(ms)) => Some(w_val * ms / WATER_DENSITY_G_CM3),
        _ => None,
    };
    PhaseDiagram {
        solids_volume: 1.0,
        void_volume: e,
        water_volume,
        air_volume: match (e, water_volume) {
            (Some(vv), Some(vw)) => Some((vv - vw).max(0.0)),
            _ => None,
        },
        solids_mass_g,
        water_mass_g: water_volume.map(|vw| vw * WATER_DENSITY_G_CM3),
    }
}

fn specimen_phases(
    input: &PhaseIndicesInput,
    w: Option<f64>,
    n: Option<f64>,
    s: Option<f64>,
    e: Option<f64>,
    gs: Option<f64>,
    gamma: Option<f64>,
) -> SpecimenPhases {
    let gamma_w = input.water_unit_weight_kn_m3;
    let mut total_mass = input.wet_mass_g;
    let mut solids_mass = input.dry_mass_g;
    let mut water_mass = match (total_mass, solids_mass) {
        (Some(mt), Some(ms)) => Some(mt - ms),
        _ => None,
    };

    let mut total_volume = input.total_volume_cm3;
    if let (None, Some(mt), Some(g)) = (total_volume, total_mass, gamma) {
        let density = g / gamma_w * WATER_DENSITY_G_CM3;
        if density > EPSILON {
            total_volume = Some(mt / density);
        }
    }
    if let (None, Some(mt), Some(w_val)) = (solids_mass, total_mass, w) {
        let ms = mt / (1.0 + w_val);
        solids_mass = Some(ms);
        water_mass.get_or_insert(mt - ms);
    }

    let solids_volume = match (solids_mass, gs, total_volume, e, n) {
        (Some(ms), Some(g), ..) => Some(ms / (g * WATER_DENSITY_G_CM3)),
        (_, _, Some(v), Some(e_val), _) => Some(v / (1.0 + e_val)),
        (_, _, Some(v), None, Some(n_val)) => Some(v * (1.0 - n_val)),
        _ => None,
    };
    let void_volume = match (total_volume, solids_volume, e) {
        (Some(v), Some(vs), _) => Some(v - vs),
        (None, Some(vs), Some(e_val)) => Some(vs * e_val),
        _ => None,
    };
    let water_volume = match (water_mass, void_volume, s) {
        (Some(mw), ..) => Some(mw / WATER_DENSITY_G_CM3),
        (None, Some(vv), Some(s_val)) => Some(vv * s_val),
        _ => None,
    };
    if total_volume.is_none() {
        if let (Some(vs), Some(vv)) = (solids_volume, void_volume) {
            total_volume = Some(vs + vv);
        }
    }
    if total_mass.is_none() {
        if let (Some(ms), Some(mw)) = (solids_mass, water_mass) {
            total_mass = Some(ms + mw);
        }
    }

    SpecimenPhases {
        total_volume_cm3: total_volume,
        solids_volume_cm3: solids_volume,
        water_volume_cm3: water_volume,
        air_volume_cm3: match (void_volume, water_volume) {
            (Some(vv), Some(vw)) => Some((vv - vw).max(0.0)),
            _ => None,
        },
        total_mass_g: total_mass,
        solids_mass_g: solids_mass,
        water_mass_g: water_mass,
    }
}

// ============================================================================
// Several specimens of one layer
// ============================================================================

/// Mean coefficient of variation above which specimens disagree strongly (%)
const HIGH_VARIABILITY_CV_PCT: f64 = 15.0;
/// Mean coefficient of variation above which variability is noted (%)
const MODERATE_VARIABILITY_CV_PCT: f64 = 10.0;

/// Sample statistics of one index across specimens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterStats {
    pub mean: f64,
    /// Sample standard deviation (n − 1)
    pub std_dev: f64,
    /// Coefficient of variation (%)
    pub cv_pct: f64,
    pub min: f64,
    pub max: f64,
}

impl ParameterStats {
    /// Statistics of the known values; `None` with fewer than two.
    pub fn from_values(values: impl IntoIterator<Item = Option<f64>>) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().flatten().filter(|v| v.is_finite()).collect();
        if values.len() < 2 {
            return None;
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1.0);
        let std_dev = variance.sqrt();
        Some(ParameterStats {
            mean,
            std_dev,
            cv_pct: if is_zero(mean) { 0.0 } else { std_dev / mean.abs() * 100.0 },
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Spread of the headline indices across specimens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_weight_kn_m3: Option<ParameterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_unit_weight_kn_m3: Option<ParameterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_unit_weight_kn_m3: Option<ParameterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_pct: Option<ParameterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_ratio: Option<ParameterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub porosity_pct: Option<ParameterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation_pct: Option<ParameterStats>,
}

impl PhaseStatistics {
    fn all(&self) -> impl Iterator<Item = &ParameterStats> {
        [
            &self.unit_weight_kn_m3,
            &self.dry_unit_weight_kn_m3,
            &self.saturated_unit_weight_kn_m3,
            &self.moisture_pct,
            &self.void_ratio,
            &self.porosity_pct,
            &self.saturation_pct,
        ]
        .into_iter()
        .flatten()
    }

    /// Mean coefficient of variation over the indices with statistics
    pub fn mean_cv_pct(&self) -> Option<f64> {
        let cvs: Vec<f64> = self.all().map(|s| s.cv_pct).collect();
        if cvs.is_empty() {
            None
        } else {
            Some(cvs.iter().sum::<f64>() / cvs.len() as f64)
        }
    }
}

/// Per-specimen results with their statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSampleSummary {
    pub samples: Vec<PhaseIndicesResult>,
    pub statistics: PhaseStatistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Reduce several specimens of the same material.
///
/// The first failing specimen aborts the reduction.
pub fn analyze_phase_samples(inputs: &[PhaseIndicesInput]) -> CalcResult<PhaseSampleSummary> {
    if inputs.is_empty() {
        return Err(CalcError::insufficient_data(1, 0, "No specimens supplied"));
    }
    let samples = inputs
        .iter()
        .map(analyze_phase_indices)
        .collect::<CalcResult<Vec<_>>>()?;

    let stats = |field: fn(&PhaseIndicesResult) -> Option<f64>| ParameterStats::from_values(samples.iter().map(field));
    let statistics = PhaseStatistics {
        unit_weight_kn_m3: stats(|r| r.unit_weight_kn_m3),
        dry_unit_weight_kn_m3: stats(|r| r.dry_unit_weight_kn_m3),
        saturated_unit_weight_kn_m3: stats(|r| r.saturated_unit_weight_kn_m3),
        moisture_pct: stats(|r| r.moisture_pct),
        void_ratio: stats(|r| r.void_ratio),
        porosity_pct: stats(|r| r.porosity_pct),
        saturation_pct: stats(|r| r.saturation_pct),
    };

    let warning = statistics.mean_cv_pct().and_then(|cv| {
        if cv > HIGH_VARIABILITY_CV_PCT {
            Some(format!("High variability between specimens (mean CV {:.1} %); review the tests", cv))
        } else if cv > MODERATE_VARIABILITY_CV_PCT {
            Some(format!("Moderate variability between specimens (mean CV {:.1} %)", cv))
        } else {
            None
        }
    });
    if let Some(w) = &warning {
        tracing::warn!("{}", w);
    }

    Ok(PhaseSampleSummary {
        samples,
        statistics,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bench_input() -> PhaseIndicesInput {
        PhaseIndicesInput {
            label: "T-2".to_string(),
            wet_mass_g: Some(185.0),
            dry_mass_g: Some(160.0),
            total_volume_cm3: Some(100.0),
            specific_gravity: Some(2.65),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_bench_readings() {
        let r = analyze_phase_indices(&bench_input()).unwrap();
        assert_relative_eq!(r.moisture_pct.unwrap(), 15.625, epsilon = 1e-9);
        assert_relative_eq!(r.unit_weight_kn_m3.unwrap(), 18.5, epsilon = 1e-9);
        assert_relative_eq!(r.dry_unit_weight_kn_m3.unwrap(), 16.0, epsilon = 1e-9);
        assert_relative_eq!(r.solids_unit_weight_kn_m3.unwrap(), 26.5, epsilon = 1e-9);
        assert_relative_eq!(r.void_ratio.unwrap(), 0.65625, epsilon = 1e-9);
        assert_relative_eq!(r.porosity_pct.unwrap(), 39.6226, epsilon = 1e-4);
        assert_relative_eq!(r.saturation_pct.unwrap(), 63.0952, epsilon = 1e-4);
        assert_relative_eq!(r.saturated_unit_weight_kn_m3.unwrap(), 19.9623, epsilon = 1e-4);
        assert_relative_eq!(r.submerged_unit_weight_kn_m3.unwrap(), 9.9623, epsilon = 1e-4);
        assert!(r.unresolved.is_empty());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_specimen_and_normalized_phases() {
        let r = analyze_phase_indices(&bench_input()).unwrap();
        let sp = r.specimen;
        assert_relative_eq!(sp.solids_volume_cm3.unwrap(), 60.3774, epsilon = 1e-4);
        assert_relative_eq!(sp.water_volume_cm3.unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(sp.air_volume_cm3.unwrap(), 14.6226, epsilon = 1e-4);
        assert_relative_eq!(sp.water_mass_g.unwrap(), 25.0, epsilon = 1e-9);

        let d = r.phase_diagram;
        assert_relative_eq!(d.void_volume.unwrap(), 0.65625, epsilon = 1e-9);
        assert_relative_eq!(d.water_volume.unwrap(), 0.4140625, epsilon = 1e-9);
        assert_relative_eq!(d.air_volume.unwrap(), 0.2421875, epsilon = 1e-9);
        assert_relative_eq!(d.solids_mass_g.unwrap(), 2.65, epsilon = 1e-12);
    }

    #[test]
    fn test_from_indices_only() {
        let input = PhaseIndicesInput {
            specific_gravity: Some(2.7),
            porosity_pct: Some(40.0),
            saturation_pct: Some(100.0),
            ..Default::default()
        };
        let r = analyze_phase_indices(&input).unwrap();
        assert_relative_eq!(r.void_ratio.unwrap(), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(r.moisture_pct.unwrap(), 24.6914, epsilon = 1e-4);
        assert_relative_eq!(r.unit_weight_kn_m3.unwrap(), 20.2, epsilon = 1e-9);
        assert_relative_eq!(r.dry_unit_weight_kn_m3.unwrap(), 16.2, epsilon = 1e-9);
        assert_relative_eq!(r.saturated_unit_weight_kn_m3.unwrap(), 20.2, epsilon = 1e-9);
        assert!(r.specimen.total_volume_cm3.is_none());
    }

    #[test]
    fn test_masses_without_gs_are_partial() {
        let mut input = bench_input();
        input.specific_gravity = None;
        let r = analyze_phase_indices(&input).unwrap();
        assert_relative_eq!(r.moisture_pct.unwrap(), 15.625, epsilon = 1e-9);
        assert_relative_eq!(r.dry_unit_weight_kn_m3.unwrap(), 16.0, epsilon = 1e-9);
        assert!(r.void_ratio.is_none());
        assert!(r.unresolved.contains(&"void_ratio".to_string()));
        assert!(r.unresolved.contains(&"specific_gravity".to_string()));
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn test_relative_density() {
        let mut input = bench_input();
        input.void_ratio_max = Some(0.9);
        input.void_ratio_min = Some(0.4);
        let r = analyze_phase_indices(&input).unwrap();
        assert_relative_eq!(r.relative_density_pct.unwrap(), 48.75, epsilon = 1e-9);
        assert_eq!(r.compactness, Some(Compactness::MediumDense));

        input.void_ratio_max = Some(0.6);
        input.void_ratio_min = Some(0.4);
        let r = analyze_phase_indices(&input).unwrap();
        assert!(r.relative_density_pct.is_none());
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn test_inconsistent_solids() {
        let mut input = bench_input();
        input.solids_unit_weight_kn_m3 = Some(27.5);
        let err = analyze_phase_indices(&input).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "solids_unit_weight_kn_m3"));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = bench_input();
        input.wet_mass_g = Some(150.0);
        assert!(analyze_phase_indices(&input).is_err());

        let input = PhaseIndicesInput {
            porosity_pct: Some(100.0),
            ..Default::default()
        };
        assert!(analyze_phase_indices(&input).is_err());

        let input = PhaseIndicesInput {
            void_ratio_max: Some(0.5),
            void_ratio_min: Some(0.5),
            ..Default::default()
        };
        assert!(analyze_phase_indices(&input).is_err());
    }

    #[test]
    fn test_dry_specimen_with_moisture_is_rejected() {
        let input = PhaseIndicesInput {
            specific_gravity: Some(2.65),
            moisture_pct: Some(10.0),
            saturation_pct: Some(0.0),
            ..Default::default()
        };
        assert!(analyze_phase_indices(&input).is_err());
    }

    #[test]
    fn test_negative_void_ratio_fails() {
        let input = PhaseIndicesInput {
            specific_gravity: Some(2.65),
            dry_unit_weight_kn_m3: Some(30.0),
            ..Default::default()
        };
        let err = analyze_phase_indices(&input).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }

    #[test]
    fn test_sample_statistics() {
        let a = PhaseIndicesInput {
            unit_weight_kn_m3: Some(18.0),
            ..Default::default()
        };
        let b = PhaseIndicesInput {
            unit_weight_kn_m3: Some(20.0),
            ..Default::default()
        };
        let summary = analyze_phase_samples(&[a, b]).unwrap();
        let stats = summary.statistics.unit_weight_kn_m3.unwrap();
        assert_relative_eq!(stats.mean, 19.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev, 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(stats.cv_pct, 7.4432, epsilon = 1e-4);
        assert_eq!((stats.min, stats.max), (18.0, 20.0));
        assert!(summary.statistics.void_ratio.is_none());
        assert!(summary.warning.is_none());
    }

    #[test]
    fn test_sample_variability_warning() {
        let make = |w| PhaseIndicesInput {
            moisture_pct: Some(w),
            ..Default::default()
        };
        let summary = analyze_phase_samples(&[make(10.0), make(20.0)]).unwrap();
        assert!(summary.warning.unwrap().starts_with("High variability"));
        assert!(analyze_phase_samples(&[]).is_err());
    }

    #[test]
    fn test_default_water_unit_weight_from_json() {
        let input: PhaseIndicesInput = serde_json::from_str(r#"{ "void_ratio": 0.5 }"#).unwrap();
        assert_eq!(input.water_unit_weight_kn_m3, WATER_UNIT_WEIGHT_KN_M3);
        let r = analyze_phase_indices(&input).unwrap();
        assert_relative_eq!(r.porosity_pct.unwrap(), 100.0 / 3.0, epsilon = 1e-9);
    }
}
