//! # Geostatic Stresses
//!
//! Total vertical stress, pore pressure and effective stresses down a
//! layered profile under its own weight.
//!
//! - σv accumulates γ·h layer by layer; γnat above the water table, γsat below
//! - u is hydrostatic below the water table and negative (suction) within the
//!   capillary fringe above it
//! - σ'v = σv − u, σ'h = K0·σ'v
//!
//! ## Water Tables
//!
//! A profile has an optional global water table. A layer may carry its own
//! (perched or confined aquifer); it then governs that layer, and layers
//! below it inherit it until an impermeable layer intervenes. An impermeable
//! layer without its own table carries no pore pressure.
//!
//! Stresses are reported at the surface, at every layer base and where a
//! water table or capillary fringe starts inside a layer.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::numeric::approx_eq;
use crate::units::WATER_UNIT_WEIGHT_KN_M3;

fn default_k0() -> f64 {
    0.5
}

fn default_water_unit_weight() -> f64 {
    WATER_UNIT_WEIGHT_KN_M3
}

/// One horizontal layer, listed from the surface down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    pub thickness_m: f64,
    /// Natural unit weight, used above the water table (kN/m³)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_weight_kn_m3: Option<f64>,
    /// Saturated unit weight, used below the water table (kN/m³)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_unit_weight_kn_m3: Option<f64>,
    /// Coefficient of earth pressure at rest
    #[serde(default = "default_k0")]
    pub k0: f64,
    #[serde(default)]
    pub impermeable: bool,
    /// Water table of an aquifer confined to this layer (m below surface)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_table_depth_m: Option<f64>,
    /// Capillary rise above this layer's own water table (m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capillary_rise_m: Option<f64>,
}

/// Layered profile.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "SPT-04",
///   "layers": [
///     { "thickness_m": 3.0, "unit_weight_kn_m3": 17.0, "saturated_unit_weight_kn_m3": 20.0 },
///     { "thickness_m": 4.0, "saturated_unit_weight_kn_m3": 18.0, "k0": 0.6 }
///   ],
///   "water_table_depth_m": 2.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeostaticInput {
    #[serde(default)]
    pub label: String,
    pub layers: Vec<SoilLayer>,
    /// Depth of the global water table (m); none means a dry profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_table_depth_m: Option<f64>,
    /// Capillary rise above the global water table (m)
    #[serde(default)]
    pub capillary_rise_m: f64,
    #[serde(default = "default_water_unit_weight")]
    pub water_unit_weight_kn_m3: f64,
}

impl GeostaticInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.layers.is_empty() {
            return Err(CalcError::insufficient_data(1, 0, "A profile needs at least one layer"));
        }
        if !self.water_unit_weight_kn_m3.is_finite() || self.water_unit_weight_kn_m3 <= 0.0 {
            return Err(CalcError::invalid_input(
                "water_unit_weight_kn_m3",
                self.water_unit_weight_kn_m3.to_string(),
                "Must be a positive number",
            ));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if !layer.thickness_m.is_finite() || layer.thickness_m <= 0.0 {
                return Err(CalcError::invalid_input(
                    format!("layers[{}].thickness_m", i),
                    layer.thickness_m.to_string(),
                    "Thickness must be positive",
                ));
            }
            for (name, value) in [
                ("unit_weight_kn_m3", layer.unit_weight_kn_m3),
                ("saturated_unit_weight_kn_m3", layer.saturated_unit_weight_kn_m3),
            ] {
                if let Some(v) = value {
                    if !v.is_finite() || v <= 0.0 {
                        return Err(CalcError::invalid_input(
                            format!("layers[{}].{}", i, name),
                            v.to_string(),
                            "Unit weight must be positive",
                        ));
                    }
                }
            }
            for (name, value) in [
                ("k0", Some(layer.k0)),
                ("water_table_depth_m", layer.water_table_depth_m),
                ("capillary_rise_m", layer.capillary_rise_m),
            ] {
                check_non_negative(&format!("layers[{}].{}", i, name), value)?;
            }
        }
        check_non_negative("water_table_depth_m", self.water_table_depth_m)?;
        check_non_negative("capillary_rise_m", Some(self.capillary_rise_m))
    }

    /// Depth of the base of the deepest layer
    pub fn total_depth(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness_m).sum()
    }
}

fn check_non_negative(field: &str, value: Option<f64>) -> CalcResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(CalcError::invalid_input(field, v.to_string(), "Cannot be negative"))
        }
        _ => Ok(()),
    }
}

/// Stresses at one depth (kPa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeostaticPoint {
    pub depth_m: f64,
    pub total_vertical_kpa: f64,
    pub pore_pressure_kpa: f64,
    pub effective_vertical_kpa: f64,
    pub effective_horizontal_kpa: f64,
}

impl GeostaticPoint {
    fn new(depth_m: f64, total_vertical_kpa: f64, pore_pressure_kpa: f64, k0: f64) -> Self {
        let effective = total_vertical_kpa - pore_pressure_kpa;
        if effective < 0.0 {
            tracing::warn!(depth_m, effective, "negative effective stress clamped to zero");
        }
        let effective_vertical_kpa = effective.max(0.0);
        GeostaticPoint {
            depth_m,
            total_vertical_kpa,
            pore_pressure_kpa,
            effective_vertical_kpa,
            effective_horizontal_kpa: k0 * effective_vertical_kpa,
        }
    }
}

/// Stress profile, ordered by depth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeostaticProfile {
    pub points: Vec<GeostaticPoint>,
}

/// Free water surface with its capillary fringe
#[derive(Debug, Clone, Copy, PartialEq)]
struct WaterTable {
    depth_m: f64,
    capillary_rise_m: f64,
}

impl WaterTable {
    fn pore_pressure(&self, z: f64, gamma_w: f64) -> f64 {
        let head = z - self.depth_m;
        if head >= 0.0 || -head <= self.capillary_rise_m {
            head * gamma_w
        } else {
            0.0
        }
    }

    /// Top of the capillary fringe, when there is one
    fn fringe_top(&self) -> Option<f64> {
        (self.capillary_rise_m > 0.0).then(|| (self.depth_m - self.capillary_rise_m).max(0.0))
    }
}

/// Water table that sets the pore pressure in layer `index`.
fn governing_water_table(input: &GeostaticInput, index: usize) -> Option<WaterTable> {
    let layer = &input.layers[index];
    let global = input.water_table_depth_m.map(|depth_m| WaterTable {
        depth_m,
        capillary_rise_m: input.capillary_rise_m,
    });
    let own = |l: &SoilLayer| {
        l.water_table_depth_m.map(|depth_m| WaterTable {
            depth_m,
            capillary_rise_m: l.capillary_rise_m.unwrap_or(0.0),
        })
    };

    if let Some(table) = own(layer) {
        return Some(table);
    }
    if layer.impermeable {
        return None;
    }
    if input.layers.iter().all(|l| l.water_table_depth_m.is_none()) {
        return global;
    }
    // Inherit the nearest aquifer above unless a seal lies in between
    for above in input.layers[..index].iter().rev() {
        if above.impermeable {
            return None;
        }
        if let Some(table) = own(above) {
            return Some(table);
        }
    }
    global
}

/// Unit weight over [top, bottom] of a layer, which lies wholly on one side of
/// `water_table`.
fn unit_weight_between(
    layer: &SoilLayer,
    index: usize,
    top: f64,
    bottom: f64,
    water_table: Option<f64>,
) -> CalcResult<f64> {
    let missing = |field: &str, reason: String| {
        CalcError::incomplete_data("Geostatic stress", [format!("layers[{}].{}", index, field)], reason)
    };
    match water_table {
        None => layer.unit_weight_kn_m3.or(layer.saturated_unit_weight_kn_m3).ok_or_else(|| {
            missing(
                "unit_weight_kn_m3",
                format!("Layer {} has neither a natural nor a saturated unit weight", index + 1),
            )
        }),
        Some(depth) if (top + bottom) / 2.0 < depth => layer.unit_weight_kn_m3.ok_or_else(|| {
            missing(
                "unit_weight_kn_m3",
                format!("Layer {} lies above the water table at {:.2} m", index + 1, depth),
            )
        }),
        Some(depth) => layer.saturated_unit_weight_kn_m3.ok_or_else(|| {
            missing(
                "saturated_unit_weight_kn_m3",
                format!("Layer {} lies below the water table at {:.2} m", index + 1, depth),
            )
        }),
    }
}

/// Compute the stress profile.
///
/// # Returns
///
/// * `Ok(GeostaticProfile)` - Points from the surface to the deepest base
/// * `Err(CalcError)` - Invalid geometry, or a layer lacking the unit weight
///   its position relative to the water table requires
pub fn geostatic_profile(input: &GeostaticInput) -> CalcResult<GeostaticProfile> {
    input.validate()?;
    let gamma_w = input.water_unit_weight_kn_m3;

    let surface_u = governing_water_table(input, 0).map_or(0.0, |t| t.pore_pressure(0.0, gamma_w));
    let mut points = vec![GeostaticPoint::new(0.0, 0.0, surface_u, input.layers[0].k0)];

    let mut top = 0.0;
    let mut sigma_v = 0.0;
    for (i, layer) in input.layers.iter().enumerate() {
        let base = top + layer.thickness_m;
        let pore_table = governing_water_table(input, i);
        let weight_table = layer.water_table_depth_m.or(input.water_table_depth_m);

        let mut depths: Vec<f64> = [pore_table.and_then(|t| t.fringe_top()), weight_table]
            .into_iter()
            .flatten()
            .filter(|&d| d > top && d < base)
            .collect();
        depths.push(base);
        depths.sort_by(f64::total_cmp);
        depths.dedup_by(|a, b| approx_eq(*a, *b));

        let mut z_prev = top;
        for z in depths {
            sigma_v += unit_weight_between(layer, i, z_prev, z, weight_table)? * (z - z_prev);
            let u = pore_table.map_or(0.0, |t| t.pore_pressure(z, gamma_w));
            points.push(GeostaticPoint::new(z, sigma_v, u, layer.k0));
            z_prev = z;
        }
        top = base;
    }

    tracing::debug!(
        layers = input.layers.len(),
        points = points.len(),
        sigma_v_base = sigma_v,
        "geostatic profile"
    );
    Ok(GeostaticProfile { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn layer(thickness_m: f64, gamma: Option<f64>, gamma_sat: Option<f64>) -> SoilLayer {
        SoilLayer {
            thickness_m,
            unit_weight_kn_m3: gamma,
            saturated_unit_weight_kn_m3: gamma_sat,
            k0: 0.5,
            impermeable: false,
            water_table_depth_m: None,
            capillary_rise_m: None,
        }
    }

    fn profile(layers: Vec<SoilLayer>, water_table: Option<f64>, capillary: f64) -> GeostaticInput {
        GeostaticInput {
            label: "Test".to_string(),
            layers,
            water_table_depth_m: water_table,
            capillary_rise_m: capillary,
            water_unit_weight_kn_m3: 10.0,
        }
    }

    fn at(profile: &GeostaticProfile, depth: f64) -> GeostaticPoint {
        *profile
            .points
            .iter()
            .find(|p| (p.depth_m - depth).abs() < 1e-9)
            .unwrap_or_else(|| panic!("no point at {} m", depth))
    }

    #[test]
    fn test_two_layers_with_water_table() {
        let mut clay = layer(4.0, None, Some(18.0));
        clay.k0 = 0.6;
        let input = profile(vec![layer(3.0, Some(17.0), Some(20.0)), clay], Some(2.0), 0.0);
        let out = geostatic_profile(&input).unwrap();

        let depths: Vec<f64> = out.points.iter().map(|p| p.depth_m).collect();
        assert_eq!(depths, vec![0.0, 2.0, 3.0, 7.0]);

        let wt = at(&out, 2.0);
        assert_relative_eq!(wt.total_vertical_kpa, 34.0, epsilon = 1e-9);
        assert_relative_eq!(wt.pore_pressure_kpa, 0.0, epsilon = 1e-9);

        let interface = at(&out, 3.0);
        assert_relative_eq!(interface.total_vertical_kpa, 54.0, epsilon = 1e-9);
        assert_relative_eq!(interface.effective_vertical_kpa, 44.0, epsilon = 1e-9);
        assert_relative_eq!(interface.effective_horizontal_kpa, 22.0, epsilon = 1e-9);

        let bottom = at(&out, 7.0);
        assert_relative_eq!(bottom.total_vertical_kpa, 126.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.pore_pressure_kpa, 50.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.effective_vertical_kpa, 76.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.effective_horizontal_kpa, 45.6, epsilon = 1e-9);
    }

    #[test]
    fn test_capillary_fringe_suction() {
        let input = profile(vec![layer(6.0, Some(16.0), Some(20.0))], Some(4.0), 1.5);
        let out = geostatic_profile(&input).unwrap();

        assert_relative_eq!(at(&out, 0.0).pore_pressure_kpa, 0.0);
        let fringe = at(&out, 2.5);
        assert_relative_eq!(fringe.total_vertical_kpa, 40.0, epsilon = 1e-9);
        assert_relative_eq!(fringe.pore_pressure_kpa, -15.0, epsilon = 1e-9);
        assert_relative_eq!(fringe.effective_vertical_kpa, 55.0, epsilon = 1e-9);

        assert_relative_eq!(at(&out, 4.0).effective_vertical_kpa, 64.0, epsilon = 1e-9);
        assert_relative_eq!(at(&out, 6.0).effective_vertical_kpa, 84.0, epsilon = 1e-9);
    }

    #[test]
    fn test_perched_and_confined_water() {
        let mut sand = layer(2.0, Some(18.0), Some(20.0));
        sand.water_table_depth_m = Some(1.0);
        let mut clay = layer(3.0, Some(19.0), None);
        clay.impermeable = true;
        let mut aquifer = layer(2.0, None, Some(21.0));
        aquifer.water_table_depth_m = Some(4.0);

        let out = geostatic_profile(&profile(vec![sand, clay, aquifer], None, 0.0)).unwrap();
        assert_relative_eq!(at(&out, 2.0).effective_vertical_kpa, 28.0, epsilon = 1e-9);

        let seal_base = at(&out, 5.0);
        assert_relative_eq!(seal_base.total_vertical_kpa, 95.0, epsilon = 1e-9);
        assert_relative_eq!(seal_base.pore_pressure_kpa, 0.0);

        let bottom = at(&out, 7.0);
        assert_relative_eq!(bottom.total_vertical_kpa, 137.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.pore_pressure_kpa, 30.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.effective_vertical_kpa, 107.0, epsilon = 1e-9);
    }

    #[test]
    fn test_layer_inherits_aquifer_above() {
        let mut upper = layer(2.0, Some(18.0), Some(20.0));
        upper.water_table_depth_m = Some(1.0);
        let lower = layer(2.0, None, Some(20.0));
        let out = geostatic_profile(&profile(vec![upper, lower], None, 0.0)).unwrap();
        let bottom = at(&out, 4.0);
        assert_relative_eq!(bottom.total_vertical_kpa, 78.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.pore_pressure_kpa, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dry_profile_falls_back_to_saturated_weight() {
        let out = geostatic_profile(&profile(vec![layer(2.0, None, Some(19.0))], None, 0.0)).unwrap();
        let bottom = at(&out, 2.0);
        assert_relative_eq!(bottom.total_vertical_kpa, 38.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.effective_vertical_kpa, 38.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_saturated_weight() {
        let input = profile(vec![layer(3.0, Some(17.0), None)], Some(1.0), 0.0);
        let err = geostatic_profile(&input).unwrap_err();
        assert_eq!(err.error_code(), "INCOMPLETE_DATA");
        assert!(err.to_string().contains("layers[0].saturated_unit_weight_kn_m3"));
    }

    #[test]
    fn test_invalid_profiles() {
        assert!(geostatic_profile(&profile(vec![], None, 0.0)).is_err());
        assert!(geostatic_profile(&profile(vec![layer(0.0, Some(17.0), None)], None, 0.0)).is_err());
        assert!(geostatic_profile(&profile(vec![layer(1.0, Some(17.0), None)], Some(-1.0), 0.0)).is_err());
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{ "layers": [ { "thickness_m": 2.0, "unit_weight_kn_m3": 18.0 } ] }"#;
        let input: GeostaticInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.layers[0].k0, 0.5);
        assert_eq!(input.water_unit_weight_kn_m3, WATER_UNIT_WEIGHT_KN_M3);
        assert_relative_eq!(input.total_depth(), 2.0);
        let out = geostatic_profile(&input).unwrap();
        assert_relative_eq!(out.points[1].effective_horizontal_kpa, 18.0, epsilon = 1e-9);
    }
}
