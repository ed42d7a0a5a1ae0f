//! # Unit Types
//!
//! Type-safe wrappers for the quantities a soil laboratory records. These
//! keep raw bench readings (grams, cubic centimetres) apart from the working
//! units of the calculations (kN/m³, kPa) while serializing as plain numbers.
//!
//! ## Working Units
//!
//! - Mass: grams (g), as weighed
//! - Volume: cubic centimetres (cm³), as calibrated for Proctor moulds
//! - Density: g/cm³
//! - Unit weight: kN/m³
//! - Force: kilonewtons (kN)
//! - Stress: kilopascals (kPa = kN/m²)
//! - Length: metres for geometry, millimetres for sieve apertures
//!
//! ## Example
//!
//! ```rust
//! use soil_core::units::{CubicCm, Grams, KnPerM3};
//!
//! let density = Grams(1980.0) / CubicCm(1000.0);
//! assert!((density.0 - 1.98).abs() < 1e-12);
//!
//! let gamma = density.to_unit_weight(KnPerM3(10.0));
//! assert!((gamma.0 - 19.8).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Density of water in g/cm³ used to scale density into unit weight
pub const WATER_DENSITY_G_CM3: f64 = 1.0;

/// Default unit weight of water (kN/m³) used by laboratory sheets
pub const WATER_UNIT_WEIGHT_KN_M3: f64 = 10.0;

// ============================================================================
// Mass and Volume
// ============================================================================

/// Mass in grams
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grams(pub f64);

/// Volume in cubic centimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicCm(pub f64);

// ============================================================================
// Density and Unit Weight
// ============================================================================

/// Density in g/cm³
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GramsPerCm3(pub f64);

/// Unit weight in kN/m³
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerM3(pub f64);

impl Div<CubicCm> for Grams {
    type Output = GramsPerCm3;
    fn div(self, rhs: CubicCm) -> GramsPerCm3 {
        GramsPerCm3(self.0 / rhs.0)
    }
}

impl GramsPerCm3 {
    /// Scale a density into unit weight: γ = (ρ / ρw) · γw
    pub fn to_unit_weight(self, water_unit_weight: KnPerM3) -> KnPerM3 {
        KnPerM3(self.0 / WATER_DENSITY_G_CM3 * water_unit_weight.0)
    }
}

// ============================================================================
// Force and Stress
// ============================================================================

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilonewtons(pub f64);

/// Stress in kilopascals (kN/m²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilopascals(pub f64);

/// Area in square metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqM(pub f64);

impl Mul<SqM> for Kilopascals {
    type Output = Kilonewtons;
    fn mul(self, rhs: SqM) -> Kilonewtons {
        Kilonewtons(self.0 * rhs.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Grams);
impl_arithmetic!(CubicCm);
impl_arithmetic!(GramsPerCm3);
impl_arithmetic!(KnPerM3);
impl_arithmetic!(Kilonewtons);
impl_arithmetic!(Kilopascals);
impl_arithmetic!(SqM);

/// Dry unit weight from moist unit weight and moisture content (%):
/// γd = γ / (1 + w/100)
pub fn dry_unit_weight(wet: KnPerM3, moisture_pct: f64) -> KnPerM3 {
    wet / (1.0 + moisture_pct / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_from_mass_and_volume() {
        let rho = Grams(2000.0) / CubicCm(1000.0);
        assert_eq!(rho, GramsPerCm3(2.0));
    }

    #[test]
    fn test_unit_weight_scaling() {
        let gamma = GramsPerCm3(1.8).to_unit_weight(KnPerM3(9.81));
        assert!((gamma.0 - 17.658).abs() < 1e-9);
    }

    #[test]
    fn test_dry_unit_weight() {
        let dry = dry_unit_weight(KnPerM3(22.0), 10.0);
        assert!((dry.0 - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_stress_times_area() {
        let force = Kilopascals(100.0) * SqM(2.5);
        assert_eq!(force, Kilonewtons(250.0));
    }

    #[test]
    fn test_arithmetic() {
        let a = Grams(10.0);
        let b = Grams(4.0);
        assert_eq!((a + b).0, 14.0);
        assert_eq!((a - b).0, 6.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let gamma = KnPerM3(18.25);
        let json = serde_json::to_string(&gamma).unwrap();
        assert_eq!(json, "18.25");

        let roundtrip: KnPerM3 = serde_json::from_str(&json).unwrap();
        assert_eq!(gamma, roundtrip);
    }
}
