//! Standard Sieves
//!
//! Catalogue of the sieve series used by ABNT NBR 7181 and ASTM D6913, with
//! lookups by designation and by aperture, plus the sieve sets a laboratory
//! typically stacks for a given soil.
//!
//! The classification sieves used throughout the crate:
//!
//! - #4 = 4.75 mm (gravel / sand boundary)
//! - #10 = 2.00 mm
//! - #40 = 0.42 mm
//! - #200 = 0.075 mm (sand / fines boundary)

use serde::{Deserialize, Serialize};

/// Aperture of the #4 sieve in mm
pub const NO_4_MM: f64 = 4.75;
/// Aperture of the #10 sieve in mm
pub const NO_10_MM: f64 = 2.0;
/// Aperture of the #40 sieve in mm
pub const NO_40_MM: f64 = 0.42;
/// Aperture of the #200 sieve in mm
pub const NO_200_MM: f64 = 0.075;

/// Aperture tolerance used when matching a measured aperture to the catalogue
pub const APERTURE_TOLERANCE_MM: f64 = 0.01;

/// Size class retained on a sieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Gravel,
    CoarseSand,
    MediumSand,
    FineSand,
    Fines,
}

/// Standard that lists the sieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SieveStandard {
    Abnt,
    Astm,
    Both,
}

impl SieveStandard {
    /// True when a sieve listed under `self` belongs to the `preferred` series
    pub fn includes(&self, preferred: SieveStandard) -> bool {
        matches!(
            (self, preferred),
            (SieveStandard::Both, _) | (_, SieveStandard::Both)
        ) || *self == preferred
    }
}

/// One entry of the sieve catalogue
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SieveInfo {
    /// Designation as stamped on the frame (e.g. "#200", "3/8\"")
    pub designation: &'static str,
    /// Nominal aperture in mm
    pub aperture_mm: f64,
    pub size_class: SizeClass,
    pub standard: SieveStandard,
}

const fn sieve(designation: &'static str, aperture_mm: f64, size_class: SizeClass, standard: SieveStandard) -> SieveInfo {
    SieveInfo {
        designation,
        aperture_mm,
        size_class,
        standard,
    }
}

/// All catalogued sieves, coarsest first
pub static STANDARD_SIEVES: &[SieveInfo] = &[
    sieve("3\"", 76.2, SizeClass::Gravel, SieveStandard::Astm),
    sieve("2 1/2\"", 63.5, SizeClass::Gravel, SieveStandard::Astm),
    sieve("2\"", 50.8, SizeClass::Gravel, SieveStandard::Both),
    sieve("1 1/2\"", 38.1, SizeClass::Gravel, SieveStandard::Both),
    sieve("1\"", 25.4, SizeClass::Gravel, SieveStandard::Both),
    sieve("3/4\"", 19.1, SizeClass::Gravel, SieveStandard::Both),
    sieve("1/2\"", 12.7, SizeClass::Gravel, SieveStandard::Astm),
    sieve("3/8\"", 9.52, SizeClass::Gravel, SieveStandard::Both),
    sieve("#4", 4.76, SizeClass::CoarseSand, SieveStandard::Both),
    sieve("#8", 2.38, SizeClass::CoarseSand, SieveStandard::Astm),
    sieve("#10", 2.00, SizeClass::CoarseSand, SieveStandard::Both),
    sieve("#16", 1.19, SizeClass::MediumSand, SieveStandard::Both),
    sieve("#20", 0.84, SizeClass::MediumSand, SieveStandard::Astm),
    sieve("#30", 0.59, SizeClass::MediumSand, SieveStandard::Both),
    sieve("#40", 0.42, SizeClass::MediumSand, SieveStandard::Both),
    sieve("#50", 0.30, SizeClass::MediumSand, SieveStandard::Astm),
    sieve("#60", 0.25, SizeClass::FineSand, SieveStandard::Both),
    sieve("#80", 0.177, SizeClass::FineSand, SieveStandard::Astm),
    sieve("#100", 0.149, SizeClass::FineSand, SieveStandard::Both),
    sieve("#140", 0.105, SizeClass::FineSand, SieveStandard::Astm),
    sieve("#200", 0.075, SizeClass::Fines, SieveStandard::Both),
    sieve("#270", 0.053, SizeClass::Fines, SieveStandard::Astm),
];

/// Look up a sieve by designation. Accepts "#200", "No. 200" and "Nº 200".
pub fn find_by_designation(designation: &str) -> Option<&'static SieveInfo> {
    let normalized = normalize_designation(designation);
    STANDARD_SIEVES.iter().find(|s| s.designation == normalized)
}

/// Look up a sieve by aperture within [`APERTURE_TOLERANCE_MM`].
pub fn find_by_aperture(aperture_mm: f64) -> Option<&'static SieveInfo> {
    STANDARD_SIEVES
        .iter()
        .find(|s| (s.aperture_mm - aperture_mm).abs() < APERTURE_TOLERANCE_MM)
}

/// Sieves of one size class, coarsest first
pub fn by_size_class(size_class: SizeClass) -> impl Iterator<Item = &'static SieveInfo> {
    STANDARD_SIEVES.iter().filter(move |s| s.size_class == size_class)
}

fn normalize_designation(designation: &str) -> String {
    let trimmed = designation.trim();
    for prefix in ["No.", "No", "Nº", "N°", "#"] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return format!("#{}", rest.trim());
        }
    }
    trimmed.replace('½', " 1/2").replace('¾', "3/4")
}

/// Predefined sieve stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SieveSet {
    /// Standard stack for sands
    SandComplete,
    /// Standard stack for gravels
    GravelComplete,
    /// Fine-grained soils with some sand
    FineSoil,
    /// Minimum set for classification
    #[default]
    Basic,
    /// Every common sieve, gravel and sand
    Complete,
}

impl SieveSet {
    pub const ALL: [SieveSet; 5] = [
        SieveSet::SandComplete,
        SieveSet::GravelComplete,
        SieveSet::FineSoil,
        SieveSet::Basic,
        SieveSet::Complete,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SieveSet::SandComplete => "Complete sand analysis",
            SieveSet::GravelComplete => "Complete gravel analysis",
            SieveSet::FineSoil => "Fine soil with sand",
            SieveSet::Basic => "Classification minimum",
            SieveSet::Complete => "Complete analysis",
        }
    }

    pub fn designations(&self) -> &'static [&'static str] {
        match self {
            SieveSet::SandComplete => &["#4", "#10", "#16", "#30", "#40", "#60", "#100", "#200"],
            SieveSet::GravelComplete => &["2\"", "1 1/2\"", "1\"", "3/4\"", "3/8\"", "#4", "#10", "#40", "#200"],
            SieveSet::FineSoil => &["#10", "#40", "#60", "#100", "#200"],
            SieveSet::Basic => &["#4", "#10", "#40", "#200"],
            SieveSet::Complete => &[
                "2\"", "1 1/2\"", "1\"", "3/4\"", "3/8\"", "#4", "#10", "#16", "#30", "#40", "#60", "#100", "#200",
            ],
        }
    }

    /// Catalogue entries of the set, coarsest first
    pub fn sieves(&self) -> Vec<&'static SieveInfo> {
        self.designations()
            .iter()
            .filter_map(|d| find_by_designation(d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_descending() {
        assert!(STANDARD_SIEVES
            .windows(2)
            .all(|w| w[0].aperture_mm > w[1].aperture_mm));
    }

    #[test]
    fn test_find_by_designation_variants() {
        assert_eq!(find_by_designation("#200").unwrap().aperture_mm, 0.075);
        assert_eq!(find_by_designation("No. 40").unwrap().aperture_mm, 0.42);
        assert_eq!(find_by_designation("Nº 10").unwrap().aperture_mm, 2.0);
        assert_eq!(find_by_designation("2½\"").unwrap().aperture_mm, 63.5);
        assert!(find_by_designation("#999").is_none());
    }

    #[test]
    fn test_find_by_aperture_tolerance() {
        assert_eq!(find_by_aperture(0.074).unwrap().designation, "#200");
        assert!(find_by_aperture(0.5).is_none());
    }

    #[test]
    fn test_every_set_resolves() {
        for set in SieveSet::ALL {
            assert_eq!(set.sieves().len(), set.designations().len(), "{:?}", set);
        }
    }

    #[test]
    fn test_standard_filter() {
        let abnt: Vec<_> = STANDARD_SIEVES
            .iter()
            .filter(|s| s.standard.includes(SieveStandard::Abnt))
            .collect();
        assert!(abnt.iter().all(|s| s.standard != SieveStandard::Astm));
        assert_eq!(by_size_class(SizeClass::Fines).count(), 2);
    }
}
