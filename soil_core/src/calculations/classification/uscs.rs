//! USCS group symbols per ASTM D2487.
//!
//! The table below is walked top-down: highly organic soils, then coarse
//! soils (less than 50% fines) split by gravel/sand prefix and fines band,
//! then fine soils from the plasticity chart.
//!
//! Fines bands for coarse soils:
//!
//! | Fines  | Symbol                         |
//! |--------|--------------------------------|
//! | < 5%   | GW, GP, SW, SP                 |
//! | 5-12%  | GW-GM, GW-GC, GP-GM, GP-GC ... |
//! | > 12%  | GM, GC, GC-GM, SM, SC, SC-SM   |
//!
//! In the dual-symbol band CL-ML fines count as clayey (GW-GC, SP-SC...).

use super::{first_match, resolve, Missing, Rule, SoilFacts};
use crate::errors::CalcError;

/// Plasticity index on the Casagrande A-line: PI = 0.73(LL − 20)
#[inline]
pub fn a_line_pi(liquid_limit: f64) -> f64 {
    0.73 * (liquid_limit - 20.0)
}

/// Plasticity of the fines as read on the plasticity chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinesKind {
    /// Silty: PI < 4 or below the A-line
    Silt,
    /// Clayey: PI ≥ 7 and on or above the A-line
    Clay,
    /// Hatched CL-ML zone
    SiltyClay,
}

/// Locate the fines on the plasticity chart (LL < 50 zone boundaries).
pub fn fines_kind(facts: &SoilFacts) -> Result<FinesKind, Missing> {
    let ll = facts.ll()?;
    let pi = facts.pi()?;
    let above_a_line = pi >= a_line_pi(ll);
    Ok(if pi < 4.0 || !above_a_line {
        FinesKind::Silt
    } else if pi >= 7.0 {
        FinesKind::Clay
    } else {
        FinesKind::SiltyClay
    })
}

fn coarse(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.fines()? < 50.0)
}

fn gravelly(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(coarse(f)? && f.gravel()? > f.sand()?)
}

fn sandy(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(coarse(f)? && f.gravel()? <= f.sand()?)
}

fn clean(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.fines()? < 5.0)
}

fn borderline(f: &SoilFacts) -> Result<bool, Missing> {
    let fines = f.fines()?;
    Ok((5.0..=12.0).contains(&fines))
}

fn dirty(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.fines()? > 12.0)
}

fn well_graded(f: &SoilFacts, min_cu: f64) -> Result<bool, Missing> {
    Ok(f.cu()? >= min_cu && (1.0..=3.0).contains(&f.cc()?))
}

fn well_graded_gravel(f: &SoilFacts) -> Result<bool, Missing> {
    well_graded(f, 4.0)
}

fn well_graded_sand(f: &SoilFacts) -> Result<bool, Missing> {
    well_graded(f, 6.0)
}

fn silty_fines(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(fines_kind(f)? == FinesKind::Silt)
}

fn clayey_fines(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(fines_kind(f)? == FinesKind::Clay)
}

fn fine(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.fines()? >= 50.0)
}

fn low_ll(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.ll()? < 50.0)
}

fn on_or_above_a_line(f: &SoilFacts) -> Result<bool, Missing> {
    let ll = f.ll()?;
    Ok(f.pi()? >= a_line_pi(ll))
}

/// USCS table in ASTM D2487 order
pub static USCS_RULES: &[Rule<&str>] = &[
    Rule { code: "Pt", test: |f| Ok(f.highly_organic()) },
    // Clean gravels and sands
    Rule { code: "GW", test: |f| Ok(gravelly(f)? && clean(f)? && well_graded_gravel(f)?) },
    Rule { code: "GP", test: |f| Ok(gravelly(f)? && clean(f)?) },
    Rule { code: "SW", test: |f| Ok(sandy(f)? && clean(f)? && well_graded_sand(f)?) },
    Rule { code: "SP", test: |f| Ok(sandy(f)? && clean(f)?) },
    // 5-12% fines: dual symbols
    Rule { code: "GW-GM", test: |f| Ok(gravelly(f)? && borderline(f)? && well_graded_gravel(f)? && silty_fines(f)?) },
    Rule { code: "GW-GC", test: |f| Ok(gravelly(f)? && borderline(f)? && well_graded_gravel(f)?) },
    Rule { code: "GP-GM", test: |f| Ok(gravelly(f)? && borderline(f)? && silty_fines(f)?) },
    Rule { code: "GP-GC", test: |f| Ok(gravelly(f)? && borderline(f)?) },
    Rule { code: "SW-SM", test: |f| Ok(sandy(f)? && borderline(f)? && well_graded_sand(f)? && silty_fines(f)?) },
    Rule { code: "SW-SC", test: |f| Ok(sandy(f)? && borderline(f)? && well_graded_sand(f)?) },
    Rule { code: "SP-SM", test: |f| Ok(sandy(f)? && borderline(f)? && silty_fines(f)?) },
    Rule { code: "SP-SC", test: |f| Ok(sandy(f)? && borderline(f)?) },
    // More than 12% fines
    Rule { code: "GM", test: |f| Ok(gravelly(f)? && dirty(f)? && silty_fines(f)?) },
    Rule { code: "GC", test: |f| Ok(gravelly(f)? && dirty(f)? && clayey_fines(f)?) },
    Rule { code: "GC-GM", test: |f| Ok(gravelly(f)? && dirty(f)?) },
    Rule { code: "SM", test: |f| Ok(sandy(f)? && dirty(f)? && silty_fines(f)?) },
    Rule { code: "SC", test: |f| Ok(sandy(f)? && dirty(f)? && clayey_fines(f)?) },
    Rule { code: "SC-SM", test: |f| Ok(sandy(f)? && dirty(f)?) },
    // Fine-grained soils
    Rule { code: "OL", test: |f| Ok(fine(f)? && f.organic() && low_ll(f)?) },
    Rule { code: "OH", test: |f| Ok(fine(f)? && f.organic()) },
    Rule { code: "ML", test: |f| Ok(fine(f)? && low_ll(f)? && silty_fines(f)?) },
    Rule { code: "CL", test: |f| Ok(fine(f)? && low_ll(f)? && clayey_fines(f)?) },
    Rule { code: "CL-ML", test: |f| Ok(fine(f)? && low_ll(f)?) },
    Rule { code: "CH", test: |f| Ok(fine(f)? && on_or_above_a_line(f)?) },
    Rule { code: "MH", test: |f| Ok(fine(f)?) },
];

/// Classify by USCS. Returns the group symbol.
pub fn classify_uscs(facts: &SoilFacts) -> Result<&'static str, CalcError> {
    resolve("USCS", first_match(USCS_RULES, facts))
}

/// Group name for a USCS symbol
pub fn description(code: &str) -> &'static str {
    match code {
        "Pt" => "Peat and other highly organic soils",
        "GW" => "Well-graded gravel, gravel-sand mixtures, little or no fines",
        "GP" => "Poorly graded gravel, gravel-sand mixtures, little or no fines",
        "SW" => "Well-graded sand, gravelly sands, little or no fines",
        "SP" => "Poorly graded sand, gravelly sands, little or no fines",
        "GW-GM" => "Well-graded gravel with silt",
        "GW-GC" => "Well-graded gravel with clay",
        "GP-GM" => "Poorly graded gravel with silt",
        "GP-GC" => "Poorly graded gravel with clay",
        "SW-SM" => "Well-graded sand with silt",
        "SW-SC" => "Well-graded sand with clay",
        "SP-SM" => "Poorly graded sand with silt",
        "SP-SC" => "Poorly graded sand with clay",
        "GM" => "Silty gravel, gravel-sand-silt mixtures",
        "GC" => "Clayey gravel, gravel-sand-clay mixtures",
        "GC-GM" => "Silty clayey gravel",
        "SM" => "Silty sand, sand-silt mixtures",
        "SC" => "Clayey sand, sand-clay mixtures",
        "SC-SM" => "Silty clayey sand",
        "ML" => "Inorganic silt of low plasticity, rock flour, silty fine sand",
        "CL" => "Inorganic clay of low to medium plasticity (lean clay)",
        "CL-ML" => "Silty clay of low plasticity",
        "OL" => "Organic silt and organic silty clay of low plasticity",
        "MH" => "Inorganic elastic silt, micaceous or diatomaceous fine soil",
        "CH" => "Inorganic clay of high plasticity (fat clay)",
        "OH" => "Organic clay of medium to high plasticity, organic silt",
        _ => "Unknown group",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::classification::ClassificationInput;

    fn facts(p4: f64, p200: f64, cu: Option<f64>, cc: Option<f64>, ll: Option<f64>, pl: Option<f64>) -> SoilFacts {
        SoilFacts::from_input(&ClassificationInput {
            passing_no4: Some(p4),
            passing_no200: Some(p200),
            cu,
            cc,
            liquid_limit: ll,
            plastic_limit: pl,
            ..Default::default()
        })
    }

    #[test]
    fn test_a_line() {
        assert!((a_line_pi(50.0) - 21.9).abs() < 1e-12);
        assert_eq!(a_line_pi(20.0), 0.0);
    }

    #[test]
    fn test_clean_well_graded_sand() {
        let f = facts(95.0, 3.0, Some(7.0), Some(1.5), None, None);
        assert_eq!(classify_uscs(&f).unwrap(), "SW");
    }

    #[test]
    fn test_clean_poorly_graded_gravel() {
        // Cu below 4 decides "not well graded" without needing Cc
        let f = facts(30.0, 2.0, Some(2.5), None, None, None);
        assert_eq!(classify_uscs(&f).unwrap(), "GP");
    }

    #[test]
    fn test_clean_soil_without_coefficients_is_incomplete() {
        let f = facts(95.0, 3.0, None, None, None, None);
        let err = classify_uscs(&f).unwrap_err();
        assert!(matches!(err, CalcError::IncompleteData { ref missing, .. } if missing == &vec!["cu".to_string()]));
    }

    #[test]
    fn test_dual_symbol_silt_and_clay() {
        // 8% silty fines in a well-graded sand
        let f = facts(90.0, 8.0, Some(8.0), Some(2.0), Some(30.0), Some(28.0));
        assert_eq!(classify_uscs(&f).unwrap(), "SW-SM");

        // CL-ML fines count as clay in the dual band
        let f = facts(90.0, 8.0, Some(3.0), Some(0.8), Some(25.0), Some(20.0));
        assert_eq!(classify_uscs(&f).unwrap(), "SP-SC");
    }

    #[test]
    fn test_dirty_gravel_fines_kinds() {
        // LL 35, PL 15: PI 20 above A-line (10.95)
        let f = facts(40.0, 20.0, None, None, Some(35.0), Some(15.0));
        assert_eq!(classify_uscs(&f).unwrap(), "GC");
        // LL 45, PL 35: PI 10 below A-line (18.25)
        let f = facts(40.0, 20.0, None, None, Some(45.0), Some(35.0));
        assert_eq!(classify_uscs(&f).unwrap(), "GM");
        // LL 25, PL 20: PI 5 in the hatched zone
        let f = facts(40.0, 20.0, None, None, Some(25.0), Some(20.0));
        assert_eq!(classify_uscs(&f).unwrap(), "GC-GM");
    }

    #[test]
    fn test_fine_soils() {
        assert_eq!(classify_uscs(&facts(100.0, 80.0, None, None, Some(35.0), Some(20.0))).unwrap(), "CL");
        assert_eq!(classify_uscs(&facts(100.0, 80.0, None, None, Some(30.0), Some(28.0))).unwrap(), "ML");
        assert_eq!(classify_uscs(&facts(100.0, 80.0, None, None, Some(22.0), Some(17.0))).unwrap(), "CL-ML");
        assert_eq!(classify_uscs(&facts(100.0, 80.0, None, None, Some(70.0), Some(30.0))).unwrap(), "CH");
        assert_eq!(classify_uscs(&facts(100.0, 80.0, None, None, Some(70.0), Some(50.0))).unwrap(), "MH");
    }

    #[test]
    fn test_organic_and_peat() {
        let mut input = ClassificationInput {
            passing_no4: Some(100.0),
            passing_no200: Some(90.0),
            liquid_limit: Some(40.0),
            plastic_limit: Some(30.0),
            organic: true,
            ..Default::default()
        };
        assert_eq!(classify_uscs(&SoilFacts::from_input(&input)).unwrap(), "OL");
        input.highly_organic = true;
        assert_eq!(classify_uscs(&SoilFacts::from_input(&input)).unwrap(), "Pt");
    }

    #[test]
    fn test_every_code_has_description() {
        for rule in USCS_RULES {
            assert_ne!(description(rule.code), "Unknown group", "{}", rule.code);
        }
    }
}
