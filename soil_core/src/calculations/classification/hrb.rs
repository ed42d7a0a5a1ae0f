//! HRB / AASHTO M 145 classification with group index.
//!
//! Groups are tested left to right in the order of the AASHTO table; the
//! first group whose limits are met is the classification, never the
//! "best" one.

use serde::{Deserialize, Serialize};

use super::{first_match, resolve, Missing, Rule, SoilFacts};
use crate::errors::CalcError;
use crate::numeric::EPSILON;

/// HRB groups and subgroups in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HrbGroup {
    #[serde(rename = "A-1-a")]
    A1a,
    #[serde(rename = "A-1-b")]
    A1b,
    #[serde(rename = "A-3")]
    A3,
    #[serde(rename = "A-2-4")]
    A24,
    #[serde(rename = "A-2-5")]
    A25,
    #[serde(rename = "A-2-6")]
    A26,
    #[serde(rename = "A-2-7")]
    A27,
    #[serde(rename = "A-4")]
    A4,
    #[serde(rename = "A-5")]
    A5,
    #[serde(rename = "A-6")]
    A6,
    #[serde(rename = "A-7-5")]
    A75,
    #[serde(rename = "A-7-6")]
    A76,
}

impl HrbGroup {
    /// Subgroup designation (e.g. "A-2-6")
    pub fn code(&self) -> &'static str {
        match self {
            HrbGroup::A1a => "A-1-a",
            HrbGroup::A1b => "A-1-b",
            HrbGroup::A3 => "A-3",
            HrbGroup::A24 => "A-2-4",
            HrbGroup::A25 => "A-2-5",
            HrbGroup::A26 => "A-2-6",
            HrbGroup::A27 => "A-2-7",
            HrbGroup::A4 => "A-4",
            HrbGroup::A5 => "A-5",
            HrbGroup::A6 => "A-6",
            HrbGroup::A75 => "A-7-5",
            HrbGroup::A76 => "A-7-6",
        }
    }

    /// Main group (e.g. "A-2")
    pub fn group(&self) -> &'static str {
        match self {
            HrbGroup::A1a | HrbGroup::A1b => "A-1",
            HrbGroup::A3 => "A-3",
            HrbGroup::A24 | HrbGroup::A25 | HrbGroup::A26 | HrbGroup::A27 => "A-2",
            HrbGroup::A4 => "A-4",
            HrbGroup::A5 => "A-5",
            HrbGroup::A6 => "A-6",
            HrbGroup::A75 | HrbGroup::A76 => "A-7",
        }
    }

    /// Granular materials: 35% or less passing #200
    pub fn is_granular(&self) -> bool {
        matches!(
            self,
            HrbGroup::A1a | HrbGroup::A1b | HrbGroup::A3 | HrbGroup::A24 | HrbGroup::A25 | HrbGroup::A26 | HrbGroup::A27
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            HrbGroup::A1a | HrbGroup::A1b => "Stone fragments, gravel and sand",
            HrbGroup::A3 => "Fine sand",
            HrbGroup::A24 | HrbGroup::A25 => "Silty gravel and sand",
            HrbGroup::A26 | HrbGroup::A27 => "Clayey gravel and sand",
            HrbGroup::A4 | HrbGroup::A5 => "Silty soils",
            HrbGroup::A6 | HrbGroup::A75 | HrbGroup::A76 => "Clayey soils",
        }
    }

    /// General rating as subgrade
    pub fn subgrade_rating(&self) -> &'static str {
        if self.is_granular() {
            "Excellent to good"
        } else {
            "Fair to poor"
        }
    }
}

/// HRB classification with its group index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HrbClassification {
    pub group: HrbGroup,
    pub group_index: u32,
}

impl HrbClassification {
    /// Designation with the group index in parentheses, e.g. "A-7-6 (12)".
    /// A zero index is left off.
    pub fn designation(&self) -> String {
        if self.group_index > 0 {
            format!("{} ({})", self.group.code(), self.group_index)
        } else {
            self.group.code().to_string()
        }
    }
}

fn granular(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.fines()? <= 35.0)
}

fn silt_clay(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.fines()? > 35.0)
}

fn low_ll(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.ll()? <= 40.0)
}

fn low_pi(f: &SoilFacts) -> Result<bool, Missing> {
    Ok(f.pi()? <= 10.0)
}

/// AASHTO M 145 table, left to right.
///
/// Each row tests fines first, so a silt-clay soil never needs the #10 and
/// #40 values the A-1 and A-3 rows read.
pub static HRB_RULES: &[Rule<HrbGroup>] = &[
    Rule { code: HrbGroup::A1a, test: |f| Ok(f.fines()? <= 15.0 && f.p10()? <= 50.0 && f.p40()? <= 30.0 && f.pi()? <= 6.0) },
    Rule { code: HrbGroup::A1b, test: |f| Ok(f.fines()? <= 25.0 && f.p40()? <= 50.0 && f.pi()? <= 6.0) },
    Rule { code: HrbGroup::A3, test: |f| Ok(f.fines()? <= 10.0 && f.p40()? > 50.0 && f.pi()? <= EPSILON) },
    Rule { code: HrbGroup::A24, test: |f| Ok(granular(f)? && low_ll(f)? && low_pi(f)?) },
    Rule { code: HrbGroup::A25, test: |f| Ok(granular(f)? && !low_ll(f)? && low_pi(f)?) },
    Rule { code: HrbGroup::A26, test: |f| Ok(granular(f)? && low_ll(f)? && !low_pi(f)?) },
    Rule { code: HrbGroup::A27, test: |f| Ok(granular(f)? && !low_ll(f)? && !low_pi(f)?) },
    Rule { code: HrbGroup::A4, test: |f| Ok(silt_clay(f)? && low_ll(f)? && low_pi(f)?) },
    Rule { code: HrbGroup::A5, test: |f| Ok(silt_clay(f)? && !low_ll(f)? && low_pi(f)?) },
    Rule { code: HrbGroup::A6, test: |f| Ok(silt_clay(f)? && low_ll(f)? && !low_pi(f)?) },
    Rule { code: HrbGroup::A75, test: |f| Ok(silt_clay(f)? && !low_ll(f)? && !low_pi(f)? && f.pi()? <= f.ll()? - 30.0) },
    Rule { code: HrbGroup::A76, test: |f| Ok(silt_clay(f)? && !low_ll(f)? && !low_pi(f)?) },
];

/// Group index per AASHTO M 145:
/// GI = (F − 35)[0.2 + 0.005(LL − 40)] + 0.01(F − 15)(PI − 10)
///
/// Zero for A-1, A-3, A-2-4 and A-2-5; only the PI term for A-2-6 and
/// A-2-7. Negative values are reported as zero and the result is rounded to
/// the nearest whole number.
pub fn group_index(group: HrbGroup, fines: f64, liquid_limit: f64, plasticity_index: f64) -> u32 {
    let pi_term = 0.01 * (fines - 15.0) * (plasticity_index - 10.0);
    let gi = match group {
        HrbGroup::A1a | HrbGroup::A1b | HrbGroup::A3 | HrbGroup::A24 | HrbGroup::A25 => 0.0,
        HrbGroup::A26 | HrbGroup::A27 => pi_term,
        _ => (fines - 35.0) * (0.2 + 0.005 * (liquid_limit - 40.0)) + pi_term,
    };
    if gi.is_finite() && gi > 0.0 {
        gi.round() as u32
    } else {
        0
    }
}

/// Classify by HRB and compute the group index.
pub fn classify_hrb(facts: &SoilFacts) -> Result<HrbClassification, CalcError> {
    let group = resolve("HRB", first_match(HRB_RULES, facts))?;

    let needs_limits = !matches!(group, HrbGroup::A1a | HrbGroup::A1b | HrbGroup::A3 | HrbGroup::A24 | HrbGroup::A25);
    let gi = if needs_limits {
        let fines = facts.fines().map_err(missing_for_gi)?;
        let ll = facts.ll().map_err(missing_for_gi)?;
        let pi = facts.pi().map_err(missing_for_gi)?;
        group_index(group, fines, ll, pi)
    } else {
        0
    };

    Ok(HrbClassification { group, group_index: gi })
}

fn missing_for_gi(missing: Missing) -> CalcError {
    CalcError::incomplete_data("HRB", [missing.0], "Group index needs fines, LL and PI")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::classification::ClassificationInput;

    fn facts(p10: f64, p40: f64, p200: f64, ll: Option<f64>, pl: Option<f64>) -> SoilFacts {
        SoilFacts::from_input(&ClassificationInput {
            passing_no10: Some(p10),
            passing_no40: Some(p40),
            passing_no200: Some(p200),
            liquid_limit: ll,
            plastic_limit: pl,
            ..Default::default()
        })
    }

    fn np(p10: f64, p40: f64, p200: f64) -> SoilFacts {
        SoilFacts::from_input(&ClassificationInput {
            passing_no10: Some(p10),
            passing_no40: Some(p40),
            passing_no200: Some(p200),
            non_plastic: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_granular_groups() {
        assert_eq!(classify_hrb(&np(40.0, 20.0, 10.0)).unwrap().group, HrbGroup::A1a);
        assert_eq!(classify_hrb(&np(80.0, 45.0, 20.0)).unwrap().group, HrbGroup::A1b);
        assert_eq!(classify_hrb(&np(100.0, 90.0, 5.0)).unwrap().group, HrbGroup::A3);
        let a24 = classify_hrb(&np(100.0, 90.0, 30.0)).unwrap();
        assert_eq!(a24.group, HrbGroup::A24);
        assert_eq!(a24.designation(), "A-2-4");
    }

    #[test]
    fn test_a2_subgroups_by_limits() {
        let f = facts(90.0, 60.0, 30.0, Some(45.0), Some(40.0));
        assert_eq!(classify_hrb(&f).unwrap().group, HrbGroup::A25);
        let f = facts(90.0, 60.0, 30.0, Some(35.0), Some(20.0));
        let hrb = classify_hrb(&f).unwrap();
        assert_eq!(hrb.group, HrbGroup::A26);
        // PI term only: 0.01 · 15 · 5 = 0.75 -> 1
        assert_eq!(hrb.group_index, 1);
    }

    #[test]
    fn test_a7_split() {
        // LL 60, PI 25 <= LL - 30 -> A-7-5
        let f = facts(100.0, 95.0, 80.0, Some(60.0), Some(35.0));
        assert_eq!(classify_hrb(&f).unwrap().group, HrbGroup::A75);
        // LL 55, PI 30 > LL - 30 -> A-7-6
        let f = facts(100.0, 95.0, 85.0, Some(55.0), Some(25.0));
        let hrb = classify_hrb(&f).unwrap();
        assert_eq!(hrb.group, HrbGroup::A76);
        // (85-35)(0.2+0.075) + 0.01·70·20 = 13.75 + 14 = 27.75 -> 28
        assert_eq!(hrb.group_index, 28);
        assert_eq!(hrb.designation(), "A-7-6 (28)");
        assert_eq!(hrb.group.subgrade_rating(), "Fair to poor");
    }

    #[test]
    fn test_group_index_never_negative() {
        assert_eq!(group_index(HrbGroup::A4, 36.0, 20.0, 2.0), 0);
        assert_eq!(group_index(HrbGroup::A1a, 10.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_fine_soil_needs_no_coarse_sieves() {
        // F = 80, LL 30, PI 10: A-4 from fines and limits alone
        let f = SoilFacts::from_input(&ClassificationInput {
            passing_no4: Some(100.0),
            passing_no200: Some(80.0),
            liquid_limit: Some(30.0),
            plastic_limit: Some(20.0),
            ..Default::default()
        });
        let hrb = classify_hrb(&f).unwrap();
        assert_eq!(hrb.group, HrbGroup::A4);
        // (80-35)(0.2-0.05) + 0.01·65·0 = 6.75 -> 7
        assert_eq!(hrb.designation(), "A-4 (7)");
    }

    #[test]
    fn test_missing_sieve_is_incomplete() {
        // Clean enough for A-1-a, so the missing #10 decides the row
        let f = SoilFacts::from_input(&ClassificationInput {
            passing_no200: Some(8.0),
            non_plastic: true,
            ..Default::default()
        });
        let err = classify_hrb(&f).unwrap_err();
        assert!(matches!(err, CalcError::IncompleteData { ref missing, .. } if missing.contains(&"passing_no10".to_string())));
    }

    #[test]
    fn test_a2_without_coarse_sieves() {
        // F = 30 rules out A-1 and A-3 before any sieve is read
        let f = SoilFacts::from_input(&ClassificationInput {
            passing_no200: Some(30.0),
            liquid_limit: Some(35.0),
            plastic_limit: Some(20.0),
            ..Default::default()
        });
        assert_eq!(classify_hrb(&f).unwrap().group, HrbGroup::A26);
    }

    #[test]
    fn test_granular_group_does_not_need_limits() {
        // Clean fine sand, no limits: A-1-a and A-1-b fail on sieves, A-3 needs PI
        let f = facts(100.0, 90.0, 5.0, None, None);
        assert!(classify_hrb(&f).is_err());
        // Coarse gravel fails A-1-a only on PI, so it stays undetermined
        let f = facts(40.0, 20.0, 10.0, None, None);
        assert!(classify_hrb(&f).is_err());
    }

    #[test]
    fn test_group_serializes_as_designation() {
        assert_eq!(serde_json::to_string(&HrbGroup::A76).unwrap(), "\"A-7-6\"");
    }
}
