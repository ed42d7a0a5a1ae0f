//! # Soil Classification
//!
//! USCS (ASTM D2487) and HRB/AASHTO (M 145) classification from grain-size
//! percentages and consistency limits.
//!
//! Both systems are encoded as ordered rule tables ([`Rule`]): each rule is a
//! code plus a predicate, and the first rule that matches wins, so ties break
//! in the order the standards print their tables. Predicates use three-valued
//! logic. A predicate that needs a value the caller did not supply is
//! *undetermined* rather than false; when an undetermined rule precedes the
//! first match, the path reports [`CalcError::IncompleteData`] naming the
//! missing inputs instead of guessing.
//!
//! [`classify`] never fails. Problems with either path are collected in
//! [`ClassificationResult::errors`] and the other path still runs.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::calculations::classification::{classify, ClassificationInput};
//!
//! let input = ClassificationInput {
//!     passing_no4: Some(100.0),
//!     passing_no10: Some(100.0),
//!     passing_no40: Some(95.0),
//!     passing_no200: Some(85.0),
//!     liquid_limit: Some(55.0),
//!     plastic_limit: Some(25.0),
//!     ..Default::default()
//! };
//!
//! let result = classify(&input);
//! assert_eq!(result.uscs_code.as_deref(), Some("CH"));
//! assert_eq!(result.hrb_subgroup.as_deref(), Some("A-7-6"));
//! ```

pub mod hrb;
pub mod uscs;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;
use crate::numeric::EPSILON;

/// Inputs to both classification systems.
///
/// All percentages are percent passing (0-100). Any of them may be absent;
/// rules that need an absent value are skipped, never guessed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationInput {
    /// Percent passing #4 (4.75 mm)
    #[serde(default)]
    pub passing_no4: Option<f64>,
    /// Percent passing #10 (2.0 mm)
    #[serde(default)]
    pub passing_no10: Option<f64>,
    /// Percent passing #40 (0.42 mm)
    #[serde(default)]
    pub passing_no40: Option<f64>,
    /// Percent passing #200 (0.075 mm)
    #[serde(default)]
    pub passing_no200: Option<f64>,
    /// Coefficient of uniformity
    #[serde(default)]
    pub cu: Option<f64>,
    /// Coefficient of curvature
    #[serde(default)]
    pub cc: Option<f64>,
    /// Liquid limit (%)
    #[serde(default)]
    pub liquid_limit: Option<f64>,
    /// Plastic limit (%)
    #[serde(default)]
    pub plastic_limit: Option<f64>,
    /// Soil reported as non-plastic (LL and PI taken as zero)
    #[serde(default)]
    pub non_plastic: bool,
    /// Organic fines (odour, dark colour, oven-dried LL drop)
    #[serde(default)]
    pub organic: bool,
    /// Peat and other highly organic soils
    #[serde(default)]
    pub highly_organic: bool,
}

impl ClassificationInput {
    /// Validate ranges. Out-of-range values fail both paths.
    pub fn validate(&self) -> Result<(), CalcError> {
        let percentages = [
            ("passing_no4", self.passing_no4),
            ("passing_no10", self.passing_no10),
            ("passing_no40", self.passing_no40),
            ("passing_no200", self.passing_no200),
        ];
        for (field, value) in percentages {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=100.0 + EPSILON).contains(&v) {
                    return Err(CalcError::invalid_input(field, v.to_string(), "Percent passing must be between 0 and 100"));
                }
            }
        }
        if let (Some(p4), Some(p200)) = (self.passing_no4, self.passing_no200) {
            if p200 > p4 + EPSILON {
                return Err(CalcError::invalid_input(
                    "passing_no200",
                    p200.to_string(),
                    "Cannot exceed percent passing #4",
                ));
            }
        }
        let non_negative = [
            ("cu", self.cu),
            ("cc", self.cc),
            ("liquid_limit", self.liquid_limit),
            ("plastic_limit", self.plastic_limit),
        ];
        for (field, value) in non_negative {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CalcError::invalid_input(field, v.to_string(), "Must be a non-negative number"));
                }
            }
        }
        Ok(())
    }

    /// Liquid limit and plasticity index used by the rules.
    ///
    /// Non-plastic soils read as LL = PI = 0. PI needs both limits and is
    /// clamped at zero.
    pub fn effective_limits(&self) -> (Option<f64>, Option<f64>) {
        if self.non_plastic {
            return (Some(0.0), Some(0.0));
        }
        let pi = match (self.liquid_limit, self.plastic_limit) {
            (Some(ll), Some(pl)) => Some((ll - pl).max(0.0)),
            _ => None,
        };
        (self.liquid_limit, pi)
    }
}

/// Result of both classification paths.
///
/// Each path fills its own fields; a path that could not complete leaves them
/// empty and adds an entry to `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// USCS group symbol (e.g. "SW-SM", "CL")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uscs_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uscs_description: Option<String>,

    /// HRB group (e.g. "A-2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrb_group: Option<String>,
    /// HRB subgroup (e.g. "A-2-6"), equal to the group when it has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrb_subgroup: Option<String>,
    /// AASHTO group index, rounded and never negative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_index: Option<u32>,
    /// Full HRB designation with group index (e.g. "A-7-6 (12)")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrb_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrb_description: Option<String>,
    /// Subgrade quality rating ("Excellent to good" / "Fair to poor")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgrade_rating: Option<String>,

    /// Liquid limit the rules used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_limit: Option<f64>,
    /// Plasticity index the rules used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plasticity_index: Option<f64>,

    /// Problems that stopped one or both paths
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CalcError>,
}

impl ClassificationResult {
    /// True when both systems produced a classification
    pub fn is_complete(&self) -> bool {
        self.uscs_code.is_some() && self.hrb_subgroup.is_some()
    }
}

// ============================================================================
// Rule tables
// ============================================================================

/// Name of a value a rule needed but did not have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Missing(pub &'static str);

/// Outcome of a single predicate: matched, not matched, or undetermined
pub type Predicate = fn(&SoilFacts) -> Result<bool, Missing>;

/// One row of a classification table
pub struct Rule<C: 'static> {
    pub code: C,
    pub test: Predicate,
}

/// Result of walking a table top-down
#[derive(Debug, Clone, PartialEq)]
pub enum TableOutcome<C> {
    Matched(C),
    /// An earlier rule could not be decided; lists what it needed
    Undetermined(Vec<&'static str>),
    /// No rule matched and none was undetermined
    Unmatched,
}

/// Walk `rules` in order and return the first match.
///
/// A match that follows an undetermined rule is not trusted, since the
/// undetermined rule might have won with complete data.
pub fn first_match<C: Copy>(rules: &[Rule<C>], facts: &SoilFacts) -> TableOutcome<C> {
    let mut missing: Vec<&'static str> = Vec::new();
    for rule in rules {
        match (rule.test)(facts) {
            Ok(true) if missing.is_empty() => return TableOutcome::Matched(rule.code),
            Ok(true) => return TableOutcome::Undetermined(missing),
            Ok(false) => {}
            Err(Missing(field)) => {
                if !missing.contains(&field) {
                    missing.push(field);
                }
            }
        }
    }
    if missing.is_empty() {
        TableOutcome::Unmatched
    } else {
        TableOutcome::Undetermined(missing)
    }
}

/// Values the predicates read. Accessors fail with [`Missing`] when the
/// value was not supplied.
#[derive(Debug, Clone, Default)]
pub struct SoilFacts {
    p4: Option<f64>,
    p10: Option<f64>,
    p40: Option<f64>,
    p200: Option<f64>,
    cu: Option<f64>,
    cc: Option<f64>,
    ll: Option<f64>,
    pi: Option<f64>,
    organic: bool,
    highly_organic: bool,
}

fn need(value: Option<f64>, field: &'static str) -> Result<f64, Missing> {
    value.ok_or(Missing(field))
}

impl SoilFacts {
    pub fn from_input(input: &ClassificationInput) -> Self {
        let (ll, pi) = input.effective_limits();
        SoilFacts {
            p4: input.passing_no4,
            p10: input.passing_no10,
            p40: input.passing_no40,
            p200: input.passing_no200,
            cu: input.cu,
            cc: input.cc,
            ll,
            pi,
            organic: input.organic,
            highly_organic: input.highly_organic,
        }
    }

    pub fn p10(&self) -> Result<f64, Missing> {
        need(self.p10, "passing_no10")
    }

    pub fn p40(&self) -> Result<f64, Missing> {
        need(self.p40, "passing_no40")
    }

    /// Fines content, percent passing #200
    pub fn fines(&self) -> Result<f64, Missing> {
        need(self.p200, "passing_no200")
    }

    /// Gravel fraction, retained on #4
    pub fn gravel(&self) -> Result<f64, Missing> {
        Ok(100.0 - need(self.p4, "passing_no4")?)
    }

    /// Sand fraction, between #4 and #200
    pub fn sand(&self) -> Result<f64, Missing> {
        Ok(need(self.p4, "passing_no4")? - self.fines()?)
    }

    pub fn cu(&self) -> Result<f64, Missing> {
        need(self.cu, "cu")
    }

    pub fn cc(&self) -> Result<f64, Missing> {
        need(self.cc, "cc")
    }

    pub fn ll(&self) -> Result<f64, Missing> {
        need(self.ll, "liquid_limit")
    }

    pub fn pi(&self) -> Result<f64, Missing> {
        // PI needs both limits; name the plastic limit when LL is present
        match (self.pi, self.ll) {
            (Some(pi), _) => Ok(pi),
            (None, Some(_)) => Err(Missing("plastic_limit")),
            (None, None) => Err(Missing("liquid_limit")),
        }
    }

    pub fn organic(&self) -> bool {
        self.organic
    }

    pub fn highly_organic(&self) -> bool {
        self.highly_organic
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Classify a soil by USCS and HRB/AASHTO.
///
/// Never fails. Each path records its own problem in `errors` and leaves its
/// fields empty; invalid input fails both paths with the same error.
pub fn classify(input: &ClassificationInput) -> ClassificationResult {
    let mut result = ClassificationResult::default();

    if let Err(e) = input.validate() {
        tracing::warn!("classification input rejected: {}", e);
        result.errors.push(e);
        return result;
    }

    let facts = SoilFacts::from_input(input);
    let (ll, pi) = input.effective_limits();
    result.liquid_limit = ll;
    result.plasticity_index = pi;

    match uscs::classify_uscs(&facts) {
        Ok(code) => {
            result.uscs_description = Some(uscs::description(code).to_string());
            result.uscs_code = Some(code.to_string());
        }
        Err(e) => result.errors.push(e),
    }

    match hrb::classify_hrb(&facts) {
        Ok(hrb) => {
            result.hrb_group = Some(hrb.group.group().to_string());
            result.hrb_subgroup = Some(hrb.group.code().to_string());
            result.group_index = Some(hrb.group_index);
            result.hrb_code = Some(hrb.designation());
            result.hrb_description = Some(hrb.group.description().to_string());
            result.subgrade_rating = Some(hrb.group.subgrade_rating().to_string());
        }
        Err(e) => result.errors.push(e),
    }

    tracing::debug!(
        uscs = ?result.uscs_code,
        hrb = ?result.hrb_code,
        errors = result.errors.len(),
        "classification finished"
    );

    result
}

/// Turn a table outcome into a code or the error the path reports.
pub(crate) fn resolve<C: Copy>(method: &str, outcome: TableOutcome<C>) -> Result<C, CalcError> {
    match outcome {
        TableOutcome::Matched(code) => Ok(code),
        TableOutcome::Undetermined(missing) => Err(CalcError::incomplete_data(
            method,
            missing,
            "A rule that precedes the first match needs these values",
        )),
        TableOutcome::Unmatched => Err(CalcError::calculation_failed(
            method,
            "No group of the table matches the supplied data",
        )),
    }
}
