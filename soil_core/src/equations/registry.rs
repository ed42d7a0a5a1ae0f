//! # Equation Registry
//!
//! Central registry of the equations the engine evaluates. Each equation has
//! metadata including its literature or standard reference, the formula and
//! its variables, so results can say exactly which expression produced them.
//!
//! ## Usage
//!
//! ```rust
//! use soil_core::equations::registry::Equation;
//!
//! let meta = Equation::BoussinesqPoint.metadata();
//! assert_eq!(meta.reference.short_form(), "Boussinesq");
//! println!("Formula: {}", meta.formula_plain);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// References
// ============================================================================

/// Literature or standard an equation comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CodeReference {
    /// Published paper or monograph
    Literature {
        author: &'static str,
        year: u16,
        title: &'static str,
    },
    /// ASTM standard
    Astm { designation: &'static str, year: u16 },
    /// AASHTO standard
    Aashto { designation: &'static str, year: u16 },
    /// ABNT (Brazilian) standard
    Abnt { designation: &'static str, year: u16 },
}

impl CodeReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Literature { author, year, title } => format!("{} ({}). {}", author, year, title),
            CodeReference::Astm { designation, year } => format!("ASTM {}-{:02}", designation, year % 100),
            CodeReference::Aashto { designation, year } => format!("AASHTO {}-{:02}", designation, year % 100),
            CodeReference::Abnt { designation, year } => format!("ABNT {}:{}", designation, year),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            CodeReference::Literature { author, .. } => *author,
            CodeReference::Astm { designation, .. }
            | CodeReference::Aashto { designation, .. }
            | CodeReference::Abnt { designation, .. } => *designation,
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for grouping equations in documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Vertical stress increments in an elastic half-space
    StressIncrement,
    /// Grain-size curve parameters
    GrainSize,
    /// Consistency (Atterberg) limits
    ConsistencyLimits,
    /// Classification indices
    Classification,
    /// Compaction test reduction
    Compaction,
    /// Weight-volume relations
    PhaseRelations,
    /// Stresses under self weight
    GeostaticStress,
    /// Consolidation settlement
    Consolidation,
}

impl EquationCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::StressIncrement => "Stress Increments",
            EquationCategory::GrainSize => "Grain Size",
            EquationCategory::ConsistencyLimits => "Consistency Limits",
            EquationCategory::Classification => "Classification",
            EquationCategory::Compaction => "Compaction",
            EquationCategory::PhaseRelations => "Phase Relations",
            EquationCategory::GeostaticStress => "Geostatic Stresses",
            EquationCategory::Consolidation => "Consolidation",
        }
    }

    pub const ALL: [EquationCategory; 8] = [
        EquationCategory::PhaseRelations,
        EquationCategory::GrainSize,
        EquationCategory::ConsistencyLimits,
        EquationCategory::Classification,
        EquationCategory::Compaction,
        EquationCategory::GeostaticStress,
        EquationCategory::StressIncrement,
        EquationCategory::Consolidation,
    ];
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "P", "z", "q")
    pub symbol: &'static str,
    pub description: &'static str,
    /// Units (e.g., "kN", "m", "kPa")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for an equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    pub reference: CodeReference,
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    pub category: EquationCategory,
    /// Source module where the equation implementation lives
    pub source_module: &'static str,
    /// Function name implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

const BOUSSINESQ: CodeReference = CodeReference::Literature {
    author: "Boussinesq",
    year: 1885,
    title: "Application des potentiels a l'etude de l'equilibre et du mouvement des solides elastiques",
};
const CAROTHERS: CodeReference = CodeReference::Literature {
    author: "Carothers",
    year: 1920,
    title: "Direct determination of stresses",
};
const LOVE: CodeReference = CodeReference::Literature {
    author: "Love",
    year: 1929,
    title: "The stress produced in a semi-infinite solid by pressure on part of the boundary",
};
const NEWMARK: CodeReference = CodeReference::Literature {
    author: "Newmark",
    year: 1935,
    title: "Simplified computation of vertical pressures in elastic foundations",
};
const TERZAGHI: CodeReference = CodeReference::Literature {
    author: "Terzaghi",
    year: 1943,
    title: "Theoretical Soil Mechanics",
};
const LAMBE_WHITMAN: CodeReference = CodeReference::Literature {
    author: "Lambe and Whitman",
    year: 1969,
    title: "Soil Mechanics",
};
const ELASTIC_HALF_SPACE: &str = "Homogeneous, isotropic, linear-elastic half-space";

/// All equations evaluated by soil_core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    // -------------------------------------------------------------------------
    // Stress increments
    // -------------------------------------------------------------------------
    /// Δσv = 3Pz³/(2πR⁵)
    BoussinesqPoint,
    /// Δσv = q/π(Δα + sinΔα cosΣα)
    CarothersStrip,
    /// Δσv = q[1 − (1/(1+(R/z)²))^1.5]
    LoveCircularAxis,
    /// Boussinesq kernel integrated over the disk
    LoveCircularIntegrated,
    /// Digitized Love chart
    LoveCircularChart,
    /// Four-corner superposition of the Newmark corner formula
    NewmarkRectangle,
    /// Four-corner superposition read off the Newmark chart
    NewmarkRectangleChart,

    // -------------------------------------------------------------------------
    // Grain size
    // -------------------------------------------------------------------------
    /// Log-linear interpolation of a characteristic diameter
    CharacteristicDiameter,
    /// Cu = D60/D10
    UniformityCoefficient,
    /// Cc = D30²/(D10·D60)
    CurvatureCoefficient,

    // -------------------------------------------------------------------------
    // Consistency limits
    // -------------------------------------------------------------------------
    /// LL from the flow curve at 25 blows
    LiquidLimitFlowCurve,
    /// PI = LL − PL
    PlasticityIndex,
    /// IC = (LL − w)/PI
    ConsistencyIndex,

    // -------------------------------------------------------------------------
    // Classification
    // -------------------------------------------------------------------------
    /// PI = 0.73(LL − 20)
    CasagrandeALine,
    /// GI = (F−35)[0.2+0.005(LL−40)] + 0.01(F−15)(PI−10)
    GroupIndex,

    // -------------------------------------------------------------------------
    // Compaction
    // -------------------------------------------------------------------------
    /// γd = γ/(1 + w)
    DryUnitWeight,
    /// γd = Gs·γw/(1 + Gs·w)
    ZeroAirVoids,

    // -------------------------------------------------------------------------
    // Phase relations
    // -------------------------------------------------------------------------
    /// S·e = w·Gs
    SaturationRelation,
    /// e = Gs·γw/γd − 1
    VoidRatioFromDryUnitWeight,
    /// γsat = γw(Gs + e)/(1 + e)
    SaturatedUnitWeight,
    /// Dr = (emax − e)/(emax − emin)
    RelativeDensity,

    // -------------------------------------------------------------------------
    // Geostatic stresses
    // -------------------------------------------------------------------------
    /// σ' = σ − u
    EffectiveStress,
    /// σ'h = K0·σ'v
    AtRestHorizontalStress,

    // -------------------------------------------------------------------------
    // Consolidation
    // -------------------------------------------------------------------------
    /// ρ = H0/(1 + e0)·[Cr log(σ'p/σ'v0) + Cc log(σ'f/σ'p)]
    PrimaryConsolidationSettlement,
}

/// Every registered equation, grouped by category order
pub static ALL_EQUATIONS: &[Equation] = &[
    Equation::SaturationRelation,
    Equation::VoidRatioFromDryUnitWeight,
    Equation::SaturatedUnitWeight,
    Equation::RelativeDensity,
    Equation::CharacteristicDiameter,
    Equation::UniformityCoefficient,
    Equation::CurvatureCoefficient,
    Equation::LiquidLimitFlowCurve,
    Equation::PlasticityIndex,
    Equation::ConsistencyIndex,
    Equation::CasagrandeALine,
    Equation::GroupIndex,
    Equation::DryUnitWeight,
    Equation::ZeroAirVoids,
    Equation::BoussinesqPoint,
    Equation::CarothersStrip,
    Equation::LoveCircularAxis,
    Equation::LoveCircularIntegrated,
    Equation::LoveCircularChart,
    Equation::NewmarkRectangle,
    Equation::NewmarkRectangleChart,
    Equation::EffectiveStress,
    Equation::AtRestHorizontalStress,
    Equation::PrimaryConsolidationSettlement,
];

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::BoussinesqPoint => EquationMetadata {
                name: "Boussinesq (Point)",
                description: "Vertical stress increment below a concentrated surface load",
                formula_plain: "dsv = 3 P z^3 / (2 pi R^5), R = sqrt(r^2 + z^2)",
                reference: BOUSSINESQ,
                variables: vec![
                    Variable::new("P", "Point load", "kN"),
                    Variable::new("r", "Horizontal distance from the load", "m"),
                    Variable::new("z", "Depth", "m"),
                ],
                assumptions: vec![ELASTIC_HALF_SPACE, "Singular directly under the load at the surface"],
                category: EquationCategory::StressIncrement,
                source_module: "equations/elasticity.rs",
                source_function: "boussinesq_point",
            },
            Equation::CarothersStrip => EquationMetadata {
                name: "Carothers (Strip)",
                description: "Vertical stress increment below a uniformly loaded strip of infinite length",
                formula_plain: "dsv = q/pi (da + sin(da) cos(a1 + a2)), da = a1 - a2",
                reference: CAROTHERS,
                variables: vec![
                    Variable::new("q", "Surface pressure", "kPa"),
                    Variable::new("B", "Strip width", "m"),
                    Variable::new("a1, a2", "Angles from the vertical to the strip edges", "rad"),
                ],
                assumptions: vec![ELASTIC_HALF_SPACE, "Plane strain along the strip"],
                category: EquationCategory::StressIncrement,
                source_module: "equations/elasticity.rs",
                source_function: "carothers_strip",
            },
            Equation::LoveCircularAxis => EquationMetadata {
                name: "Love (Circular)",
                description: "Vertical stress increment on the axis of a uniformly loaded circle",
                formula_plain: "dsv = q [1 - (1 / (1 + (R/z)^2))^1.5]",
                reference: LOVE,
                variables: vec![
                    Variable::new("q", "Surface pressure", "kPa"),
                    Variable::new("R", "Load radius", "m"),
                    Variable::new("z", "Depth", "m"),
                ],
                assumptions: vec![ELASTIC_HALF_SPACE, "Flexible footing"],
                category: EquationCategory::StressIncrement,
                source_module: "equations/elasticity.rs",
                source_function: "love_circular_axis",
            },
            Equation::LoveCircularIntegrated => EquationMetadata {
                name: "Love (Circular, off-axis)",
                description: "Boussinesq kernel integrated in closed form along rays from the point, then over the ray angle by composite Simpson quadrature",
                formula_plain: "dsv = (q / pi) * int_0^pi [g(s1) - g(s2)] dphi, g(s) = z^3 / (s^2 + z^2)^1.5, s1,2 = -r cos phi -/+ sqrt(R^2 - r^2 sin^2 phi)",
                reference: LOVE,
                variables: vec![
                    Variable::new("r", "Horizontal distance from the load centre", "m"),
                    Variable::new("phi", "Ray angle measured from the direction away from the centre", "rad"),
                    Variable::new("s1, s2", "Where the ray enters and leaves the disk, clipped at zero", "m"),
                ],
                assumptions: vec![ELASTIC_HALF_SPACE, "Quadrature resolution grows with R/z"],
                category: EquationCategory::StressIncrement,
                source_module: "equations/elasticity.rs",
                source_function: "love_circular_integrated",
            },
            Equation::LoveCircularChart => EquationMetadata {
                name: "Love (Circular, chart)",
                description: "Influence value read off the digitized Love chart",
                formula_plain: "dsv = q I(z/R, r/R)",
                reference: LOVE,
                variables: vec![Variable::new("I", "Chart influence value", "-")],
                assumptions: vec!["Linear interpolation between curves", "Chart edges beyond its range"],
                category: EquationCategory::StressIncrement,
                source_module: "equations/charts.rs",
                source_function: "love_chart_influence",
            },
            Equation::NewmarkRectangle => EquationMetadata {
                name: "Newmark (Rectangular - Formula)",
                description: "Corner influence factor combined over four sub-rectangles",
                formula_plain: "I = 1/(4 pi) [2mn sqrt(V)(V+1)/((V+m^2n^2)V) + atan2(2mn sqrt(V), V - m^2n^2)], V = m^2+n^2+1",
                reference: NEWMARK,
                variables: vec![
                    Variable::new("m", "Sub-rectangle side a / z", "-"),
                    Variable::new("n", "Sub-rectangle side b / z", "-"),
                    Variable::new("q", "Surface pressure", "kPa"),
                ],
                assumptions: vec![ELASTIC_HALF_SPACE, "Sub-rectangles outside the footprint are subtracted"],
                category: EquationCategory::StressIncrement,
                source_module: "equations/elasticity.rs",
                source_function: "newmark_corner_influence",
            },
            Equation::NewmarkRectangleChart => EquationMetadata {
                name: "Newmark (Rectangular - Chart)",
                description: "Corner influence factor read off the Newmark chart at the nearest tabulated m, n",
                formula_plain: "I = chart(m, n)",
                reference: NEWMARK,
                variables: vec![Variable::new("m, n", "Side / depth ratios", "-")],
                assumptions: vec!["Nearest tabulated value, no interpolation"],
                category: EquationCategory::StressIncrement,
                source_module: "equations/charts.rs",
                source_function: "newmark_chart_influence",
            },
            Equation::CharacteristicDiameter => EquationMetadata {
                name: "Characteristic Diameter",
                description: "Aperture at which a given percentage passes",
                formula_plain: "log D = log D1 + (P - P1)(log D2 - log D1)/(P2 - P1)",
                reference: CodeReference::Astm { designation: "D6913", year: 2017 },
                variables: vec![
                    Variable::new("D", "Diameter at target passing", "mm"),
                    Variable::new("P", "Percent passing", "%"),
                ],
                assumptions: vec!["Linear in log(aperture) between adjacent sieves"],
                category: EquationCategory::GrainSize,
                source_module: "calculations/grain_size.rs",
                source_function: "characteristic_diameter",
            },
            Equation::UniformityCoefficient => EquationMetadata {
                name: "Coefficient of Uniformity",
                description: "Spread of the grain-size curve",
                formula_plain: "Cu = D60 / D10",
                reference: CodeReference::Astm { designation: "D2487", year: 2017 },
                variables: vec![
                    Variable::new("D60", "Diameter at 60% passing", "mm"),
                    Variable::new("D10", "Diameter at 10% passing", "mm"),
                ],
                assumptions: vec![],
                category: EquationCategory::GrainSize,
                source_module: "calculations/grain_size.rs",
                source_function: "grading_coefficients",
            },
            Equation::CurvatureCoefficient => EquationMetadata {
                name: "Coefficient of Curvature",
                description: "Shape of the grain-size curve",
                formula_plain: "Cc = D30^2 / (D10 D60)",
                reference: CodeReference::Astm { designation: "D2487", year: 2017 },
                variables: vec![Variable::new("D30", "Diameter at 30% passing", "mm")],
                assumptions: vec![],
                category: EquationCategory::GrainSize,
                source_module: "calculations/grain_size.rs",
                source_function: "grading_coefficients",
            },
            Equation::LiquidLimitFlowCurve => EquationMetadata {
                name: "Liquid Limit (Flow Curve)",
                description: "Moisture at 25 blows from a least-squares line of w against log N",
                formula_plain: "w = a + b log10(N), LL = a + b log10(25)",
                reference: CodeReference::Abnt { designation: "NBR 6459", year: 2016 },
                variables: vec![
                    Variable::new("N", "Casagrande blow count", "-"),
                    Variable::new("w", "Moisture content", "%"),
                ],
                assumptions: vec!["At least two trials with distinct blow counts"],
                category: EquationCategory::ConsistencyLimits,
                source_module: "calculations/atterberg.rs",
                source_function: "liquid_limit_from_flow_curve",
            },
            Equation::PlasticityIndex => EquationMetadata {
                name: "Plasticity Index",
                description: "Range of moisture over which the soil is plastic",
                formula_plain: "PI = LL - PL",
                reference: CodeReference::Abnt { designation: "NBR 7180", year: 2016 },
                variables: vec![
                    Variable::new("LL", "Liquid limit", "%"),
                    Variable::new("PL", "Plastic limit", "%"),
                ],
                assumptions: vec!["Clamped at zero"],
                category: EquationCategory::ConsistencyLimits,
                source_module: "calculations/atterberg.rs",
                source_function: "analyze_atterberg",
            },
            Equation::ConsistencyIndex => EquationMetadata {
                name: "Consistency Index",
                description: "Position of the natural moisture inside the plastic range",
                formula_plain: "IC = (LL - w) / PI",
                reference: CodeReference::Abnt { designation: "NBR 7180", year: 2016 },
                variables: vec![Variable::new("w", "Natural moisture content", "%")],
                assumptions: vec!["Undefined for non-plastic soils"],
                category: EquationCategory::ConsistencyLimits,
                source_module: "calculations/atterberg.rs",
                source_function: "analyze_atterberg",
            },
            Equation::CasagrandeALine => EquationMetadata {
                name: "Casagrande A-Line",
                description: "Boundary between clays and silts on the plasticity chart",
                formula_plain: "PI = 0.73 (LL - 20)",
                reference: CodeReference::Astm { designation: "D2487", year: 2017 },
                variables: vec![
                    Variable::new("LL", "Liquid limit", "%"),
                    Variable::new("PI", "Plasticity index", "%"),
                ],
                assumptions: vec![],
                category: EquationCategory::Classification,
                source_module: "calculations/classification/uscs.rs",
                source_function: "a_line_pi",
            },
            Equation::GroupIndex => EquationMetadata {
                name: "Group Index",
                description: "Subgrade quality index within an HRB group",
                formula_plain: "GI = (F - 35)(0.2 + 0.005(LL - 40)) + 0.01(F - 15)(PI - 10)",
                reference: CodeReference::Aashto { designation: "M 145", year: 1991 },
                variables: vec![
                    Variable::new("F", "Percent passing #200", "%"),
                    Variable::new("LL", "Liquid limit", "%"),
                    Variable::new("PI", "Plasticity index", "%"),
                ],
                assumptions: vec!["Clamped at zero and rounded", "PI term only for A-2-6 and A-2-7"],
                category: EquationCategory::Classification,
                source_module: "calculations/classification/hrb.rs",
                source_function: "group_index",
            },
            Equation::DryUnitWeight => EquationMetadata {
                name: "Dry Unit Weight",
                description: "Unit weight of the solids from the compacted specimen",
                formula_plain: "gd = g / (1 + w/100)",
                reference: CodeReference::Abnt { designation: "NBR 7182", year: 2016 },
                variables: vec![
                    Variable::new("g", "Moist unit weight", "kN/m3"),
                    Variable::new("w", "Moisture content", "%"),
                ],
                assumptions: vec![],
                category: EquationCategory::Compaction,
                source_module: "units.rs",
                source_function: "dry_unit_weight",
            },
            Equation::ZeroAirVoids => EquationMetadata {
                name: "Zero Air Voids",
                description: "Dry unit weight of a saturated specimen at a given moisture",
                formula_plain: "gd = Gs gw / (1 + Gs w)",
                reference: CodeReference::Abnt { designation: "NBR 7182", year: 2016 },
                variables: vec![
                    Variable::new("Gs", "Specific gravity of solids", "-"),
                    Variable::new("gw", "Unit weight of water", "kN/m3"),
                ],
                assumptions: vec!["Degree of saturation 100%"],
                category: EquationCategory::Compaction,
                source_module: "calculations/compaction.rs",
                source_function: "zero_air_voids_curve",
            },
            Equation::SaturationRelation => EquationMetadata {
                name: "Saturation Relation",
                description: "Links saturation, void ratio, moisture and specific gravity",
                formula_plain: "S e = w Gs",
                reference: LAMBE_WHITMAN,
                variables: vec![
                    Variable::new("S", "Degree of saturation", "-"),
                    Variable::new("e", "Void ratio", "-"),
                    Variable::new("w", "Moisture content", "-"),
                    Variable::new("Gs", "Specific gravity of solids", "-"),
                ],
                assumptions: vec!["Solved for whichever of S, w, e is missing"],
                category: EquationCategory::PhaseRelations,
                source_module: "calculations/phase_indices.rs",
                source_function: "analyze_phase_indices",
            },
            Equation::VoidRatioFromDryUnitWeight => EquationMetadata {
                name: "Void Ratio from Dry Unit Weight",
                description: "Void ratio of a specimen of known dry unit weight",
                formula_plain: "e = Gs gw / gd - 1",
                reference: LAMBE_WHITMAN,
                variables: vec![
                    Variable::new("Gs", "Specific gravity of solids", "-"),
                    Variable::new("gw", "Unit weight of water", "kN/m3"),
                    Variable::new("gd", "Dry unit weight", "kN/m3"),
                ],
                assumptions: vec![],
                category: EquationCategory::PhaseRelations,
                source_module: "calculations/phase_indices.rs",
                source_function: "analyze_phase_indices",
            },
            Equation::SaturatedUnitWeight => EquationMetadata {
                name: "Saturated Unit Weight",
                description: "Unit weight with every void filled with water",
                formula_plain: "gsat = gw (Gs + e) / (1 + e),  gsub = gsat - gw",
                reference: LAMBE_WHITMAN,
                variables: vec![
                    Variable::new("Gs", "Specific gravity of solids", "-"),
                    Variable::new("e", "Void ratio", "-"),
                    Variable::new("gw", "Unit weight of water", "kN/m3"),
                ],
                assumptions: vec![],
                category: EquationCategory::PhaseRelations,
                source_module: "calculations/phase_indices.rs",
                source_function: "analyze_phase_indices",
            },
            Equation::RelativeDensity => EquationMetadata {
                name: "Relative Density",
                description: "Position of the void ratio between the loosest and densest states",
                formula_plain: "Dr = (emax - e) / (emax - emin) x 100",
                reference: CodeReference::Astm { designation: "D4254", year: 2016 },
                variables: vec![
                    Variable::new("emax", "Maximum void ratio", "-"),
                    Variable::new("emin", "Minimum void ratio", "-"),
                ],
                assumptions: vec!["Clamped to 0-100 %", "Not reported when e lies outside [emin, emax]"],
                category: EquationCategory::PhaseRelations,
                source_module: "calculations/phase_indices.rs",
                source_function: "analyze_phase_indices",
            },
            Equation::EffectiveStress => EquationMetadata {
                name: "Effective Stress",
                description: "Stress carried by the soil skeleton",
                formula_plain: "s'v = sv - u,  sv = sum(g h)",
                reference: TERZAGHI,
                variables: vec![
                    Variable::new("sv", "Total vertical stress", "kPa"),
                    Variable::new("u", "Pore pressure (negative in the capillary fringe)", "kPa"),
                    Variable::new("g", "Natural or saturated unit weight of a layer", "kN/m3"),
                ],
                assumptions: vec!["Hydrostatic pore pressure below the water table", "Clamped at zero"],
                category: EquationCategory::GeostaticStress,
                source_module: "calculations/geostatic.rs",
                source_function: "geostatic_profile",
            },
            Equation::AtRestHorizontalStress => EquationMetadata {
                name: "At-Rest Horizontal Stress",
                description: "Effective horizontal stress with no lateral strain",
                formula_plain: "s'h = K0 s'v",
                reference: TERZAGHI,
                variables: vec![Variable::new("K0", "Coefficient of earth pressure at rest", "-")],
                assumptions: vec![],
                category: EquationCategory::GeostaticStress,
                source_module: "calculations/geostatic.rs",
                source_function: "geostatic_profile",
            },
            Equation::PrimaryConsolidationSettlement => EquationMetadata {
                name: "Primary Consolidation Settlement",
                description: "One-dimensional settlement from the e-log s' compression lines",
                formula_plain: "rho = H0/(1 + e0) [Cr log(s'p/s'v0) + Cc log(s'f/s'p)]",
                reference: TERZAGHI,
                variables: vec![
                    Variable::new("H0", "Layer thickness", "m"),
                    Variable::new("e0", "Initial void ratio", "-"),
                    Variable::new("Cc", "Compression index", "-"),
                    Variable::new("Cr", "Recompression index", "-"),
                    Variable::new("s'p", "Preconsolidation stress", "kPa"),
                ],
                assumptions: vec![
                    "Normally consolidated layers (|OCR - 1| < 0.1) use Cc only",
                    "Underconsolidated layers are computed as normally consolidated",
                ],
                category: EquationCategory::Consolidation,
                source_module: "calculations/settlement.rs",
                source_function: "consolidation_settlement",
            },
        }
    }

    /// All equations of a category, in registry order
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .copied()
            .filter(|eq| eq.metadata().category == category)
            .collect()
    }
}

/// Markdown listing of every registered equation, grouped by category.
pub fn generate_equations_markdown() -> String {
    let mut md = String::from("# Equations\n\n");
    for category in EquationCategory::ALL {
        let equations = Equation::in_category(category);
        if equations.is_empty() {
            continue;
        }
        md.push_str(&format!("## {}\n\n", category.display_name()));
        for eq in equations {
            let meta = eq.metadata();
            md.push_str(&format!("### {}\n\n", meta.name));
            md.push_str(&format!("{}\n\n", meta.description));
            md.push_str(&format!("```text\n{}\n```\n\n", meta.formula_plain));
            for var in &meta.variables {
                md.push_str(&format!("- `{}`: {} ({})\n", var.symbol, var.description, var.units));
            }
            for assumption in &meta.assumptions {
                md.push_str(&format!("- Assumes: {}\n", assumption));
            }
            md.push_str(&format!(
                "\nReference: {}. Implemented in `{}::{}`.\n\n",
                meta.reference.citation(),
                meta.source_module,
                meta.source_function
            ));
        }
    }
    md
}
