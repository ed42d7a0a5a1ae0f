//! # Stress Increments
//!
//! Vertical stress increment Δσv at a point of a homogeneous elastic
//! half-space under a surface load. One closed set of load shapes, each with
//! its classical solution:
//!
//! | Geometry      | Solution                                         |
//! |---------------|--------------------------------------------------|
//! | `Point`       | Boussinesq                                       |
//! | `Strip`       | Carothers (infinite along y)                     |
//! | `Circular`    | Love on the axis, integrated kernel off the axis |
//! | `Rectangular` | Newmark four-corner superposition                |
//!
//! ## Coordinates
//!
//! - x, y horizontal in metres, z depth in metres (positive downward)
//! - Loads in kN, surface pressures in kPa, results in kPa
//!
//! ## Error Reporting
//!
//! [`compute_stress_increment`] never fails. Invalid input fills
//! [`StressResult::error`] and leaves the value empty; a point on a
//! singularity of the solution returns a finite value with
//! [`StressResult::singular`] set.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::calculations::stress::{compute_stress_increment, LoadGeometry, PointOfInterest, StressOptions};
//!
//! let load = LoadGeometry::Point { load_kn: 100.0, x: 0.0, y: 0.0 };
//! let point = PointOfInterest { x: 0.0, y: 0.0, z: 2.0 };
//!
//! let result = compute_stress_increment(&point, &load, &StressOptions::default());
//! assert!((result.delta_sigma_v.unwrap() - 11.94).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::charts::{love_chart_influence, newmark_chart_influence};
use crate::equations::elasticity::{
    boussinesq_point, carothers_strip, love_circular_axis, love_circular_integrated, newmark_corner_influence,
    strip_edge_angles,
};
use crate::equations::Equation;
use crate::errors::{CalcError, CalcResult};
use crate::numeric::EPSILON;
use crate::units::{Kilonewtons, Kilopascals, SqM};

/// Quadrature intervals for the off-axis circular load at R/z ≤ 1
const MIN_INTEGRATION_STEPS: usize = 128;
/// Upper bound on quadrature intervals for shallow points
const MAX_INTEGRATION_STEPS: usize = 1024;
/// Below this z/R a point within one depth of the circle's edge sits on the
/// surface discontinuity (q inside, 0 outside)
const SHALLOW_EDGE_RATIO: f64 = 0.01;

/// Point where the stress increment is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub x: f64,
    pub y: f64,
    /// Depth below the loaded surface (m), must be positive
    pub z: f64,
}

/// Surface load.
///
/// ## JSON Example
///
/// ```json
/// { "type": "Rectangular", "width": 2.0, "length": 3.0, "intensity": 150.0, "center_x": 0.0, "center_y": 0.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadGeometry {
    /// Concentrated load at (x, y)
    Point { load_kn: f64, x: f64, y: f64 },
    /// Strip of width B along y, centred on x = center_x
    Strip {
        width: f64,
        intensity: f64,
        #[serde(default)]
        center_x: f64,
        #[serde(default)]
        center_y: f64,
    },
    /// Uniformly loaded circle
    Circular {
        radius: f64,
        intensity: f64,
        #[serde(default)]
        center_x: f64,
        #[serde(default)]
        center_y: f64,
    },
    /// Uniformly loaded rectangle, width along x and length along y
    Rectangular {
        width: f64,
        length: f64,
        intensity: f64,
        #[serde(default)]
        center_x: f64,
        #[serde(default)]
        center_y: f64,
    },
}

impl LoadGeometry {
    /// Check that every dimension and intensity is positive and finite.
    pub fn validate(&self) -> CalcResult<()> {
        let positive: Vec<(&str, f64)> = match self {
            LoadGeometry::Point { load_kn, .. } => vec![("load_kn", *load_kn)],
            LoadGeometry::Strip { width, intensity, .. } => vec![("width", *width), ("intensity", *intensity)],
            LoadGeometry::Circular { radius, intensity, .. } => vec![("radius", *radius), ("intensity", *intensity)],
            LoadGeometry::Rectangular {
                width,
                length,
                intensity,
                ..
            } => vec![("width", *width), ("length", *length), ("intensity", *intensity)],
        };
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be a positive number"));
            }
        }

        let (cx, cy) = self.position();
        for (field, value) in [("center_x", cx), ("center_y", cy)] {
            if !value.is_finite() {
                return Err(CalcError::invalid_input(field, value.to_string(), "Coordinate must be finite"));
            }
        }
        Ok(())
    }

    /// Load position (centre, or the load itself for a point load)
    pub fn position(&self) -> (f64, f64) {
        match self {
            LoadGeometry::Point { x, y, .. } => (*x, *y),
            LoadGeometry::Strip { center_x, center_y, .. }
            | LoadGeometry::Circular { center_x, center_y, .. }
            | LoadGeometry::Rectangular { center_x, center_y, .. } => (*center_x, *center_y),
        }
    }

    /// Total applied load. A strip reports its load per metre of length.
    pub fn total_load(&self) -> Kilonewtons {
        match self {
            LoadGeometry::Point { load_kn, .. } => Kilonewtons(*load_kn),
            LoadGeometry::Strip { width, intensity, .. } => Kilopascals(*intensity) * SqM(*width),
            LoadGeometry::Circular { radius, intensity, .. } => {
                Kilopascals(*intensity) * SqM(std::f64::consts::PI * radius * radius)
            }
            LoadGeometry::Rectangular {
                width,
                length,
                intensity,
                ..
            } => Kilopascals(*intensity) * SqM(width * length),
        }
    }

    /// Solution family used for this geometry
    pub fn method(&self) -> StressMethod {
        match self {
            LoadGeometry::Point { .. } => StressMethod::Boussinesq,
            LoadGeometry::Strip { .. } => StressMethod::Carothers,
            LoadGeometry::Circular { .. } => StressMethod::Love,
            LoadGeometry::Rectangular { .. } => StressMethod::Newmark,
        }
    }
}

/// Choice between closed forms and digitized charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StressOptions {
    /// Read rectangle influence factors off the Newmark chart
    #[serde(default)]
    pub newmark_chart: bool,
    /// Read circular-load influence off the Love chart
    #[serde(default)]
    pub love_chart: bool,
}

/// Closed-form solution family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressMethod {
    Boussinesq,
    Carothers,
    Love,
    Newmark,
}

impl StressMethod {
    pub fn display_name(&self) -> &'static str {
        match self {
            StressMethod::Boussinesq => "Boussinesq (Point)",
            StressMethod::Carothers => "Carothers (Strip)",
            StressMethod::Love => "Love (Circular)",
            StressMethod::Newmark => "Newmark (Rectangular)",
        }
    }
}

/// One sub-rectangle of the Newmark superposition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadrantDetail {
    /// Side along x (m)
    pub a: f64,
    /// Side along y (m)
    pub b: f64,
    pub m: f64,
    pub n: f64,
    /// Corner influence factor of the sub-rectangle
    pub influence: f64,
    /// Influence with the superposition sign applied
    pub signed_influence: f64,
    /// +1 when added, -1 when subtracted
    pub sign: f64,
}

/// Intermediate values behind a stress increment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StressDetail {
    Point {
        /// Horizontal distance to the load (m)
        r: f64,
        /// Distance to the load, √(r² + z²) (m)
        distance: f64,
    },
    Strip {
        /// Offset from the strip centreline (m)
        x_offset: f64,
        alpha1: f64,
        alpha2: f64,
    },
    Circular {
        /// Horizontal distance to the centre (m)
        r: f64,
        z_over_r: f64,
        r_over_r: f64,
        influence: f64,
        /// Simpson intervals when integrated numerically
        #[serde(default, skip_serializing_if = "Option::is_none")]
        integration_steps: Option<usize>,
    },
    Rectangular {
        quadrants: Vec<QuadrantDetail>,
        influence_sum: f64,
    },
}

/// Stress increment at one point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    /// Vertical stress increment (kPa)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_sigma_v: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<StressMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equation: Option<Equation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<StressDetail>,
    /// The point lies on a singularity; the value is the finite limit used
    #[serde(default)]
    pub singular: bool,
    #[serde(default, alias = "erro", skip_serializing_if = "Option::is_none")]
    pub error: Option<CalcError>,
}

impl StressResult {
    fn failed(method: Option<StressMethod>, error: CalcError) -> Self {
        tracing::warn!("stress increment not computed: {}", error);
        StressResult {
            method,
            error: Some(error),
            ..Default::default()
        }
    }

    fn value(method: StressMethod, equation: Equation, delta_sigma_v: f64, detail: StressDetail) -> Self {
        if !delta_sigma_v.is_finite() {
            return Self::failed(
                Some(method),
                CalcError::numeric_singularity(method.display_name(), "Solution evaluated to a non-finite value"),
            );
        }
        StressResult {
            delta_sigma_v: Some(delta_sigma_v),
            method: Some(method),
            equation: Some(equation),
            detail: Some(detail),
            singular: false,
            error: None,
        }
    }
}

/// Stress increment from one load at one point.
///
/// Dispatches on the load geometry; see the module table. Options select
/// chart readings instead of the closed forms.
pub fn compute_stress_increment(
    point: &PointOfInterest,
    geometry: &LoadGeometry,
    options: &StressOptions,
) -> StressResult {
    let method = geometry.method();

    for (field, value) in [("x", point.x), ("y", point.y), ("z", point.z)] {
        if !value.is_finite() {
            return StressResult::failed(
                Some(method),
                CalcError::invalid_input(field, value.to_string(), "Coordinate must be finite"),
            );
        }
    }
    if point.z <= EPSILON {
        return StressResult::failed(
            Some(method),
            CalcError::invalid_input("z", point.z.to_string(), "Depth must be greater than zero"),
        );
    }
    if let Err(e) = geometry.validate() {
        return StressResult::failed(Some(method), e);
    }

    match *geometry {
        LoadGeometry::Point { load_kn, x, y } => point_load(point, load_kn, x, y),
        LoadGeometry::Strip {
            width,
            intensity,
            center_x,
            ..
        } => strip_load(point, width, intensity, center_x),
        LoadGeometry::Circular {
            radius,
            intensity,
            center_x,
            center_y,
        } => circular_load(point, radius, intensity, center_x, center_y, options),
        LoadGeometry::Rectangular {
            width,
            length,
            intensity,
            center_x,
            center_y,
        } => rectangular_load(point, width, length, intensity, center_x, center_y, options),
    }
}

/// Stress increments at several points from the same load.
pub fn compute_stress_increments(
    points: &[PointOfInterest],
    geometry: &LoadGeometry,
    options: &StressOptions,
) -> Vec<StressResult> {
    points
        .iter()
        .map(|p| compute_stress_increment(p, geometry, options))
        .collect()
}

/// Stress increments down a vertical line at (x, y), one per depth.
pub fn stress_profile(
    x: f64,
    y: f64,
    depths: &[f64],
    geometry: &LoadGeometry,
    options: &StressOptions,
) -> Vec<StressResult> {
    depths
        .iter()
        .map(|&z| compute_stress_increment(&PointOfInterest { x, y, z }, geometry, options))
        .collect()
}

// ============================================================================
// Geometries
// ============================================================================

fn point_load(point: &PointOfInterest, load_kn: f64, x: f64, y: f64) -> StressResult {
    let r = (point.x - x).hypot(point.y - y);
    let r2 = r * r + point.z * point.z;
    let detail = StressDetail::Point { r, distance: r2.sqrt() };

    if r2 <= EPSILON {
        tracing::warn!(r, z = point.z, "point of interest on the point load");
        let mut result = StressResult::value(StressMethod::Boussinesq, Equation::BoussinesqPoint, 0.0, detail);
        result.singular = true;
        result.error = Some(CalcError::numeric_singularity(
            StressMethod::Boussinesq.display_name(),
            "Point coincides with the load; reported as zero",
        ));
        return result;
    }

    StressResult::value(
        StressMethod::Boussinesq,
        Equation::BoussinesqPoint,
        boussinesq_point(load_kn, r, point.z),
        detail,
    )
}

fn strip_load(point: &PointOfInterest, width: f64, intensity: f64, center_x: f64) -> StressResult {
    let x_offset = point.x - center_x;
    let (alpha1, alpha2) = strip_edge_angles(width, x_offset, point.z);
    StressResult::value(
        StressMethod::Carothers,
        Equation::CarothersStrip,
        carothers_strip(intensity, width, x_offset, point.z),
        StressDetail::Strip {
            x_offset,
            alpha1,
            alpha2,
        },
    )
}

/// Simpson intervals for the off-axis circle: more for shallow points
/// relative to the radius.
fn integration_steps(radius: f64, z: f64) -> usize {
    let scale = (radius / z).max(1.0);
    let steps = (MIN_INTEGRATION_STEPS as f64 * scale).ceil() as usize;
    let steps = steps.clamp(MIN_INTEGRATION_STEPS, MAX_INTEGRATION_STEPS);
    steps + steps % 2
}

fn circular_load(
    point: &PointOfInterest,
    radius: f64,
    intensity: f64,
    center_x: f64,
    center_y: f64,
    options: &StressOptions,
) -> StressResult {
    let r = (point.x - center_x).hypot(point.y - center_y);
    let z = point.z;

    let (sigma, equation, steps) = if options.love_chart {
        let influence = love_chart_influence(z / radius, r / radius);
        (intensity * influence, Equation::LoveCircularChart, None)
    } else if r <= EPSILON {
        (love_circular_axis(intensity, radius, z), Equation::LoveCircularAxis, None)
    } else {
        let steps = integration_steps(radius, z);
        tracing::debug!(r, z, steps, "integrating circular load off the axis");
        (
            love_circular_integrated(intensity, radius, r, z, steps),
            Equation::LoveCircularIntegrated,
            Some(steps),
        )
    };

    let mut result = StressResult::value(
        StressMethod::Love,
        equation,
        sigma.max(0.0),
        StressDetail::Circular {
            r,
            z_over_r: z / radius,
            r_over_r: r / radius,
            influence: sigma / intensity,
            integration_steps: steps,
        },
    );

    if result.error.is_none() && z / radius <= SHALLOW_EDGE_RATIO && (r - radius).abs() <= z {
        tracing::warn!(r, z, radius, "point of interest on the edge of the circular load");
        result.singular = true;
        result.error = Some(CalcError::numeric_singularity(
            StressMethod::Love.display_name(),
            "Point lies on the loaded edge near the surface; value is the limit between q and 0",
        ));
    }
    result
}

fn rectangular_load(
    point: &PointOfInterest,
    width: f64,
    length: f64,
    intensity: f64,
    center_x: f64,
    center_y: f64,
    options: &StressOptions,
) -> StressResult {
    let z = point.z;

    // Signed distances from the point to each edge; negative when the point
    // lies beyond that edge
    let right = center_x + width / 2.0 - point.x;
    let left = point.x - (center_x - width / 2.0);
    let front = center_y + length / 2.0 - point.y;
    let back = point.y - (center_y - length / 2.0);

    let corner = |a: f64, b: f64| -> f64 {
        if a <= EPSILON || b <= EPSILON {
            0.0
        } else if options.newmark_chart {
            newmark_chart_influence(a / z, b / z)
        } else {
            newmark_corner_influence(a, b, z)
        }
    };

    let sign_of = |d: f64| if d < -EPSILON { -1.0 } else { 1.0 };

    let mut quadrants = Vec::with_capacity(4);
    for dx in [right, left] {
        for dy in [front, back] {
            let sign = sign_of(dx) * sign_of(dy);
            let (a, b) = (dx.abs(), dy.abs());
            let influence = corner(a, b);
            quadrants.push(QuadrantDetail {
                a,
                b,
                m: a / z,
                n: b / z,
                influence,
                signed_influence: sign * influence,
                sign,
            });
        }
    }

    let influence_sum: f64 = quadrants.iter().map(|q| q.signed_influence).sum();
    tracing::debug!(influence_sum, quadrants = quadrants.len(), "newmark superposition");

    let equation = if options.newmark_chart {
        Equation::NewmarkRectangleChart
    } else {
        Equation::NewmarkRectangle
    };

    StressResult::value(
        StressMethod::Newmark,
        equation,
        (intensity * influence_sum).max(0.0),
        StressDetail::Rectangular {
            quadrants,
            influence_sum,
        },
    )
}

// ============================================================================
// Calculation input
// ============================================================================

/// Stress increments from one load at a set of points.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Footing F-1",
///   "geometry": { "type": "Circular", "radius": 1.5, "intensity": 100.0 },
///   "points": [ { "x": 0.0, "y": 0.0, "z": 2.0 }, { "x": 1.0, "y": 0.0, "z": 2.0 } ],
///   "options": { "love_chart": false }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressInput {
    #[serde(default)]
    pub label: String,
    pub geometry: LoadGeometry,
    pub points: Vec<PointOfInterest>,
    #[serde(default)]
    pub options: StressOptions,
}

/// A point with its stress increment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedPoint {
    pub point: PointOfInterest,
    pub result: StressResult,
}

/// Stress increments for every point of a [`StressInput`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressOutput {
    /// Total applied load (kN, or kN/m for a strip)
    pub total_load_kn: Kilonewtons,
    pub points: Vec<EvaluatedPoint>,
}

/// Evaluate every point of the input.
pub fn calculate(input: &StressInput) -> StressOutput {
    let results = compute_stress_increments(&input.points, &input.geometry, &input.options);
    StressOutput {
        total_load_kn: input.geometry.total_load(),
        points: input
            .points
            .iter()
            .zip(results)
            .map(|(point, result)| EvaluatedPoint { point: *point, result })
            .collect(),
    }
}
