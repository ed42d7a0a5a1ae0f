//! # Geotechnical Equations
//!
//! Closed-form formulas and digitized charts used by the calculations.
//! Keeping them in one place makes them easy to check against the
//! literature and keeps the calculation modules about data flow only.
//!
//! ## Modules
//!
//! - [`elasticity`] - Boussinesq-family stress increments in an elastic half-space
//! - [`charts`] - Digitized Newmark and Love influence charts
//! - [`registry`] - Equation metadata (formula, variables, reference)
//!
//! ## Sign Conventions
//!
//! - **Depth**: z positive downward from the loaded surface
//! - **Loads**: Positive downward (compressive pressure on the surface)
//! - **Stress increments**: Positive in compression
//!
//! ## References
//!
//! - Poulos & Davis (1974): Elastic Solutions for Soil and Rock Mechanics
//! - Das, B.M.: Principles of Geotechnical Engineering, Chapter 10
//! - ASTM D2487 / AASHTO M 145 for classification indices

pub mod charts;
pub mod elasticity;
pub mod registry;

pub use elasticity::{
    boussinesq_influence,
    boussinesq_point,
    carothers_strip,
    love_circular_axis,
    love_circular_integrated,
    newmark_corner_influence,
    strip_edge_angles,
};

pub use charts::{love_chart_influence, newmark_chart_influence};

pub use registry::{
    CodeReference,
    Equation,
    EquationCategory,
    EquationMetadata,
    Variable,
    ALL_EQUATIONS,
    generate_equations_markdown,
};
