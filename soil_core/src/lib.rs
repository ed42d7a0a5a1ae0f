//! # soil_core - Soil Mechanics Calculation Engine
//!
//! `soil_core` reduces laboratory soil tests and computes stresses induced in
//! a soil mass by surface loads. All inputs and outputs are JSON-serializable,
//! so a project file, a command-line tool, or another program can drive the
//! same calculations.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Traceable**: Every formula is listed with its source in [`equations`]
//!
//! ## Quick Start
//!
//! ```rust
//! use soil_core::calculations::stress::{LoadGeometry, PointOfInterest, StressOptions};
//! use soil_core::calculations::stress::compute_stress_increment;
//!
//! let footing = LoadGeometry::Rectangular {
//!     width: 2.0,
//!     length: 2.0,
//!     intensity: 100.0,
//!     center_x: 0.0,
//!     center_y: 0.0,
//! };
//! let point = PointOfInterest { x: 0.0, y: 0.0, z: 1.0 };
//! let result = compute_stress_increment(&point, &footing, &StressOptions::default());
//! assert!(result.delta_sigma_v.unwrap() > 60.0);
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project container, metadata, and settings
//! - [`calculations`] - Phase indices, grain size, Atterberg limits, classification, compaction,
//!   geostatic and induced stresses, consolidation settlement
//! - [`equations`] - Closed-form solutions, influence charts, and their sources
//! - [`sieves`] - Sieve catalogue and standard stacks
//! - [`units`] - Type-safe unit wrappers
//! - [`numeric`] - Interpolation and linear algebra helpers
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod numeric;
pub mod project;
pub mod sieves;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationItem, CalculationOutput};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_item, load_project, save_project};
pub use project::{GlobalSettings, Project, ProjectMetadata, SavedCalculation};
