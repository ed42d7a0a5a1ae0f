//! # Project Data Structures
//!
//! The `Project` struct is the root container for a site's laboratory and
//! stress calculations. Projects serialize to `.soil` files as human-readable
//! JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: GlobalSettings (water unit weight, sieve defaults)
//! └── items: HashMap<Uuid, SavedCalculation> (inputs and last outputs)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use soil_core::project::Project;
//!
//! let project = Project::new("Jane Engineer", "25-042", "ACME Corp");
//!
//! // Serialize to JSON (see file_io module for atomic saves)
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("25-042"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::compaction::{CompactionInput, CurveFit};
use crate::calculations::geostatic::GeostaticInput;
use crate::calculations::phase_indices::PhaseIndicesInput;
use crate::calculations::{CalculationItem, CalculationOutput};
use crate::errors::CalcResult;
use crate::sieves::{SieveInfo, SieveSet, SieveStandard};
use crate::units::WATER_UNIT_WEIGHT_KN_M3;

/// Current schema version for .soil files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
///
/// This is the top-level struct that gets serialized to `.soil` files.
/// Items are stored in a flat UUID-keyed map for O(1) lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (version, engineer, job info)
    pub meta: ProjectMetadata,

    /// Project-wide defaults
    #[serde(default)]
    pub settings: GlobalSettings,

    /// All calculations, keyed by UUID
    pub items: HashMap<Uuid, SavedCalculation>,
}

/// A calculation input with the output of its last run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub item: CalculationItem,

    /// Output of the last successful run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<CalculationOutput>,

    /// When the output was computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_at: Option<DateTime<Utc>>,
}

impl SavedCalculation {
    pub fn new(item: CalculationItem) -> Self {
        SavedCalculation {
            item,
            output: None,
            computed_at: None,
        }
    }
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Name of the responsible engineer
    /// * `job_id` - Job/project number (e.g., "25-001")
    /// * `client` - Client name
    ///
    /// # Example
    ///
    /// ```rust
    /// use soil_core::project::Project;
    ///
    /// let project = Project::new("John Doe", "25-001", "Client Corp");
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// ```
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: GlobalSettings::default(),
            items: HashMap::new(),
        }
    }

    /// Add a calculation to the project.
    ///
    /// Returns the UUID assigned to the item.
    ///
    /// # Example
    ///
    /// ```rust
    /// use soil_core::project::Project;
    /// use soil_core::calculations::{AtterbergInput, CalculationItem};
    ///
    /// let mut project = Project::new("Engineer", "25-001", "Client");
    /// let id = project.add_item(CalculationItem::Atterberg(AtterbergInput::default()));
    /// assert!(project.items.contains_key(&id));
    /// ```
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, SavedCalculation::new(item));
        self.touch();
        id
    }

    /// Remove a calculation by UUID.
    ///
    /// Returns the removed calculation if it existed.
    pub fn remove_item(&mut self, id: &Uuid) -> Option<SavedCalculation> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    /// Get a calculation input by UUID.
    pub fn get_item(&self, id: &Uuid) -> Option<&CalculationItem> {
        self.items.get(id).map(|saved| &saved.item)
    }

    /// Get a mutable reference to a calculation input by UUID.
    ///
    /// Marks the project as modified and drops the stale output.
    pub fn get_item_mut(&mut self, id: &Uuid) -> Option<&mut CalculationItem> {
        let saved = self.items.get_mut(id)?;
        self.meta.modified = Utc::now();
        saved.output = None;
        saved.computed_at = None;
        Some(&mut saved.item)
    }

    /// Run a calculation and store its output.
    ///
    /// Returns `None` when no item has this UUID.
    pub fn run_item(&mut self, id: &Uuid) -> Option<CalcResult<&CalculationOutput>> {
        let saved = self.items.get_mut(id)?;
        match saved.item.run() {
            Ok(output) => {
                saved.computed_at = Some(Utc::now());
                self.meta.modified = Utc::now();
                Some(Ok(&*saved.output.insert(output)))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Global project settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Unit weight of water for new compaction tests (kN/m³)
    pub water_unit_weight_kn_m3: f64,

    /// Sieve series used by the laboratory
    pub preferred_sieve_standard: SieveStandard,

    /// Sieve stack offered for new grain-size analyses
    pub default_sieve_set: SieveSet,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            water_unit_weight_kn_m3: WATER_UNIT_WEIGHT_KN_M3,
            preferred_sieve_standard: SieveStandard::Abnt,
            default_sieve_set: SieveSet::default(),
        }
    }
}

impl GlobalSettings {
    /// Sieves of the default stack available in the preferred standard,
    /// coarsest first
    pub fn default_sieves(&self) -> Vec<&'static SieveInfo> {
        self.default_sieve_set
            .sieves()
            .into_iter()
            .filter(|s| s.standard.includes(self.preferred_sieve_standard))
            .collect()
    }

    /// Empty compaction input carrying the project's water unit weight
    pub fn new_compaction_input(&self, label: impl Into<String>) -> CompactionInput {
        CompactionInput {
            label: label.into(),
            water_unit_weight: self.water_unit_weight_kn_m3,
            fit: CurveFit::Auto,
            ..Default::default()
        }
    }

    /// Empty phase-index input carrying the project's water unit weight
    pub fn new_phase_indices_input(&self, label: impl Into<String>) -> PhaseIndicesInput {
        PhaseIndicesInput {
            label: label.into(),
            water_unit_weight_kn_m3: self.water_unit_weight_kn_m3,
            ..Default::default()
        }
    }

    /// Profile without layers carrying the project's water unit weight
    pub fn new_geostatic_input(&self, label: impl Into<String>) -> GeostaticInput {
        GeostaticInput {
            label: label.into(),
            layers: Vec::new(),
            water_table_depth_m: None,
            capillary_rise_m: 0.0,
            water_unit_weight_kn_m3: self.water_unit_weight_kn_m3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::stress::{LoadGeometry, PointOfInterest, StressInput, StressOptions};

    fn stress_item() -> CalculationItem {
        CalculationItem::Stress(StressInput {
            label: "F-1".to_string(),
            geometry: LoadGeometry::Point {
                load_kn: 100.0,
                x: 0.0,
                y: 0.0,
            },
            points: vec![PointOfInterest { x: 0.0, y: 0.0, z: 2.0 }],
            options: StressOptions::default(),
        })
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("John Doe", "25-001", "Acme Corp");
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "25-001");
        assert_eq!(project.meta.client, "Acme Corp");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Jane Engineer", "25-042", "Test Client");
        let id = project.add_item(stress_item());
        let json = serde_json::to_string_pretty(&project).unwrap();

        // Should contain key fields
        assert!(json.contains("Jane Engineer"));
        assert!(json.contains("\"Stress\""));

        // Roundtrip
        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.engineer, "Jane Engineer");
        assert_eq!(roundtrip.get_item(&id), project.get_item(&id));
        assert_eq!(roundtrip.settings, GlobalSettings::default());
    }

    #[test]
    fn test_add_run_remove_item() {
        let mut project = Project::new("Engineer", "25-001", "Client");
        let id = project.add_item(stress_item());
        assert_eq!(project.item_count(), 1);

        let output = project.run_item(&id).unwrap().unwrap();
        assert_eq!(output.calc_type(), "Stress");
        assert!(project.items[&id].output.is_some());

        // Editing drops the stale output
        assert!(project.get_item_mut(&id).is_some());
        assert!(project.items[&id].output.is_none());

        assert!(project.remove_item(&id).is_some());
        assert_eq!(project.item_count(), 0);
        assert!(project.run_item(&id).is_none());
    }

    #[test]
    fn test_default_sieves_follow_standard() {
        let mut settings = GlobalSettings {
            default_sieve_set: SieveSet::Complete,
            ..Default::default()
        };
        let abnt = settings.default_sieves();
        assert!(abnt.iter().all(|s| s.standard != SieveStandard::Astm));

        settings.preferred_sieve_standard = SieveStandard::Astm;
        assert!(settings.default_sieves().len() >= abnt.len());
    }

    #[test]
    fn test_new_compaction_input_uses_settings() {
        let settings = GlobalSettings {
            water_unit_weight_kn_m3: 9.81,
            ..Default::default()
        };
        let input = settings.new_compaction_input("P-1");
        assert_eq!(input.label, "P-1");
        assert_eq!(input.water_unit_weight, 9.81);
        assert_eq!(settings.new_phase_indices_input("T-1").water_unit_weight_kn_m3, 9.81);
        let profile = settings.new_geostatic_input("SPT-1");
        assert_eq!(profile.water_unit_weight_kn_m3, 9.81);
        assert!(profile.layers.is_empty());
    }
}
