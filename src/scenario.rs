//! Scenarios are independent sets of input data which are downscaled separately.
use crate::id::define_id_type;
use crate::region::{Region, RegionID, RegionMap};
use crate::technology::TechnologyID;
use crate::units::{Energy, Population};
use indexmap::IndexMap;

define_id_type! {ScenarioID}

/// A map of [`Scenario`]s, keyed by scenario ID
pub type ScenarioMap = IndexMap<ScenarioID, Scenario>;

/// Aggregate heat generation for each technology at the coarse level
pub type GenerationMap = IndexMap<TechnologyID, Energy>;

/// The input data for a single scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// A unique identifier for the scenario (e.g. "Techno-Friendly")
    pub id: ScenarioID,
    /// Heat generation for each technology
    pub generation: GenerationMap,
    /// The sub-regions which generation will be allocated to
    pub regions: RegionMap,
}

impl Scenario {
    /// Total heat generation across all technologies
    pub fn total_generation(&self) -> Energy {
        self.generation.values().sum()
    }

    /// Total population across all regions
    pub fn total_population(&self) -> Population {
        self.regions.values().map(|region| region.population).sum()
    }

    /// Iterate over the IDs of regions in this scenario
    pub fn iter_region_ids(&self) -> indexmap::map::Keys<'_, RegionID, Region> {
        self.regions.keys()
    }
}
