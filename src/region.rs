//! Regions are the fine-grained spatial units to which heat generation is allocated.
use crate::id::define_id_type;
use crate::units::{Area, Population, PopulationDensity};
use indexmap::IndexMap;

define_id_type! {RegionID}

/// A map of [`Region`]s, keyed by region ID
pub type RegionMap = IndexMap<RegionID, Region>;

/// A sub-region with the data needed to allocate heat generation to it
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// A unique identifier for a region (e.g. "AT127")
    pub id: RegionID,
    /// Number of people living in the region
    pub population: Population,
    /// The heat network infrastructure potential of the region.
    ///
    /// This is derived from population density and is compared against technology requirements.
    pub suitability: PopulationDensity,
    /// Total area of the region, if known
    pub area: Option<Area>,
}
