//! Technologies are heat generation sources, each with an infrastructure requirement.
use crate::id::define_id_type;
use crate::units::PopulationDensity;
use derive_more::Display;
use indexmap::IndexMap;

define_id_type! {TechnologyID}

/// A map of [`Technology`]s, keyed by technology ID
pub type TechnologyMap = IndexMap<TechnologyID, Technology>;

/// A heat generation technology or source
#[derive(Debug, Clone, PartialEq)]
pub struct Technology {
    /// A unique identifier for the technology (e.g. "Heat pump")
    pub id: TechnologyID,
    /// The minimum infrastructure potential a region needs to host this technology
    pub requirement: PopulationDensity,
}

/// Whether a technology relies on a heat network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NetworkType {
    /// Technologies supplying a district heating network
    Centralised,
    /// Technologies installed in individual buildings
    Decentralised,
}

impl Technology {
    /// Classify the technology by comparing its requirement with the network threshold
    pub fn network_type(&self, threshold: PopulationDensity) -> NetworkType {
        if self.requirement >= threshold {
            NetworkType::Centralised
        } else {
            NetworkType::Decentralised
        }
    }
}
