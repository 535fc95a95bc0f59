//! Code for summarising allocated generation by whether it relies on a heat network.
use super::allocation::ScenarioAllocation;
use crate::region::RegionID;
use crate::scenario::Scenario;
use crate::technology::{NetworkType, TechnologyMap};
use crate::units::{Energy, EnergyPerArea, PopulationDensity};
use indexmap::IndexMap;

/// Allocated generation for each region, split into centralised and decentralised generation
pub type NetworkSplitMap = IndexMap<(RegionID, NetworkType), Energy>;

/// Heat density for each region, split into centralised and decentralised generation
pub type HeatDensityMap = IndexMap<(RegionID, NetworkType), EnergyPerArea>;

/// Sum allocated generation in each region by network type.
///
/// Every region in the scenario gets an entry for both network types, even if nothing was
/// allocated to it.
///
/// # Arguments
///
/// * `scenario` - The scenario which was allocated
/// * `allocation` - The allocation for the scenario
/// * `technologies` - All technologies
/// * `threshold` - Technologies with a requirement of at least this value are centralised
pub fn split_by_network(
    scenario: &Scenario,
    allocation: &ScenarioAllocation,
    technologies: &TechnologyMap,
    threshold: PopulationDensity,
) -> NetworkSplitMap {
    let mut map: NetworkSplitMap = scenario
        .iter_region_ids()
        .flat_map(|region_id| {
            [NetworkType::Centralised, NetworkType::Decentralised]
                .map(|network_type| ((region_id.clone(), network_type), Energy(0.0)))
        })
        .collect();

    for (technology_id, region_id, value) in allocation.iter() {
        let network_type = technologies[technology_id].network_type(threshold);
        *map.entry((region_id.clone(), network_type))
            .or_insert(Energy(0.0)) += value;
    }

    map
}

/// Divide generation by region area.
///
/// Regions without an area, or with an area of zero, are left out.
pub fn calculate_heat_density(scenario: &Scenario, split: &NetworkSplitMap) -> HeatDensityMap {
    split
        .iter()
        .filter_map(|((region_id, network_type), value)| {
            let area = scenario.regions.get(region_id)?.area?;
            (area.value() > 0.0).then(|| ((region_id.clone(), *network_type), *value / area))
        })
        .collect()
}
