//! Code for selecting the regions a technology can be allocated to.
use crate::region::{RegionID, RegionMap};
use crate::units::PopulationDensity;

/// Get the regions whose infrastructure potential meets the given requirement.
///
/// Regions are returned in the order in which they appear in `regions`.
pub fn eligible_regions(
    requirement: PopulationDensity,
    regions: &RegionMap,
) -> impl Iterator<Item = &RegionID> {
    regions
        .values()
        .filter(move |region| region.suitability >= requirement)
        .map(|region| &region.id)
}
