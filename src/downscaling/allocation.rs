//! The sequential allocation of heat generation to regions.
//!
//! Technologies are processed one at a time in priority order. Each technology's generation is
//! shared between the regions which meet its requirement, in proportion to the demand each of
//! those regions has left. The shared demand pool is then depleted, so later technologies only
//! see what earlier ones left behind.
use super::DownscalingError;
use super::demand::DemandPool;
use super::eligibility::eligible_regions;
use crate::region::RegionID;
use crate::scenario::{Scenario, ScenarioID};
use crate::technology::{Technology, TechnologyID};
use crate::units::Energy;
use float_cmp::approx_eq;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, warn};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// Identifies a single allocated quantity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllocationKey {
    /// The scenario
    pub scenario_id: ScenarioID,
    /// The technology whose generation is allocated
    pub technology_id: TechnologyID,
    /// The region receiving the generation
    pub region_id: RegionID,
}

/// Generation allocated to each region, in the order in which it was allocated
pub type AllocationMap = IndexMap<AllocationKey, Energy>;

/// Why some generation could not be allocated
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum ShortfallReason {
    /// No region meets the technology's requirement
    #[string = "no_eligible_region"]
    NoEligibleRegion,
    /// Eligible regions exist, but none of them has any demand left
    #[string = "no_eligible_capacity"]
    NoEligibleCapacity,
}

/// Generation of a technology which could not be allocated to any region
#[derive(Debug, Clone, PartialEq)]
pub struct Shortfall {
    /// The technology whose generation was not allocated
    pub technology_id: TechnologyID,
    /// Why it was not allocated
    pub reason: ShortfallReason,
    /// The amount not allocated
    pub unallocated: Energy,
}

/// The remaining demand of a region after a technology was allocated
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualDemand {
    /// The technology which was just allocated
    pub technology_id: TechnologyID,
    /// The region
    pub region_id: RegionID,
    /// The demand left in the region
    pub demand: Energy,
}

/// The result of allocating every technology in a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioAllocation {
    /// The scenario which was allocated
    pub scenario_id: ScenarioID,
    /// Generation allocated to each technology and region
    pub allocation: AllocationMap,
    /// Generation which could not be allocated
    pub shortfalls: Vec<Shortfall>,
    /// Demand left in each region after each technology step
    pub residual_demand: Vec<ResidualDemand>,
}

impl ScenarioAllocation {
    fn new(scenario_id: ScenarioID) -> Self {
        Self {
            scenario_id,
            allocation: AllocationMap::new(),
            shortfalls: Vec::new(),
            residual_demand: Vec::new(),
        }
    }

    /// Iterate over allocated generation as (technology, region, value) tuples
    pub fn iter(&self) -> impl Iterator<Item = (&TechnologyID, &RegionID, Energy)> {
        self.allocation
            .iter()
            .map(|(key, value)| (&key.technology_id, &key.region_id, *value))
    }

    /// Total generation allocated for a technology
    pub fn total_for_technology(&self, technology_id: &TechnologyID) -> Energy {
        self.iter()
            .filter(|(id, _, _)| *id == technology_id)
            .map(|(_, _, value)| value)
            .sum()
    }

    fn insert(&mut self, technology_id: &TechnologyID, region_id: &RegionID, value: Energy) {
        let key = AllocationKey {
            scenario_id: self.scenario_id.clone(),
            technology_id: technology_id.clone(),
            region_id: region_id.clone(),
        };
        self.allocation.insert(key, value);
    }

    fn add_shortfall(
        &mut self,
        technology_id: &TechnologyID,
        reason: ShortfallReason,
        unallocated: Energy,
    ) {
        warn!(
            "Scenario {}: {} of generation from technology {technology_id} could not be \
            allocated ({})",
            self.scenario_id,
            unallocated.value(),
            match reason {
                ShortfallReason::NoEligibleRegion => "no region meets its requirement",
                ShortfallReason::NoEligibleCapacity => "no eligible region has demand left",
            }
        );

        self.shortfalls.push(Shortfall {
            technology_id: technology_id.clone(),
            reason,
            unallocated,
        });
    }
}

/// Allocate the generation of every technology in a scenario to its regions.
///
/// # Arguments
///
/// * `scenario` - The scenario's generation and region data
/// * `technologies` - Technologies in priority order
///
/// # Returns
///
/// The allocation for the scenario, or an error if demand cannot be distributed between its
/// regions.
pub fn allocate_scenario<'a, I>(
    scenario: &Scenario,
    technologies: I,
) -> Result<ScenarioAllocation, DownscalingError>
where
    I: IntoIterator<Item = &'a Technology>,
{
    let mut pool = DemandPool::from_population(scenario)?;
    let mut result = ScenarioAllocation::new(scenario.id.clone());

    for technology in technologies {
        let Some(generation) = scenario.generation.get(&technology.id).copied() else {
            // No generation for this technology in this scenario
            continue;
        };

        allocate_technology(scenario, technology, generation, &mut pool, &mut result);

        result
            .residual_demand
            .extend(pool.iter().map(|(region_id, demand)| ResidualDemand {
                technology_id: technology.id.clone(),
                region_id: region_id.clone(),
                demand,
            }));
    }

    Ok(result)
}

/// Eligible load, relative to the scenario's total generation, below which regions are treated as
/// having no demand left. Rounding leaves residues of this order in fully depleted regions.
const DEPLETED_LOAD_TOLERANCE: f64 = 1e-12;

/// Allocate the generation of a single technology, depleting the demand pool
fn allocate_technology(
    scenario: &Scenario,
    technology: &Technology,
    generation: Energy,
    pool: &mut DemandPool,
    result: &mut ScenarioAllocation,
) {
    let candidates = eligible_regions(technology.requirement, &scenario.regions)
        .filter_map(|region_id| pool.get(region_id).map(|demand| (region_id, demand)))
        .filter(|(_, demand)| *demand >= Energy(0.0))
        .collect_vec();
    if candidates.is_empty() {
        if generation > Energy(0.0) {
            result.add_shortfall(&technology.id, ShortfallReason::NoEligibleRegion, generation);
        }
        return;
    }

    let load: Energy = candidates.iter().map(|(_, demand)| *demand).sum();
    let tolerance = scenario.total_generation().value() * DEPLETED_LOAD_TOLERANCE;
    if approx_eq!(Energy, load, Energy(0.0), epsilon = tolerance) {
        for (region_id, _) in candidates {
            result.insert(&technology.id, region_id, Energy(0.0));
        }
        if generation > Energy(0.0) {
            result.add_shortfall(&technology.id, ShortfallReason::NoEligibleCapacity, generation);
        }
        return;
    }

    for (region_id, demand) in candidates {
        let share = demand / load;
        let value = share * generation;
        result.insert(&technology.id, region_id, value);

        let excess = pool.deplete(region_id, value);
        if excess > Energy(0.0) {
            debug!(
                "Scenario {}: allocation of technology {} to region {region_id} exceeds its \
                remaining demand by {}",
                scenario.id,
                technology.id,
                excess.value()
            );
        }
    }
}
