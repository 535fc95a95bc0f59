//! The demand pool: the heat demand in each region which has yet to be met.
use super::DownscalingError;
use crate::region::RegionID;
use crate::scenario::{Scenario, ScenarioID};
use crate::units::{Energy, Population};
use indexmap::IndexMap;

/// Remaining unallocated heat demand for each region in a single scenario.
///
/// The pool is created once per scenario and depleted as each technology is allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandPool {
    scenario_id: ScenarioID,
    demand: IndexMap<RegionID, Energy>,
}

impl DemandPool {
    /// Distribute the scenario's total heat generation across its regions by population.
    ///
    /// Demand is calculated from generation summed across all technologies, so it represents a
    /// region's total heat need rather than its need for any one technology.
    pub fn from_population(scenario: &Scenario) -> Result<Self, DownscalingError> {
        let total_population = scenario.total_population();
        if total_population <= Population(0.0) {
            return Err(DownscalingError::ZeroPopulation(scenario.id.clone()));
        }

        let total_generation = scenario.total_generation();
        let demand = scenario
            .regions
            .values()
            .map(|region| {
                let share = region.population / total_population;
                (region.id.clone(), total_generation * share)
            })
            .collect();

        Ok(Self {
            scenario_id: scenario.id.clone(),
            demand,
        })
    }

    /// The scenario this pool belongs to
    pub fn scenario_id(&self) -> &ScenarioID {
        &self.scenario_id
    }

    /// Remaining demand for the given region, if it is in the pool
    pub fn get(&self, region_id: &RegionID) -> Option<Energy> {
        self.demand.get(region_id).copied()
    }

    /// Total remaining demand across all regions
    pub fn total(&self) -> Energy {
        self.demand.values().sum()
    }

    /// Iterate over remaining demand for each region
    pub fn iter(&self) -> impl Iterator<Item = (&RegionID, Energy)> {
        self.demand.iter().map(|(id, demand)| (id, *demand))
    }

    /// Reduce the demand of a region by `amount`.
    ///
    /// Demand never drops below zero. Any amount beyond the remaining demand is returned.
    ///
    /// # Panics
    ///
    /// If the region is not in the pool.
    pub fn deplete(&mut self, region_id: &RegionID, amount: Energy) -> Energy {
        let demand = self
            .demand
            .get_mut(region_id)
            .unwrap_or_else(|| panic!("Region {region_id} is not in the demand pool"));

        let excess = (amount - *demand).max(Energy(0.0));
        *demand = (*demand - amount).max(Energy(0.0));

        excess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::scenario;
    use crate::units::Population;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_from_population(scenario: Scenario) {
        let pool = DemandPool::from_population(&scenario).unwrap();
        assert_eq!(pool.scenario_id(), &scenario.id);
        assert_approx_eq!(Energy, pool.get(&"X".into()).unwrap(), Energy(105.0));
        assert_approx_eq!(Energy, pool.get(&"Y".into()).unwrap(), Energy(45.0));
        assert_approx_eq!(Energy, pool.total(), scenario.total_generation());
        assert!(pool.get(&"Z".into()).is_none());
    }

    #[rstest]
    fn test_from_population_zero_population(mut scenario: Scenario) {
        for region in scenario.regions.values_mut() {
            region.population = Population(0.0);
        }

        assert_eq!(
            DemandPool::from_population(&scenario).unwrap_err(),
            DownscalingError::ZeroPopulation(scenario.id.clone())
        );
    }

    #[rstest]
    fn test_from_population_zero_generation(mut scenario: Scenario) {
        for generation in scenario.generation.values_mut() {
            *generation = Energy(0.0);
        }

        let pool = DemandPool::from_population(&scenario).unwrap();
        assert!(pool.iter().all(|(_, demand)| demand == Energy(0.0)));
    }

    #[rstest]
    fn test_deplete(scenario: Scenario) {
        let mut pool = DemandPool::from_population(&scenario).unwrap();
        let region_id = "Y".into();

        assert_eq!(pool.deplete(&region_id, Energy(5.0)), Energy(0.0));
        assert_approx_eq!(Energy, pool.get(&region_id).unwrap(), Energy(40.0));

        // Demand is floored at zero and the excess returned
        assert_approx_eq!(Energy, pool.deplete(&region_id, Energy(50.0)), Energy(10.0));
        assert_eq!(pool.get(&region_id).unwrap(), Energy(0.0));
    }

    #[rstest]
    #[should_panic(expected = "Region Z is not in the demand pool")]
    fn test_deplete_unknown_region(scenario: Scenario) {
        let mut pool = DemandPool::from_population(&scenario).unwrap();
        pool.deplete(&"Z".into(), Energy(1.0));
    }
}
