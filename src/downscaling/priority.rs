//! Code for deciding the order in which technologies are allocated.
//!
//! Technologies with the highest infrastructure requirement are allocated first, so that they
//! can claim demand in the regions which meet their stricter requirement before technologies
//! with lower requirements compete for the same demand.
use crate::technology::{Technology, TechnologyID, TechnologyMap};
use crate::units::PopulationDensity;
use indexmap::IndexSet;
use itertools::Itertools;
use log::warn;
use std::collections::HashMap;

/// Infrastructure requirements for technologies, keyed by technology ID
pub type RequirementMap = HashMap<TechnologyID, PopulationDensity>;

/// Create technologies for every ID, ordered by priority.
///
/// Technologies without a requirement are given a requirement of zero.
///
/// # Arguments
///
/// * `technology_ids` - IDs of all technologies with generation data
/// * `requirements` - Requirements for some or all technologies
///
/// # Returns
///
/// A map of technologies in the order in which they should be allocated.
pub fn complete_requirements(
    technology_ids: &IndexSet<TechnologyID>,
    requirements: &RequirementMap,
) -> TechnologyMap {
    for id in requirements
        .keys()
        .filter(|id| !technology_ids.contains(*id))
        .sorted()
    {
        warn!("A requirement was provided for technology {id}, which has no generation data");
    }

    let mut technologies = technology_ids
        .iter()
        .map(|id| {
            let requirement = requirements.get(id).copied().unwrap_or_else(|| {
                warn!("No requirement defined for technology {id}; it will be set to zero");
                PopulationDensity(0.0)
            });

            Technology {
                id: id.clone(),
                requirement,
            }
        })
        .collect_vec();
    sort_by_priority(&mut technologies);

    technologies
        .into_iter()
        .map(|technology| (technology.id.clone(), technology))
        .collect()
}

/// Sort technologies by requirement, highest first.
///
/// Ties are broken by technology ID so the result does not depend on input order.
pub fn sort_by_priority(technologies: &mut [Technology]) {
    technologies.sort_by(|a, b| {
        b.requirement
            .value()
            .total_cmp(&a.requirement.value())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_macro::hash_map;

    fn ids(technologies: &TechnologyMap) -> Vec<&str> {
        technologies.keys().map(|id| &*id.0).collect()
    }

    #[test]
    fn test_complete_requirements() {
        let technology_ids: IndexSet<TechnologyID> =
            ["B".into(), "A".into(), "C".into()].into_iter().collect();
        let requirements: RequirementMap = hash_map! {
            "A".into() => PopulationDensity(200.0),
            "C".into() => PopulationDensity(50.0),
            "unused".into() => PopulationDensity(500.0),
        };

        let technologies = complete_requirements(&technology_ids, &requirements);
        assert_eq!(ids(&technologies), ["A", "C", "B"]);

        // Missing requirement set to zero
        assert_eq!(technologies["B"].requirement, PopulationDensity(0.0));
    }

    #[test]
    fn test_complete_requirements_empty() {
        let technologies = complete_requirements(&IndexSet::new(), &RequirementMap::new());
        assert!(technologies.is_empty());
    }

    #[test]
    fn test_complete_requirements_input_order_irrelevant() {
        let requirements: RequirementMap = hash_map! {
            "A".into() => PopulationDensity(100.0),
            "B".into() => PopulationDensity(100.0),
            "C".into() => PopulationDensity(300.0),
        };

        let forward: IndexSet<TechnologyID> =
            ["A".into(), "B".into(), "C".into()].into_iter().collect();
        let backward: IndexSet<TechnologyID> =
            ["C".into(), "B".into(), "A".into()].into_iter().collect();
        let technologies1 = complete_requirements(&forward, &requirements);
        let technologies2 = complete_requirements(&backward, &requirements);
        assert_eq!(ids(&technologies1), ["C", "A", "B"]);
        assert_eq!(ids(&technologies1), ids(&technologies2));
    }
}
