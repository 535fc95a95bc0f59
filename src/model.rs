//! The model represents the static input data provided by the user.
use crate::downscaling::priority::{RequirementMap, complete_requirements};
use crate::input::generation::GenerationData;
use crate::input::region::ScenarioRegionData;
use crate::scenario::{Scenario, ScenarioID, ScenarioMap};
use crate::technology::{Technology, TechnologyMap};
use crate::units::EnergyUnit;
use anyhow::{Result, ensure};
use log::warn;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
#[derive(Debug)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Name of the model which produced the generation data, copied into output rows
    pub source_model: String,
    /// The unit of all generation values
    pub unit: EnergyUnit,
    /// The unit of region areas, if areas were provided
    pub area_unit: Option<String>,
    /// Technologies, in the order in which they are allocated
    pub technologies: TechnologyMap,
    /// Scenarios with complete input data
    pub scenarios: ScenarioMap,
}

impl Model {
    /// Assemble a model from its input data.
    ///
    /// Scenarios without region data are dropped. Technologies without a requirement get a
    /// requirement of zero.
    pub fn new(
        model_path: PathBuf,
        parameters: ModelParameters,
        generation: GenerationData,
        mut regions: ScenarioRegionData,
        requirements: &RequirementMap,
    ) -> Result<Self> {
        let technologies = complete_requirements(&generation.technology_ids, requirements);

        let mut scenarios = ScenarioMap::new();
        for (id, generation_map) in generation.by_scenario {
            let Some(scenario_regions) = regions.by_scenario.shift_remove(&id) else {
                warn!("Scenario {id} has no usable region data and will be skipped");
                continue;
            };

            scenarios.insert(
                id.clone(),
                Scenario {
                    id,
                    generation: generation_map,
                    regions: scenario_regions,
                },
            );
        }
        ensure!(
            !scenarios.is_empty(),
            "No scenario has a complete set of input data"
        );

        Ok(Self {
            model_path,
            parameters,
            source_model: generation.source_model,
            unit: generation.unit,
            area_unit: regions.area_unit,
            technologies,
            scenarios,
        })
    }

    /// The year being downscaled
    pub fn year(&self) -> u32 {
        self.parameters.year
    }

    /// Iterate over the model's scenarios
    pub fn iter_scenarios(&self) -> indexmap::map::Values<'_, ScenarioID, Scenario> {
        self.scenarios.values()
    }

    /// Iterate over technologies in priority order
    pub fn iter_technologies(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.values()
    }
}
