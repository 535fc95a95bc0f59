//! Functionality for downscaling scenario-level heat generation to regions.
use crate::model::Model;
use crate::output::DataWriter;
use crate::scenario::ScenarioID;
use anyhow::{Result, ensure};
use log::{error, info};
use std::path::Path;
use thiserror::Error;

pub mod allocation;
pub mod demand;
pub mod eligibility;
pub mod network;
pub mod priority;
use allocation::allocate_scenario;
use network::{calculate_heat_density, split_by_network};

/// Errors which prevent a single scenario from being downscaled
#[derive(Debug, Error, PartialEq)]
pub enum DownscalingError {
    /// The regions of a scenario have no population to distribute demand by
    #[error("Total population of scenario {0} is zero, so demand cannot be distributed")]
    ZeroPopulation(ScenarioID),
}

/// Run the downscaling for every scenario in the model.
///
/// Scenarios which cannot be downscaled are reported and skipped.
///
/// # Arguments
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. residual demand) to file
pub fn run(model: &Model, output_path: &Path, debug_model: bool) -> Result<()> {
    let mut writer = DataWriter::create(output_path, model, debug_model)?;
    let threshold = model.parameters.network_threshold;

    let mut completed = 0;
    for scenario in model.iter_scenarios() {
        info!("Downscaling scenario: {}", scenario.id);

        let allocation = match allocate_scenario(scenario, model.iter_technologies()) {
            Ok(allocation) => allocation,
            Err(err) => {
                error!("Skipping scenario: {err}");
                continue;
            }
        };

        writer.write_allocation(&allocation)?;
        writer.write_shortfalls(&allocation)?;
        writer.write_residual_demand(&allocation)?;

        let split = split_by_network(scenario, &allocation, &model.technologies, threshold);
        writer.write_network_split(&scenario.id, &split)?;
        if model.area_unit.is_some() {
            let density = calculate_heat_density(scenario, &split);
            writer.write_heat_density(&scenario.id, &density)?;
        }

        completed += 1;
    }

    writer.flush()?;
    ensure!(completed > 0, "No scenario could be downscaled");
    info!("Downscaled {completed} of {} scenario(s)", model.scenarios.len());

    Ok(())
}
