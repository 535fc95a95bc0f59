//! The module responsible for writing output data to disk.
use crate::downscaling::allocation::{ScenarioAllocation, ShortfallReason};
use crate::downscaling::network::{HeatDensityMap, NetworkSplitMap};
use crate::iamc::IamcRow;
use crate::model::Model;
use crate::region::RegionID;
use crate::scenario::ScenarioID;
use crate::technology::TechnologyID;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "heatscale_results";

/// The output file name for allocated generation
const ALLOCATION_FILE_NAME: &str = "allocation.csv";

/// The output file name for generation split by network type
const NETWORK_SPLIT_FILE_NAME: &str = "network_split.csv";

/// The output file name for heat density
const HEAT_DENSITY_FILE_NAME: &str = "heat_density.csv";

/// The output file name for unallocated generation
const SHORTFALLS_FILE_NAME: &str = "shortfalls.csv";

/// The output file name for residual demand
const RESIDUAL_DEMAND_FILE_NAME: &str = "debug_residual_demand.csv";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model specified at `model_dir`.
///
/// # Arguments
///
/// * `output_dir` - The folder to create
/// * `allow_overwrite` - Whether an existing folder containing files may be reused
///
/// # Returns
///
/// True if existing output files will be overwritten, otherwise false
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            // Already exists, but is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace its \
            contents."
        );
        return Ok(true);
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// Represents a row in the shortfalls CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ShortfallRow {
    scenario: ScenarioID,
    variable: TechnologyID,
    reason: ShortfallReason,
    value: f64,
}

/// Represents a row in the residual demand CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ResidualDemandRow {
    scenario: ScenarioID,
    variable: TechnologyID,
    region: RegionID,
    residual_demand: f64,
}

/// For writing extra debug information about the model
struct DebugDataWriter {
    residual_demand_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        let file_path = output_path.join(RESIDUAL_DEMAND_FILE_NAME);

        Ok(Self {
            residual_demand_writer: csv::Writer::from_path(file_path)?,
        })
    }

    /// Write residual demand after each technology step to file
    fn write_residual_demand(&mut self, allocation: &ScenarioAllocation) -> Result<()> {
        for residual in &allocation.residual_demand {
            let row = ResidualDemandRow {
                scenario: allocation.scenario_id.clone(),
                variable: residual.technology_id.clone(),
                region: residual.region_id.clone(),
                residual_demand: residual.demand.value(),
            };
            self.residual_demand_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    fn flush(&mut self) -> Result<()> {
        self.residual_demand_writer.flush()?;

        Ok(())
    }
}

/// Fields shared by every IAMC row written for a model
struct RowTemplate {
    model: String,
    unit: String,
    density_unit: Option<String>,
    year: u32,
}

impl RowTemplate {
    fn row(
        &self,
        scenario: &ScenarioID,
        region: &RegionID,
        variable: &str,
        value: f64,
    ) -> IamcRow {
        IamcRow {
            model: self.model.clone(),
            scenario: scenario.to_string(),
            region: region.to_string(),
            variable: variable.into(),
            unit: self.unit.clone(),
            year: self.year,
            value,
        }
    }
}

/// An object for writing downscaling results to file
pub struct DataWriter {
    template: RowTemplate,
    allocation_writer: csv::Writer<File>,
    network_split_writer: csv::Writer<File>,
    heat_density_writer: Option<csv::Writer<File>>,
    shortfalls_writer: csv::Writer<File>,
    debug_writer: Option<DebugDataWriter>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// The heat density file is only created if the model has region areas.
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `model` - The model whose results will be written
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, model: &Model, save_debug_info: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let debug_writer = if save_debug_info {
            // Create debug CSV files
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        let heat_density_writer = if model.area_unit.is_some() {
            Some(new_writer(HEAT_DENSITY_FILE_NAME)?)
        } else {
            None
        };

        let unit = model.unit.to_string();
        let template = RowTemplate {
            model: model.source_model.clone(),
            density_unit: model
                .area_unit
                .as_ref()
                .map(|area_unit| format!("{unit}/{area_unit}")),
            unit,
            year: model.year(),
        };

        Ok(Self {
            template,
            allocation_writer: new_writer(ALLOCATION_FILE_NAME)?,
            network_split_writer: new_writer(NETWORK_SPLIT_FILE_NAME)?,
            heat_density_writer,
            shortfalls_writer: new_writer(SHORTFALLS_FILE_NAME)?,
            debug_writer,
        })
    }

    /// Write allocated generation to a CSV file
    pub fn write_allocation(&mut self, allocation: &ScenarioAllocation) -> Result<()> {
        for (technology_id, region_id, value) in allocation.iter() {
            let row = self.template.row(
                &allocation.scenario_id,
                region_id,
                &technology_id.0,
                value.value(),
            );
            self.allocation_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write generation split by network type to a CSV file
    pub fn write_network_split(
        &mut self,
        scenario_id: &ScenarioID,
        split: &NetworkSplitMap,
    ) -> Result<()> {
        for ((region_id, network_type), value) in split {
            let row = self.template.row(
                scenario_id,
                region_id,
                &network_type.to_string(),
                value.value(),
            );
            self.network_split_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write heat density to a CSV file.
    ///
    /// Does nothing if the model has no region areas.
    pub fn write_heat_density(
        &mut self,
        scenario_id: &ScenarioID,
        density: &HeatDensityMap,
    ) -> Result<()> {
        let (Some(wtr), Some(unit)) = (&mut self.heat_density_writer, &self.template.density_unit)
        else {
            return Ok(());
        };

        for ((region_id, network_type), value) in density {
            let mut row = self.template.row(
                scenario_id,
                region_id,
                &network_type.to_string(),
                value.value(),
            );
            row.unit = unit.clone();
            wtr.serialize(row)?;
        }

        Ok(())
    }

    /// Write unallocated generation to a CSV file
    pub fn write_shortfalls(&mut self, allocation: &ScenarioAllocation) -> Result<()> {
        for shortfall in &allocation.shortfalls {
            let row = ShortfallRow {
                scenario: allocation.scenario_id.clone(),
                variable: shortfall.technology_id.clone(),
                reason: shortfall.reason,
                value: shortfall.unallocated.value(),
            };
            self.shortfalls_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write residual demand to a CSV file, if debug output is enabled
    pub fn write_residual_demand(&mut self, allocation: &ScenarioAllocation) -> Result<()> {
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_residual_demand(allocation)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.allocation_writer.flush()?;
        self.network_split_writer.flush()?;
        if let Some(wtr) = &mut self.heat_density_writer {
            wtr.flush()?;
        }
        self.shortfalls_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downscaling::allocation::allocate_scenario;
    use crate::downscaling::network::{calculate_heat_density, split_by_network};
    use crate::fixture::model;
    use crate::units::PopulationDensity;
    use itertools::Itertools;
    use rstest::rstest;
    use tempfile::tempdir;

    fn read_rows<T: for<'de> Deserialize<'de>>(file_path: &Path) -> Vec<T> {
        csv::Reader::from_path(file_path)
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap()
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");

        // New directory
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Existing empty directory
        assert!(!create_output_directory(&output_dir, false).unwrap());

        // Existing directory with files
        fs::write(output_dir.join("file.txt"), "").unwrap();
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
    }

    #[rstest]
    fn test_write_allocation(model: Model) {
        let scenario = model.iter_scenarios().next().unwrap();
        let allocation = allocate_scenario(scenario, model.iter_technologies()).unwrap();
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path(), &model, false).unwrap();
            writer.write_allocation(&allocation).unwrap();
            writer.flush().unwrap();
        }

        let rows: Vec<IamcRow> = read_rows(&dir.path().join(ALLOCATION_FILE_NAME));
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            IamcRow {
                model: "source".into(),
                scenario: "scenario1".into(),
                region: "X".into(),
                variable: "A".into(),
                unit: "TWh".into(),
                year: 2050,
                value: 100.0,
            }
        );
        assert_eq!(
            rows.iter()
                .map(|row| (row.variable.as_str(), row.region.as_str()))
                .collect_vec(),
            [("A", "X"), ("B", "X"), ("B", "Y")]
        );

        // Debug output not requested
        assert!(!dir.path().join(RESIDUAL_DEMAND_FILE_NAME).exists());
    }

    #[rstest]
    fn test_write_network_split_and_heat_density(model: Model) {
        let scenario = model.iter_scenarios().next().unwrap();
        let allocation = allocate_scenario(scenario, model.iter_technologies()).unwrap();
        let split = split_by_network(
            scenario,
            &allocation,
            &model.technologies,
            model.parameters.network_threshold,
        );
        let density = calculate_heat_density(scenario, &split);
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path(), &model, false).unwrap();
            writer.write_network_split(&scenario.id, &split).unwrap();
            writer.write_heat_density(&scenario.id, &density).unwrap();
            writer.flush().unwrap();
        }

        let rows: Vec<IamcRow> = read_rows(&dir.path().join(NETWORK_SPLIT_FILE_NAME));
        assert_eq!(
            rows.iter()
                .map(|row| (row.region.as_str(), row.variable.as_str()))
                .collect_vec(),
            [
                ("X", "Centralised"),
                ("X", "Decentralised"),
                ("Y", "Centralised"),
                ("Y", "Decentralised")
            ]
        );

        let rows: Vec<IamcRow> = read_rows(&dir.path().join(HEAT_DENSITY_FILE_NAME));
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.unit == "TWh/km2"));
        assert_eq!(rows[0].value, 25.0);
    }

    #[rstest]
    fn test_write_shortfalls(model: Model) {
        let mut technologies = model.technologies.clone();
        technologies["A"].requirement = PopulationDensity(1000.0);
        let scenario = model.iter_scenarios().next().unwrap();
        let allocation = allocate_scenario(scenario, technologies.values()).unwrap();
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path(), &model, false).unwrap();
            writer.write_shortfalls(&allocation).unwrap();
            writer.flush().unwrap();
        }

        let rows: Vec<ShortfallRow> = read_rows(&dir.path().join(SHORTFALLS_FILE_NAME));
        assert_eq!(
            rows,
            [ShortfallRow {
                scenario: "scenario1".into(),
                variable: "A".into(),
                reason: ShortfallReason::NoEligibleRegion,
                value: 100.0,
            }]
        );
    }

    #[rstest]
    fn test_write_residual_demand(model: Model) {
        let scenario = model.iter_scenarios().next().unwrap();
        let allocation = allocate_scenario(scenario, model.iter_technologies()).unwrap();
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path(), &model, true).unwrap();
            writer.write_residual_demand(&allocation).unwrap();
            writer.flush().unwrap();
        }

        let rows: Vec<ResidualDemandRow> = read_rows(&dir.path().join(RESIDUAL_DEMAND_FILE_NAME));
        assert_eq!(rows.len(), 4);
        assert_eq!(
            (rows[0].variable.clone(), rows[0].region.clone()),
            ("A".into(), "X".into())
        );
    }
}
