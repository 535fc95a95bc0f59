//! Code for reading per-region population, area and population density from CSV files.
use super::{input_err_msg, read_csv, read_csv_optional};
use crate::iamc::{IamcRow, filter_year};
use crate::model::ModelParameters;
use crate::region::{Region, RegionID, RegionMap};
use crate::scenario::ScenarioID;
use crate::units::{Area, Population, PopulationDensity};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::{debug, info, warn};
use std::path::Path;
use unicase::UniCase;

const POPULATION_FILE_NAME: &str = "population.csv";
const POPULATION_DENSITY_FILE_NAME: &str = "population_density.csv";

/// Values for each region, grouped by the name of the scenario they were given for
type ScenarioRegionValues<T> = IndexMap<String, IndexMap<RegionID, T>>;

/// The contents of the population file
#[derive(Debug, Default, PartialEq)]
struct PopulationData {
    population: ScenarioRegionValues<Population>,
    area: ScenarioRegionValues<Area>,
    area_unit: Option<String>,
}

/// Region data for every scenario which has a complete set of it
#[derive(Debug, PartialEq)]
pub struct ScenarioRegionData {
    /// Regions for each scenario
    pub by_scenario: IndexMap<ScenarioID, RegionMap>,
    /// The unit of region areas, if any were provided
    pub area_unit: Option<String>,
}

/// Read population, area and population density for each scenario.
///
/// Scenarios for which the population and population density data cover different sets of
/// regions are skipped with a warning. If no population density file is provided, population
/// density is calculated from population and area.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `parameters` - Model parameters
/// * `scenario_ids` - The scenarios to read data for
pub fn read_scenario_regions<'a, I>(
    model_dir: &Path,
    parameters: &ModelParameters,
    scenario_ids: I,
) -> Result<ScenarioRegionData>
where
    I: Iterator<Item = &'a ScenarioID>,
{
    let file_path = model_dir.join(POPULATION_FILE_NAME);
    let rows = read_csv::<IamcRow>(&file_path)?;
    let population_data = read_population_from_iter(filter_year(rows, parameters.year), parameters)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(POPULATION_DENSITY_FILE_NAME);
    let density = match read_csv_optional::<IamcRow>(&file_path)? {
        Some(rows) => read_density_from_iter(filter_year(rows, parameters.year))
            .with_context(|| input_err_msg(&file_path))?,
        None => {
            info!(
                "No {POPULATION_DENSITY_FILE_NAME} file provided; calculating population \
                density from population and area"
            );
            calculate_density(&population_data)
        }
    };

    let by_scenario = build_scenario_regions(
        scenario_ids,
        &population_data,
        &density,
        parameters.baseline_scenario.as_deref(),
    );

    Ok(ScenarioRegionData {
        by_scenario,
        area_unit: population_data.area_unit,
    })
}

/// Insert a value for a scenario and region, checking for duplicates
fn insert_value<T>(
    map: &mut ScenarioRegionValues<T>,
    row: &IamcRow,
    value: T,
    what: &str,
) -> Result<()> {
    let region_map = map.entry(row.scenario.clone()).or_default();
    ensure!(
        region_map
            .insert(row.region.as_str().into(), value)
            .is_none(),
        "Duplicate {what} entries (scenario: {}, region: {})",
        row.scenario,
        row.region
    );

    Ok(())
}

/// Check that a value read from a file is usable
fn check_value(row: &IamcRow) -> Result<()> {
    ensure!(
        row.value.is_finite() && row.value >= 0.0,
        "{} for region {} in scenario {} must be a finite number greater than or equal to zero",
        row.variable,
        row.region,
        row.scenario
    );

    Ok(())
}

/// Read population and area from an iterator of rows for a single year
fn read_population_from_iter<I>(iter: I, parameters: &ModelParameters) -> Result<PopulationData>
where
    I: Iterator<Item = IamcRow>,
{
    let population_variable = UniCase::new(parameters.population_variable.as_str());
    let area_variable = UniCase::new(parameters.area_variable.as_str());

    let mut data = PopulationData::default();
    for row in iter {
        let variable = UniCase::new(row.variable.as_str());
        if variable == population_variable {
            check_value(&row)?;
            insert_value(
                &mut data.population,
                &row,
                Population::new(row.value),
                "population",
            )?;
        } else if variable == area_variable {
            check_value(&row)?;
            let unit = data.area_unit.get_or_insert_with(|| row.unit.clone());
            ensure!(
                *unit == row.unit,
                "All areas must have the same unit (found {unit} and {})",
                row.unit
            );
            insert_value(&mut data.area, &row, Area::new(row.value), "area")?;
        } else {
            debug!("Ignoring population data for variable {}", row.variable);
        }
    }

    ensure!(
        !data.population.is_empty(),
        "No rows for variable {} found",
        parameters.population_variable
    );

    Ok(data)
}

/// Read population density from an iterator of rows for a single year
fn read_density_from_iter<I>(iter: I) -> Result<ScenarioRegionValues<PopulationDensity>>
where
    I: Iterator<Item = IamcRow>,
{
    let mut density = ScenarioRegionValues::new();
    for row in iter {
        check_value(&row)?;
        insert_value(
            &mut density,
            &row,
            PopulationDensity::new(row.value),
            "population density",
        )?;
    }
    ensure!(!density.is_empty(), "No population density data found");

    Ok(density)
}

/// Calculate population density for every region with a known, non-zero area
fn calculate_density(data: &PopulationData) -> ScenarioRegionValues<PopulationDensity> {
    data.population
        .iter()
        .filter_map(|(scenario, population)| {
            let area = data.area.get(scenario)?;
            let density = population
                .iter()
                .filter_map(|(region_id, population)| {
                    let area = *area.get(region_id)?;
                    (area > Area(0.0)).then(|| (region_id.clone(), *population / area))
                })
                .collect();
            Some((scenario.clone(), density))
        })
        .collect()
}

/// Get the values for the given scenario, falling back on the baseline scenario
fn get_for_scenario<'a, T>(
    map: &'a ScenarioRegionValues<T>,
    scenario_id: &ScenarioID,
    baseline_scenario: Option<&str>,
) -> Option<&'a IndexMap<RegionID, T>> {
    let scenario: &str = &scenario_id.0;
    map.get(scenario)
        .or_else(|| baseline_scenario.and_then(|baseline| map.get(baseline)))
}

/// Combine population, area and density into regions for each scenario
fn build_scenario_regions<'a, I>(
    scenario_ids: I,
    population_data: &PopulationData,
    density: &ScenarioRegionValues<PopulationDensity>,
    baseline_scenario: Option<&str>,
) -> IndexMap<ScenarioID, RegionMap>
where
    I: Iterator<Item = &'a ScenarioID>,
{
    let mut by_scenario = IndexMap::new();
    for scenario_id in scenario_ids {
        let Some(population) =
            get_for_scenario(&population_data.population, scenario_id, baseline_scenario)
        else {
            warn!("Scenario {scenario_id} has no population data");
            continue;
        };
        let Some(density) = get_for_scenario(density, scenario_id, baseline_scenario) else {
            warn!("Scenario {scenario_id} has no population density data");
            continue;
        };

        let population_regions: IndexSet<&RegionID> = population.keys().collect();
        let density_regions: IndexSet<&RegionID> = density.keys().collect();
        if population_regions != density_regions {
            warn!(
                "Scenario {scenario_id} has an incomplete input data set and will be skipped. \
                Regions without population density: [{}]. Regions without population: [{}]",
                population_regions.difference(&density_regions).join(", "),
                density_regions.difference(&population_regions).join(", ")
            );
            continue;
        }

        let area = get_for_scenario(&population_data.area, scenario_id, baseline_scenario);
        let regions = population
            .iter()
            .map(|(region_id, population)| {
                let region = Region {
                    id: region_id.clone(),
                    population: *population,
                    suitability: density[region_id],
                    area: area.and_then(|area| area.get(region_id).copied()),
                };
                (region_id.clone(), region)
            })
            .collect();
        by_scenario.insert(scenario_id.clone(), regions);
    }

    by_scenario
}
