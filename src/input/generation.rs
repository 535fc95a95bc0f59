//! Code for reading aggregate heat generation from a CSV file.
use super::{input_err_msg, read_csv};
use crate::iamc::{IamcRow, filter_year};
use crate::model::ModelParameters;
use crate::scenario::{GenerationMap, ScenarioID};
use crate::technology::TechnologyID;
use crate::units::{Energy, EnergyUnit};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::path::Path;
use std::str::FromStr;

const GENERATION_FILE_NAME: &str = "generation.csv";

/// Heat generation for every scenario, converted to a single unit
#[derive(Debug, PartialEq)]
pub struct GenerationData {
    /// The model named in the first generation row
    pub source_model: String,
    /// The unit generation values are expressed in
    pub unit: EnergyUnit,
    /// All technologies with generation data, in the order they first appear
    pub technology_ids: IndexSet<TechnologyID>,
    /// Generation per technology, grouped by scenario
    pub by_scenario: IndexMap<ScenarioID, GenerationMap>,
}

impl GenerationData {
    /// Iterate over the IDs of scenarios with generation data
    pub fn iter_scenario_ids(&self) -> indexmap::map::Keys<'_, ScenarioID, GenerationMap> {
        self.by_scenario.keys()
    }
}

/// Read heat generation data from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `parameters` - Model parameters, giving the year and output unit
pub fn read_generation(model_dir: &Path, parameters: &ModelParameters) -> Result<GenerationData> {
    let file_path = model_dir.join(GENERATION_FILE_NAME);
    let rows = read_csv::<IamcRow>(&file_path)?;
    read_generation_from_iter(filter_year(rows, parameters.year), parameters.unit)
        .with_context(|| input_err_msg(&file_path))
}

/// Read heat generation data from an iterator of rows for a single year
fn read_generation_from_iter<I>(iter: I, unit: Option<EnergyUnit>) -> Result<GenerationData>
where
    I: Iterator<Item = IamcRow>,
{
    let mut iter = iter.peekable();
    let first = iter
        .peek()
        .context("No generation data found for the given year")?;
    let source_model = first.model.clone();
    let first_unit = parse_unit(&first.unit)?;
    let output_unit = unit.unwrap_or(first_unit);
    if output_unit != first_unit {
        debug!("Converting heat generation from {first_unit} to {output_unit}");
    }

    let mut technology_ids = IndexSet::new();
    let mut by_scenario: IndexMap<ScenarioID, GenerationMap> = IndexMap::new();
    for row in iter {
        let row_unit = parse_unit(&row.unit)?;
        ensure!(
            unit.is_some() || row_unit == output_unit,
            "Generation data uses more than one unit ({output_unit} and {row_unit}). \
            Set `unit` in the model file to convert between them."
        );

        let value = Energy::new(row.value);
        ensure!(
            value.is_finite_non_negative(),
            "Generation for technology {} in scenario {} must be a finite number greater than \
            or equal to zero",
            row.variable,
            row.scenario
        );

        let technology = row.variable.trim();
        ensure!(!technology.is_empty(), "Technology name cannot be empty");
        let technology_id: TechnologyID = technology.into();
        technology_ids.insert(technology_id.clone());

        let scenario_id: ScenarioID = row.scenario.into();
        let generation = by_scenario.entry(scenario_id.clone()).or_default();
        ensure!(
            generation
                .insert(
                    technology_id.clone(),
                    row_unit.convert(value, output_unit)
                )
                .is_none(),
            "Duplicate generation entries (scenario: {scenario_id}, technology: {technology_id})"
        );
    }

    Ok(GenerationData {
        source_model,
        unit: output_unit,
        technology_ids,
        by_scenario,
    })
}

/// Parse the name of an energy unit
fn parse_unit(s: &str) -> Result<EnergyUnit> {
    EnergyUnit::from_str(s.trim()).with_context(|| format!("Unknown energy unit: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, iamc_row, model_parameters};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn generation_row(scenario: &str, technology: &str, unit: &str, value: f64) -> IamcRow {
        IamcRow {
            unit: unit.into(),
            ..iamc_row(scenario, "AT", technology, 2050, value)
        }
    }

    #[test]
    fn test_read_generation_from_iter() {
        let rows = [
            generation_row("s1", "A", "TWh", 100.0),
            generation_row("s1", "B", "TWh", 50.0),
            generation_row("s2", "B", "TWh", 20.0),
        ];
        let data = read_generation_from_iter(rows.into_iter(), None).unwrap();
        assert_eq!(data.source_model, "model");
        assert_eq!(data.unit, EnergyUnit::TerawattHour);
        assert_eq!(
            data.technology_ids,
            IndexSet::from(["A".into(), "B".into()])
        );
        assert_eq!(
            data.iter_scenario_ids().cloned().collect::<Vec<_>>(),
            [ScenarioID::new("s1"), ScenarioID::new("s2")]
        );
        assert_eq!(data.by_scenario["s1"]["A"], Energy(100.0));
        assert_eq!(data.by_scenario["s1"]["B"], Energy(50.0));
        assert_eq!(data.by_scenario["s2"]["B"], Energy(20.0));
        assert!(!data.by_scenario["s2"].contains_key("A"));
    }

    #[test]
    fn test_read_generation_from_iter_convert_units() {
        let rows = [
            generation_row("s1", "A", "PJ", 36.0),
            generation_row("s1", "B", "TWh", 1.0),
        ];
        let data =
            read_generation_from_iter(rows.into_iter(), Some(EnergyUnit::TerawattHour)).unwrap();
        assert_eq!(data.unit, EnergyUnit::TerawattHour);
        assert_approx_eq!(Energy, data.by_scenario["s1"]["A"], Energy(10.0));
        assert_approx_eq!(Energy, data.by_scenario["s1"]["B"], Energy(1.0));
    }

    #[test]
    fn test_read_generation_from_iter_mixed_units() {
        let rows = [
            generation_row("s1", "A", "PJ", 36.0),
            generation_row("s1", "B", "TWh", 1.0),
        ];
        assert_error!(
            read_generation_from_iter(rows.into_iter(), None),
            "Generation data uses more than one unit (PJ and TWh). \
            Set `unit` in the model file to convert between them."
        );
    }

    #[test]
    fn test_read_generation_from_iter_bad_unit() {
        let rows = [generation_row("s1", "A", "people", 1.0)];
        assert_error!(
            read_generation_from_iter(rows.into_iter(), None),
            "Unknown energy unit: people"
        );
    }

    #[test]
    fn test_read_generation_from_iter_duplicate() {
        let rows = [
            generation_row("s1", "A", "TWh", 1.0),
            generation_row("s1", "A", "TWh", 2.0),
        ];
        assert_error!(
            read_generation_from_iter(rows.into_iter(), None),
            "Duplicate generation entries (scenario: s1, technology: A)"
        );
    }

    #[test]
    fn test_read_generation_from_iter_trims_names() {
        let rows = [generation_row("s1", " A ", "TWh", 1.0)];
        let data = read_generation_from_iter(rows.into_iter(), None).unwrap();
        assert!(data.technology_ids.contains("A"));
        assert!(data.by_scenario["s1"].contains_key("A"));

        // Padding doesn't make a name distinct
        let rows = [
            generation_row("s1", "A", "TWh", 1.0),
            generation_row("s1", "A ", "TWh", 2.0),
        ];
        assert_error!(
            read_generation_from_iter(rows.into_iter(), None),
            "Duplicate generation entries (scenario: s1, technology: A)"
        );

        let rows = [generation_row("s1", "  ", "TWh", 1.0)];
        assert_error!(
            read_generation_from_iter(rows.into_iter(), None),
            "Technology name cannot be empty"
        );
    }

    #[test]
    fn test_read_generation_from_iter_negative() {
        let rows = [generation_row("s1", "A", "TWh", -1.0)];
        assert!(read_generation_from_iter(rows.into_iter(), None).is_err());
    }

    #[test]
    fn test_read_generation_from_iter_empty() {
        assert_error!(
            read_generation_from_iter(std::iter::empty(), None),
            "No generation data found for the given year"
        );
    }

    #[rstest]
    fn test_read_generation_filters_year(mut model_parameters: ModelParameters) {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(GENERATION_FILE_NAME)).unwrap();
            writeln!(
                file,
                "model,scenario,region,variable,unit,year,value
GENeSYS-MOD,Techno-Friendly,AT,Biomass,PJ,2030,10
GENeSYS-MOD,Techno-Friendly,AT,Biomass,PJ,2050,7.2"
            )
            .unwrap();
        }

        model_parameters.unit = Some(EnergyUnit::TerawattHour);
        let data = read_generation(dir.path(), &model_parameters).unwrap();
        assert_eq!(data.source_model, "GENeSYS-MOD");
        assert_approx_eq!(
            Energy,
            data.by_scenario["Techno-Friendly"]["Biomass"],
            Energy(2.0)
        );
    }
}
