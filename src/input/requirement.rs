//! Code for reading the infrastructure requirements of technologies from a CSV file.
use super::{deserialise_non_negative, input_err_msg, read_csv_optional};
use crate::downscaling::priority::RequirementMap;
use crate::units::PopulationDensity;
use anyhow::{Context, Result, ensure};
use log::info;
use serde::Deserialize;
use std::path::Path;

const REQUIREMENTS_FILE_NAME: &str = "requirements.csv";

/// A row of the requirements file. Other IAMC columns may be present and are ignored.
#[derive(PartialEq, Debug, Deserialize)]
struct RequirementRaw {
    /// The technology the requirement applies to
    variable: String,
    /// Minimum population density needed in a region for the technology
    #[serde(deserialize_with = "deserialise_non_negative")]
    value: f64,
}

/// Read technology requirements from the model directory.
///
/// The file is optional; if it is absent, every technology gets a requirement of zero.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_requirements(model_dir: &Path) -> Result<RequirementMap> {
    let file_path = model_dir.join(REQUIREMENTS_FILE_NAME);
    let Some(iter) = read_csv_optional::<RequirementRaw>(&file_path)? else {
        info!("No {REQUIREMENTS_FILE_NAME} file provided");
        return Ok(RequirementMap::new());
    };

    read_requirements_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

fn read_requirements_from_iter<I>(iter: I) -> Result<RequirementMap>
where
    I: Iterator<Item = RequirementRaw>,
{
    let mut map = RequirementMap::new();
    for requirement in iter {
        let variable = requirement.variable.trim();
        ensure!(!variable.is_empty(), "Technology name cannot be empty");
        ensure!(
            map.insert(
                variable.into(),
                PopulationDensity::new(requirement.value)
            )
            .is_none(),
            "Duplicate requirement for technology {variable}"
        );
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use map_macro::hash_map;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn requirement(variable: &str, value: f64) -> RequirementRaw {
        RequirementRaw {
            variable: variable.into(),
            value,
        }
    }

    #[test]
    fn test_read_requirements_from_iter() {
        let iter = [requirement("A", 200.0), requirement(" B ", 0.0)].into_iter();
        assert_eq!(
            read_requirements_from_iter(iter).unwrap(),
            hash_map! {
                "A".into() => PopulationDensity(200.0),
                "B".into() => PopulationDensity(0.0),
            }
        );
    }

    #[test]
    fn test_read_requirements_from_iter_duplicate() {
        let iter = [requirement("A", 200.0), requirement("A", 100.0)].into_iter();
        assert_error!(
            read_requirements_from_iter(iter),
            "Duplicate requirement for technology A"
        );
    }

    #[test]
    fn test_read_requirements_from_iter_empty_name() {
        let iter = [requirement("  ", 200.0)].into_iter();
        assert_error!(
            read_requirements_from_iter(iter),
            "Technology name cannot be empty"
        );
    }

    #[test]
    fn test_read_requirements() {
        let dir = tempdir().unwrap();

        // No file
        assert!(read_requirements(dir.path()).unwrap().is_empty());

        {
            let mut file = File::create(dir.path().join(REQUIREMENTS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "model,scenario,region,variable,unit,year,value
Requirements,all,all,District heating,people/km2,2050,150
Requirements,all,all,Heat pump,people/km2,2050,0"
            )
            .unwrap();
        }
        let map = read_requirements(dir.path()).unwrap();
        assert_eq!(map["District heating"], PopulationDensity(150.0));
        assert_eq!(map["Heat pump"], PopulationDensity(0.0));

        // Negative values are not allowed
        {
            let mut file = File::create(dir.path().join(REQUIREMENTS_FILE_NAME)).unwrap();
            writeln!(file, "variable,value\nDistrict heating,-1").unwrap();
        }
        assert!(read_requirements(dir.path()).is_err());
    }
}
