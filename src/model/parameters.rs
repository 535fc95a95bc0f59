//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::units::{EnergyUnit, PopulationDensity};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_unit_param_default!(default_network_threshold, PopulationDensity, 150.0);
define_param_default!(default_population_variable, String, "Population".into());
define_param_default!(default_area_variable, String, "Total area".into());

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The year to downscale. Rows for other years are ignored.
    pub year: u32,
    /// The unit for output data.
    ///
    /// If not provided, all generation data must share the same unit, which is then used.
    pub unit: Option<EnergyUnit>,
    /// Scenario whose population data applies to scenarios without population data of their own
    pub baseline_scenario: Option<String>,
    /// Technologies whose requirement is at least this value are classed as centralised
    #[serde(default = "default_network_threshold")]
    pub network_threshold: PopulationDensity,
    /// The variable name for population rows in the population file
    #[serde(default = "default_population_variable")]
    pub population_variable: String,
    /// The variable name for area rows in the population file
    #[serde(default = "default_area_variable")]
    pub area_variable: String,
}

/// Check that the `year` parameter is valid
fn check_year(year: u32) -> Result<()> {
    ensure!(year > 0, "`year` must be greater than zero");

    Ok(())
}

/// Check that the `network_threshold` parameter is valid
fn check_network_threshold(value: PopulationDensity) -> Result<()> {
    ensure!(
        value.is_finite_non_negative(),
        "network_threshold must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Check that a variable name parameter is valid
fn check_variable_name(name: &str, param_name: &str) -> Result<()> {
    ensure!(!name.trim().is_empty(), "{param_name} cannot be empty");

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_year(self.year)?;
        check_network_threshold(self.network_threshold)?;
        check_variable_name(&self.population_variable, "population_variable")?;
        check_variable_name(&self.area_variable, "area_variable")?;
        ensure!(
            !unicase::eq(self.population_variable.as_str(), self.area_variable.as_str()),
            "population_variable and area_variable must be different"
        );

        Ok(())
    }
}
