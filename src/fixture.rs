//! Fixtures for tests

use crate::iamc::IamcRow;
use crate::model::{Model, ModelParameters};
use crate::region::Region;
use crate::scenario::Scenario;
use crate::technology::{Technology, TechnologyMap};
use crate::units::{Area, Energy, EnergyUnit, Population, PopulationDensity};
use indexmap::indexmap;
use rstest::fixture;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Create an IAMC row for model "model" with unit "unit"
pub fn iamc_row(scenario: &str, region: &str, variable: &str, year: u32, value: f64) -> IamcRow {
    IamcRow {
        model: "model".into(),
        scenario: scenario.into(),
        region: region.into(),
        variable: variable.into(),
        unit: "unit".into(),
        year,
        value,
    }
}

#[fixture]
pub fn model_parameters() -> ModelParameters {
    ModelParameters {
        year: 2050,
        unit: None,
        baseline_scenario: None,
        network_threshold: PopulationDensity(150.0),
        population_variable: "Population".into(),
        area_variable: "Total area".into(),
    }
}

/// A scenario with two technologies and two regions.
///
/// Region X is dense enough for either technology and Y only for technologies with a requirement
/// of at most 100.
#[fixture]
pub fn scenario() -> Scenario {
    let region = |id: &str, population, suitability| Region {
        id: id.into(),
        population: Population(population),
        suitability: PopulationDensity(suitability),
        area: None,
    };

    Scenario {
        id: "scenario1".into(),
        generation: indexmap! {
            "A".into() => Energy(100.0),
            "B".into() => Energy(50.0),
        },
        regions: indexmap! {
            "X".into() => region("X", 70.0, 300.0),
            "Y".into() => region("Y", 30.0, 100.0),
        },
    }
}

/// Technologies matching [`scenario`], in priority order
#[fixture]
pub fn technologies() -> TechnologyMap {
    let technology = |id: &str, requirement| Technology {
        id: id.into(),
        requirement: PopulationDensity(requirement),
    };

    indexmap! {
        "A".into() => technology("A", 200.0),
        "B".into() => technology("B", 0.0),
    }
}

/// A model containing [`scenario`], reported in TWh, where region X has an area of 4 km2
#[fixture]
pub fn model(
    model_parameters: ModelParameters,
    mut scenario: Scenario,
    technologies: TechnologyMap,
) -> Model {
    scenario.regions["X"].area = Some(Area(4.0));

    Model {
        model_path: PathBuf::from("model"),
        parameters: model_parameters,
        source_model: "source".into(),
        unit: EnergyUnit::TerawattHour,
        area_unit: Some("km2".into()),
        technologies,
        scenarios: indexmap! { scenario.id.clone() => scenario },
    }
}
