//! Code for writing information about a run to file
use crate::model::Model;
use anyhow::{Result, anyhow};
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Information about the program build via `built` crate
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// The git commit of this build, with a suffix if the working tree had changes
fn get_git_hash() -> String {
    match (built_info::GIT_COMMIT_HASH_SHORT, built_info::GIT_DIRTY) {
        (None, _) => "unknown".into(),
        (Some(hash), Some(true)) => format!("{hash}-dirty"),
        (Some(hash), _) => hash.into(),
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    model: ModelMetadata<'a>,
    program: ProgramMetadata<'a>,
    platform: PlatformMetadata,
}

/// Information about the run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the model which was downscaled
    model_path: &'a Path,
    /// When the run started
    datetime: String,
}

/// A summary of the model's input data
#[derive(Serialize)]
struct ModelMetadata<'a> {
    /// The model which produced the generation data
    source_model: &'a str,
    /// The year which was downscaled
    year: u32,
    /// The unit of output generation values
    unit: String,
    /// Scenarios with complete input data
    scenarios: Vec<&'a str>,
    /// Technologies in the order they were allocated
    technologies: Vec<&'a str>,
}

impl<'a> ModelMetadata<'a> {
    fn new(model: &'a Model) -> Self {
        Self {
            source_model: &model.source_model,
            year: model.year(),
            unit: model.unit.to_string(),
            scenarios: model.scenarios.keys().map(|id| &*id.0).collect(),
            technologies: model.technologies.keys().map(|id| &*id.0).collect(),
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// The target architecture for the build (e.g. x86_64-unknown-linux-gnu)
    target: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
    /// The version of rustc used to compile heatscale
    rustc_version: &'a str,
    /// When heatscale was built
    build_time_utc: &'a str,
    /// The git commit hash for the version of heatscale (if known)
    git_commit_hash: String,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: get_git_hash(),
        }
    }
}

/// The operating system and machine, as reported by [`PlatformInfo`]
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow!("Unable to determine platform info: {err}"))?;

        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            nodename: info.nodename().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            version: info.version().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write metadata for a run to the specified output path in TOML format
pub fn write_metadata(output_path: &Path, model: &Model) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            model_path: &model.model_path,
            datetime: Local::now().to_rfc2822(),
        },
        model: ModelMetadata::new(model),
        program: ProgramMetadata::default(),
        platform: PlatformMetadata::new()?,
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{model_parameters, scenario, technologies};
    use crate::model::ModelParameters;
    use crate::scenario::Scenario;
    use crate::technology::TechnologyMap;
    use crate::units::EnergyUnit;
    use indexmap::indexmap;
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[rstest]
    fn test_write_metadata(
        model_parameters: ModelParameters,
        scenario: Scenario,
        technologies: TechnologyMap,
    ) {
        let model = Model {
            model_path: PathBuf::from("some_model"),
            parameters: model_parameters,
            source_model: "source".into(),
            unit: EnergyUnit::TerawattHour,
            area_unit: None,
            technologies,
            scenarios: indexmap! { scenario.id.clone() => scenario },
        };
        let dir = tempdir().unwrap();
        write_metadata(dir.path(), &model).unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let value: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(value["run"]["model_path"].as_str(), Some("some_model"));
        assert_eq!(value["model"]["year"].as_integer(), Some(2050));
        assert_eq!(value["model"]["unit"].as_str(), Some("TWh"));
        assert_eq!(value["program"]["name"].as_str(), Some("heatscale"));
    }
}
