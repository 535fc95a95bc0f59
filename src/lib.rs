//! Common functionality for heatscale.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod downscaling;
pub mod iamc;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod region;
pub mod scenario;
pub mod settings;
pub mod technology;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the config folder for heatscale
pub fn get_heatscale_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        panic!("Could not find a config folder for the current user");
    };
    config_dir.push("heatscale");

    config_dir
}
