//! Cargo build script: turns the node configuration JSON into Rust constants.

mod build_core;
use crate::build_core::{
    conf::*, domain::NodeConfigFile, errors::BuildError, gen_config::run_config_gen,
};

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

// The firmware has no runtime configuration storage: broker, radio and
// scheduling options are fixed when the image is built. This script reads the
// JSON description, validates it, and writes `node_config.rs` into `OUT_DIR`,
// where `src/config.rs` includes it.

//==================================================================================MAIN
fn main() -> Result<(), BuildError> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", NODE_CONFIG_PATH);
    println!("cargo:rerun-if-env-changed={}", NODE_CONFIG_ENV);

    // 1. Locate the configuration file.
    // Priority order:
    //   1. TELENODE_CONFIG_PATH environment variable (absolute or relative path)
    //   2. Default configuration shipped with the crate
    let default_config_path =
        PathBuf::from_str(NODE_CONFIG_PATH).map_err(|_| BuildError::ReadPath {
            path: NODE_CONFIG_PATH,
        })?;

    let user_config_path = std::env::var(NODE_CONFIG_ENV).ok().map(PathBuf::from);

    let config_path = match user_config_path {
        Some(path) if path.exists() => {
            println!("cargo:warning=Using custom node configuration from {:?}", path);
            println!("cargo:rerun-if-changed={}", path.display());
            path
        }
        Some(path) => {
            println!(
                "cargo:warning=Custom configuration path specified but file not found: {:?}",
                path
            );
            println!("cargo:warning=Falling back to the default node configuration");
            default_config_path
        }
        None => default_config_path,
    };

    // 2. Parse and validate.
    let config_string = fs::read_to_string(&config_path).map_err(|e| BuildError::ReadFile {
        path: config_path.clone(),
        source: e,
    })?;
    let config: NodeConfigFile = serde_json::from_str(&config_string)?;

    // 3. Generate and write the constants into `OUT_DIR`.
    let buffer_config_code = run_config_gen(&config)?;

    let out_dir_str = std::env::var("OUT_DIR").map_err(|e| BuildError::OutDirErr { source: e })?;
    let config_file_path = PathBuf::from(out_dir_str).join(OUT_DIR_CONFIG_FILE_NAME);

    fs::write(&config_file_path, &buffer_config_code).map_err(|e| BuildError::WriteFile {
        path: config_file_path,
        source: e,
    })?;

    Ok(())
}
