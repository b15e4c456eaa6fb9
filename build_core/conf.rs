//! Paths and constants used during build-time code generation.
//==================================================================================CONF
/// Default node configuration shipped with the crate.
pub(crate) const NODE_CONFIG_PATH: &str = "config/node_config.json";
/// Environment variable overriding `NODE_CONFIG_PATH`.
pub(crate) const NODE_CONFIG_ENV: &str = "TELENODE_CONFIG_PATH";
/// Generated configuration file name (written to `OUT_DIR`).
pub(crate) const OUT_DIR_CONFIG_FILE_NAME: &str = "node_config.rs";
