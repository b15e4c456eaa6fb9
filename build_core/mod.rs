//! Workspace for the build script: configuration schema and code generator.
pub mod conf;
pub mod domain;
pub mod errors;
pub mod gen_config;
