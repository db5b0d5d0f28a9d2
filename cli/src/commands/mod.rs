//! Command implementations

pub mod config;
pub mod context;
pub mod deploy;
pub mod destroy;
pub mod outputs;
pub mod render;
pub mod synth;
pub mod version;
