//! Domain layer — pure stack description, validation, and rendering.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod naming;
pub mod stack;
pub mod template;
pub mod zone;

pub use bootstrap::{BootParams, RenderedBoot, TemplateSet, render_boot};
pub use config::{EnvOverrides, StackConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, ProviderError, SynthError, TemplateError};
pub use stack::{SynthesizedStack, assemble};
pub use zone::HostedZone;
