//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. `error_code` maps an error chain back to the stable
//! code used by `--json` output.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration keys, values, and deployment environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error(
        "Account mismatch: stack targets account {expected} but the active AWS credentials belong to {actual}"
    )]
    AccountMismatch { expected: String, actual: String },
}

// ── Synthesis errors ──────────────────────────────────────────────────────────

/// Errors raised while assembling the resource graph.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error(
        "Hosted zone lookup failed for '{zone}': {reason}\n\nSet domain.zone_id to skip the lookup."
    )]
    ZoneLookup { zone: String, reason: String },

    #[error("Domain '{domain}' is not a subdomain of hosted zone '{zone}'")]
    DomainOutsideZone { domain: String, zone: String },

    #[error(transparent)]
    Model(#[from] n8n_stack_common::TemplateModelError),
}

// ── Template errors ───────────────────────────────────────────────────────────

/// Errors raised while rendering provisioning templates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Template '{template}' has no value for placeholder {{{{{placeholder}}}}}")]
    Unresolved { template: String, placeholder: String },

    #[error("Template '{template}' has an unterminated placeholder at byte {offset}")]
    Unterminated { template: String, offset: usize },

    #[error("Rendered '{template}' contains its heredoc delimiter '{delimiter}' on its own line")]
    DelimiterCollision { template: String, delimiter: String },
}

// ── Provider errors ───────────────────────────────────────────────────────────

/// Errors surfaced from the cloud provider's CLI.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{command} failed (exit {code}): {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("{command} returned unexpected output: {reason}")]
    UnexpectedOutput { command: String, reason: String },

    #[error("Stack '{0}' does not exist")]
    StackNotFound(String),
}

/// Stable machine-readable code for the first typed error in the chain.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return "CONFIG";
        }
        if let Some(synth) = cause.downcast_ref::<SynthError>() {
            return match synth {
                SynthError::ZoneLookup { .. } => "ZONE_LOOKUP",
                SynthError::DomainOutsideZone { .. } => "CONFIG",
                SynthError::Model(_) => "SYNTH",
            };
        }
        if cause.is::<TemplateError>() {
            return "TEMPLATE";
        }
        if cause.is::<ProviderError>() {
            return "PROVIDER";
        }
    }
    "INTERNAL"
}
