//! Application service — stack deployment lifecycle.

use anyhow::{Context, Result};
use n8n_stack_common::StackOutputs;

use crate::application::ports::{DeployRequest, IdentityProbe, ProgressReporter, StackDeployer};
use crate::domain::config::StackConfig;
use crate::domain::error::ConfigError;
use crate::domain::stack::SynthesizedStack;

/// Refuse to continue when `env.account` is pinned and the active
/// credentials belong to another account.
///
/// # Errors
///
/// Returns `ConfigError::AccountMismatch` on mismatch, or the probe error.
pub async fn ensure_account(config: &StackConfig, probe: &impl IdentityProbe) -> Result<()> {
    let Some(expected) = config.env.account.as_deref() else {
        return Ok(());
    };
    let actual = probe
        .caller_account(&config.env.region)
        .await
        .context("checking active AWS account")?;
    if actual != expected {
        return Err(ConfigError::AccountMismatch {
            expected: expected.to_string(),
            actual,
        }
        .into());
    }
    Ok(())
}

/// Submit the synthesized template and return the resulting outputs.
///
/// # Errors
///
/// Returns an error if the account guard, the deployment, or the output
/// query fails.
pub async fn deploy(
    config: &StackConfig,
    stack: &SynthesizedStack,
    body: &str,
    provider: &(impl StackDeployer + IdentityProbe),
    reporter: &impl ProgressReporter,
) -> Result<StackOutputs> {
    ensure_account(config, provider).await?;

    reporter.step(&format!("Deploying stack {}...", stack.stack_name));
    tracing::info!(stack = %stack.stack_name, region = %config.env.region, "deploying");
    provider
        .deploy(&DeployRequest {
            stack_name: &stack.stack_name,
            region: &config.env.region,
            template_body: body,
            tags: &config.stack.tags,
        })
        .await?;
    reporter.success(&format!("Stack {} deployed", stack.stack_name));

    let outputs = provider
        .describe_outputs(&stack.stack_name, &config.env.region)
        .await?;
    let missing = outputs.missing();
    if !missing.is_empty() {
        reporter.warn(&format!("Stack outputs missing: {}", missing.join(", ")));
    }
    Ok(outputs)
}

/// Outputs of the deployed stack.
///
/// # Errors
///
/// Returns an error if the stack does not exist or the query fails.
pub async fn outputs(config: &StackConfig, deployer: &impl StackDeployer) -> Result<StackOutputs> {
    deployer
        .describe_outputs(&config.stack.name, &config.env.region)
        .await
}

/// Delete the stack and wait for completion.
///
/// # Errors
///
/// Returns an error if the account guard or the deletion fails.
pub async fn destroy(
    config: &StackConfig,
    provider: &(impl StackDeployer + IdentityProbe),
    reporter: &impl ProgressReporter,
) -> Result<()> {
    ensure_account(config, provider).await?;
    reporter.step(&format!("Deleting stack {}...", config.stack.name));
    tracing::info!(stack = %config.stack.name, region = %config.env.region, "deleting");
    provider
        .delete(&config.stack.name, &config.env.region)
        .await?;
    reporter.success(&format!("Stack {} deleted", config.stack.name));
    Ok(())
}
