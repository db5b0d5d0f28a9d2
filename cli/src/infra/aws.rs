//! Infrastructure implementation of the cloud provider ports.
//!
//! `AwsCli<R>` routes every call through the `aws` command line so the
//! operator's usual credential chain (profiles, SSO, env vars) applies.
//! Generic over `R: CommandRunner` so tests can inject a recording runner.

use std::io::Write as _;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use n8n_stack_common::StackOutputs;
use serde::Deserialize;

use crate::application::ports::{
    CommandRunner, DeployRequest, IdentityProbe, StackDeployer, ZoneLookup,
};
use crate::domain::error::ProviderError;
use crate::domain::naming;
use crate::domain::zone::HostedZone;
use crate::infra::command_runner::{STACK_OP_TIMEOUT, TokioCommandRunner};

pub const AWS: &str = "aws";

/// Adapter over the `aws` CLI.
pub struct AwsCli<R: CommandRunner> {
    runner: R,
    stack_timeout: Duration,
}

impl<R: CommandRunner> AwsCli<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            stack_timeout: STACK_OP_TIMEOUT,
        }
    }

    /// Run `aws <args>` and return stdout, mapping non-zero exits to
    /// `ProviderError::CommandFailed`.
    async fn call(&self, args: &[&str], timeout: Option<Duration>) -> Result<String> {
        let output = match timeout {
            Some(t) => self.runner.run_with_timeout(AWS, args, t).await,
            None => self.runner.run(AWS, args).await,
        }
        .with_context(|| format!("running {}", describe(args)))?;
        check(args, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl AwsCli<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::default())
    }
}

/// `aws <service> <operation>` for messages.
fn describe(args: &[&str]) -> String {
    let head: Vec<&str> = args.iter().take(2).copied().collect();
    format!("{AWS} {}", head.join(" "))
}

fn check(args: &[&str], output: &Output) -> Result<(), ProviderError> {
    if output.status.success() {
        return Ok(());
    }
    Err(ProviderError::CommandFailed {
        command: describe(args),
        code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn parse<T: for<'de> Deserialize<'de>>(args: &[&str], stdout: &str) -> Result<T> {
    serde_json::from_str(stdout).map_err(|e| {
        ProviderError::UnexpectedOutput {
            command: describe(args),
            reason: e.to_string(),
        }
        .into()
    })
}

// ── Response shapes ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZonesPage {
    #[serde(default)]
    hosted_zones: Vec<HostedZoneEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZoneEntry {
    id: String,
    name: String,
    #[serde(default)]
    config: Option<HostedZoneConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZoneConfig {
    #[serde(default)]
    private_zone: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StacksPage {
    #[serde(default)]
    stacks: Vec<StackEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackEntry {
    #[serde(default)]
    outputs: Vec<OutputEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OutputEntry {
    output_key: String,
    output_value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CallerIdentity {
    account: String,
}

// ── Port implementations ─────────────────────────────────────────────────────

impl<R: CommandRunner> ZoneLookup for AwsCli<R> {
    async fn lookup_zone(&self, zone_name: &str, region: &str) -> Result<HostedZone> {
        let zone_name = naming::normalize_domain(zone_name);
        let args = [
            "route53",
            "list-hosted-zones-by-name",
            "--dns-name",
            zone_name.as_str(),
            "--region",
            region,
            "--output",
            "json",
        ];
        tracing::debug!(zone = %zone_name, region, "looking up hosted zone");
        let stdout = self.call(&args, None).await?;
        let page: HostedZonesPage = parse(&args, &stdout)?;

        // Results start at the requested name in DNS order; only an exact,
        // public match counts.
        page.hosted_zones
            .into_iter()
            .find(|z| {
                naming::normalize_domain(&z.name) == zone_name
                    && !z.config.as_ref().is_some_and(|c| c.private_zone)
            })
            .map(|z| HostedZone::new(&z.id, &z.name))
            .ok_or_else(|| anyhow::anyhow!("no public hosted zone named '{zone_name}'"))
    }
}

impl<R: CommandRunner> StackDeployer for AwsCli<R> {
    async fn deploy(&self, request: &DeployRequest<'_>) -> Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("n8n-stack-")
            .suffix(".template.json")
            .tempfile()
            .context("creating template file")?;
        file.write_all(request.template_body.as_bytes())
            .context("writing template file")?;
        file.flush().context("writing template file")?;
        let path = file.path().to_string_lossy().into_owned();

        let tags: Vec<String> = request
            .tags
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        let mut args = vec![
            "cloudformation",
            "deploy",
            "--template-file",
            path.as_str(),
            "--stack-name",
            request.stack_name,
            "--capabilities",
            "CAPABILITY_IAM",
            "--region",
            request.region,
            "--no-fail-on-empty-changeset",
        ];
        if !tags.is_empty() {
            args.push("--tags");
            args.extend(tags.iter().map(String::as_str));
        }
        tracing::debug!(stack = request.stack_name, template = %path, "submitting template");
        self.call(&args, Some(self.stack_timeout)).await?;
        Ok(())
    }

    async fn describe_outputs(&self, stack_name: &str, region: &str) -> Result<StackOutputs> {
        let args = [
            "cloudformation",
            "describe-stacks",
            "--stack-name",
            stack_name,
            "--region",
            region,
            "--output",
            "json",
        ];
        let stdout = match self.call(&args, None).await {
            Ok(s) => s,
            Err(e) => {
                let missing = matches!(
                    e.downcast_ref::<ProviderError>(),
                    Some(ProviderError::CommandFailed { stderr, .. }) if stderr.contains("does not exist")
                );
                if missing {
                    return Err(ProviderError::StackNotFound(stack_name.to_string()).into());
                }
                return Err(e);
            }
        };
        let page: StacksPage = parse(&args, &stdout)?;
        let stack = page.stacks.into_iter().next().ok_or_else(|| {
            anyhow::Error::from(ProviderError::StackNotFound(stack_name.to_string()))
        })?;
        Ok(StackOutputs::from_pairs(
            stack
                .outputs
                .iter()
                .map(|o| (o.output_key.as_str(), o.output_value.as_str())),
        ))
    }

    async fn delete(&self, stack_name: &str, region: &str) -> Result<()> {
        self.call(
            &[
                "cloudformation",
                "delete-stack",
                "--stack-name",
                stack_name,
                "--region",
                region,
            ],
            None,
        )
        .await?;
        self.call(
            &[
                "cloudformation",
                "wait",
                "stack-delete-complete",
                "--stack-name",
                stack_name,
                "--region",
                region,
            ],
            Some(self.stack_timeout),
        )
        .await?;
        Ok(())
    }
}

impl<R: CommandRunner> IdentityProbe for AwsCli<R> {
    async fn caller_account(&self, region: &str) -> Result<String> {
        let args = [
            "sts",
            "get-caller-identity",
            "--region",
            region,
            "--output",
            "json",
        ];
        let stdout = self.call(&args, None).await?;
        let identity: CallerIdentity = parse(&args, &stdout)?;
        Ok(identity.account)
    }
}
