//! Human-readable terminal renderer.

use std::path::{Path, PathBuf};

use n8n_stack_common::StackOutputs;
use owo_colors::OwoColorize as _;

use crate::application::services::synth_service::Synthesis;
use crate::domain::bootstrap::RenderedBoot;
use crate::domain::config::StackConfig;
use crate::infra::config::CONFIG_ENV;
use crate::output::OutputContext;

/// Environment variables that override file configuration, in display order.
const OVERRIDE_VARS: &[&str] = &[
    CONFIG_ENV,
    "DOMAIN_NAME",
    "HOSTED_ZONE_NAME",
    "HOSTED_ZONE_ID",
    "AWS_ACCOUNT_ID",
    "AWS_REGION",
    "CERTBOT_EMAIL",
];

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn render_version(&self, version: &str) {
        println!("n8n-stack {version}");
    }

    /// Without `written`, the template itself is the command's output.
    pub fn render_synth(&self, synthesis: &Synthesis, written: Option<&Path>) {
        let Some(path) = written else {
            print!("{}", synthesis.body);
            return;
        };
        self.ctx.success(&format!("Wrote {}", path.display()));
        self.ctx.kv("Stack:       ", &synthesis.stack.stack_name);
        self.ctx.kv(
            "Resources:   ",
            &synthesis.stack.template.resources.len().to_string(),
        );
        self.ctx.kv("Hosted zone: ", synthesis.zone_source.as_str());
        self.ctx.kv("SHA-256:     ", &synthesis.digest);
    }

    /// Without written files, the user data is printed as-is.
    pub fn render_boot(&self, boot: &RenderedBoot, written: &[PathBuf]) {
        if written.is_empty() {
            print!("{}", boot.user_data);
            return;
        }
        for path in written {
            self.ctx.success(&format!("Wrote {}", path.display()));
        }
    }

    pub fn render_outputs(&self, stack_name: &str, outputs: &StackOutputs) {
        println!();
        println!(
            "  {}",
            format!("Stack {stack_name}").style(self.ctx.styles.header)
        );
        println!();
        let none = "(not available)";
        println!(
            "  {:<14} {}",
            "URL:",
            outputs
                .url
                .as_deref()
                .unwrap_or(none)
                .style(self.ctx.styles.link)
        );
        println!(
            "  {:<14} {}",
            "Public IP:",
            outputs.public_ip.as_deref().unwrap_or(none)
        );
        println!(
            "  {:<14} {}",
            "Instance:",
            outputs.instance_id.as_deref().unwrap_or(none)
        );
        println!(
            "  {:<14} {}",
            "SSH:",
            outputs.ssh_command.as_deref().unwrap_or(none)
        );
        println!();
    }

    pub fn render_destroyed(&self, stack_name: &str) {
        self.ctx.success(&format!("Stack {stack_name} removed"));
    }

    /// Render the effective configuration.
    pub fn render_config(&self, config: &StackConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        let unset = "(not set)".to_string();
        let rows = [
            ("stack.name:", config.stack.name.clone()),
            ("stack.description:", config.stack.description.clone()),
            ("env.account:", config.env.account.clone().unwrap_or_else(|| unset.clone())),
            ("env.region:", config.env.region.clone()),
            ("domain.name:", config.domain.name.clone()),
            (
                "domain.zone:",
                config.zone_name().unwrap_or_else(|| unset.clone()),
            ),
            (
                "domain.zone_id:",
                config.domain.zone_id.clone().unwrap_or_else(|| unset.clone()),
            ),
            ("certificate.email:", config.certificate.email.clone()),
            ("instance.type:", config.instance.instance_type.clone()),
            ("instance.key_name:", config.instance.key_name.clone()),
            ("app.timezone:", config.app.timezone.clone()),
            ("app.image:", config.app.image.clone()),
        ];
        for (key, value) in rows {
            println!("  {key:<20} {value}");
        }
        if !config.stack.tags.is_empty() {
            println!();
            println!("  {}", "Tags:".style(self.ctx.styles.bold));
            for (k, v) in &config.stack.tags {
                println!("    {k:<18} {v}");
            }
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in OVERRIDE_VARS {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| unset.clone())
            );
        }
        println!();
    }

    pub fn render_config_set(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {value}"));
    }

    pub fn render_context_cleared(&self, path: &Path, removed: bool) {
        if removed {
            self.ctx
                .success(&format!("Removed cached lookups ({})", path.display()));
        } else {
            self.ctx.info("No cached lookups");
        }
    }
}
