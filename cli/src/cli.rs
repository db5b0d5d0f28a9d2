//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Single-instance n8n deployment on AWS
#[derive(Parser)]
#[command(
    name = "n8n-stack",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also honors `NO_COLOR`)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print or write the CloudFormation template
    Synth(commands::synth::SynthArgs),

    /// Render the boot script and the files it installs
    Render(commands::render::RenderArgs),

    /// Deploy the stack and print its outputs
    Deploy,

    /// Show outputs of the deployed stack
    Outputs,

    /// Delete the stack and everything in it
    Destroy,

    /// Manage cached lookups
    #[command(subcommand)]
    Context(commands::context::ContextCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
        })?;

        match command {
            Command::Synth(args) => commands::synth::run(&app, &args).await,
            Command::Render(args) => commands::render::run(&app, &args),
            Command::Deploy => commands::deploy::run(&app).await,
            Command::Outputs => commands::outputs::run(&app).await,
            Command::Destroy => commands::destroy::run(&app).await,
            Command::Context(cmd) => commands::context::run(&app, &cmd),
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
