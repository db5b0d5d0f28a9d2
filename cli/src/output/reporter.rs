//! `TerminalReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.
//!
//! On a TTY, `step()` starts a spinner that the next `success()` or `warn()`
//! finishes, or that is marked failed if the reporter is dropped first;
//! otherwise every event is a plain line. Progress goes to stderr
//! so stdout carries only command results.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    active: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            active: RefCell::new(None),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if self.ctx.show_progress() {
            if let Some(previous) = self.active.replace(Some(progress::spinner(message))) {
                previous.finish_and_clear();
            }
        } else {
            eprintln!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.active.take() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => eprintln!("  {} {message}", "✓".style(self.ctx.styles.success)),
        }
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if let Some(pb) = self.active.take() {
            pb.finish_and_clear();
        }
        eprintln!("  {} {message}", "⚠".style(self.ctx.styles.warning));
    }
}

/// A spinner still running at drop belongs to a step that never finished,
/// i.e. an error unwound past it. Leave it on screen marked as failed.
impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.active.get_mut().take() {
            let message = pb.message();
            progress::finish_error(&pb, &message);
        }
    }
}
