//! Shared mock infrastructure for unit tests.
//!
//! Hand-written port implementations so each test file doesn't have to
//! re-define the same boilerplate.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use n8n_stack::application::ports::{
    CommandRunner, ContextStore, DeployRequest, IdentityProbe, LookupContext, ProgressReporter,
    StackDeployer, ZoneLookup,
};
use n8n_stack::domain::HostedZone;
use n8n_stack_common::StackOutputs;

// ── Output helpers ────────────────────────────────────────────────────────────

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Recording command runner ─────────────────────────────────────────────────

/// Records every `(program, args)` call and replays queued outputs in order.
/// When the queue is empty, calls succeed with empty stdout.
#[derive(Clone, Default)]
pub struct MockCommandRunner {
    pub calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    pub timeouts: Arc<Mutex<Vec<Option<Duration>>>>,
    responses: Arc<Mutex<VecDeque<Output>>>,
}

impl MockCommandRunner {
    pub fn with_responses(responses: Vec<Output>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, program: &str, args: &[&str], timeout: Option<Duration>) -> Output {
        self.calls.lock().unwrap().push((
            program.to_string(),
            args.iter().map(|s| (*s).to_string()).collect(),
        ));
        self.timeouts.lock().unwrap().push(timeout);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ok_output(b""))
    }
}

impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        Ok(self.record(program, args, None))
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        Ok(self.record(program, args, Some(timeout)))
    }
}

// ── Zone lookup ──────────────────────────────────────────────────────────────

/// Returns a fixed zone (or fails) and counts calls.
pub struct StubZoneLookup {
    pub zone: Option<HostedZone>,
    pub calls: Cell<usize>,
}

impl StubZoneLookup {
    pub fn found(id: &str, name: &str) -> Self {
        Self {
            zone: Some(HostedZone::new(id, name)),
            calls: Cell::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            zone: None,
            calls: Cell::new(0),
        }
    }
}

impl ZoneLookup for StubZoneLookup {
    async fn lookup_zone(&self, zone_name: &str, _region: &str) -> Result<HostedZone> {
        self.calls.set(self.calls.get() + 1);
        self.zone
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no public hosted zone named '{zone_name}'"))
    }
}

// ── Context store ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryContextStore {
    pub context: RefCell<LookupContext>,
    pub saves: Cell<usize>,
}

impl ContextStore for MemoryContextStore {
    fn load(&self) -> Result<LookupContext> {
        Ok(self.context.borrow().clone())
    }

    fn save(&self, context: &LookupContext) -> Result<()> {
        self.saves.set(self.saves.get() + 1);
        *self.context.borrow_mut() = context.clone();
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        let had = !self.context.borrow().is_empty();
        self.context.borrow_mut().clear();
        Ok(had)
    }

    fn path(&self) -> Result<std::path::PathBuf> {
        Ok(std::path::PathBuf::from("memory"))
    }
}

// ── Provider ─────────────────────────────────────────────────────────────────

/// Stack provider that records requests instead of calling AWS.
pub struct FakeProvider {
    pub account: String,
    pub outputs: StackOutputs,
    pub deployed: RefCell<Vec<(String, String)>>,
    pub deleted: RefCell<Vec<String>>,
    pub fail_deploy: bool,
}

impl FakeProvider {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            outputs: StackOutputs::from_pairs([
                ("InstanceId", "i-0123456789abcdef0"),
                ("PublicIP", "203.0.113.10"),
                ("N8nUrl", "https://n8n.aws.yyogestiono.com"),
                ("SSHCommand", "ssh -i ~/.ssh/n8n-key.pem ec2-user@203.0.113.10"),
            ]),
            deployed: RefCell::new(Vec::new()),
            deleted: RefCell::new(Vec::new()),
            fail_deploy: false,
        }
    }
}

impl StackDeployer for FakeProvider {
    async fn deploy(&self, request: &DeployRequest<'_>) -> Result<()> {
        if self.fail_deploy {
            anyhow::bail!("deploy failed");
        }
        self.deployed
            .borrow_mut()
            .push((request.stack_name.to_string(), request.template_body.to_string()));
        Ok(())
    }

    async fn describe_outputs(&self, _stack_name: &str, _region: &str) -> Result<StackOutputs> {
        Ok(self.outputs.clone())
    }

    async fn delete(&self, stack_name: &str, _region: &str) -> Result<()> {
        self.deleted.borrow_mut().push(stack_name.to_string());
        Ok(())
    }
}

impl IdentityProbe for FakeProvider {
    async fn caller_account(&self, _region: &str) -> Result<String> {
        Ok(self.account.clone())
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    pub events: RefCell<Vec<String>>,
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.borrow_mut().push(format!("step: {message}"));
    }

    fn success(&self, message: &str) {
        self.events.borrow_mut().push(format!("ok: {message}"));
    }

    fn warn(&self, message: &str) {
        self.events.borrow_mut().push(format!("warn: {message}"));
    }
}
