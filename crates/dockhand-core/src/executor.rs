//! Remote command execution
//!
//! Every external process dockhand starts goes through [`Executor`]: shell
//! commands on the master node, on a worker machine over ssh, or on the
//! operator's own host, plus plain argv invocations of docker-machine, docker
//! and docker-compose.
//!
//! Process spawning itself sits behind the [`CommandRunner`] trait so the
//! orchestration code can be tested against a recording runner.

use crate::error::{CoreError, Result};
use crate::shell::shell_escape;
use async_trait::async_trait;
use dockhand_config::Settings;
use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// A fully specified external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Do not echo the diagnostic stream to the operator's terminal
    pub silent: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {}", shell_escape(arg))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns external processes
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput>;
}

/// Production runner on `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !spec.silent && !stderr.is_empty() {
            eprint!("{}", stderr);
        }

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr,
        })
    }
}

/// Where a shell command runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The fixed master node, reached with the operator's default key
    Master,
    /// The operator's own host, no transport
    Local,
    /// A provisioned worker, reached with its docker-machine key
    Machine { name: String, ip: String },
}

impl Target {
    pub const MASTER: &'static str = "master";
    pub const LOCAL: &'static str = "local";

    pub fn name(&self) -> &str {
        match self {
            Target::Master => Self::MASTER,
            Target::Local => Self::LOCAL,
            Target::Machine { name, .. } => name,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    pub silent: bool,
    /// Connect with the operator's default credential instead of the
    /// machine's own key
    pub use_operator_key: bool,
}

impl ExecOptions {
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Default::default()
        }
    }

    pub fn with_operator_key(mut self) -> Self {
        self.use_operator_key = true;
        self
    }
}

/// The single egress point for external commands
#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl Executor {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { runner, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run an argv command on the operator host and capture it, whatever its
    /// exit status
    pub async fn run_output(&self, spec: CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", spec);
        self.runner
            .run(&spec)
            .await
            .map_err(|source| CoreError::Spawn {
                program: spec.program.clone(),
                source,
            })
    }

    /// Run an argv command on the operator host; non-zero exit is an error
    pub async fn run(&self, spec: CommandSpec) -> Result<String> {
        let rendered = spec.to_string();
        let output = self.run_output(spec).await?;
        check(rendered, output)
    }

    /// Build the process invocation for a shell command on a target
    pub fn command_for(
        &self,
        target: &Target,
        command: &str,
        options: ExecOptions,
    ) -> Result<CommandSpec> {
        let user = &self.settings.ssh_user;
        let spec = match target {
            Target::Local => CommandSpec::new("sh").arg("-c").arg(command),
            Target::Master => {
                let address = self.settings.require_master_address()?;
                ssh_base()
                    .arg(format!("{}@{}", user, address))
                    .arg(command)
            }
            Target::Machine { name, ip } => {
                let mut spec = ssh_base().args(["-o", "StrictHostKeyChecking=accept-new"]);
                if !options.use_operator_key {
                    spec = spec
                        .arg("-i")
                        .arg(self.settings.machine_key_path(name).display().to_string());
                }
                spec.arg(format!("{}@{}", user, ip)).arg(command)
            }
        };
        Ok(spec.silent(options.silent))
    }

    /// Run a shell command on a target and return its stdout
    pub async fn execute(
        &self,
        target: &Target,
        command: &str,
        options: ExecOptions,
    ) -> Result<String> {
        tracing::debug!(host = %target, "Executing: {}", command);
        let spec = self.command_for(target, command, options)?;
        self.run(spec).await
    }

    /// Run a command whose failure only means "not yet"; `Ok(false)` on a
    /// non-zero exit, spawn errors still propagate
    pub async fn probe(
        &self,
        target: &Target,
        command: &str,
        options: ExecOptions,
    ) -> Result<bool> {
        match self.execute(target, command, options).await {
            Ok(_) => Ok(true),
            Err(CoreError::CommandFailed { command, code, .. }) => {
                tracing::debug!(host = %target, ?code, "Probe failed: {}", command);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

fn ssh_base() -> CommandSpec {
    CommandSpec::new("ssh").args(["-o", "BatchMode=yes"])
}

fn check(command: String, output: CommandOutput) -> Result<String> {
    if output.is_success() {
        Ok(output.stdout)
    } else {
        Err(CoreError::CommandFailed {
            command,
            code: output.code,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRunner;

    fn executor(runner: Arc<MockRunner>) -> Executor {
        let settings = Settings {
            master_address: "master.example.com".into(),
            machine_storage_path: "/opt/machine".into(),
            ..Default::default()
        };
        Executor::new(runner, Arc::new(settings))
    }

    fn worker() -> Target {
        Target::Machine {
            name: "web-1".into(),
            ip: "10.0.0.5".into(),
        }
    }

    #[test]
    fn test_command_spec_display_quotes_whitespace() {
        let spec = CommandSpec::new("ssh").arg("root@host").arg("cat /proc/swaps");
        assert_eq!(spec.to_string(), "ssh root@host 'cat /proc/swaps'");
    }

    #[test]
    fn test_command_for_master() {
        let exec = executor(Arc::new(MockRunner::new()));
        let spec = exec
            .command_for(&Target::Master, "uptime", ExecOptions::default())
            .unwrap();
        assert_eq!(spec.program, "ssh");
        assert_eq!(spec.args, vec!["-o", "BatchMode=yes", "root@master.example.com", "uptime"]);
    }

    #[test]
    fn test_command_for_machine_uses_machine_key() {
        let exec = executor(Arc::new(MockRunner::new()));
        let spec = exec
            .command_for(&worker(), "pwd", ExecOptions::silent())
            .unwrap();
        assert!(spec.silent);
        assert!(spec.to_string().contains("-i /opt/machine/machines/web-1/id_rsa root@10.0.0.5 pwd"));
    }

    #[test]
    fn test_command_for_machine_with_operator_key() {
        let exec = executor(Arc::new(MockRunner::new()));
        let spec = exec
            .command_for(&worker(), "pwd", ExecOptions::default().with_operator_key())
            .unwrap();
        assert!(!spec.args.contains(&"-i".to_string()));
        assert_eq!(spec.args.last().unwrap(), "pwd");
    }

    #[test]
    fn test_command_for_local_uses_shell() {
        let exec = executor(Arc::new(MockRunner::new()));
        let spec = exec
            .command_for(&Target::Local, "rsync -avz a b", ExecOptions::default())
            .unwrap();
        assert_eq!(spec.program, "sh");
        assert_eq!(spec.args, vec!["-c", "rsync -avz a b"]);
    }

    #[test]
    fn test_master_requires_address() {
        let exec = Executor::new(Arc::new(MockRunner::new()), Arc::new(Settings::default()));
        let err = exec
            .command_for(&Target::Master, "pwd", ExecOptions::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[tokio::test]
    async fn test_execute_returns_stdout() {
        let runner = Arc::new(MockRunner::new().on("uptime", CommandOutput::success("up 3 days")));
        let exec = executor(runner.clone());

        let out = exec
            .execute(&Target::Master, "uptime", ExecOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "up 3 days");
        assert_eq!(runner.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_non_zero_is_command_failed() {
        let runner = Arc::new(MockRunner::new().on("false", CommandOutput::failure(2, "boom")));
        let exec = executor(runner);

        let err = exec
            .execute(&Target::Local, "false", ExecOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(2));
        match err {
            CoreError::CommandFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_probe_maps_failure_to_false() {
        let runner = Arc::new(MockRunner::new().on("pwd", CommandOutput::failure(255, "denied")));
        let exec = executor(runner);

        let trusted = exec
            .probe(&worker(), "pwd", ExecOptions::silent().with_operator_key())
            .await
            .unwrap();
        assert!(!trusted);
    }

    #[tokio::test]
    async fn test_probe_success_is_true() {
        let exec = executor(Arc::new(MockRunner::new()));
        assert!(exec
            .probe(&worker(), "pwd", ExecOptions::silent())
            .await
            .unwrap());
    }
}
