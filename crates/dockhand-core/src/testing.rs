//! Test double for [`CommandRunner`]
//!
//! `MockRunner` records every command and answers from pattern rules; a
//! command no rule matches succeeds with empty output.

use crate::executor::{CommandOutput, CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::sync::Mutex;

struct Rule {
    pattern: String,
    output: CommandOutput,
    once: bool,
}

#[derive(Default)]
pub struct MockRunner {
    rules: Mutex<Vec<Rule>>,
    commands: Mutex<Vec<CommandSpec>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every command containing `pattern` with `output`
    pub fn on(self, pattern: impl Into<String>, output: CommandOutput) -> Self {
        self.push_rule(pattern.into(), output, false);
        self
    }

    /// Answer only the next command containing `pattern`
    pub fn once(self, pattern: impl Into<String>, output: CommandOutput) -> Self {
        self.push_rule(pattern.into(), output, true);
        self
    }

    fn push_rule(&self, pattern: String, output: CommandOutput, once: bool) {
        self.rules.lock().unwrap().push(Rule {
            pattern,
            output,
            once,
        });
    }

    /// Commands executed so far, in order
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap().clone()
    }

    /// Rendered command lines executed so far
    pub fn command_lines(&self) -> Vec<String> {
        self.commands().iter().map(ToString::to_string).collect()
    }

    /// Whether any executed command line contains `pattern`
    pub fn ran(&self, pattern: &str) -> bool {
        self.command_lines().iter().any(|c| c.contains(pattern))
    }

    /// Shell command lines handed to `sh -c` or ssh, unquoted
    pub fn shell_commands(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter(|c| c.program == "ssh" || c.program == "sh")
            .filter_map(|c| c.args.last().cloned())
            .collect()
    }

    /// Whether any shell command contains `pattern`
    pub fn ran_shell(&self, pattern: &str) -> bool {
        self.shell_commands().iter().any(|c| c.contains(pattern))
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|c| c.contains(pattern))
            .count()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        self.commands.lock().unwrap().push(spec.clone());

        let line = spec.to_string();
        let mut rules = self.rules.lock().unwrap();
        let Some(index) = rules.iter().position(|r| line.contains(&r.pattern)) else {
            return Ok(CommandOutput::success(""));
        };

        if rules[index].once {
            Ok(rules.remove(index).output)
        } else {
            Ok(rules[index].output.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_commands_in_order() {
        let runner = MockRunner::new();
        runner.run(&CommandSpec::new("echo").arg("a")).await.unwrap();
        runner.run(&CommandSpec::new("echo").arg("b")).await.unwrap();

        assert_eq!(runner.command_lines(), vec!["echo a", "echo b"]);
        assert!(runner.ran("echo b"));
        assert_eq!(runner.count("echo"), 2);
    }

    #[tokio::test]
    async fn test_shell_commands_are_unquoted() {
        let runner = MockRunner::new();
        runner
            .run(&CommandSpec::new("ssh").args(["root@host", "echo 'a b' >> f"]))
            .await
            .unwrap();
        runner.run(&CommandSpec::new("docker").arg("ps")).await.unwrap();

        assert_eq!(runner.shell_commands(), vec!["echo 'a b' >> f"]);
        assert!(runner.ran_shell("'a b'"));
    }

    #[tokio::test]
    async fn test_once_rule_is_consumed() {
        let runner = MockRunner::new()
            .once("ls", CommandOutput::success("first"))
            .on("ls", CommandOutput::success("later"));

        let spec = CommandSpec::new("ls");
        assert_eq!(runner.run(&spec).await.unwrap().stdout, "first");
        assert_eq!(runner.run(&spec).await.unwrap().stdout, "later");
        assert_eq!(runner.run(&spec).await.unwrap().stdout, "later");
    }

    #[tokio::test]
    async fn test_unmatched_defaults_to_success() {
        let runner = MockRunner::new().on("docker", CommandOutput::failure(1, "nope"));
        let out = runner.run(&CommandSpec::new("uptime")).await.unwrap();
        assert!(out.is_success());
        assert!(out.stdout.is_empty());
    }
}
