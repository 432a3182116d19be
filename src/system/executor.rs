// src/system/executor.rs

use std::fmt;
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{0}' exited with a non-zero error code.")]
    NonZeroExitStatus(String),
}

/// A fully prepared process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// The configured command line; may hold the program and leading arguments.
    pub cmd: String,
    pub args: Vec<String>,
    /// Working directory; the current one when `None`.
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Splits `cmd` and appends the prepared arguments.
    pub fn argv(&self) -> Result<Vec<String>, ExecutionError> {
        let mut argv = shlex::split(self.cmd.trim())
            .ok_or_else(|| ExecutionError::CommandParse(self.cmd.clone()))?;
        if argv.is_empty() {
            return Err(ExecutionError::EmptyCommand);
        }
        argv.extend(self.args.iter().cloned());
        Ok(argv)
    }

    /// The command line as a shell would read it, for logs and error messages.
    pub fn render(&self) -> String {
        match self.argv() {
            Ok(argv) => shlex::try_join(argv.iter().map(String::as_str))
                .unwrap_or_else(|_| argv.join(" ")),
            Err(_) => self.cmd.clone(),
        }
    }
}

/// Runs prepared commands.
pub trait CommandRunner: fmt::Debug {
    fn run(&self, spec: &CommandSpec) -> Result<(), ExecutionError>;
}

/// Spawns commands as child processes that share the terminal and the
/// environment of this process, and waits for them to finish.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandRunner for SystemExecutor {
    fn run(&self, spec: &CommandSpec) -> Result<(), ExecutionError> {
        let argv = spec.argv()?;
        let rendered = spec.render();
        let Some((program, args)) = argv.split_first() else {
            return Err(ExecutionError::EmptyCommand);
        };

        let mut command = StdCommand::new(program);
        command
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &spec.cwd {
            command.current_dir(dunce::simplified(cwd));
        }

        log::debug!("Running command: {}", rendered);
        let status = command
            .status()
            .map_err(|e| ExecutionError::CommandFailed(rendered.clone(), e))?;

        if !status.success() {
            return Err(ExecutionError::NonZeroExitStatus(rendered));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(cmd: &str, args: &[&str]) -> CommandSpec {
        CommandSpec {
            cmd: cmd.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: None,
        }
    }

    #[test]
    fn test_argv_splits_cmd() {
        let argv = spec("docker compose", &["up", "-d"]).argv().unwrap();
        assert_eq!(argv, ["docker", "compose", "up", "-d"]);
    }

    #[test]
    fn test_argv_keeps_prepared_args_whole() {
        let argv = spec("echo", &["hello world"]).argv().unwrap();
        assert_eq!(argv, ["echo", "hello world"]);
        assert_eq!(
            spec("echo", &["hello world"]).render(),
            "echo 'hello world'"
        );
    }

    #[test]
    fn test_argv_errors() {
        assert!(matches!(
            spec("   ", &[]).argv(),
            Err(ExecutionError::EmptyCommand)
        ));
        assert!(matches!(
            spec("echo \"open", &[]).argv(),
            Err(ExecutionError::CommandParse(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_reports_exit_status() {
        let executor = SystemExecutor;
        assert!(executor.run(&spec("true", &[])).is_ok());
        assert!(matches!(
            executor.run(&spec("false", &[])),
            Err(ExecutionError::NonZeroExitStatus(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let executor = SystemExecutor;
        let command = CommandSpec {
            cmd: "touch".to_string(),
            args: vec!["marker".to_string()],
            cwd: Some(dir.path().to_path_buf()),
        };

        executor.run(&command).unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_missing_program() {
        let executor = SystemExecutor;
        assert!(matches!(
            executor.run(&spec("definitely-not-a-real-program-4242", &[])),
            Err(ExecutionError::CommandFailed(_, _))
        ));
    }
}
