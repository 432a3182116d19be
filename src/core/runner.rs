// src/core/runner.rs

use crate::{
    core::{arg_preparer::ArgSource, flag_store::FlagSource, operations::OperationSource},
    models::Operation,
    system::executor::{CommandRunner, CommandSpec},
};
use anyhow::{Context, Result};

/// Runs the operation selected on the command line, prerequisites first.
#[derive(Debug, Clone, Copy)]
pub struct Runner<'a> {
    flags: &'a dyn FlagSource,
    operations: &'a dyn OperationSource,
    args: &'a dyn ArgSource,
    executor: &'a dyn CommandRunner,
}

impl<'a> Runner<'a> {
    pub fn new(
        flags: &'a dyn FlagSource,
        operations: &'a dyn OperationSource,
        args: &'a dyn ArgSource,
        executor: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            flags,
            operations,
            args,
            executor,
        }
    }

    pub fn run(&self) -> Result<()> {
        let flags = self.flags.initial_flags();
        let operation = self
            .operations
            .get_enhanced_operation(&flags.operation)
            .context("failed to get enhanced operation")?;

        self.run_operation(&operation)
    }

    /// Runs the `run_before` tree of `operation` depth-first, then the operation itself.
    pub fn run_operation(&self, operation: &Operation) -> Result<()> {
        self.run_before(operation).context("failed to run before")?;

        log::debug!(
            "Running operation '{}' ({}): cmd '{}', args {:?}, overrides {:?}",
            operation.name,
            operation.description,
            operation.cmd,
            operation.args,
            operation.predefined_flags
        );

        let args = self
            .args
            .prepare_args(operation)
            .context("failed to prepare args")?;

        self.run_cmd(operation, args)
            .context("failed to run command")
    }

    fn run_before(&self, operation: &Operation) -> Result<()> {
        for before in &operation.run_before {
            self.run_operation(before)
                .with_context(|| format!("failed to run before operation: {}", before.name))?;
        }
        Ok(())
    }

    fn run_cmd(&self, operation: &Operation, args: Vec<String>) -> Result<()> {
        let cwd = if operation.change_path {
            let path = self
                .operations
                .get_operation_execution_path(&operation.name)
                .context("failed to get operation execution path")?;
            Some(path)
        } else {
            None
        };

        let spec = CommandSpec {
            cmd: operation.cmd.clone(),
            args,
            cwd,
        };
        self.executor.run(&spec)?;
        Ok(())
    }
}
