// src/core/operations.rs

use crate::{core::config_loader::ConfigStore, errors::ResolutionError, models::Operation};
use anyhow::{Context, Result};
use std::{fmt, fs, path::PathBuf};

const MAX_RUN_BEFORE_DEPTH: usize = 32;

/// Access to operations ready to run.
pub trait OperationSource: fmt::Debug {
    /// The operation `name` with its `run_before` stubs replaced by the full
    /// operations they name, carrying the stub's flag overrides.
    fn get_enhanced_operation(&self, name: &str) -> Result<Operation>;

    /// The directory operation `name` runs in when it changes path.
    fn get_operation_execution_path(&self, name: &str) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy)]
pub struct OperationService<'a> {
    config: &'a ConfigStore,
}

impl<'a> OperationService<'a> {
    pub fn new(config: &'a ConfigStore) -> Self {
        Self { config }
    }

    fn resolve_run_before(
        &self,
        mut operation: Operation,
        stack: &mut Vec<String>,
    ) -> Result<Operation> {
        if stack.contains(&operation.name) {
            let chain = stack
                .iter()
                .chain(std::iter::once(&operation.name))
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ResolutionError::CyclicRunBefore(chain).into());
        }
        if stack.len() >= MAX_RUN_BEFORE_DEPTH {
            return Err(
                ResolutionError::RecursionLimit(operation.name, MAX_RUN_BEFORE_DEPTH).into(),
            );
        }

        stack.push(operation.name.clone());
        let mut run_before = Vec::with_capacity(operation.run_before.len());
        for stub in &operation.run_before {
            let mut before = self
                .config
                .operation(&stub.name)
                .with_context(|| format!("failed to get run before operation: {}", stub.name))?;
            before.predefined_flags = stub.predefined_flags.clone();
            run_before.push(self.resolve_run_before(before, stack)?);
        }
        stack.pop();

        operation.run_before = run_before;
        Ok(operation)
    }
}

impl OperationSource for OperationService<'_> {
    fn get_enhanced_operation(&self, name: &str) -> Result<Operation> {
        let operation = self.config.operation(name)?;
        self.resolve_run_before(operation, &mut Vec::new())
    }

    fn get_operation_execution_path(&self, name: &str) -> Result<PathBuf> {
        let operation = self.config.operation(name)?;
        let path = self
            .config
            .application_path()
            .join(&operation.execution_path);

        fs::metadata(&path)
            .with_context(|| format!("execution path '{}' is not accessible", path.display()))?;
        Ok(path)
    }
}
