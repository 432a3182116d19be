// src/core/arg_preparer.rs

use crate::{
    core::{
        arg_enhancer::ArgEnhancer, flag_store::FlagSource, predefined_args::PredefinedArgSource,
    },
    models::{Flags, Operation},
};
use anyhow::{Context, Result};
use std::fmt;

/// Produces the final argument list of an operation.
pub trait ArgSource: fmt::Debug {
    fn prepare_args(&self, operation: &Operation) -> Result<Vec<String>>;
}

/// Picks the raw argument list for an operation and substitutes its tags.
///
/// The raw list is the operation's own `args` unless it declares a
/// predefined args tag. With a tag, arguments referencing it are expanded
/// from the predefined table, and an operation without `args` takes the
/// whole list from the table.
#[derive(Debug, Clone, Copy)]
pub struct ArgPreparer<'a> {
    flags: &'a dyn FlagSource,
    enhancer: &'a dyn ArgEnhancer,
    predefined_args: &'a dyn PredefinedArgSource,
}

impl<'a> ArgPreparer<'a> {
    pub fn new(
        flags: &'a dyn FlagSource,
        enhancer: &'a dyn ArgEnhancer,
        predefined_args: &'a dyn PredefinedArgSource,
    ) -> Self {
        Self {
            flags,
            enhancer,
            predefined_args,
        }
    }

    fn raw_args(&self, operation: &Operation, flags: &Flags) -> Result<Vec<String>> {
        let Some(predefined_args_tag) = &operation.predefined_args_tag else {
            return Ok(operation.args.clone());
        };

        if !operation.args.is_empty() {
            return self
                .enhancer
                .get_enhanced_operation_args(operation, flags)
                .context("failed to enhance with operation args");
        }

        self.predefined_args
            .get_predefined_arg_values(predefined_args_tag, flags)
            .context("failed to get predefined args")
    }
}

impl ArgSource for ArgPreparer<'_> {
    fn prepare_args(&self, operation: &Operation) -> Result<Vec<String>> {
        let flags = self.flags.operation_flags(operation);

        let args = self
            .raw_args(operation, &flags)
            .context("failed to enhance args")?;
        if args.is_empty() {
            return Ok(args);
        }

        self.enhancer
            .enhance_args(operation, &flags, &args)
            .context("failed to enhance args")
    }
}
