// src/core/arg_enhancer.rs

use crate::{
    core::{
        commons::escape_value, predefined_args::PredefinedArgSource, tag_extractor::TagExtractor,
        tag_resolver::TagValueSource,
    },
    errors::ResolutionError,
    models::{Flags, Operation},
};
use anyhow::{Context, Result};
use std::fmt;

/// Turns argument templates into concrete arguments.
pub trait ArgEnhancer: fmt::Debug {
    /// Substitutes the tags of every argument in `args`.
    fn enhance_args(
        &self,
        operation: &Operation,
        flags: &Flags,
        args: &[String],
    ) -> Result<Vec<String>>;

    /// Expands the arguments of `operation` that reference its predefined
    /// args tag into the matching predefined values.
    fn get_enhanced_operation_args(
        &self,
        operation: &Operation,
        flags: &Flags,
    ) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy)]
pub struct Enhancer<'a> {
    tag_extractor: &'a dyn TagExtractor,
    tag_values: &'a dyn TagValueSource,
    predefined_args: &'a dyn PredefinedArgSource,
}

impl<'a> Enhancer<'a> {
    pub fn new(
        tag_extractor: &'a dyn TagExtractor,
        tag_values: &'a dyn TagValueSource,
        predefined_args: &'a dyn PredefinedArgSource,
    ) -> Self {
        Self {
            tag_extractor,
            tag_values,
            predefined_args,
        }
    }

    fn enhance_arg(&self, operation: &Operation, flags: &Flags, arg: &str) -> Result<String> {
        let tags = self.tag_extractor.extract_tags(arg);

        // Every tag is substituted into the original template, so with several
        // tags only the substitution of the last one survives.
        let mut enhanced = arg.to_string();
        for tag in &tags {
            let name = self
                .tag_extractor
                .extract_tag(tag)
                .context("failed to extract tag")?;
            let value = self
                .tag_values
                .get_tag_value(operation, flags, &name)
                .context("failed to get tag value")?;
            let value = self
                .predefined_args
                .try_to_find_predefined_arg_value(&name, &value);

            enhanced = escape_value(&arg.replace(tag.as_str(), &value))
                .context("failed to escape value")?;
        }

        Ok(enhanced)
    }
}

impl ArgEnhancer for Enhancer<'_> {
    fn enhance_args(
        &self,
        operation: &Operation,
        flags: &Flags,
        args: &[String],
    ) -> Result<Vec<String>> {
        args.iter()
            .map(|arg| self.enhance_arg(operation, flags, arg))
            .collect()
    }

    fn get_enhanced_operation_args(
        &self,
        operation: &Operation,
        flags: &Flags,
    ) -> Result<Vec<String>> {
        let predefined_args_tag = operation
            .predefined_args_tag
            .as_ref()
            .ok_or(ResolutionError::NilInput("predefined args tag"))?;

        let mut args = Vec::with_capacity(operation.args.len());
        for arg in &operation.args {
            let names = self
                .tag_extractor
                .extract_tags(arg)
                .iter()
                .map(|tag| self.tag_extractor.extract_tag(tag))
                .collect::<Result<Vec<_>, _>>()
                .context("failed to extract tag")?;

            if !names.iter().any(|name| *name == predefined_args_tag.name) {
                args.push(arg.clone());
                continue;
            }

            let values = self
                .predefined_args
                .get_predefined_arg_values(predefined_args_tag, flags)
                .context("failed to get predefined args")?;
            if values.is_empty() {
                args.push(arg.clone());
            } else {
                args.extend(values);
            }
        }

        Ok(args)
    }
}
