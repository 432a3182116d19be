// src/core/predefined_args.rs

use crate::{
    constants::{VALUE_SEPARATOR, WILDCARD_ARG_KEY},
    core::config_loader::ConfigStore,
    errors::ResolutionError,
    models::{Flags, PredefinedArgsTag},
};
use anyhow::{Context, Result};
use std::fmt;

/// Lookups into the predefined-argument tables.
pub trait PredefinedArgSource: fmt::Debug {
    /// Replaces `value` by the comma-joined entry `value` of table `table`.
    /// Any miss falls back to `value` itself.
    fn try_to_find_predefined_arg_value(&self, table: &str, value: &str) -> String;

    /// The entry of table `tag.value` keyed by the current value of flag
    /// `tag.name`, or the table's `*` entry.
    fn get_predefined_arg_values(
        &self,
        tag: &PredefinedArgsTag,
        flags: &Flags,
    ) -> Result<Vec<String>>;
}

/// [`PredefinedArgSource`] over the tables of the loaded configuration.
#[derive(Debug, Clone, Copy)]
pub struct PredefinedArgResolver<'a> {
    config: &'a ConfigStore,
}

impl<'a> PredefinedArgResolver<'a> {
    pub fn new(config: &'a ConfigStore) -> Self {
        Self { config }
    }
}

impl PredefinedArgSource for PredefinedArgResolver<'_> {
    fn try_to_find_predefined_arg_value(&self, table: &str, value: &str) -> String {
        let Some(predefined_arg) = self.config.predefined_args().get(table) else {
            log::debug!(
                "No predefined arg table '{}', keeping value '{}'",
                table,
                value
            );
            return value.to_string();
        };

        match predefined_arg.get_arg_values(value) {
            Ok(values) => values.join(VALUE_SEPARATOR),
            Err(e) => {
                log::debug!(
                    "Failed to get predefined arg values (table '{}', value '{}'): {}",
                    table,
                    value,
                    e
                );
                value.to_string()
            }
        }
    }

    fn get_predefined_arg_values(
        &self,
        tag: &PredefinedArgsTag,
        flags: &Flags,
    ) -> Result<Vec<String>> {
        let predefined_arg = self
            .config
            .predefined_args()
            .get(&tag.value)
            .ok_or_else(|| ResolutionError::PredefinedArgNotFound(tag.value.clone()))?;

        let value = flags
            .get_required_flag_string_value(&tag.name)
            .context("failed to get flag value")?;

        let values = match predefined_arg.get_arg_values(&value) {
            Ok(values) => values,
            Err(_) => predefined_arg
                .get_arg_values(WILDCARD_ARG_KEY)
                .with_context(|| {
                    format!(
                        "failed to get arg values for value {} or common value ({})",
                        value, WILDCARD_ARG_KEY
                    )
                })?,
        };

        Ok(values.to_vec())
    }
}
