// src/core/tag_resolver.rs

use crate::{
    constants::EXECUTION_PATH_TAG,
    core::config_loader::ConfigStore,
    errors::ResolutionError,
    models::{Flags, Operation},
};
use anyhow::{Context, Result};
use std::{collections::HashMap, fmt};

/// Maps a decoded tag name to the value substituted for it.
pub trait TagValueSource: fmt::Debug {
    fn get_tag_value(&self, operation: &Operation, flags: &Flags, tag: &str) -> Result<String>;
}

/// Resolves tags against the operation's flags first, then the additional args.
#[derive(Debug, Clone, Copy)]
pub struct TagResolver<'a> {
    config: &'a ConfigStore,
}

impl<'a> TagResolver<'a> {
    pub fn new(config: &'a ConfigStore) -> Self {
        Self { config }
    }

    fn additional_args(&self, operation: &Operation) -> HashMap<String, String> {
        let mut additional_args = self.config.additional_args();
        if operation.change_path {
            let execution_path = self
                .config
                .application_path()
                .join(&operation.execution_path);
            additional_args.insert(
                EXECUTION_PATH_TAG.to_string(),
                execution_path.to_string_lossy().to_string(),
            );
        }
        additional_args
    }

    fn check_additional_args(
        &self,
        operation: &Operation,
        tag: &str,
    ) -> Result<String, ResolutionError> {
        self.additional_args(operation)
            .remove(tag)
            .ok_or_else(|| ResolutionError::AdditionalArgNotFound(tag.to_string()))
    }
}

impl TagValueSource for TagResolver<'_> {
    fn get_tag_value(&self, operation: &Operation, flags: &Flags, tag: &str) -> Result<String> {
        if let Some(flag) = flags.dynamic_flags.get(tag) {
            return flag.to_arg_string().context("failed to get flag value");
        }

        self.check_additional_args(operation, tag)
            .context("failed to check additional args")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Application, DynamicFlagValue, FlagType};
    use std::path::Path;

    fn store() -> ConfigStore {
        ConfigStore::new(Application {
            path: "application-path".to_string(),
            ..Application::default()
        })
        .unwrap()
    }

    fn operation(change_path: bool) -> Operation {
        Operation {
            name: "operation".to_string(),
            execution_path: "execution-path".to_string(),
            change_path,
            ..Operation::default()
        }
    }

    #[test]
    fn test_flag_value_wins() {
        let config = store();
        let resolver = TagResolver::new(&config);
        let mut flags = Flags::new();
        flags.insert(DynamicFlagValue::string("application-path", "from-flag"));

        let value = resolver
            .get_tag_value(&operation(false), &flags, "application-path")
            .unwrap();
        assert_eq!(value, "from-flag");
    }

    #[test]
    fn test_array_flag_is_joined() {
        let config = store();
        let resolver = TagResolver::new(&config);
        let mut flags = Flags::new();
        flags.insert(DynamicFlagValue::array("flag", ["a", "b"]));

        assert_eq!(
            resolver
                .get_tag_value(&operation(false), &flags, "flag")
                .unwrap(),
            "a,b"
        );
    }

    #[test]
    fn test_invalid_flag_value_is_reported() {
        let config = store();
        let resolver = TagResolver::new(&config);
        let mut flags = Flags::new();
        flags.insert(DynamicFlagValue {
            name: "flag".to_string(),
            flag_type: FlagType::String,
            value: None,
        });

        let err = resolver
            .get_tag_value(&operation(false), &flags, "flag")
            .unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "failed to get flag value: flag flag is nil"
        );
    }

    #[test]
    fn test_application_path_from_additional_args() {
        let config = store();
        let resolver = TagResolver::new(&config);

        let value = resolver
            .get_tag_value(&operation(false), &Flags::new(), "application-path")
            .unwrap();
        assert_eq!(value, "application-path");
    }

    #[test]
    fn test_execution_path_requires_change_path() {
        let config = store();
        let resolver = TagResolver::new(&config);

        let value = resolver
            .get_tag_value(&operation(true), &Flags::new(), "execution-path")
            .unwrap();
        assert_eq!(
            Path::new(&value),
            Path::new("application-path").join("execution-path")
        );

        let err = resolver
            .get_tag_value(&operation(false), &Flags::new(), "execution-path")
            .unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "failed to check additional args: additional arg execution-path not found"
        );
    }

    #[test]
    fn test_execution_path_does_not_leak_between_calls() {
        let config = store();
        let resolver = TagResolver::new(&config);

        resolver
            .get_tag_value(&operation(true), &Flags::new(), "execution-path")
            .unwrap();
        assert!(!config.additional_args().contains_key(EXECUTION_PATH_TAG));
    }

    #[test]
    fn test_unknown_tag() {
        let config = store();
        let resolver = TagResolver::new(&config);

        let err = resolver
            .get_tag_value(&operation(false), &Flags::new(), "tag1")
            .unwrap_err();
        assert_eq!(
            err.root_cause().downcast_ref::<ResolutionError>(),
            Some(&ResolutionError::AdditionalArgNotFound("tag1".to_string()))
        );
    }
}
