//! # Config Loader
//!
//! Reads `application.toml` and exposes it in the shape the resolution
//! pipeline consumes: operations indexed by name and short name, predefined
//! argument tables indexed by table name, and the seed of additional args.
use crate::{
    constants::{APPLICATION_PATH_TAG, CONFIG_PATH_ENV},
    core::paths,
    errors::ResolutionError,
    models::{Application, Operation, PredefinedArg},
};
use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// The loaded configuration, indexed for lookups.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    application: Application,
    application_path: PathBuf,
    operations: HashMap<String, Operation>,
    predefined_args: HashMap<String, PredefinedArg>,
    additional_args: HashMap<String, String>,
}

impl ConfigStore {
    /// Locates the configuration file (`CONFIG_PATH` or the user config dir) and loads it.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok();
        let path = paths::resolve_config_path(explicit.as_deref(), CONFIG_PATH_ENV)
            .context("failed to read config path")?;
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to open config file '{}'", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let application: Application =
            toml::from_str(content).context("failed to decode config file")?;
        Self::new(application)
    }

    pub fn new(application: Application) -> Result<Self> {
        let application_path = paths::expand_application_path(&application.path)?;

        let mut operations = HashMap::new();
        for operation in &application.operations {
            if !operation.name.is_empty() {
                operations.insert(operation.name.clone(), operation.clone());
            }
            if !operation.short_name.is_empty() {
                operations.insert(operation.short_name.clone(), operation.clone());
            }
        }

        let predefined_args = application
            .predefined_args
            .iter()
            .filter(|arg| !arg.name.is_empty())
            .map(|arg| (arg.name.clone(), arg.clone()))
            .collect();

        let additional_args = HashMap::from([(
            APPLICATION_PATH_TAG.to_string(),
            application_path.to_string_lossy().to_string(),
        )]);

        log::debug!(
            "Loaded application '{}' with {} operation(s)",
            application.name,
            application.operations.len()
        );

        Ok(Self {
            application,
            application_path,
            operations,
            predefined_args,
            additional_args,
        })
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    /// Looks an operation up by its name or short name.
    pub fn operation(&self, name: &str) -> Result<Operation> {
        self.operations
            .get(name)
            .cloned()
            .ok_or_else(|| ResolutionError::OperationNotFound(name.to_string()).into())
    }

    pub fn predefined_args(&self) -> &HashMap<String, PredefinedArg> {
        &self.predefined_args
    }

    /// A fresh copy of the additional-args seed; callers may extend it freely.
    pub fn additional_args(&self) -> HashMap<String, String> {
        self.additional_args.clone()
    }

    pub fn application_path(&self) -> &Path {
        &self.application_path
    }
}
