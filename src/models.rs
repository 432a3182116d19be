// src/models.rs

use crate::{constants::VALUE_SEPARATOR, errors::ResolutionError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// --- `application.toml` MODELS (What is read from the configuration file) ---

/// Represents the deserialized structure of an `application.toml` file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Application {
    #[serde(default)]
    pub name: String,
    /// Root directory of the application the operations work on.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub dynamic_flags: Vec<DynamicFlag>,
    #[serde(default)]
    pub predefined_args: Vec<PredefinedArg>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// A named, configured unit of executable work.
///
/// Entries of `run_before` are stubs in the file (a name and optional flag
/// overrides); they are replaced by the full operation before execution.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Operation {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub cmd: String,
    pub args: Vec<String>,
    pub execution_path: String,
    pub change_path: bool,
    pub predefined_args_tag: Option<PredefinedArgsTag>,
    pub run_before: Vec<Operation>,
    pub predefined_flags: Vec<PredefinedFlag>,
}

/// Points an operation at a predefined-argument table.
///
/// `name` is the flag whose current value selects the entry, `value` is the
/// name of the table.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PredefinedArgsTag {
    pub name: String,
    pub value: String,
}

/// A flag value forced by an operation, layered over the parsed flags.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PredefinedFlag {
    pub name: String,
    pub value: String,
}

/// A flag declared in the configuration and exposed on the command line.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DynamicFlag {
    pub name: String,
    pub short_name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub default: String,
}

/// A named substitution table.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PredefinedArg {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: FlagType,
    pub args: Vec<Arg>,
}

impl PredefinedArg {
    /// Returns the values of the entry whose key is `name`.
    pub fn get_arg_values(&self, name: &str) -> Result<&[String], ResolutionError> {
        self.args
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| arg.values.as_slice())
            .ok_or_else(|| ResolutionError::PredefinedArgValueNotFound(name.to_string()))
    }
}

/// One entry of a predefined-argument table.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

// --- RUNTIME FLAG MODELS ---

/// Declared type of a dynamic flag.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    #[default]
    String,
    Array,
}

/// The stored representation of a flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Str(String),
    Array(Vec<String>),
}

/// A flag value together with the type it was declared with.
///
/// `value` is `None` when the flag is known but nothing was stored for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicFlagValue {
    pub name: String,
    pub flag_type: FlagType,
    pub value: Option<FlagValue>,
}

impl DynamicFlagValue {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag_type: FlagType::String,
            value: Some(FlagValue::Str(value.into())),
        }
    }

    pub fn array<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            flag_type: FlagType::Array,
            value: Some(FlagValue::Array(
                values.into_iter().map(Into::into).collect(),
            )),
        }
    }

    /// Typed access to a string flag.
    pub fn as_str(&self) -> Result<&str, ResolutionError> {
        match (self.flag_type, &self.value) {
            (_, None) => Err(ResolutionError::FlagNilValue(self.name.clone())),
            (FlagType::String, Some(FlagValue::Str(value))) => Ok(value),
            _ => Err(ResolutionError::FlagWrongType {
                name: self.name.clone(),
                expected: "a string",
            }),
        }
    }

    /// Typed access to an array flag. An empty list counts as absent.
    pub fn as_array(&self) -> Result<&[String], ResolutionError> {
        match (self.flag_type, &self.value) {
            (_, None) => Err(ResolutionError::FlagNilValue(self.name.clone())),
            (FlagType::Array, Some(FlagValue::Array(values))) if values.is_empty() => {
                Err(ResolutionError::FlagEmpty(self.name.clone()))
            }
            (FlagType::Array, Some(FlagValue::Array(values))) => Ok(values),
            _ => Err(ResolutionError::FlagWrongType {
                name: self.name.clone(),
                expected: "an array",
            }),
        }
    }

    /// Renders the value as it is substituted into an argument; arrays are comma-joined.
    pub fn to_arg_string(&self) -> Result<String, ResolutionError> {
        match self.flag_type {
            FlagType::String => self.as_str().map(str::to_string),
            FlagType::Array => self.as_array().map(|values| values.join(VALUE_SEPARATOR)),
        }
    }
}

/// The resolved flag values of one invocation scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// Name (or short name) of the operation to run.
    pub operation: String,
    pub dynamic_flags: HashMap<String, DynamicFlagValue>,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under its own name, replacing any previous entry.
    pub fn insert(&mut self, value: DynamicFlagValue) {
        self.dynamic_flags.insert(value.name.clone(), value);
    }

    pub fn validate(&self) -> Result<(), ResolutionError> {
        if self.operation.is_empty() {
            return Err(ResolutionError::OperationNotProvided);
        }
        Ok(())
    }

    fn get(&self, flag: &str) -> Result<&DynamicFlagValue, ResolutionError> {
        self.dynamic_flags
            .get(flag)
            .ok_or_else(|| ResolutionError::FlagNotFound(flag.to_string()))
    }

    /// Best-effort read: empty string on any failure.
    pub fn get_flag_string_value(&self, flag: &str) -> String {
        self.get_required_flag_string_value(flag).unwrap_or_default()
    }

    pub fn get_required_flag_string_value(&self, flag: &str) -> Result<String, ResolutionError> {
        self.get(flag)?.as_str().map(str::to_string)
    }

    pub fn get_required_flag_array_value(
        &self,
        flag: &str,
    ) -> Result<Vec<String>, ResolutionError> {
        self.get(flag)?.as_array().map(<[String]>::to_vec)
    }

    /// Best-effort read: empty list on any failure.
    pub fn get_flag_array_value(&self, flag: &str) -> Vec<String> {
        self.get_required_flag_array_value(flag).unwrap_or_default()
    }
}
