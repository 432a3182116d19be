// src/errors.rs

use thiserror::Error;

/// Semantic failures of the argument resolution pipeline.
///
/// Components return these at the root of an error chain; every component
/// boundary then adds one line of context on top through `anyhow`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("operation not provided")]
    OperationNotProvided,
    #[error("operation {0} not found")]
    OperationNotFound(String),
    #[error("tag '{0}' is not valid: tag value not found")]
    TagValueNotFound(String),
    #[error("predefined arg {0} not found")]
    PredefinedArgNotFound(String),
    #[error("arg {0} not found")]
    PredefinedArgValueNotFound(String),
    #[error("additional arg {0} not found")]
    AdditionalArgNotFound(String),
    #[error("flag {0} not found")]
    FlagNotFound(String),
    #[error("flag {0} is nil")]
    FlagNilValue(String),
    #[error("flag {name} is not {expected}")]
    FlagWrongType { name: String, expected: &'static str },
    #[error("flag {0} is empty")]
    FlagEmpty(String),
    #[error("nil input: {0}")]
    NilInput(&'static str),
    #[error("run before chain of {0} exceeds the maximum depth of {1}")]
    RecursionLimit(String, usize),
    #[error("cyclic run before reference: {0}")]
    CyclicRunBefore(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_chain_wording() {
        assert_eq!(
            ResolutionError::AdditionalArgNotFound("tag1".to_string()).to_string(),
            "additional arg tag1 not found"
        );
        assert_eq!(
            ResolutionError::FlagWrongType {
                name: "flag".to_string(),
                expected: "a string"
            }
            .to_string(),
            "flag flag is not a string"
        );
        assert_eq!(
            ResolutionError::TagValueNotFound("tag1".to_string()).to_string(),
            "tag 'tag1' is not valid: tag value not found"
        );
    }
}
