// src/core/tag_extractor.rs

use crate::errors::ResolutionError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref TAG_RE: Regex =
        Regex::new(r"\$\{\{([a-zA-Z0-9-]+)\}\}").expect("tag pattern must compile");
}

/// A raw `${{name}}` token, delimiters included, as found in an argument template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds and decodes placeholder tags.
pub trait TagExtractor: fmt::Debug {
    /// All non-overlapping tags of `arg`, left to right.
    fn extract_tags(&self, arg: &str) -> Vec<Tag>;

    /// The inner name of a raw tag.
    fn extract_tag(&self, tag: &Tag) -> Result<String, ResolutionError>;
}

/// The [`TagExtractor`] backed by the `${{name}}` pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexTagExtractor;

impl RegexTagExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TagExtractor for RegexTagExtractor {
    fn extract_tags(&self, arg: &str) -> Vec<Tag> {
        TAG_RE
            .find_iter(arg)
            .map(|m| Tag::new(m.as_str()))
            .collect()
    }

    fn extract_tag(&self, tag: &Tag) -> Result<String, ResolutionError> {
        let name = TAG_RE
            .captures(tag.as_str())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ResolutionError::TagValueNotFound(tag.to_string()))?;

        log::debug!("Extracted tag '{}' -> '{}'", tag, name);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tags() {
        let extractor = RegexTagExtractor::new();

        let tags = extractor.extract_tags("--env=${{env}} --out=${{out-dir2}}");
        assert_eq!(tags, vec![Tag::new("${{env}}"), Tag::new("${{out-dir2}}")]);

        assert!(extractor.extract_tags("plain-arg").is_empty());
        assert!(extractor.extract_tags("").is_empty());
    }

    #[test]
    fn test_extract_tags_ignores_invalid_tokens() {
        let extractor = RegexTagExtractor::new();
        assert!(extractor.extract_tags("${{}}").is_empty());
        assert!(extractor.extract_tags("${{with space}}").is_empty());
        assert!(extractor.extract_tags("${{under_score}}").is_empty());
        assert!(extractor.extract_tags("${env}").is_empty());
    }

    #[test]
    fn test_extract_tags_keeps_duplicates_in_order() {
        let extractor = RegexTagExtractor::new();
        let tags = extractor.extract_tags("${{a}}${{b}}${{a}}");
        assert_eq!(
            tags,
            vec![Tag::new("${{a}}"), Tag::new("${{b}}"), Tag::new("${{a}}")]
        );
    }

    #[test]
    fn test_extract_tag() {
        let extractor = RegexTagExtractor::new();
        assert_eq!(
            extractor.extract_tag(&Tag::new("${{dynamic-flag}}")),
            Ok("dynamic-flag".to_string())
        );

        let err = extractor.extract_tag(&Tag::new("tag1")).unwrap_err();
        assert_eq!(err, ResolutionError::TagValueNotFound("tag1".to_string()));
        assert_eq!(
            err.to_string(),
            "tag 'tag1' is not valid: tag value not found"
        );
    }
}
