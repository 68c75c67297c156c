//! URL slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// The input string is empty (or slugified to nothing).
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9_-]`.
    #[error("slug may only contain lowercase letters, digits, hyphens and underscores")]
    InvalidCharacter,
}

/// A URL-safe identifier derived from an entity name.
///
/// Slugs appear in URLs (`/toolkit/{slug}`) and must be stable, lowercase
/// and free of characters that need percent-encoding.
///
/// ## Constraints
///
/// - Length: 1-50 characters
/// - Characters: `a-z`, `0-9`, `-`, `_`
///
/// ## Examples
///
/// ```
/// use neurolab_core::Slug;
///
/// assert!(Slug::parse("spike-sorting").is_ok());
/// assert!(Slug::parse("Spike Sorting").is_err());
///
/// let derived = Slug::slugify("Spike Sorting (v2)").unwrap();
/// assert_eq!(derived.as_str(), "spike-sorting-v2");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(transparent))]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 50;

    /// Parse a `Slug` from a string, validating the character set.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or contains a
    /// character outside `[a-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(SlugError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a free-form name.
    ///
    /// Lowercases ASCII letters, keeps digits and underscores, collapses
    /// whitespace and punctuation runs into single hyphens, and trims
    /// leading/trailing hyphens.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if nothing slug-worthy remains.
    pub fn slugify(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
            } else if c == '_' {
                out.push('_');
            } else if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        }

        while out.ends_with('-') {
            out.pop();
        }

        out.truncate(Self::MAX_LENGTH);
        while out.ends_with('-') {
            out.pop();
        }

        if out.is_empty() {
            return Err(SlugError::Empty);
        }

        Ok(Self(out))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("spike-sorting").is_ok());
        assert!(Slug::parse("eeg_preprocessing").is_ok());
        assert!(Slug::parse("v2").is_ok());
    }

    #[test]
    fn test_parse_rejects_uppercase_and_spaces() {
        assert!(matches!(
            Slug::parse("Spike"),
            Err(SlugError::InvalidCharacter)
        ));
        assert!(matches!(
            Slug::parse("spike sorting"),
            Err(SlugError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Slug::parse(""), Err(SlugError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(51);
        assert!(matches!(Slug::parse(&long), Err(SlugError::TooLong { .. })));
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(Slug::slugify("Spike Sorting").unwrap().as_str(), "spike-sorting");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(
            Slug::slugify("EEG -- Preprocessing (v2)").unwrap().as_str(),
            "eeg-preprocessing-v2"
        );
    }

    #[test]
    fn test_slugify_keeps_underscores() {
        assert_eq!(
            Slug::slugify("raw_data loader").unwrap().as_str(),
            "raw_data-loader"
        );
    }

    #[test]
    fn test_slugify_empty_input() {
        assert!(matches!(Slug::slugify("!!!"), Err(SlugError::Empty)));
        assert!(matches!(Slug::slugify(""), Err(SlugError::Empty)));
    }

    #[test]
    fn test_slugify_truncates() {
        let slug = Slug::slugify(&"word ".repeat(30)).unwrap();
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_slugify_result_parses() {
        let slug = Slug::slugify("Naturalistic Visual Scenes!").unwrap();
        assert!(Slug::parse(slug.as_str()).is_ok());
    }
}
