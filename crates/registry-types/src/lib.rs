//! Validated text primitives shared across the registry crates.
//!
//! These types push simple field rules (non-blank, no digits in a person's name)
//! into construction, so a value that exists is already known to be well formed.

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// A name component contained a numeric digit
    #[error("Name cannot contain numbers")]
    ContainsDigit,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One component of a person's name (given or family).
///
/// A `NamePart` is non-blank and contains no ASCII or Unicode digits. Hyphens,
/// apostrophes and inner spaces are kept as entered ("O'Neil", "Mary Ann").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamePart(NonEmptyText);

impl NamePart {
    /// Validates and wraps a name component.
    ///
    /// # Errors
    ///
    /// - [`TextError::Empty`] if the trimmed input is empty.
    /// - [`TextError::ContainsDigit`] if any character is numeric.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = NonEmptyText::new(input)?;
        if text.as_str().chars().any(char::is_numeric) {
            return Err(TextError::ContainsDigit);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for NamePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  John  ").expect("should accept padded text");
        assert_eq!(text.as_str(), "John");
        assert_eq!(text.to_string(), "John");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new(" \t\n"), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
    }

    #[test]
    fn test_name_part_rejects_digits() {
        assert_eq!(NamePart::parse("J0hn"), Err(TextError::ContainsDigit));
        assert_eq!(NamePart::parse("   "), Err(TextError::Empty));
    }

    #[test]
    fn test_name_part_keeps_punctuation() {
        let name = NamePart::parse(" O'Neil-Smith ").expect("punctuation is allowed");
        assert_eq!(name.as_str(), "O'Neil-Smith");
    }
}
