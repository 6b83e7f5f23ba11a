//! Completion candidates.

/// A completion suggestion with text and description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Suggestion {
    /// The text inserted when this suggestion is confirmed
    pub text: String,
    /// Shown next to the text, never inserted
    pub description: String,
}

impl Suggestion {
    /// Create a new suggestion with the given text and description.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Suggestion;
    ///
    /// let suggestion = Suggestion::new("users", "Store the username and age");
    /// assert_eq!(suggestion.text, "users");
    /// assert_eq!(suggestion.description, "Store the username and age");
    /// ```
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }

    /// Create a suggestion with no description.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, String::new())
    }
}

impl From<&str> for Suggestion {
    fn from(text: &str) -> Self {
        Self::text_only(text)
    }
}

impl From<String> for Suggestion {
    fn from(text: String) -> Self {
        Self::text_only(text)
    }
}

impl<T: Into<String>, D: Into<String>> From<(T, D)> for Suggestion {
    /// `(text, description)` pairs.
    ///
    /// ```
    /// use promptline_core::Suggestion;
    ///
    /// let suggestion: Suggestion = ("select", "Query rows").into();
    /// assert_eq!(suggestion.description, "Query rows");
    /// ```
    fn from((text, description): (T, D)) -> Self {
        Self::new(text, description)
    }
}
