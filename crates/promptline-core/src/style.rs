//! Presentation settings handed to the renderer.
//!
//! Nothing in the editing core reads these values; they travel untouched
//! from the configuration to every [`Renderer::render`](crate::Renderer::render)
//! call. Encoding them as escape sequences is the renderer's job.

/// Color specification for one styled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// Whatever the terminal uses when no color is set
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb(u8, u8, u8),
    Ansi256(u8),
}

/// Title, prefix and the colors of every region the renderer paints.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StyleConfig {
    /// Terminal window title, left alone when `None`
    pub title: Option<String>,
    /// Static prefix shown when no live label is supplied
    pub prefix: String,

    pub prefix_text: Color,
    pub prefix_background: Color,
    pub input_text: Color,
    pub input_background: Color,
    pub preview_suggestion_text: Color,
    pub preview_suggestion_background: Color,
    pub suggestion_text: Color,
    pub suggestion_background: Color,
    pub selected_suggestion_text: Color,
    pub selected_suggestion_background: Color,
    pub description_text: Color,
    pub description_background: Color,
    pub selected_description_text: Color,
    pub selected_description_background: Color,
    pub scrollbar_thumb: Color,
    pub scrollbar_background: Color,
}

impl Default for StyleConfig {
    fn default() -> Self {
        StyleConfig {
            title: None,
            prefix: "> ".to_string(),
            prefix_text: Color::Blue,
            prefix_background: Color::Default,
            input_text: Color::Default,
            input_background: Color::Default,
            preview_suggestion_text: Color::Green,
            preview_suggestion_background: Color::Default,
            suggestion_text: Color::White,
            suggestion_background: Color::Cyan,
            selected_suggestion_text: Color::Black,
            selected_suggestion_background: Color::BrightCyan,
            description_text: Color::Black,
            description_background: Color::BrightCyan,
            selected_description_text: Color::White,
            selected_description_background: Color::Cyan,
            scrollbar_thumb: Color::BrightBlack,
            scrollbar_background: Color::Cyan,
        }
    }
}

impl StyleConfig {
    /// Set the prompt prefix.
    ///
    /// ```
    /// use promptline_core::StyleConfig;
    ///
    /// let style = StyleConfig::default().with_prefix("sql> ");
    /// assert_eq!(style.prefix, "sql> ");
    /// ```
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
