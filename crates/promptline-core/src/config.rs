//! Engine configuration.
//!
//! An [`EngineConfig`] is built once through [`EngineConfigBuilder`], which
//! validates everything up front. After `build()` the value is frozen; the
//! engine only reads it.
//!
//! # Examples
//!
//! ```
//! use promptline_core::{Action, EngineConfig, Key, KeyBindMode};
//!
//! let config = EngineConfig::builder()
//!     .with_prefix("sql> ")
//!     .with_max_visible(8)
//!     .with_word_separator_chars(" .,")
//!     .with_history(["select 1", "select 2"])
//!     .with_key_bind_mode(KeyBindMode::Emacs)
//!     .with_key_binding(Key::ControlX, Action::Exit)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_visible(), 8);
//! assert_eq!(config.history_seed().len(), 2);
//! ```

use std::collections::HashSet;

use crate::document::WordSeparators;
use crate::error::ConfigError;
use crate::history::{History, HistoryPolicy};
use crate::key::Key;
use crate::keybind::{Action, Dispatcher, KeyBindMode, KeyBinding, RawBinding};
use crate::style::StyleConfig;

/// Number of suggestion rows shown when nothing else is configured.
pub const DEFAULT_MAX_VISIBLE: usize = 6;

/// Validated, immutable engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    max_visible: usize,
    separators: WordSeparators,
    history_seed: Vec<String>,
    history_policy: HistoryPolicy,
    max_history: Option<usize>,
    mode: KeyBindMode,
    key_bindings: Vec<KeyBinding>,
    raw_bindings: Vec<RawBinding>,
    style: StyleConfig,
    show_completion_at_start: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_visible: DEFAULT_MAX_VISIBLE,
            separators: WordSeparators::default(),
            history_seed: Vec::new(),
            history_policy: HistoryPolicy::default(),
            max_history: None,
            mode: KeyBindMode::default(),
            key_bindings: Vec::new(),
            raw_bindings: Vec::new(),
            style: StyleConfig::default(),
            show_completion_at_start: false,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    pub fn word_separators(&self) -> &WordSeparators {
        &self.separators
    }

    /// Seed history entries, oldest first.
    pub fn history_seed(&self) -> &[String] {
        &self.history_seed
    }

    pub fn history_policy(&self) -> HistoryPolicy {
        self.history_policy
    }

    pub fn max_history(&self) -> Option<usize> {
        self.max_history
    }

    pub fn key_bind_mode(&self) -> KeyBindMode {
        self.mode
    }

    pub fn key_bindings(&self) -> &[KeyBinding] {
        &self.key_bindings
    }

    pub fn raw_bindings(&self) -> &[RawBinding] {
        &self.raw_bindings
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Whether suggestions are requested before the first keystroke.
    pub fn show_completion_at_start(&self) -> bool {
        self.show_completion_at_start
    }

    /// Fresh history seeded from this configuration.
    pub fn build_history(&self) -> History {
        let history =
            History::with_entries(self.history_seed.iter().cloned()).with_policy(self.history_policy);
        match self.max_history {
            Some(max) => history.with_max_entries(max),
            None => history,
        }
    }

    /// Dispatcher tables for the configured mode and bindings.
    pub fn build_dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.mode, &self.key_bindings, &self.raw_bindings)
    }
}

/// Fluent builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of suggestion rows shown at once. Must be positive.
    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.config.max_visible = max_visible;
        self
    }

    pub fn with_word_separators(mut self, separators: WordSeparators) -> Self {
        self.config.separators = separators;
        self
    }

    /// Word separators given as a string of runes; empty means whitespace.
    pub fn with_word_separator_chars(self, chars: &str) -> Self {
        self.with_word_separators(WordSeparators::from_chars(chars))
    }

    /// Seed history entries, oldest first.
    pub fn with_history<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.history_seed = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_history_policy(mut self, policy: HistoryPolicy) -> Self {
        self.config.history_policy = policy;
        self
    }

    /// Cap the number of kept history entries.
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.config.max_history = Some(max);
        self
    }

    pub fn with_key_bind_mode(mut self, mode: KeyBindMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Bind a named key, overriding the mode's default for it.
    pub fn with_key_binding(mut self, key: Key, action: Action) -> Self {
        self.config.key_bindings.push(KeyBinding::new(key, action));
        self
    }

    /// Bind an exact byte sequence.
    pub fn with_raw_binding(mut self, sequence: impl Into<Vec<u8>>, action: Action) -> Self {
        self.config
            .raw_bindings
            .push(RawBinding::new(sequence, action));
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.config.style = style;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.style.prefix = prefix.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.style.title = Some(title.into());
        self
    }

    pub fn with_show_completion_at_start(mut self, show: bool) -> Self {
        self.config.show_completion_at_start = show;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let config = self.config;

        if config.max_visible == 0 {
            return Err(ConfigError::ZeroMaxVisible);
        }

        if config.style.prefix.chars().any(|c| c.is_control() && c != '\t') {
            return Err(ConfigError::InvalidPrefix(config.style.prefix));
        }

        let mut seen_keys = HashSet::new();
        for binding in &config.key_bindings {
            if !binding.key.is_bindable() {
                return Err(ConfigError::UnbindableKey(binding.key));
            }
            if !seen_keys.insert(binding.key) {
                return Err(ConfigError::DuplicateKeyBinding(binding.key));
            }
        }

        let mut seen_sequences = HashSet::new();
        for binding in &config.raw_bindings {
            if binding.sequence.is_empty() {
                return Err(ConfigError::EmptyRawSequence);
            }
            if !seen_sequences.insert(binding.sequence.as_slice()) {
                return Err(ConfigError::DuplicateRawBinding(binding.sequence.clone()));
            }
        }

        log::debug!(
            "engine config built: mode={:?}, {} key bindings, {} raw bindings",
            config.mode,
            config.key_bindings.len(),
            config.raw_bindings.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::builder().build().unwrap();
        assert_eq!(config.max_visible(), DEFAULT_MAX_VISIBLE);
        assert_eq!(config.key_bind_mode(), KeyBindMode::Emacs);
        assert_eq!(config.word_separators(), &WordSeparators::Whitespace);
        assert_eq!(config.style().prefix, "> ");
        assert!(!config.show_completion_at_start());
    }

    #[test]
    fn test_zero_max_visible_rejected() {
        let err = EngineConfig::builder().with_max_visible(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroMaxVisible);
    }

    #[test]
    fn test_duplicate_key_binding_rejected() {
        let err = EngineConfig::builder()
            .with_key_binding(Key::ControlX, Action::Exit)
            .with_key_binding(Key::ControlX, Action::Abort)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateKeyBinding(Key::ControlX));
    }

    #[test]
    fn test_overriding_a_default_is_not_a_conflict() {
        let config = EngineConfig::builder()
            .with_key_binding(Key::Tab, Action::Submit)
            .build()
            .unwrap();
        assert_eq!(config.key_bindings().len(), 1);
    }

    #[test]
    fn test_meta_key_binding_rejected() {
        let err = EngineConfig::builder()
            .with_key_binding(Key::NotDefined, Action::Exit)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnbindableKey(Key::NotDefined));
    }

    #[test]
    fn test_raw_binding_validation() {
        let err = EngineConfig::builder()
            .with_raw_binding(Vec::new(), Action::Exit)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyRawSequence);

        let err = EngineConfig::builder()
            .with_raw_binding(*b"\x1b[Z", Action::Exit)
            .with_raw_binding(*b"\x1b[Z", Action::Abort)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateRawBinding(b"\x1b[Z".to_vec()));
    }

    #[test]
    fn test_prefix_with_escape_rejected() {
        let err = EngineConfig::builder()
            .with_prefix("\x1b[31m> ")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrefix(_)));
    }

    #[test]
    fn test_empty_separator_chars_mean_whitespace() {
        let config = EngineConfig::builder()
            .with_word_separator_chars("")
            .build()
            .unwrap();
        assert_eq!(config.word_separators(), &WordSeparators::Whitespace);
    }

    #[test]
    fn test_history_built_from_seed() {
        let config = EngineConfig::builder()
            .with_history(["a", "b", "c"])
            .with_max_history(2)
            .build()
            .unwrap();
        let history = config.build_history();
        assert_eq!(history.entries(), ["b", "c"]);
    }
}
