//! Submitted lines and Older/Newer navigation.
//!
//! Persisted entries are only ever appended by [`History::add`]. Navigation
//! works on a separate working copy made of every entry plus one trailing
//! placeholder for the line that was being typed before navigation began.
//! Edits made while browsing land in the working copy and are discarded by
//! the next [`History::reset`].

/// Rule applied by [`History::add`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HistoryPolicy {
    /// Append every submitted line.
    #[default]
    KeepAll,
    /// Skip empty lines and lines equal to the newest entry.
    SkipEmptyAndDuplicates,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    working: Vec<String>,
    selected: usize,
    policy: HistoryPolicy,
    max_entries: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        History::new()
    }
}

impl History {
    pub fn new() -> Self {
        History {
            entries: Vec::new(),
            working: vec![String::new()],
            selected: 0,
            policy: HistoryPolicy::default(),
            max_entries: None,
        }
    }

    /// History seeded with `entries`, oldest first.
    ///
    /// ```
    /// use promptline_core::History;
    ///
    /// let mut history = History::with_entries(["a", "b", "c"]);
    /// assert_eq!(history.older(""), Some("c"));
    /// assert_eq!(history.older("c"), Some("b"));
    /// ```
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = History::new();
        history.entries = entries.into_iter().map(Into::into).collect();
        history.reset();
        history
    }

    pub fn with_policy(mut self, policy: HistoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Keep at most `max` entries, dropping the oldest ones first.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self.enforce_cap();
        self.reset();
        self
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    /// True while a working slot other than the placeholder is selected.
    pub fn is_navigating(&self) -> bool {
        self.selected + 1 < self.working.len()
    }

    /// Record a submitted line and end any navigation.
    ///
    /// Returns whether the line was stored.
    ///
    /// ```
    /// use promptline_core::{History, HistoryPolicy};
    ///
    /// let mut history = History::new().with_policy(HistoryPolicy::SkipEmptyAndDuplicates);
    /// assert!(history.add("ls"));
    /// assert!(!history.add("ls"));
    /// assert!(!history.add(""));
    /// assert_eq!(history.entries(), ["ls"]);
    /// ```
    pub fn add(&mut self, line: impl Into<String>) -> bool {
        let line = line.into();
        let keep = match self.policy {
            HistoryPolicy::KeepAll => true,
            HistoryPolicy::SkipEmptyAndDuplicates => {
                !line.is_empty() && self.entries.last() != Some(&line)
            }
        };
        if keep {
            self.entries.push(line);
            self.enforce_cap();
        } else {
            log::trace!("history skipped line under {:?}", self.policy);
        }
        self.reset();
        keep
    }

    /// Rebuild the working copy from the persisted entries.
    pub fn reset(&mut self) {
        self.working = self.entries.clone();
        self.working.push(String::new());
        self.selected = self.working.len() - 1;
    }

    /// Step one entry back in time.
    ///
    /// `current` is the buffer text, stored into the slot being left so it
    /// comes back on the way forward. Returns `None` at the oldest entry.
    pub fn older(&mut self, current: &str) -> Option<&str> {
        if self.selected == 0 {
            return None;
        }
        self.working[self.selected] = current.to_string();
        self.selected -= 1;
        Some(&self.working[self.selected])
    }

    /// Step one entry forward in time.
    ///
    /// Reaching the placeholder hands back the line typed before navigation
    /// began. Returns `None` when not navigating.
    pub fn newer(&mut self, current: &str) -> Option<&str> {
        if !self.is_navigating() {
            return None;
        }
        self.working[self.selected] = current.to_string();
        self.selected += 1;
        Some(&self.working[self.selected])
    }

    fn enforce_cap(&mut self) {
        if let Some(max) = self.max_entries {
            let excess = self.entries.len().saturating_sub(max);
            self.entries.drain(..excess);
        }
    }
}
