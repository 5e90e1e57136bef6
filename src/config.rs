//! Plugin configuration and the settings panel that edits it.
//!
//! Settings are not persistent: a new plugin instance always starts from
//! [`NapConfig::default`].

use std::sync::{Arc, RwLock};

use crate::trace::constants::DEFAULT_HISTO_ENTRIES_LIMIT;

/// Settings read by every draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NapConfig {
    /// Naps are only drawn while the visible histogram holds at most this
    /// many entries.
    pub histo_entries_limit: usize,

    /// Outline naps with the task's display color instead of the fill color.
    pub use_task_coloring: bool,
}

impl Default for NapConfig {
    fn default() -> Self {
        Self {
            histo_entries_limit: DEFAULT_HISTO_ENTRIES_LIMIT,
            use_task_coloring: false,
        }
    }
}

/// Configuration shared between the settings panel and draw calls.
///
/// Draw calls take a [`snapshot`](Self::snapshot); the panel replaces the
/// whole value on apply, so a draw never sees half an update.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<NapConfig>>,
}

impl SharedConfig {
    pub fn new(config: NapConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn snapshot(&self) -> NapConfig {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn apply(&self, config: NapConfig) {
        match self.inner.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
        tracing::debug!(
            "naps config applied: histo_entries_limit={} use_task_coloring={}",
            config.histo_entries_limit,
            config.use_task_coloring
        );
    }
}

/// Largest value the limit spin box accepts.
pub const HISTO_LIMIT_MAX: usize = i32::MAX as usize;

/// Message shown after a successful apply.
pub const APPLY_MESSAGE: &str = "All configuration changes have been applied.";

/// The settings dialog's state: staged values that only reach the shared
/// configuration when applied.
#[derive(Debug, Clone, Default)]
pub struct NapConfigPanel {
    histo_limit: usize,
    use_task_coloring: bool,
    open: bool,
}

impl NapConfigPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the current configuration into the panel and open it.
    pub fn show(&mut self, config: &SharedConfig) {
        let current = config.snapshot();
        self.histo_limit = current.histo_entries_limit;
        self.use_task_coloring = current.use_task_coloring;
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn histo_limit(&self) -> usize {
        self.histo_limit
    }

    pub fn use_task_coloring(&self) -> bool {
        self.use_task_coloring
    }

    pub fn set_histo_limit(&mut self, limit: usize) {
        self.histo_limit = limit.min(HISTO_LIMIT_MAX);
    }

    pub fn set_use_task_coloring(&mut self, on: bool) {
        self.use_task_coloring = on;
    }

    /// Commit the staged values, close the panel and return the message to
    /// show the user.
    pub fn apply(&mut self, config: &SharedConfig) -> &'static str {
        config.apply(NapConfig {
            histo_entries_limit: self.histo_limit,
            use_task_coloring: self.use_task_coloring,
        });
        self.open = false;
        APPLY_MESSAGE
    }

    /// Close the panel, discarding staged values.
    pub fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NapConfig::default();
        assert_eq!(config.histo_entries_limit, 10_000);
        assert!(!config.use_task_coloring);
        assert_eq!(SharedConfig::default().snapshot(), config);
    }

    #[test]
    fn test_apply_replaces_both_fields() {
        let shared = SharedConfig::default();
        let mut panel = NapConfigPanel::new();
        panel.show(&shared);
        assert!(panel.is_open());
        assert_eq!(panel.histo_limit(), 10_000);

        panel.set_histo_limit(500);
        panel.set_use_task_coloring(true);
        // Nothing changes until apply.
        assert_eq!(shared.snapshot(), NapConfig::default());

        assert_eq!(panel.apply(&shared), APPLY_MESSAGE);
        assert!(!panel.is_open());
        assert_eq!(
            shared.snapshot(),
            NapConfig {
                histo_entries_limit: 500,
                use_task_coloring: true,
            }
        );
    }

    #[test]
    fn test_close_discards_staged_values() {
        let shared = SharedConfig::default();
        let mut panel = NapConfigPanel::new();
        panel.show(&shared);
        panel.set_histo_limit(1);
        panel.close();
        assert_eq!(shared.snapshot(), NapConfig::default());

        // Reopening reloads from the shared config.
        panel.show(&shared);
        assert_eq!(panel.histo_limit(), 10_000);
    }

    #[test]
    fn test_limit_is_clamped() {
        let mut panel = NapConfigPanel::new();
        panel.set_histo_limit(usize::MAX);
        assert_eq!(panel.histo_limit(), HISTO_LIMIT_MAX);
    }

    #[test]
    fn test_clones_share_state() {
        let shared = SharedConfig::default();
        let other = shared.clone();
        other.apply(NapConfig {
            histo_entries_limit: 3,
            use_task_coloring: false,
        });
        assert_eq!(shared.snapshot().histo_entries_limit, 3);
    }
}
