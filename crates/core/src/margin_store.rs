//! Margin settings persistence interface
//!
//! Per-page margin settings are keyed by an explicit page-set identifier
//! chosen by the caller, not derived from file names.

use crate::error::EngineResult;
use crate::geometry::MarginSettings;
use std::cell::RefCell;
use std::collections::HashMap;

/// Key-value store for per-page margin settings
pub trait MarginSettingsStore {
    /// Settings saved for `page_set_id`, `None` if nothing was saved
    fn load(&self, page_set_id: &str) -> EngineResult<Option<Vec<MarginSettings>>>;

    fn save(&self, page_set_id: &str, settings: &[MarginSettings]) -> EngineResult<()>;
}

/// Process-local store, used by tests and when persistence is not wanted
#[derive(Debug, Default)]
pub struct InMemoryMarginStore {
    entries: RefCell<HashMap<String, Vec<MarginSettings>>>,
}

impl InMemoryMarginStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarginSettingsStore for InMemoryMarginStore {
    fn load(&self, page_set_id: &str) -> EngineResult<Option<Vec<MarginSettings>>> {
        Ok(self.entries.borrow().get(page_set_id).cloned())
    }

    fn save(&self, page_set_id: &str, settings: &[MarginSettings]) -> EngineResult<()> {
        self.entries.borrow_mut().insert(page_set_id.to_owned(), settings.to_vec());
        Ok(())
    }
}

impl<T: MarginSettingsStore + ?Sized> MarginSettingsStore for std::rc::Rc<T> {
    fn load(&self, page_set_id: &str) -> EngineResult<Option<Vec<MarginSettings>>> {
        (**self).load(page_set_id)
    }

    fn save(&self, page_set_id: &str, settings: &[MarginSettings]) -> EngineResult<()> {
        (**self).save(page_set_id, settings)
    }
}

/// Fit a loaded settings list to `page_count`, padding with defaults and
/// replacing entries whose scale is out of range
pub fn fit_to_page_count(
    settings: Option<Vec<MarginSettings>>,
    page_count: usize,
) -> Vec<MarginSettings> {
    let mut settings = settings.unwrap_or_default();
    settings.truncate(page_count);
    for (index, entry) in settings.iter_mut().enumerate() {
        if entry.validate().is_err() {
            log::warn!(
                "page {index}: stored margin scale {} out of range, using defaults",
                entry.scale
            );
            *entry = MarginSettings::default();
        }
    }
    settings.resize(page_count, MarginSettings::default());
    settings
}
