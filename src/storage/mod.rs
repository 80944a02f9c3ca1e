//! Persistence of categories, settings and input history.
//!
//! All three live as JSON files in one data directory:
//!
//! | File | Contents | When missing |
//! |------|----------|--------------|
//! | `categories.json` | array of category descriptions | defaults are written and returned |
//! | `settings.json` | [`Settings`] | defaults |
//! | `input_history.json` | array of inputs, most recent first | empty |

use std::path::PathBuf;

use crate::constants::{
    default_categories, CATEGORIES_FILE, HISTORY_FILE, MAX_HISTORY_ITEMS, SETTINGS_FILE,
};
use crate::errors::StorageError;
use crate::settings::Settings;
use crate::utilities::file_handler::FileHandler;

#[derive(Debug, Clone)]
pub struct Store {
    files: FileHandler,
}

impl Store {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            files: FileHandler::new(directory),
        }
    }

    pub fn files(&self) -> &FileHandler {
        &self.files
    }

    // --- Categories ---

    pub fn load_categories(&self) -> Result<Vec<String>, StorageError> {
        match self.files.load::<Vec<String>>(CATEGORIES_FILE)? {
            Some(categories) => Ok(categories),
            None => {
                log::info!("No {} found, writing default categories", CATEGORIES_FILE);
                let categories = default_categories();
                self.save_categories(&categories)?;
                Ok(categories)
            }
        }
    }

    pub fn save_categories(&self, categories: &[String]) -> Result<(), StorageError> {
        self.files.save(CATEGORIES_FILE, categories)
    }

    /// Append a category. Blank or duplicate descriptions are ignored and
    /// `false` is returned.
    pub fn add_category(&self, description: &str) -> Result<bool, StorageError> {
        let description = description.trim();
        let mut categories = self.load_categories()?;
        if description.is_empty() || categories.iter().any(|c| c == description) {
            return Ok(false);
        }
        categories.push(description.to_string());
        self.save_categories(&categories)?;
        Ok(true)
    }

    /// Remove the category at `index`, returning it.
    pub fn remove_category(&self, index: usize) -> Result<Option<String>, StorageError> {
        let mut categories = self.load_categories()?;
        if index >= categories.len() {
            return Ok(None);
        }
        let removed = categories.remove(index);
        self.save_categories(&categories)?;
        Ok(Some(removed))
    }

    pub fn reset_categories(&self) -> Result<Vec<String>, StorageError> {
        let categories = default_categories();
        self.save_categories(&categories)?;
        Ok(categories)
    }

    // --- Settings ---

    pub fn load_settings(&self) -> Result<Settings, StorageError> {
        Ok(self.files.load(SETTINGS_FILE)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.files.save(SETTINGS_FILE, settings)
    }

    // --- Input history ---

    pub fn load_history(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.files.load(HISTORY_FILE)?.unwrap_or_default())
    }

    /// Record `input` as the most recent entry.
    ///
    /// A repeat moves to the front instead of being duplicated; blank input
    /// is ignored. The list is capped at [`MAX_HISTORY_ITEMS`].
    pub fn add_to_history(&self, input: &str) -> Result<Vec<String>, StorageError> {
        let mut history = self.load_history()?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(history);
        }

        history.retain(|item| item != input);
        history.insert(0, input.to_string());
        history.truncate(MAX_HISTORY_ITEMS);
        self.files.save(HISTORY_FILE, &history)?;
        Ok(history)
    }

    pub fn clear_history(&self) -> Result<(), StorageError> {
        self.files.save(HISTORY_FILE, &Vec::<String>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_CATEGORIES;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_missing_categories_are_written_as_defaults() {
        let (_dir, store) = store();
        assert!(!store.files().exists(CATEGORIES_FILE));

        let categories = store.load_categories().unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert!(store.files().exists(CATEGORIES_FILE));
    }

    #[test]
    fn test_add_and_remove_categories() {
        let (_dir, store) = store();
        store.save_categories(&["Clarity".to_string()]).unwrap();

        assert!(store.add_category("  Humor  ").unwrap());
        assert!(!store.add_category("Humor").unwrap());
        assert!(!store.add_category("   ").unwrap());
        assert_eq!(store.load_categories().unwrap(), vec!["Clarity", "Humor"]);

        assert_eq!(store.remove_category(0).unwrap(), Some("Clarity".to_string()));
        assert_eq!(store.remove_category(5).unwrap(), None);
        assert_eq!(store.load_categories().unwrap(), vec!["Humor"]);

        assert_eq!(store.reset_categories().unwrap().len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_settings_round_trip_and_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.load_settings().unwrap(), Settings::default());

        let settings = Settings {
            selected_model: "ollama/gemma3:4b".into(),
            iterations: 3,
            patience: 2,
            use_cache: false,
        };
        store.save_settings(&settings).unwrap();
        assert_eq!(store.load_settings().unwrap(), settings);
    }

    #[test]
    fn test_history_is_most_recent_first_without_duplicates() {
        let (_dir, store) = store();
        store.add_to_history("first").unwrap();
        store.add_to_history("second").unwrap();
        store.add_to_history("  ").unwrap();
        let history = store.add_to_history("first").unwrap();
        assert_eq!(history, vec!["first", "second"]);
        assert_eq!(store.load_history().unwrap(), history);

        store.clear_history().unwrap();
        assert!(store.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_history_is_capped() {
        let (_dir, store) = store();
        for i in 0..(MAX_HISTORY_ITEMS + 5) {
            store.add_to_history(&format!("input {}", i)).unwrap();
        }
        let history = store.load_history().unwrap();
        assert_eq!(history.len(), MAX_HISTORY_ITEMS);
        assert_eq!(history[0], format!("input {}", MAX_HISTORY_ITEMS + 4));
    }
}
