use crate::error::{persistence_error, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// On-disk shape of the selection file
#[derive(Debug, Default, Serialize, Deserialize)]
struct SelectionFile {
    selected_calendars: Vec<String>,
}

/// Persisted set of selected calendar-source identifiers.
///
/// Load never fails the caller: a missing or unreadable file is an empty
/// selection. Writes rewrite the whole file; failures are logged by the
/// caller and the in-memory set stays authoritative for the session.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted selection, empty on any failure
    pub fn load(&self) -> HashSet<String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            // Missing file just means nothing was selected yet
            Err(_) => return HashSet::new(),
        };

        match toml::from_str::<SelectionFile>(&content) {
            Ok(file) => file.selected_calendars.into_iter().collect(),
            Err(e) => {
                warn!(
                    "Ignoring unreadable selection file {}: {}",
                    self.path.display(),
                    e
                );
                HashSet::new()
            }
        }
    }

    /// Persist the addition of a single source identifier
    pub fn add(&self, source_id: &str) -> AppResult<()> {
        let mut selected = self.load();
        selected.insert(source_id.to_string());
        self.save(&selected)
    }

    /// Persist the removal of a single source identifier
    pub fn remove(&self, source_id: &str) -> AppResult<()> {
        let mut selected = self.load();
        selected.remove(source_id);
        self.save(&selected)
    }

    fn save(&self, selected: &HashSet<String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| persistence_error(&format!("Cannot create {}: {}", parent.display(), e)))?;
            }
        }

        let mut selected_calendars: Vec<String> = selected.iter().cloned().collect();
        selected_calendars.sort();

        let toml_str = toml::to_string(&SelectionFile { selected_calendars })
            .map_err(|e| persistence_error(&format!("Cannot encode selection: {}", e)))?;
        fs::write(&self.path, toml_str)
            .map_err(|e| persistence_error(&format!("Cannot write {}: {}", self.path.display(), e)))?;

        Ok(())
    }
}
