//! The persisted list of selected calendars.
//!
//! Stored as TOML at `<data dir>/nextup/preferences.toml`:
//!
//! ```toml
//! selected_calendars = ["work", "team"]
//! ```

use std::path::{Path, PathBuf};

use nextup_core::Calendar;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PreferencesFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_calendars: Option<Vec<String>>,
}

/// Which calendars the user watches.
#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
    selected: Option<Vec<String>>,
}

impl Preferences {
    /// Returns the default preferences file path.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nextup")
            .join("preferences.toml")
    }

    /// Loads preferences from `path`. A missing file means nothing was
    /// stored yet.
    pub fn load(path: impl Into<PathBuf>) -> ServerResult<Self> {
        let path = path.into();
        let selected = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file: PreferencesFile =
                    toml::from_str(&content).map_err(|e| ServerError::preferences(&path, e))?;
                file.selected_calendars
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ServerError::io(&path, e)),
        };
        debug!(path = %path.display(), stored = selected.is_some(), "loaded preferences");
        Ok(Self { path, selected })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored selection, if one was ever saved.
    pub fn stored_selection(&self) -> Option<&[String]> {
        self.selected.as_deref()
    }

    /// The calendars to watch, in the order `calendars` lists them.
    ///
    /// A stored selection wins, minus ids that no longer exist. Without
    /// one, the default calendar is used when it exists. Otherwise nothing
    /// is selected.
    pub fn resolve(&self, calendars: &[Calendar], default_id: Option<&str>) -> Vec<String> {
        if let Some(stored) = &self.selected {
            return calendars
                .iter()
                .filter(|c| stored.contains(&c.id))
                .map(|c| c.id.clone())
                .collect();
        }

        default_id
            .and_then(|id| calendars.iter().find(|c| c.id == id))
            .map(|c| vec![c.id.clone()])
            .unwrap_or_default()
    }

    /// Like [`resolve`](Self::resolve), but writes the result when nothing
    /// was stored yet. Later changes of the default calendar then leave the
    /// selection alone.
    pub fn resolve_and_store(
        &mut self,
        calendars: &[Calendar],
        default_id: Option<&str>,
    ) -> ServerResult<Vec<String>> {
        let ids = self.resolve(calendars, default_id);
        if self.selected.is_none() {
            info!(calendars = ?ids, "storing initial calendar selection");
            self.set_selected(ids.clone())?;
        }
        Ok(ids)
    }

    /// Replaces the stored selection and writes it to disk.
    pub fn set_selected(&mut self, ids: Vec<String>) -> ServerResult<()> {
        self.selected = Some(ids);
        self.save()
    }

    /// Flips `id` in the resolved selection and persists the result.
    ///
    /// Returns whether the calendar is selected afterwards.
    pub fn toggle(
        &mut self,
        id: &str,
        calendars: &[Calendar],
        default_id: Option<&str>,
    ) -> ServerResult<bool> {
        if !calendars.iter().any(|c| c.id == id) {
            return Err(ServerError::unknown_calendar(id));
        }

        let mut ids = self.resolve(calendars, default_id);
        let now_selected = if let Some(pos) = ids.iter().position(|s| s == id) {
            ids.remove(pos);
            false
        } else {
            ids.push(id.to_string());
            true
        };

        info!(calendar = %id, selected = now_selected, "toggled calendar");
        self.set_selected(ids)?;
        Ok(now_selected)
    }

    fn save(&self) -> ServerResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ServerError::io(parent, e))?;
        }
        let content = toml::to_string_pretty(&PreferencesFile {
            selected_calendars: self.selected.clone(),
        })?;
        std::fs::write(&self.path, content).map_err(|e| ServerError::io(&self.path, e))
    }
}
