use crate::error::{Result, WeatherAlertsError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// When a seasonal event last fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub year: i32,
    /// Day the alert was decided
    pub date: NaiveDate,
    /// Forecast day that matched
    pub forecast_date: NaiveDate,
}

/// On-disk shape of the state file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub occurrences: BTreeMap<String, Occurrence>,
}

/// First-occurrence state, read once at startup and written once per run.
///
/// A missing or unreadable file yields an empty store; it is never an error.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceStore {
    path: Option<PathBuf>,
    state: StateDocument,
}

impl OccurrenceStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = Self::load(&path);
        Self {
            path: Some(path),
            state,
        }
    }

    /// Store with no backing file; `save` is a no-op
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn load(path: &Path) -> StateDocument {
        if !path.exists() {
            tracing::debug!("No state file at {:?}, starting empty", path);
            return StateDocument::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(WeatherAlertsError::from)
            .and_then(|s| serde_json::from_str::<StateDocument>(&s).map_err(Into::into));

        match parsed {
            Ok(state) => {
                tracing::debug!(
                    "Loaded {} occurrence record(s) from {:?}",
                    state.occurrences.len(),
                    path
                );
                state
            }
            Err(e) => {
                tracing::debug!("Ignoring unreadable state file {:?}: {}", path, e);
                StateDocument::default()
            }
        }
    }

    /// Write the whole document back to its file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(path, json)?;
        tracing::debug!("Saved state to {:?}", path);
        Ok(())
    }

    /// Key identifying one seasonal tracker, stable across runs
    pub fn state_key(field: &str, start_month: u32, end_month: u32) -> String {
        format!("first_{}_{}_{}", field, start_month, end_month)
    }

    pub fn get(&self, key: &str) -> Option<&Occurrence> {
        self.state.occurrences.get(key)
    }

    pub fn record(&mut self, key: impl Into<String>, occurrence: Occurrence) {
        self.state.occurrences.insert(key.into(), occurrence);
    }

    pub fn has_fired_in(&self, key: &str, year: i32) -> bool {
        self.get(key).is_some_and(|o| o.year == year)
    }

    pub fn len(&self) -> usize {
        self.state.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.occurrences.is_empty()
    }
}
