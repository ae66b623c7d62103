use crate::config::app_dir;
use crate::error::{Result, TallyError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_PRESET: &str = "Default";

/// Named repository lists plus the one currently in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetStore {
    pub active: String,
    pub presets: BTreeMap<String, Vec<String>>,
}

/// On-disk shape before normalization. Also accepts the JSON layout
/// `{"presets": {...}, "active_preset": "...", "repos": [...]}`.
#[derive(Debug, Default, Deserialize)]
struct RawStore {
    #[serde(default, alias = "active_preset")]
    active: Option<String>,
    #[serde(default)]
    presets: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    repos: Option<serde_json::Value>,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self {
            active: DEFAULT_PRESET.to_string(),
            presets: BTreeMap::from([(DEFAULT_PRESET.to_string(), Vec::new())]),
        }
    }
}

pub fn default_path() -> PathBuf {
    app_dir().join("presets.toml")
}

fn repo_lines(value: &serde_json::Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

/// Trims and drops blank lines.
pub fn clean_repos<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl PresetStore {
    fn from_raw(raw: RawStore) -> Self {
        let mut presets: BTreeMap<String, Vec<String>> = raw
            .presets
            .iter()
            .filter_map(|(name, value)| {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                repo_lines(value).map(|repos| (name.to_string(), repos))
            })
            .collect();

        if presets.is_empty() {
            let repos = raw.repos.as_ref().and_then(repo_lines).unwrap_or_default();
            presets.insert(DEFAULT_PRESET.to_string(), repos);
        }

        let mut store = Self {
            active: String::new(),
            presets,
        };
        store.active = match raw.active {
            Some(name) if store.presets.contains_key(&name) => name,
            _ if store.presets.contains_key(DEFAULT_PRESET) => DEFAULT_PRESET.to_string(),
            _ => store.first_name(),
        };
        store
    }

    /// Missing or unreadable files yield the default store.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(TallyError::from)
            .and_then(|content| parse(path, &content))
        {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "presets unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Reads a preset file written by this tool (TOML) or the JSON layout.
    pub fn import(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        parse(path, &content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Case-insensitive alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        self.presets
            .keys()
            .map(String::as_str)
            .sorted_by_key(|k| k.to_lowercase())
            .collect()
    }

    fn first_name(&self) -> String {
        self.names()
            .first()
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_PRESET.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.presets.get(name).map(Vec::as_slice)
    }

    pub fn active_repos(&self) -> &[String] {
        self.get(&self.active).unwrap_or(&[])
    }

    pub fn apply(&mut self, name: &str) -> Result<()> {
        if !self.presets.contains_key(name) {
            return Err(TallyError::Preset(format!("no preset named '{name}'")));
        }
        self.active = name.to_string();
        Ok(())
    }

    /// Activates the next (or previous) preset in display order.
    pub fn cycle(&mut self, forward: bool) -> &str {
        let names = self.names();
        if let Some(pos) = names.iter().position(|n| *n == self.active) {
            let len = names.len();
            let next = if forward {
                (pos + 1) % len
            } else {
                (pos + len - 1) % len
            };
            self.active = names[next].to_string();
        }
        &self.active
    }

    pub fn save_as(&mut self, name: &str, repos: Vec<String>) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TallyError::Preset("preset name is empty".to_string()));
        }
        let repos = clean_repos(repos);
        if repos.is_empty() {
            return Err(TallyError::Preset(
                "add at least one repo before saving a preset".to_string(),
            ));
        }
        if self.presets.contains_key(name) {
            return Err(TallyError::Preset(format!(
                "a preset named '{name}' already exists"
            )));
        }
        self.presets.insert(name.to_string(), repos);
        self.active = name.to_string();
        Ok(())
    }

    pub fn update(&mut self, name: &str, repos: Vec<String>) -> Result<()> {
        let repos = clean_repos(repos);
        if repos.is_empty() {
            return Err(TallyError::Preset(
                "add at least one repo before updating a preset".to_string(),
            ));
        }
        match self.presets.get_mut(name) {
            Some(slot) => {
                *slot = repos;
                self.active = name.to_string();
                Ok(())
            }
            None => Err(TallyError::Preset(format!("no preset named '{name}'"))),
        }
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let new = new.trim();
        if !self.presets.contains_key(old) {
            return Err(TallyError::Preset(format!("no preset named '{old}'")));
        }
        if new.is_empty() {
            return Err(TallyError::Preset("new name is empty".to_string()));
        }
        if new == old {
            return Err(TallyError::Preset("new name equals the old one".to_string()));
        }
        if self.presets.contains_key(new) {
            return Err(TallyError::Preset(format!(
                "a preset named '{new}' already exists"
            )));
        }
        if let Some(repos) = self.presets.remove(old) {
            self.presets.insert(new.to_string(), repos);
        }
        if self.active == old {
            self.active = new.to_string();
        }
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        if !self.presets.contains_key(name) {
            return Err(TallyError::Preset(format!("no preset named '{name}'")));
        }
        if self.presets.len() <= 1 {
            return Err(TallyError::Preset(
                "you must keep at least one preset".to_string(),
            ));
        }
        self.presets.remove(name);
        if self.active == name {
            self.active = self.first_name();
        }
        Ok(())
    }
}

fn parse(path: &Path, content: &str) -> Result<PresetStore> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let raw: RawStore = if is_json {
        serde_json::from_str(content)?
    } else {
        toml::from_str(content)?
    };
    Ok(PresetStore::from_raw(raw))
}
