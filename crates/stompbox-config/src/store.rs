//! Per-user preset persistence.
//!
//! A [`PresetStore`] keeps the presets each player saved and remembers which
//! one is active. At most one preset per user is active; activating another
//! one deactivates the previous. Users are opaque strings.
//!
//! - [`MemoryPresetStore`]: process-local, for tests and ephemeral sessions
//! - [`FilePresetStore`]: one TOML file per preset under
//!   `<root>/<user>/<id>.toml`, the active id in `<root>/<user>/active`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use stompbox_effects::{PedalParams, PedalState};

use crate::error::{ConfigError, Result};
use crate::paths;
use crate::preset::{Preset, PresetCategory, validate_params};

/// Name of the file that holds a user's active preset id.
const ACTIVE_MARKER: &str = "active";

/// Storage for user presets.
pub trait PresetStore {
    /// Presets of `user_id`, newest first.
    fn list(&self, user_id: &str) -> Result<Vec<Preset>>;

    /// Stores a new preset and returns it with its assigned id.
    ///
    /// Saving never overwrites: two saves with the same name are two presets.
    fn save(
        &mut self,
        user_id: &str,
        name: &str,
        pedal_state: &PedalState,
        pedal_params: &PedalParams,
    ) -> Result<Preset>;

    /// Marks `preset_id` as its owner's active preset.
    fn activate(&mut self, preset_id: &str) -> Result<()>;

    /// Removes `preset_id`; an active preset leaves its owner with none.
    fn delete(&mut self, preset_id: &str) -> Result<()>;

    /// The active preset of `user_id`, if any.
    fn active(&self, user_id: &str) -> Result<Option<Preset>>;
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Strictly increasing save stamp, wall clock when it allows.
fn next_stamp(last: &mut u64) -> u64 {
    let stamp = now_millis().max(last.saturating_add(1));
    *last = stamp;
    stamp
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "preset".to_string()
    } else {
        trimmed.to_string()
    }
}

fn new_preset(
    id: String,
    name: &str,
    stamp: u64,
    pedal_state: &PedalState,
    pedal_params: &PedalParams,
) -> Preset {
    Preset {
        id,
        name: name.trim().to_string(),
        description: None,
        category: PresetCategory::Custom,
        created_at: Some(stamp),
        pedal_state: *pedal_state,
        params: *pedal_params,
    }
}

fn check_new(name: &str, pedal_params: &PedalParams) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::invalid("new preset", "name", "must not be empty"));
    }
    validate_params(pedal_params, &format!("preset '{}'", name.trim()))
}

fn newest_first(presets: &mut [Preset]) {
    presets.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Process-local preset store.
#[derive(Debug, Default, Clone)]
pub struct MemoryPresetStore {
    presets: Vec<(String, Preset)>,
    active: HashMap<String, String>,
    last_stamp: u64,
}

impl MemoryPresetStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total presets across all users.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// True when no user has saved anything.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    fn owner_of(&self, preset_id: &str) -> Option<&str> {
        self.presets
            .iter()
            .find(|(_, p)| p.id == preset_id)
            .map(|(user, _)| user.as_str())
    }
}

impl PresetStore for MemoryPresetStore {
    fn list(&self, user_id: &str) -> Result<Vec<Preset>> {
        let mut presets: Vec<Preset> = self
            .presets
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, p)| p.clone())
            .collect();
        newest_first(&mut presets);
        Ok(presets)
    }

    fn save(
        &mut self,
        user_id: &str,
        name: &str,
        pedal_state: &PedalState,
        pedal_params: &PedalParams,
    ) -> Result<Preset> {
        check_new(name, pedal_params)?;
        let stamp = next_stamp(&mut self.last_stamp);
        let id = format!("{}-{stamp:x}", slug(name));
        let preset = new_preset(id, name, stamp, pedal_state, pedal_params);
        self.presets.push((user_id.to_string(), preset.clone()));
        tracing::debug!(user = user_id, id = %preset.id, "preset saved");
        Ok(preset)
    }

    fn activate(&mut self, preset_id: &str) -> Result<()> {
        let owner = self
            .owner_of(preset_id)
            .ok_or_else(|| ConfigError::PresetNotFound(preset_id.to_string()))?
            .to_string();
        self.active.insert(owner, preset_id.to_string());
        Ok(())
    }

    fn delete(&mut self, preset_id: &str) -> Result<()> {
        let index = self
            .presets
            .iter()
            .position(|(_, p)| p.id == preset_id)
            .ok_or_else(|| ConfigError::PresetNotFound(preset_id.to_string()))?;
        let (owner, _) = self.presets.remove(index);
        if self.active.get(&owner).is_some_and(|id| id == preset_id) {
            self.active.remove(&owner);
        }
        Ok(())
    }

    fn active(&self, user_id: &str) -> Result<Option<Preset>> {
        let Some(id) = self.active.get(user_id) else {
            return Ok(None);
        };
        Ok(self
            .presets
            .iter()
            .find(|(user, p)| user == user_id && &p.id == id)
            .map(|(_, p)| p.clone()))
    }
}

/// Preset store backed by a directory tree of TOML files.
#[derive(Debug, Clone)]
pub struct FilePresetStore {
    root: PathBuf,
    last_stamp: u64,
}

impl FilePresetStore {
    /// Store rooted at `root`; directories are created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            last_stamp: 0,
        }
    }

    /// Store under the platform preset directory.
    pub fn open_default() -> Self {
        Self::new(paths::user_presets_dir())
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(paths::sanitize_component(user_id))
    }

    /// Finds the file of `preset_id` in any user directory.
    fn locate(&self, preset_id: &str) -> Option<PathBuf> {
        if paths::sanitize_component(preset_id) != preset_id {
            return None;
        }
        let file_name = format!("{preset_id}.toml");
        std::fs::read_dir(&self.root)
            .ok()?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path().join(&file_name))
            .find(|path| path.is_file())
    }

    fn read_marker(dir: &Path) -> Option<String> {
        std::fs::read_to_string(dir.join(ACTIVE_MARKER))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl PresetStore for FilePresetStore {
    fn list(&self, user_id: &str) -> Result<Vec<Preset>> {
        let mut presets = Vec::new();
        for path in paths::list_toml_files(&self.user_dir(user_id)) {
            match Preset::load(&path) {
                Ok(preset) => presets.push(preset),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable preset");
                }
            }
        }
        newest_first(&mut presets);
        Ok(presets)
    }

    fn save(
        &mut self,
        user_id: &str,
        name: &str,
        pedal_state: &PedalState,
        pedal_params: &PedalParams,
    ) -> Result<Preset> {
        check_new(name, pedal_params)?;
        let dir = self.user_dir(user_id);
        paths::ensure_dir(&dir)?;

        let (id, stamp) = loop {
            let stamp = next_stamp(&mut self.last_stamp);
            let id = format!("{}-{stamp:x}", slug(name));
            if !dir.join(format!("{id}.toml")).exists() {
                break (id, stamp);
            }
        };
        let preset = new_preset(id, name, stamp, pedal_state, pedal_params);
        preset.save(dir.join(format!("{}.toml", preset.id)))?;
        tracing::info!(user = user_id, id = %preset.id, "preset saved");
        Ok(preset)
    }

    fn activate(&mut self, preset_id: &str) -> Result<()> {
        let path = self
            .locate(preset_id)
            .ok_or_else(|| ConfigError::PresetNotFound(preset_id.to_string()))?;
        let marker = path.with_file_name(ACTIVE_MARKER);
        std::fs::write(&marker, preset_id).map_err(|e| ConfigError::write_file(&marker, e))?;
        tracing::debug!(id = preset_id, "preset activated");
        Ok(())
    }

    fn delete(&mut self, preset_id: &str) -> Result<()> {
        let path = self
            .locate(preset_id)
            .ok_or_else(|| ConfigError::PresetNotFound(preset_id.to_string()))?;
        std::fs::remove_file(&path).map_err(|e| ConfigError::delete_file(&path, e))?;

        if let Some(dir) = path.parent()
            && Self::read_marker(dir).as_deref() == Some(preset_id)
        {
            let marker = dir.join(ACTIVE_MARKER);
            std::fs::remove_file(&marker).map_err(|e| ConfigError::delete_file(&marker, e))?;
        }
        tracing::debug!(id = preset_id, "preset deleted");
        Ok(())
    }

    fn active(&self, user_id: &str) -> Result<Option<Preset>> {
        let dir = self.user_dir(user_id);
        let Some(id) = Self::read_marker(&dir) else {
            return Ok(None);
        };
        let path = dir.join(format!("{}.toml", paths::sanitize_component(&id)));
        if !path.is_file() {
            return Ok(None);
        }
        Preset::load(path).map(Some)
    }
}
