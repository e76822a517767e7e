use crate::error::ConfigError;
use crate::settings::{Adjacency, SimulationSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A named set of run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub settings: SimulationSettings,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            settings,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the binary
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-ins plus user presets from the platform config directory
    pub fn new() -> Self {
        Self::with_dir(Self::default_dir())
    }

    /// Built-ins plus user presets from `dir` (if any)
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dla-model").join("presets"))
    }

    fn preset_path(dir: &Path, name: &str) -> PathBuf {
        let filename = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();
        dir.join(format!("{}.json", filename))
    }

    /// Load user presets from disk, skipping unreadable files
    fn load_user_presets(&mut self) {
        let Some(dir) = &self.dir else { return };
        let Ok(entries) = fs::read_dir(dir) else { return };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<Preset>(&content).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(preset) => self.user.push(preset),
                Err(err) => warn!(path = %path.display(), %err, "Skipping unreadable preset"),
            }
        }
    }

    /// Save a preset to disk, replacing any user preset with the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<PathBuf, ConfigError> {
        let dir = self.dir.as_ref().ok_or(ConfigError::NoConfigDir)?;

        fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = Self::preset_path(dir, &preset.name);
        let json = serde_json::to_string_pretty(&preset).map_err(|source| ConfigError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        self.user.retain(|p| p.name != preset.name);
        self.user.push(preset);
        Ok(path)
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let dir = self.dir.as_ref().ok_or(ConfigError::NoConfigDir)?;

        let before = self.user.len();
        self.user.retain(|p| p.name != name);
        if self.user.len() == before {
            return Err(ConfigError::UnknownPreset(name.to_string()));
        }

        let path = Self::preset_path(dir, name);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| ConfigError::Io { path, source })?;
        }
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name, ignoring case
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new(
            "Classic",
            "640x480 grid grown to 20000 particles",
            SimulationSettings::default(),
        ),
        Preset::new(
            "Small",
            "Quick 101x101 cluster",
            SimulationSettings::new(101, 101, 600),
        ),
        Preset::new(
            "Medium",
            "320x240 grid with 5000 particles",
            SimulationSettings::new(320, 240, 5000),
        ),
        Preset::new(
            "Sparse",
            "Diagonal-only contact, growth on a checkerboard sub-lattice",
            SimulationSettings::new(201, 201, 1500).with_adjacency(Adjacency::Diagonal),
        ),
        Preset::new(
            "Lattice",
            "Orthogonal contact only, angular branches",
            SimulationSettings::new(201, 201, 2000).with_adjacency(Adjacency::VonNeumann),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::AggregationGrid;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_presets_are_feasible() {
        for preset in builtin_presets() {
            let s = &preset.settings;
            let grid = AggregationGrid::new(s.width, s.height);
            assert!(
                s.target_count <= grid.sticking_capacity(s.adjacency),
                "{} cannot finish",
                preset.name
            );
        }
    }

    #[test]
    fn test_find_ignores_case() {
        let manager = PresetManager::with_dir(None);
        assert_eq!(manager.find("sparse").unwrap().settings.adjacency, Adjacency::Diagonal);
        assert!(manager.find("nope").is_none());
    }

    #[test]
    fn test_save_load_and_delete_user_preset() {
        let dir = tempdir().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        let preset = Preset::new("My Run", "custom", SimulationSettings::new(50, 40, 200));

        let path = manager.save_preset(preset.clone()).unwrap();
        assert_eq!(path, dir.path().join("My_Run.json"));

        let reloaded = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert_eq!(reloaded.user, vec![preset]);
        assert!(reloaded.find("my run").is_some());

        manager.delete_preset("My Run").unwrap();
        assert!(!path.exists());
        assert!(manager.user.is_empty());
    }

    #[test]
    fn test_saving_same_name_replaces() {
        let dir = tempdir().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        manager
            .save_preset(Preset::new("a", "first", SimulationSettings::new(9, 9, 3)))
            .unwrap();
        manager
            .save_preset(Preset::new("a", "second", SimulationSettings::new(9, 9, 4)))
            .unwrap();
        assert_eq!(manager.user.len(), 1);
        assert_eq!(manager.user[0].description, "second");
    }

    #[test]
    fn test_bad_preset_file_is_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert!(manager.user.is_empty());
    }

    #[test]
    fn test_without_dir_cannot_save() {
        let mut manager = PresetManager::with_dir(None);
        let result = manager.save_preset(Preset::new("x", "", SimulationSettings::default()));
        assert!(matches!(result, Err(ConfigError::NoConfigDir)));
        assert!(matches!(
            manager.delete_preset("x"),
            Err(ConfigError::NoConfigDir)
        ));
    }
}
