use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::theme::Theme;
use crate::{Result, SelectorError};

pub const APP_NAME: &str = "theme-selector";
pub const RANDOM_ICON_FILE: &str = "random.png";
pub const PICKER_THEME_FILE: &str = "selecting.rasi";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub themes: Vec<ThemeConfig>,

    #[serde(default)]
    pub picker: PickerConfig,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    #[serde(default = "default_frame_extractor")]
    pub frame_extractor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerConfig {
    #[serde(default = "default_picker_command")]
    pub command: Vec<String>,

    #[serde(default)]
    pub theme: Option<PathBuf>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            command: default_picker_command(),
            theme: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    pub icon: PathBuf,

    #[serde(default)]
    pub wallpapers: Vec<PathBuf>,

    #[serde(default)]
    pub videos: Vec<PathBuf>,
}

fn default_picker_command() -> Vec<String> {
    vec!["rofi".to_owned()]
}

fn default_frame_extractor() -> String {
    "ffmpeg".to_owned()
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join(APP_NAME)
}

fn config_home() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(APP_NAME)
}

fn default_assets_dir() -> PathBuf {
    config_home().join("assets")
}

/// Resolves a leading `~/` against the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

impl Config {
    pub fn default_path() -> PathBuf {
        config_home().join("config.yaml")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| SelectorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.themes.is_empty() {
            return Err(SelectorError::NoThemes);
        }

        let mut names = HashSet::new();
        for theme in &self.themes {
            if !names.insert(theme.name.as_str()) {
                return Err(SelectorError::InvalidConfig(format!(
                    "theme \"{}\" is defined more than once",
                    theme.name
                )));
            }
        }

        if self.picker.command.is_empty() {
            return Err(SelectorError::InvalidConfig("picker command is empty".to_owned()));
        }

        Ok(())
    }

    fn expand_paths(&mut self) {
        self.cache_dir = expand_path(&self.cache_dir);
        self.assets_dir = expand_path(&self.assets_dir);
        self.picker.theme = self.picker.theme.as_deref().map(expand_path);

        for theme in &mut self.themes {
            theme.icon = expand_path(&theme.icon);
            for path in theme.wallpapers.iter_mut().chain(theme.videos.iter_mut()) {
                *path = expand_path(path);
            }
        }
    }

    pub fn themes(&self) -> Vec<Theme> {
        self.themes.iter().map(Theme::from_config).collect()
    }

    pub fn theme_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("themes")
    }

    pub fn wallpaper_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("wallpapers")
    }

    pub fn random_icon(&self) -> PathBuf {
        self.assets_dir.join(RANDOM_ICON_FILE)
    }

    /// The configured picker theme, or the one shipped in the assets dir.
    pub fn picker_theme(&self) -> PathBuf {
        self.picker
            .theme
            .clone()
            .unwrap_or_else(|| self.assets_dir.join(PICKER_THEME_FILE))
    }
}
