use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ThemeConfig;
use crate::{is_image_file, is_video_file, Result, SelectorError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub icon: PathBuf,
    pub wallpapers: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            name: config.name.clone(),
            icon: config.icon.clone(),
            wallpapers: collect_media(&config.wallpapers, is_image_file),
            videos: collect_media(&config.videos, is_video_file),
        }
    }
}

/// Looks a theme up by name, or takes the first one when no name is given.
pub fn find_theme<'a>(themes: &'a [Theme], name: Option<&str>) -> Result<&'a Theme> {
    match name {
        Some(name) => themes
            .iter()
            .find(|theme| theme.name == name)
            .ok_or_else(|| SelectorError::ThemeNotFound(name.to_owned())),
        None => themes.first().ok_or(SelectorError::NoThemes),
    }
}

/// Expands a mix of files and directories into the sorted list of media files
/// they contain. Listed files are kept only if `accept` matches them too.
pub fn collect_media(paths: &[PathBuf], accept: fn(&Path) -> bool) -> Vec<PathBuf> {
    let mut media = Vec::new();

    for path in paths {
        if path.is_dir() {
            media.extend(
                WalkDir::new(path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file() && accept(e.path()))
                    .map(|e| e.into_path()),
            );
        } else if accept(path) {
            media.push(path.clone());
        }
    }

    media.sort();
    media.dedup();
    media
}
