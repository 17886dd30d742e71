use log::warn;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::theme::Theme;
use crate::thumbnail::{CacheStore, ThumbnailCache, ThumbnailStatus};
use crate::{Result, THUMBNAIL_WORKERS};

pub const ICON_FIELD: &str = "icon";
const FIELD_SEPARATOR: char = '\0';
const VALUE_SEPARATOR: char = '\x1f';

/// Something the user can pick. `name` doubles as the lookup key for the
/// picker's answer, so it must be unique within one menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    pub source_path: PathBuf,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
        }
    }

    fn from_file(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::new(name, path)
    }
}

/// One line of picker input: `<label>\0icon\x1f<path>`, or the bare label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub icon: Option<PathBuf>,
}

impl MenuEntry {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
        }
    }

    pub fn with_icon(label: impl Into<String>, icon: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            icon: Some(icon.into()),
        }
    }

    pub fn encode(&self) -> String {
        match &self.icon {
            Some(icon) => format!(
                "{}{}{}{}{}",
                self.label,
                FIELD_SEPARATOR,
                ICON_FIELD,
                VALUE_SEPARATOR,
                icon.to_string_lossy()
            ),
            None => self.label.clone(),
        }
    }

    /// Splits an encoded line into its label and `(field, value)` pairs.
    pub fn fields(line: &str) -> (&str, Vec<(&str, &str)>) {
        let mut parts = line.split(FIELD_SEPARATOR);
        let label = parts.next().unwrap_or_default();
        let fields = parts
            .filter_map(|field| field.split_once(VALUE_SEPARATOR))
            .collect();
        (label, fields)
    }

    pub fn decode(line: &str) -> Self {
        let (label, fields) = Self::fields(line);
        let icon = fields
            .into_iter()
            .find(|(name, _)| *name == ICON_FIELD)
            .map(|(_, value)| PathBuf::from(value));
        Self {
            label: label.to_owned(),
            icon,
        }
    }
}

/// What a menu is built from. Each variant knows its items, its wording and
/// which thumbnail cache it belongs to.
#[derive(Debug, Clone, Copy)]
pub enum MenuSource<'a> {
    Themes(&'a [Theme]),
    Wallpapers(&'a Theme),
    Videos(&'a Theme),
}

impl<'a> MenuSource<'a> {
    /// Video mode falls back to still wallpapers when the theme has no videos.
    pub fn wallpapers(theme: &'a Theme, video_mode: bool) -> Self {
        if video_mode && !theme.videos.is_empty() {
            MenuSource::Videos(theme)
        } else {
            MenuSource::Wallpapers(theme)
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MenuSource::Themes(_) => "Choose a theme:",
            MenuSource::Wallpapers(_) => "Choose a wallpaper:",
            MenuSource::Videos(_) => "Choose a video wallpaper:",
        }
    }

    pub fn random_label(&self) -> &'static str {
        match self {
            MenuSource::Themes(_) => "Random Theme",
            MenuSource::Wallpapers(_) => "Random Wallpaper",
            MenuSource::Videos(_) => "Random Video",
        }
    }

    pub fn is_theme_menu(&self) -> bool {
        matches!(self, MenuSource::Themes(_))
    }

    /// Items in catalog order. Labels are unique: when two files in a
    /// walked tree share a file name only the first is offered.
    pub fn items(&self) -> Vec<MenuItem> {
        match self {
            MenuSource::Themes(themes) => themes
                .iter()
                .map(|theme| MenuItem::new(theme.name.as_str(), theme.icon.as_path()))
                .collect(),
            MenuSource::Wallpapers(theme) => unique_labels(theme.wallpapers.iter().map(|p| MenuItem::from_file(p))),
            MenuSource::Videos(theme) => unique_labels(theme.videos.iter().map(|p| MenuItem::from_file(p))),
        }
    }
}

fn unique_labels(items: impl Iterator<Item = MenuItem>) -> Vec<MenuItem> {
    let mut seen = HashSet::new();
    items
        .filter(|item| {
            if seen.insert(item.name.clone()) {
                true
            } else {
                warn!("Skipping {:?}: another file is already listed as \"{}\"", item.source_path, item.name);
                false
            }
        })
        .collect()
}

pub struct MenuListBuilder {
    thread_pool: rayon::ThreadPool,
    thumbnails: ThumbnailCache,
    random_icon: PathBuf,
}

impl MenuListBuilder {
    pub fn new(thumbnails: ThumbnailCache, random_icon: impl Into<PathBuf>) -> Result<Self> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(THUMBNAIL_WORKERS)
            .build()?;

        Ok(Self {
            thread_pool,
            thumbnails,
            random_icon: random_icon.into(),
        })
    }

    /// Returns the random entry followed by every item whose thumbnail could
    /// be produced, in the order given. Items that aren't regular files are
    /// left out.
    pub fn build(&self, items: &[MenuItem], cache: &CacheStore, random_label: &str) -> Result<Vec<MenuEntry>> {
        cache.ensure_exists()?;

        // Random entry always comes first
        let mut entries = vec![MenuEntry::with_icon(random_label, self.random_icon.as_path())];

        // Generate missing thumbnails in parallel
        let jobs = thumbnail_jobs(items, cache);
        self.generate(&jobs);

        // Order is re-established here, after every worker has finished.
        entries.extend(
            jobs.into_iter()
                .filter(|(_, thumbnail)| thumbnail.is_file())
                .map(|(item, thumbnail)| MenuEntry::with_icon(item.name.as_str(), thumbnail)),
        );

        Ok(entries)
    }

    /// Generates thumbnails without building a menu.
    pub fn warm(&self, items: &[MenuItem], cache: &CacheStore) -> Result<Vec<ThumbnailStatus>> {
        cache.ensure_exists()?;
        Ok(self.generate(&thumbnail_jobs(items, cache)))
    }

    fn generate(&self, jobs: &[(&MenuItem, PathBuf)]) -> Vec<ThumbnailStatus> {
        let thumbnails = &self.thumbnails;
        self.thread_pool.install(|| {
            jobs.par_iter()
                .map(|(item, thumbnail)| thumbnails.ensure_thumbnail(&item.source_path, thumbnail))
                .collect()
        })
    }
}

fn thumbnail_jobs<'a>(items: &'a [MenuItem], cache: &CacheStore) -> Vec<(&'a MenuItem, PathBuf)> {
    items
        .iter()
        .filter(|item| item.source_path.is_file())
        .filter_map(|item| Some((item, cache.thumbnail_path(&item.source_path)?)))
        .collect()
}
