use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

pub mod config;
pub mod menu;
pub mod picker;
pub mod selection;
pub mod theme;
pub mod thumbnail;

pub use config::{Config, PickerConfig, ThemeConfig};
pub use menu::{MenuEntry, MenuItem, MenuListBuilder, MenuSource};
pub use picker::{PickerClient, PickerResponse};
pub use selection::{resolve, Labeled, PregenerateReport, SelectionOutcome, Selector};
pub use theme::{find_theme, Theme};
pub use thumbnail::{CacheStore, ThumbnailCache, ThumbnailError, ThumbnailStatus};

#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("Failed to create thread pool: {0}")]
    ThreadPoolCreation(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to create thumbnail cache directory {path}: {source}")]
    CacheDirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to launch picker: {0}")]
    PickerLaunch(String),

    #[error("Nothing to choose from for \"{0}\"")]
    NoCandidates(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No themes configured")]
    NoThemes,

    #[error("Theme named \"{0}\" not found")]
    ThemeNotFound(String),

    #[error("Command execution failed: {0}")]
    CommandExecution(String),
}

pub type Result<T> = std::result::Result<T, SelectorError>;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "avi", "mov", "mkv", "gif"];

/// Edge length of every generated thumbnail.
pub const THUMBNAIL_SIZE: u32 = 500;
pub const THUMBNAIL_WORKERS: usize = 4;

#[derive(Parser, Clone, Debug)]
#[command(name = "theme-selector")]
#[command(about = "Pick a theme or wallpaper from a rofi menu with thumbnail previews")]
pub struct Args {
    #[arg(long, help = "Path to the YAML config file")]
    pub config: Option<PathBuf>,

    #[arg(short = 's', long, help = "Extra rofi theme string for this menu")]
    pub theme_str: Option<String>,

    #[arg(short, long, help = "Command that receives the selection as its last argument")]
    pub command: Option<String>,

    #[arg(long, help = "Enable debug output")]
    pub debug: bool,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Choose one of the configured themes
    Theme,
    /// Choose a wallpaper or video from a theme's pool
    Wallpaper {
        #[arg(short, long, help = "Theme whose pool is shown (defaults to the first one)")]
        theme: Option<String>,

        #[arg(long, help = "Show the video pool instead of still wallpapers")]
        video: bool,
    },
    /// Generate every thumbnail up front and exit
    Pregenerate,
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext_str| extensions.iter().any(|&valid_ext| valid_ext.eq_ignore_ascii_case(ext_str)))
        .unwrap_or(false)
}

pub fn is_image_file(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

pub fn is_video_file(path: &Path) -> bool {
    has_extension(path, VIDEO_EXTENSIONS)
}

pub fn validate_command(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        return Err(SelectorError::CommandExecution("Empty command".to_owned()));
    }
    Ok(())
}

/// Runs `command` with `selection` appended, e.g. `feh --bg-fill <path>`.
pub fn run_handoff(command: &str, selection: &str) -> Result<()> {
    validate_command(command)?;
    let command_parts: Vec<&str> = command.split_whitespace().collect();

    let mut cmd = Command::new(command_parts[0]);
    cmd.args(&command_parts[1..]);
    cmd.arg(selection);

    let output = cmd.output()
        .map_err(|e| SelectorError::CommandExecution(e.to_string()))?;

    if !output.status.success() {
        let error_msg = String::from_utf8_lossy(&output.stderr);
        return Err(SelectorError::CommandExecution(error_msg.into_owned()));
    }

    Ok(())
}
