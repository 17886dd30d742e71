use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageEncoder, Rgb, RgbImage};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{is_video_file, Result, SelectorError, THUMBNAIL_SIZE};

/// Background of the flat image written when a source can't be previewed.
pub const PLACEHOLDER_COLOR: [u8; 3] = [0x1e, 0x1e, 0x2e];

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to write thumbnail: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame extraction failed: {0}")]
    FrameExtraction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStatus {
    Cached,
    Generated,
    Placeholder,
}

/// A thumbnail directory. Entries are named after the source file's stem and
/// are only ever added; a file being present is the cache hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| SelectorError::CacheDirectoryCreation {
            path: self.root.clone(),
            source,
        })
    }

    pub fn thumbnail_path(&self, source: &Path) -> Option<PathBuf> {
        let mut name = source.file_stem()?.to_os_string();
        name.push(".png");
        Some(self.root.join(name))
    }
}

/// Produces 500x500 previews for images and videos.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    frame_extractor: String,
}

impl Default for ThumbnailCache {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl ThumbnailCache {
    pub fn new(frame_extractor: impl Into<String>) -> Self {
        Self {
            frame_extractor: frame_extractor.into(),
        }
    }

    /// Makes sure `destination` holds a preview of `source`. Never fails: a
    /// source that can't be processed gets the placeholder image instead.
    pub fn ensure_thumbnail(&self, source: &Path, destination: &Path) -> ThumbnailStatus {
        // Check if thumbnail already exists
        if destination.exists() {
            debug!("Found cached thumbnail: {:?}", destination);
            return ThumbnailStatus::Cached;
        }

        // Generate new thumbnail
        match self.generate(source, destination) {
            Ok(()) => {
                debug!("Generated thumbnail for {:?}", source.file_name().unwrap_or_default());
                ThumbnailStatus::Generated
            }
            Err(e) => {
                // Fall back to placeholder
                warn!("Failed to generate thumbnail for {:?}: {}", source, e);
                if let Err(e) = save_png(&placeholder(), destination) {
                    warn!("Failed to write placeholder thumbnail {:?}: {}", destination, e);
                }
                ThumbnailStatus::Placeholder
            }
        }
    }

    pub fn generate(&self, source: &Path, destination: &Path) -> std::result::Result<(), ThumbnailError> {
        if is_video_file(source) {
            match self.extract_frame(source, destination) {
                Ok(()) => return Ok(()),
                Err(e) => debug!("{}; decoding {:?} as an image instead", e, source),
            }
        }

        let img = image::io::Reader::open(source)?
            .with_guessed_format()?
            .decode()?;
        save_png(&fit_thumbnail(img), destination)
    }

    fn extract_frame(&self, source: &Path, destination: &Path) -> std::result::Result<(), ThumbnailError> {
        let partial = partial_path(destination);
        let filter = format!(
            "scale={size}:{size}:force_original_aspect_ratio=decrease,pad={size}:{size}:(ow-iw)/2:(oh-ih)/2",
            size = THUMBNAIL_SIZE
        );

        let output = Command::new(&self.frame_extractor)
            .args(["-loglevel", "error", "-i"])
            .arg(source)
            .args(["-vf", filter.as_str(), "-frames:v", "1", "-y"])
            .arg(&partial)
            .output()
            .map_err(|e| ThumbnailError::FrameExtraction(format!("{}: {}", self.frame_extractor, e)))?;

        if !output.status.success() {
            let _ = fs::remove_file(&partial);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ThumbnailError::FrameExtraction(stderr.trim().to_owned()));
        }

        fs::rename(&partial, destination)?;
        Ok(())
    }
}

/// Leaves images that already fit untouched. Anything larger is cut to its
/// centered square first and that square is scaled to 500x500, so a very
/// long and thin image never comes out smaller than the thumbnail.
pub fn fit_thumbnail(img: DynamicImage) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if width <= THUMBNAIL_SIZE && height <= THUMBNAIL_SIZE {
        return img;
    }

    let side = width.min(height);
    img.crop_imm((width - side) / 2, (height - side) / 2, side, side)
        .resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Triangle)
}

pub fn placeholder() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        THUMBNAIL_SIZE,
        THUMBNAIL_SIZE,
        Rgb(PLACEHOLDER_COLOR),
    ))
}

// Sibling file in the same directory so the final rename stays atomic.
fn partial_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.part.png", name))
}

fn save_png(img: &DynamicImage, destination: &Path) -> std::result::Result<(), ThumbnailError> {
    let partial = partial_path(destination);
    let rgba = img.to_rgba8();

    let written = File::create(&partial)
        .map_err(ThumbnailError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            PngEncoder::new(&mut writer).write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ColorType::Rgba8,
            )?;
            writer.flush()?;
            Ok(())
        });

    if let Err(e) = written {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, destination)?;
    Ok(())
}
