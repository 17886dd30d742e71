use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Instant;

use crate::config::Config;
use crate::menu::{MenuEntry, MenuItem, MenuListBuilder, MenuSource};
use crate::picker::{PickerClient, PickerResponse};
use crate::theme::Theme;
use crate::thumbnail::{CacheStore, ThumbnailCache, ThumbnailStatus};
use crate::{Result, SelectorError};

pub trait Labeled {
    fn label(&self) -> &str;
}

impl Labeled for MenuItem {
    fn label(&self) -> &str {
        &self.name
    }
}

impl Labeled for Theme {
    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SelectionOutcome<'a, T> {
    Cancelled,
    RandomRequested,
    Resolved(&'a T),
    NotFound(String),
}

/// Maps the picker's answer onto `candidates`. The first candidate whose
/// label matches wins.
pub fn resolve<'a, T: Labeled>(
    response: &PickerResponse,
    random_label: &str,
    candidates: &'a [T],
) -> SelectionOutcome<'a, T> {
    if response.is_cancelled() {
        return SelectionOutcome::Cancelled;
    }

    let text = response.raw_text.as_deref().unwrap_or_default();
    if text == random_label {
        return SelectionOutcome::RandomRequested;
    }

    match candidates.iter().find(|candidate| candidate.label() == text) {
        Some(candidate) => SelectionOutcome::Resolved(candidate),
        None => SelectionOutcome::NotFound(text.to_owned()),
    }
}

impl<'a, T> SelectionOutcome<'a, T> {
    /// Settles the outcome into at most one candidate, drawing uniformly when
    /// a random pick was requested. An empty pool can't satisfy that request.
    pub fn choose<R: Rng + ?Sized>(
        self,
        candidates: &'a [T],
        random_label: &str,
        rng: &mut R,
    ) -> Result<Option<&'a T>> {
        match self {
            SelectionOutcome::Cancelled | SelectionOutcome::NotFound(_) => Ok(None),
            SelectionOutcome::Resolved(candidate) => Ok(Some(candidate)),
            SelectionOutcome::RandomRequested => candidates
                .choose(rng)
                .map(Some)
                .ok_or_else(|| SelectorError::NoCandidates(random_label.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PregenerateReport {
    pub cached: usize,
    pub generated: usize,
    pub placeholders: usize,
}

impl PregenerateReport {
    fn tally(statuses: &[ThumbnailStatus]) -> Self {
        let mut report = Self::default();
        for status in statuses {
            match status {
                ThumbnailStatus::Cached => report.cached += 1,
                ThumbnailStatus::Generated => report.generated += 1,
                ThumbnailStatus::Placeholder => report.placeholders += 1,
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.cached + self.generated + self.placeholders
    }
}

/// Runs a whole menu round: thumbnails, picker, answer.
pub struct Selector {
    builder: MenuListBuilder,
    picker: PickerClient,
    theme_cache: CacheStore,
    wallpaper_cache: CacheStore,
}

impl Selector {
    pub fn new(
        builder: MenuListBuilder,
        picker: PickerClient,
        theme_cache: CacheStore,
        wallpaper_cache: CacheStore,
    ) -> Self {
        Self {
            builder,
            picker,
            theme_cache,
            wallpaper_cache,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let builder = MenuListBuilder::new(
            ThumbnailCache::new(config.frame_extractor.as_str()),
            config.random_icon(),
        )?;
        let picker = PickerClient::from_command(&config.picker.command, config.picker_theme())?;

        Ok(Self::new(
            builder,
            picker,
            CacheStore::new(config.theme_cache_dir()),
            CacheStore::new(config.wallpaper_cache_dir()),
        ))
    }

    pub fn cache_for(&self, source: &MenuSource) -> &CacheStore {
        if source.is_theme_menu() {
            &self.theme_cache
        } else {
            &self.wallpaper_cache
        }
    }

    /// `Ok(None)` means nothing was selected: the menu was dismissed or the
    /// answer matched no item.
    pub fn select(&self, source: &MenuSource, theme_override: Option<&str>) -> Result<Option<MenuItem>> {
        let items = source.items();
        let random_label = source.random_label();

        let entries: Vec<String> = self
            .builder
            .build(&items, self.cache_for(source), random_label)?
            .iter()
            .map(MenuEntry::encode)
            .collect();

        let response = self.picker.run(source.title(), &entries, theme_override)?;
        let outcome = resolve(&response, random_label, &items);

        match &outcome {
            SelectionOutcome::Cancelled => debug!("The selection has been canceled"),
            SelectionOutcome::RandomRequested => debug!("{} requested", random_label),
            SelectionOutcome::Resolved(item) => debug!("Selected {:?}", item.name),
            SelectionOutcome::NotFound(label) => warn!("\"{}\" does not match any menu item", label),
        }

        Ok(outcome
            .choose(&items, random_label, &mut rand::thread_rng())?
            .cloned())
    }

    /// Fills both caches for every theme, wallpaper and video.
    pub fn pregenerate(&self, themes: &[Theme]) -> Result<PregenerateReport> {
        let start_time = Instant::now();

        // Theme icons
        let mut statuses = self
            .builder
            .warm(&MenuSource::Themes(themes).items(), &self.theme_cache)?;

        // Wallpapers and videos share one cache
        let media: Vec<MenuItem> = themes
            .iter()
            .flat_map(|theme| {
                let mut items = MenuSource::Wallpapers(theme).items();
                items.extend(MenuSource::Videos(theme).items());
                items
            })
            .collect();
        statuses.extend(self.builder.warm(&media, &self.wallpaper_cache)?);

        // Report results
        let report = PregenerateReport::tally(&statuses);
        info!(
            "Thumbnail generation complete: {} cached, {} generated, {} placeholders ({:.1}s)",
            report.cached,
            report.generated,
            report.placeholders,
            start_time.elapsed().as_secs_f64()
        );

        Ok(report)
    }
}
