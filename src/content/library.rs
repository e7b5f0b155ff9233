//! Image and fact library.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::config::ContentConfig;
use crate::content::facts::FACTS;

pub const DEFAULT_ALT: &str = "A cute capybara";
pub const DEFAULT_TAKE: usize = 25;
pub const MAX_TAKE: usize = 100;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid alt text file: {0}")]
    AltText(#[from] serde_json::Error),
}

/// One addressable image (1-based index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapyImage {
    pub index: usize,
    pub url: String,
    pub alt: String,
    #[serde(skip)]
    pub path: PathBuf,
}

impl CapyImage {
    pub fn content_type(&self) -> &'static str {
        match extension(&self.path).as_deref() {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        }
    }
}

/// Clamp a 1-based `from`/`take` pair to a valid window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub from: usize,
    pub take: usize,
}

impl Page {
    pub fn new(from: Option<usize>, take: Option<usize>) -> Self {
        Self {
            from: from.unwrap_or(1).max(1),
            take: take.unwrap_or(DEFAULT_TAKE).clamp(1, MAX_TAKE),
        }
    }

    fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = (self.from - 1).min(len);
        let end = start.saturating_add(self.take).min(len);
        start..end
    }
}

/// Content loaded once at startup and read concurrently afterwards.
#[derive(Debug, Clone)]
pub struct CapyLibrary {
    images: Vec<PathBuf>,
    alts: HashMap<usize, String>,
    facts: Vec<String>,
    public_url: String,
}

impl CapyLibrary {
    pub fn new(
        images: Vec<PathBuf>,
        alts: HashMap<usize, String>,
        facts: Vec<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            images,
            alts,
            facts,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Load images and alt text from disk. A missing images directory or alt
    /// file is logged and leaves the library without those entries.
    pub fn load(config: &ContentConfig) -> Self {
        let images = match scan_images(Path::new(&config.images_dir)) {
            Ok(images) => images,
            Err(e) => {
                tracing::warn!(dir = %config.images_dir, error = %e, "Could not read images directory");
                Vec::new()
            }
        };

        let alts = match load_alts(Path::new(&config.alt_text_path)) {
            Ok(alts) => alts,
            Err(e) => {
                tracing::warn!(path = %config.alt_text_path, error = %e, "Could not load alt text, using default");
                HashMap::new()
            }
        };

        tracing::info!(images = images.len(), alt_texts = alts.len(), "Content library loaded");

        Self::new(
            images,
            alts,
            FACTS.iter().map(|f| f.to_string()).collect(),
            config.public_url.clone(),
        )
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<CapyImage> {
        let path = self.images.get(index.checked_sub(1)?)?;
        Some(CapyImage {
            index,
            url: format!("{}/v1/capybara/{}", self.public_url, index),
            alt: self
                .alts
                .get(&index)
                .cloned()
                .unwrap_or_else(|| DEFAULT_ALT.to_string()),
            path: path.clone(),
        })
    }

    pub fn random(&self) -> Option<CapyImage> {
        if self.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(1..=self.len());
        self.get(index)
    }

    /// Same image for every request on a given UTC day.
    pub fn of_the_day(&self, date: NaiveDate) -> Option<CapyImage> {
        self.pick(date.num_days_from_ce().unsigned_abs() as usize)
    }

    /// Same image for every request within a given UTC hour.
    pub fn of_the_hour(&self, at: DateTime<Utc>) -> Option<CapyImage> {
        let day = at.date_naive().num_days_from_ce().unsigned_abs() as usize;
        self.pick(day.wrapping_mul(24).wrapping_add(at.hour() as usize))
    }

    fn pick(&self, seed: usize) -> Option<CapyImage> {
        if self.is_empty() {
            return None;
        }
        self.get(seed % self.len() + 1)
    }

    pub fn page(&self, page: Page) -> Vec<CapyImage> {
        page.range(self.len())
            .filter_map(|i| self.get(i + 1))
            .collect()
    }

    pub fn random_fact(&self) -> Option<&str> {
        if self.facts.is_empty() {
            return None;
        }
        let i = rand::thread_rng().gen_range(0..self.facts.len());
        Some(&self.facts[i])
    }

    pub fn facts(&self, page: Page) -> &[String] {
        &self.facts[page.range(self.facts.len())]
    }

    pub async fn read_image(&self, image: &CapyImage) -> Result<Vec<u8>, ContentError> {
        Ok(tokio::fs::read(&image.path).await?)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Leading digits of a file stem, for natural ordering (`capy2` < `capy10`).
fn numeric_key(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn scan_images(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            extension(path)
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false)
        })
        .collect();

    images.sort_by(|a, b| {
        numeric_key(a)
            .cmp(&numeric_key(b))
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
    Ok(images)
}

fn load_alts(path: &Path) -> Result<HashMap<usize, String>, ContentError> {
    let content = std::fs::read_to_string(path)?;
    let raw: HashMap<String, String> = serde_json::from_str(&content)?;

    Ok(raw
        .into_iter()
        .filter_map(|(k, v)| k.trim().parse::<usize>().ok().map(|i| (i, v)))
        .collect())
}
