//! Per-creature brightness table and image classification.
//!
//! The dataset is a plain text file with one creature per line:
//! `name brightness [ignored...]`. Numeric ids are not read from the file;
//! they are assigned from the position of each well-formed line, so
//! `001` is the first creature that parsed.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Brightness returned for creatures missing from the table.
pub const NEUTRAL_BRIGHTNESS: f64 = 0.5;

/// Brightness scores keyed by zero-padded id and by lowercase name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdTable {
    by_id: HashMap<String, f64>,
    by_name: HashMap<String, f64>,
}

impl ThresholdTable {
    /// Parse dataset text. Lines with fewer than two tokens, or whose second
    /// token is not a float, are skipped and do not take an id.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        let mut next_id = 1_u32;

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let (Some(name), Some(score)) = (tokens.next(), tokens.next()) else {
                continue;
            };
            let Ok(score) = score.parse::<f64>() else {
                continue;
            };

            table.by_name.insert(name.to_lowercase(), score);
            table.by_id.insert(format!("{next_id:03}"), score);
            next_id += 1;
        }

        table
    }

    /// Read and parse the dataset at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read brightness dataset {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Brightness by id; `id` is zero-padded to three digits first.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<f64> {
        self.by_id.get(&format!("{id:0>3}")).copied()
    }

    /// Brightness by lowercase name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<f64> {
        self.by_name.get(name).copied()
    }

    /// Number of creatures in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no line of the dataset parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Brightness for an image file, derived from its name.
    ///
    /// `025.jpg` is looked up by id, `pikachu.png` by name and
    /// `charizard-mega.jpg` by the part before the first hyphen. Unknown
    /// creatures get `NEUTRAL_BRIGHTNESS`.
    #[must_use]
    pub fn classify(&self, path: &Path) -> f64 {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()) {
            return self.by_id(&stem).unwrap_or(NEUTRAL_BRIGHTNESS);
        }

        let name = stem.split('-').next().unwrap_or_default();
        self.by_name(name).unwrap_or(NEUTRAL_BRIGHTNESS)
    }
}

/// Classifies images against a dataset that is parsed on first use and kept
/// for the lifetime of the classifier.
#[derive(Debug)]
pub struct BrightnessClassifier {
    data_path: PathBuf,
    table: OnceCell<ThresholdTable>,
}

impl BrightnessClassifier {
    /// Classifier backed by the dataset at `data_path`. Nothing is read yet.
    #[must_use]
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            table: OnceCell::new(),
        }
    }

    /// Classifier over an already built table.
    #[must_use]
    pub fn with_table(table: ThresholdTable) -> Self {
        Self {
            data_path: PathBuf::new(),
            table: OnceCell::from(table),
        }
    }

    /// The table, loading it on the first call. An unreadable dataset gives an
    /// empty table, so every image classifies as neutral.
    pub fn table(&self) -> &ThresholdTable {
        self.table.get_or_init(|| match ThresholdTable::load(&self.data_path) {
            Ok(table) => {
                let path = self.data_path.display();
                debug!(path = %path, entries = table.len(), "loaded brightness dataset");
                table
            }
            Err(err) => {
                warn!("{err:#}");
                ThresholdTable::default()
            }
        })
    }

    /// See [`ThresholdTable::classify`].
    pub fn classify(&self, path: &Path) -> f64 {
        self.table().classify(path)
    }
}
