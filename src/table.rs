//! Loading and validating reference color tables.
//!
//! The JSON layout is tagged by `strategy`:
//!
//! ```json
//! { "k": 5,
//!   "classifier": { "strategy": "threshold", "space": "luv",
//!                   "colors": [{ "name": "purple", "hex": "#9E4DFF",
//!                                "minDistance": 0.02, "maxDistance": 0.04 }] } }
//! ```
//!
//! Every entry is validated here, before any classification runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{Classifier, DistanceEntry, NearestTable, RangeEntry};
use crate::color::{PerceptualSpace, parse_hex};
use crate::error::{EngineError, TableError};
use crate::partition::ClusterCount;

const DEFAULT_CROP_PERCENTAGE: f32 = 50.0;
const DEFAULT_RESIZE_WIDTH: u32 = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdColor {
    pub name: String,
    pub hex: String,
    pub min_distance: f32,
    pub max_distance: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NearestColor {
    pub name: String,
    pub hex: String,
}

/// Raw reference table as it appears in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ClassifierConfig {
    Range {
        colors: Vec<RangeEntry>,
    },
    Threshold {
        #[serde(default)]
        space: PerceptualSpace,
        colors: Vec<ThresholdColor>,
    },
    Nearest {
        #[serde(default)]
        space: PerceptualSpace,
        colors: Vec<NearestColor>,
    },
}

impl ClassifierConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate every entry and resolve hex strings.
    pub fn build(&self) -> Result<Classifier, TableError> {
        let classifier = match self {
            ClassifierConfig::Range { colors } => {
                for (index, entry) in colors.iter().enumerate() {
                    validate_range(index, entry)?;
                }
                Classifier::Range(colors.clone())
            }
            ClassifierConfig::Threshold { space, colors } => {
                let entries = colors
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        validate_name(index, &entry.name)?;
                        check_distance(index, &entry.name, entry.min_distance, entry.max_distance)?;
                        let canonical = resolve_hex(index, &entry.name, &entry.hex)?;
                        Ok(DistanceEntry::new(
                            entry.name.clone(),
                            canonical,
                            *space,
                            entry.min_distance,
                            entry.max_distance,
                        ))
                    })
                    .collect::<Result<Vec<_>, TableError>>()?;
                Classifier::ThresholdDistance {
                    space: *space,
                    entries,
                }
            }
            ClassifierConfig::Nearest { space, colors } => {
                let entries = colors
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        validate_name(index, &entry.name)?;
                        let canonical = resolve_hex(index, &entry.name, &entry.hex)?;
                        Ok(DistanceEntry::nearest(entry.name.clone(), canonical, *space))
                    })
                    .collect::<Result<Vec<_>, TableError>>()?;
                let entries = NearestTable::new(entries)
                    .ok_or_else(|| TableError::malformed(0, "", "nearest table needs at least one color"))?;
                Classifier::NearestDistance {
                    space: *space,
                    entries,
                }
            }
        };
        debug!(strategy = ?classifier.strategy(), colors = classifier.len(), "loaded reference table");
        Ok(classifier)
    }
}

/// Full analysis settings: cluster count, reference table and the
/// preprocessing hints consumed by the command-line front end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub k: usize,
    #[serde(default = "default_crop_percentage")]
    pub crop_percentage: f32,
    #[serde(default = "default_resize_width")]
    pub resize_width: u32,
    pub classifier: ClassifierConfig,
}

fn default_crop_percentage() -> f32 {
    DEFAULT_CROP_PERCENTAGE
}

fn default_resize_width() -> u32 {
    DEFAULT_RESIZE_WIDTH
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TableError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn cluster_count(&self) -> Result<ClusterCount, EngineError> {
        ClusterCount::new(self.k)
    }
}

fn validate_name(index: usize, name: &str) -> Result<(), TableError> {
    if name.trim().is_empty() {
        return Err(TableError::malformed(index, name, "name is empty"));
    }
    Ok(())
}

fn check_bound(index: usize, name: &str, field: &str, value: f32, max: f32) -> Result<(), TableError> {
    if !value.is_finite() || !(0.0..=max).contains(&value) {
        return Err(TableError::malformed(
            index,
            name,
            format!("{field} {value} is outside [0, {max}]"),
        ));
    }
    Ok(())
}

fn validate_range(index: usize, entry: &RangeEntry) -> Result<(), TableError> {
    let name = entry.name.as_str();
    validate_name(index, name)?;
    check_bound(index, name, "minHue", entry.min_hue, 360.0)?;
    check_bound(index, name, "maxHue", entry.max_hue, 360.0)?;
    check_bound(index, name, "minSaturation", entry.min_saturation, 1.0)?;
    check_bound(index, name, "maxSaturation", entry.max_saturation, 1.0)?;
    check_bound(index, name, "minValue", entry.min_value, 1.0)?;
    check_bound(index, name, "maxValue", entry.max_value, 1.0)?;
    // Saturation may legitimately be descending; hue and value may not.
    if entry.min_hue > entry.max_hue {
        return Err(TableError::malformed(index, name, "minHue exceeds maxHue"));
    }
    if entry.min_value > entry.max_value {
        return Err(TableError::malformed(index, name, "minValue exceeds maxValue"));
    }
    Ok(())
}

fn check_distance(index: usize, name: &str, min: f32, max: f32) -> Result<(), TableError> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 {
        return Err(TableError::malformed(
            index,
            name,
            format!("distance window [{min}, {max}] is not a finite, non-negative range"),
        ));
    }
    if min > max {
        return Err(TableError::malformed(index, name, "minDistance exceeds maxDistance"));
    }
    Ok(())
}

fn resolve_hex(index: usize, name: &str, hex: &str) -> Result<palette::Srgb<u8>, TableError> {
    parse_hex(hex).map_err(|source| TableError::Color {
        index,
        name: name.to_string(),
        source,
    })
}
