//! Mapping representative colors to reference color names.
//!
//! A [`Classifier`] owns an immutable, validated reference table and applies
//! exactly one strategy to it. Tables are built by [`crate::table`]; nothing in
//! here reads configuration.

use palette::{Hsv, Srgb};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::color::{PerceptualColor, PerceptualSpace, to_hsv};

/// Inclusive HSV box used by the range strategy.
///
/// When `min_saturation >= max_saturation` the saturation bound is read as a
/// descending range, i.e. `max_saturation <= s <= min_saturation`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeEntry {
    pub name: String,
    pub min_hue: f32,
    pub max_hue: f32,
    pub min_saturation: f32,
    pub max_saturation: f32,
    pub min_value: f32,
    pub max_value: f32,
}

impl RangeEntry {
    pub fn contains(&self, hsv: Hsv) -> bool {
        let h = hsv.hue.into_positive_degrees();
        let s = hsv.saturation;
        let v = hsv.value;

        if !(self.min_hue <= h && h <= self.max_hue) || !(self.min_value <= v && v <= self.max_value) {
            return false;
        }
        if self.min_saturation < self.max_saturation {
            self.min_saturation <= s && s <= self.max_saturation
        } else {
            self.min_saturation >= s && s >= self.max_saturation
        }
    }
}

/// A named reference color with its perceptual coordinates resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceEntry {
    pub name: String,
    pub canonical: Srgb<u8>,
    pub(crate) perceptual: PerceptualColor,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl DistanceEntry {
    /// Entry for the threshold form, accepting `[min_distance, max_distance]`.
    pub fn new(
        name: impl Into<String>,
        canonical: Srgb<u8>,
        space: PerceptualSpace,
        min_distance: f32,
        max_distance: f32,
    ) -> Self {
        Self {
            name: name.into(),
            canonical,
            perceptual: space.convert(canonical.into_format()),
            min_distance,
            max_distance,
        }
    }

    /// Entry for the nearest form; the distance window is unbounded.
    pub fn nearest(name: impl Into<String>, canonical: Srgb<u8>, space: PerceptualSpace) -> Self {
        Self::new(name, canonical, space, 0.0, f32::INFINITY)
    }

    pub fn distance_to(&self, color: PerceptualColor) -> f32 {
        color.distance(self.perceptual)
    }

    #[inline]
    pub fn accepts(&self, distance: f32) -> bool {
        self.min_distance <= distance && distance <= self.max_distance
    }
}

/// Position of the smallest distance; the first one wins on ties.
pub fn closest<I: IntoIterator<Item = f32>>(distances: I) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, d) in distances.into_iter().enumerate() {
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((idx, d)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Reference entries for the nearest form. Never empty, so a closest entry
/// always exists.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestTable(Vec<DistanceEntry>);

impl NearestTable {
    /// `None` when `entries` is empty.
    pub fn new(entries: Vec<DistanceEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self(entries))
        }
    }

    pub fn entries(&self) -> &[DistanceEntry] {
        &self.0
    }

    /// The entry closest to `target`; the earliest one wins on ties.
    pub fn closest_to(&self, target: PerceptualColor) -> &DistanceEntry {
        let idx = closest(self.0.iter().map(|e| e.distance_to(target))).unwrap_or(0);
        &self.0[idx]
    }
}

/// Which of the three matching strategies a classifier applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Range,
    Threshold,
    Nearest,
}

/// Reference table plus the strategy used to match against it.
#[derive(Clone, Debug, PartialEq)]
pub enum Classifier {
    Range(Vec<RangeEntry>),
    ThresholdDistance {
        space: PerceptualSpace,
        entries: Vec<DistanceEntry>,
    },
    NearestDistance {
        space: PerceptualSpace,
        entries: NearestTable,
    },
}

impl Classifier {
    pub fn strategy(&self) -> Strategy {
        match self {
            Classifier::Range(_) => Strategy::Range,
            Classifier::ThresholdDistance { .. } => Strategy::Threshold,
            Classifier::NearestDistance { .. } => Strategy::Nearest,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Classifier::Range(entries) => entries.len(),
            Classifier::ThresholdDistance { entries, .. } => entries.len(),
            Classifier::NearestDistance { entries, .. } => entries.entries().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of every reference color matching `color`, in table order.
    pub fn classify(&self, color: Srgb<f32>) -> Vec<&str> {
        let names: Vec<&str> = match self {
            Classifier::Range(entries) => {
                let hsv = to_hsv(color);
                entries
                    .iter()
                    .filter(|e| e.contains(hsv))
                    .map(|e| e.name.as_str())
                    .collect()
            }
            Classifier::ThresholdDistance { space, entries } => {
                let target = space.convert(color);
                entries
                    .iter()
                    .filter(|e| e.accepts(e.distance_to(target)))
                    .map(|e| e.name.as_str())
                    .collect()
            }
            Classifier::NearestDistance { space, entries } => {
                vec![entries.closest_to(space.convert(color)).name.as_str()]
            }
        };
        trace!(strategy = ?self.strategy(), matches = names.len(), "classified color");
        names
    }
}
