//! Dominant color extraction and naming for product photographs.
//!
//! An image is split into `k` spatial clusters around random seed points, each
//! cluster is reduced to its mean color, and that color is matched against a
//! reference table of named colors:
//!
//! ```no_run
//! use colortag::{AnalysisConfig, ColorEngine, batch_rng, build_row};
//!
//! let config = AnalysisConfig::from_json_file("config.json".as_ref())?;
//! let engine = ColorEngine::from_config(&config)?;
//! let img = image::open("product.jpg")?;
//! let results = engine.analyze(&img, &mut batch_rng(42, 0))?;
//! println!("{:?}", build_row(&results));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod classify;
pub mod color;
pub mod engine;
pub mod error;
pub mod partition;
pub mod record;
pub mod table;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use aggregate::mean_color;
pub use classify::{Classifier, DistanceEntry, NearestTable, RangeEntry, Strategy};
pub use color::{PerceptualColor, PerceptualSpace};
pub use engine::{ColorEngine, analyze_image, batch_rng, describe_cluster};
pub use error::{ColorError, EngineError, Error, ListingError, TableError};
pub use partition::{ClusterCount, Partition, PixelGrid, SeedPoint, partition};
pub use record::{ClassificationResult, ProductInput, ProductRecord, build_row, header_row, parse_listing};
pub use table::{AnalysisConfig, ClassifierConfig, NearestColor, ThresholdColor};

#[cfg(target_arch = "wasm32")]
pub use wasm::classify_image;
