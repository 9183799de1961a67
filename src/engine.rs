//! Partition → aggregate → classify, for one image or a batch.

use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::aggregate::mean_color;
use crate::classify::Classifier;
use crate::color::to_hex;
use crate::error::{EngineError, Error};
use crate::partition::{ClusterCount, PixelGrid, partition};
use crate::record::ClassificationResult;
use crate::table::AnalysisConfig;

/// Generator for the `index`-th image of a batch seeded with `seed`.
///
/// Every index gets its own ChaCha stream, so results do not depend on which
/// thread analyzes which image.
pub fn batch_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

/// Classify one cluster. Empty clusters produce an empty result.
pub fn describe_cluster(cluster: &[Srgb<u8>], classifier: &Classifier) -> ClassificationResult {
    match mean_color(cluster) {
        Some(color) => {
            let names = classifier
                .classify(color)
                .into_iter()
                .map(str::to_string)
                .collect();
            ClassificationResult::new(to_hex(color), names)
        }
        None => ClassificationResult::empty(),
    }
}

/// Run the whole pipeline on `image`, returning `k` results in cluster order.
pub fn analyze_image<G, R>(
    image: &G,
    k: ClusterCount,
    classifier: &Classifier,
    rng: &mut R,
) -> Result<Vec<ClassificationResult>, EngineError>
where
    G: PixelGrid + ?Sized,
    R: Rng + ?Sized,
{
    let partition = partition(image, k, rng)?;
    let results: Vec<ClassificationResult> = partition
        .into_clusters()
        .iter()
        .enumerate()
        .map(|(idx, cluster)| {
            let result = describe_cluster(cluster, classifier);
            trace!(cluster = idx, pixels = cluster.len(), hex = %result.hex, "cluster classified");
            result
        })
        .collect();
    debug!(
        k = k.get(),
        matched = results.iter().filter(|r| !r.names.is_empty()).count(),
        "image analyzed"
    );
    Ok(results)
}

/// A reference table bound to a cluster count. Immutable and shareable
/// across threads.
#[derive(Clone, Debug)]
pub struct ColorEngine {
    classifier: Classifier,
    k: ClusterCount,
}

impl ColorEngine {
    pub fn new(classifier: Classifier, k: ClusterCount) -> Self {
        Self { classifier, k }
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, Error> {
        let k = config.cluster_count()?;
        let classifier = config.classifier.build()?;
        Ok(Self::new(classifier, k))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn cluster_count(&self) -> ClusterCount {
        self.k
    }

    pub fn analyze<G, R>(&self, image: &G, rng: &mut R) -> Result<Vec<ClassificationResult>, EngineError>
    where
        G: PixelGrid + ?Sized,
        R: Rng + ?Sized,
    {
        analyze_image(image, self.k, &self.classifier, rng)
    }

    /// Analyze every image in parallel; image `i` uses [`batch_rng`]`(seed, i)`.
    #[cfg(feature = "parallel")]
    pub fn analyze_batch<G>(&self, images: &[G], seed: u64) -> Vec<Result<Vec<ClassificationResult>, EngineError>>
    where
        G: PixelGrid + Sync,
    {
        debug!(images = images.len(), seed, "analyzing batch");
        images
            .par_iter()
            .enumerate()
            .map(|(idx, image)| self.analyze(image, &mut batch_rng(seed, idx)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{DistanceEntry, NearestTable, RangeEntry};
    use crate::color::PerceptualSpace;
    use image::{Rgb, RgbImage};

    fn black_and_dark() -> Classifier {
        Classifier::Range(vec![RangeEntry {
            name: "black".to_string(),
            min_hue: 0.0,
            max_hue: 360.0,
            min_saturation: 0.0,
            max_saturation: 1.0,
            min_value: 0.0,
            max_value: 0.16,
        }])
    }

    #[test]
    fn empty_cluster_is_an_empty_result() {
        let result = describe_cluster(&[], &black_and_dark());
        assert_eq!(result.hex, "");
        assert!(result.names.is_empty());
    }

    #[test]
    fn black_image_matches_black() {
        let img = RgbImage::from_pixel(20, 10, Rgb([0, 0, 0]));
        let k = ClusterCount::new(3).unwrap();
        let results = analyze_image(&img, k, &black_and_dark(), &mut batch_rng(5, 0)).unwrap();
        assert_eq!(results.len(), 3);
        for r in results.iter().filter(|r| !r.is_empty()) {
            assert_eq!(r.hex, "#000000");
            assert_eq!(r.names, vec!["black".to_string()]);
        }
    }

    #[test]
    fn single_pixel_with_many_clusters_keeps_k_results() {
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        let engine = ColorEngine::new(black_and_dark(), ClusterCount::new(4).unwrap());
        let results = engine.analyze(&img, &mut batch_rng(1, 0)).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results.iter().filter(|r| r.hex == "#FFFFFF").count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_empty()).count(), 3);
    }

    #[test]
    fn batch_streams_differ_but_are_reproducible() {
        let mut a = batch_rng(9, 0);
        let mut b = batch_rng(9, 1);
        let mut a2 = batch_rng(9, 0);
        let first: u64 = a.random();
        assert_ne!(first, b.random::<u64>());
        assert_eq!(first, a2.random::<u64>());
    }

    #[test]
    fn nearest_engine_names_every_nonempty_cluster() {
        let space = PerceptualSpace::Luv;
        let entries = NearestTable::new(vec![
            DistanceEntry::nearest("white", Srgb::new(255, 253, 247), space),
            DistanceEntry::nearest("black", Srgb::new(25, 24, 24), space),
        ])
        .unwrap();
        let classifier = Classifier::NearestDistance { space, entries };
        let img = RgbImage::from_fn(8, 8, |x, _| if x < 4 { Rgb([250, 250, 250]) } else { Rgb([5, 5, 5]) });
        let engine = ColorEngine::new(classifier, ClusterCount::new(2).unwrap());
        for r in engine.analyze(&img, &mut batch_rng(11, 0)).unwrap() {
            if !r.is_empty() {
                assert_eq!(r.names.len(), 1);
            }
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn batch_matches_sequential_runs() {
        let images: Vec<RgbImage> = (0..6u8)
            .map(|i| RgbImage::from_fn(16, 12, move |x, y| Rgb([x as u8 * i, y as u8 * 3, i * 20])))
            .collect();
        let engine = ColorEngine::new(black_and_dark(), ClusterCount::new(3).unwrap());
        let batch = engine.analyze_batch(&images, 77);
        for (idx, image) in images.iter().enumerate() {
            let sequential = engine.analyze(image, &mut batch_rng(77, idx)).unwrap();
            assert_eq!(batch[idx].as_ref().unwrap(), &sequential);
        }
    }
}
