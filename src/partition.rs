//! Single-pass spatial partitioning.
//!
//! Seeds are dropped uniformly at random inside the image bounds and every
//! pixel joins the cluster of the geometrically closest seed. There is no
//! re-centering step; one scan produces the final partition.

use std::num::NonZeroUsize;

use image::{DynamicImage, GenericImageView, RgbImage, RgbaImage};
use palette::Srgb;
use rand::Rng;
use tracing::debug;

use crate::error::EngineError;

/// Read-only access to a decoded pixel grid.
pub trait PixelGrid {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixel_at(&self, x: u32, y: u32) -> Srgb<u8>;
}

impl PixelGrid for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel_at(&self, x: u32, y: u32) -> Srgb<u8> {
        let [r, g, b] = self.get_pixel(x, y).0;
        Srgb::new(r, g, b)
    }
}

/// Scale a straight channel by alpha, truncating like 8-bit premultiplication.
#[inline(always)]
fn premultiply(channel: u8, alpha: u8) -> u8 {
    (channel as u16 * alpha as u16 / 255) as u8
}

#[inline(always)]
fn premultiplied(r: u8, g: u8, b: u8, a: u8) -> Srgb<u8> {
    Srgb::new(premultiply(r, a), premultiply(g, a), premultiply(b, a))
}

// Transparent pixels still belong to a cluster; they count towards black.
impl PixelGrid for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel_at(&self, x: u32, y: u32) -> Srgb<u8> {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        premultiplied(r, g, b, a)
    }
}

impl PixelGrid for DynamicImage {
    fn width(&self) -> u32 {
        GenericImageView::width(self)
    }

    fn height(&self) -> u32 {
        GenericImageView::height(self)
    }

    fn pixel_at(&self, x: u32, y: u32) -> Srgb<u8> {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        premultiplied(r, g, b, a)
    }
}

/// Number of clusters requested for one invocation. Always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClusterCount(NonZeroUsize);

impl ClusterCount {
    pub fn new(k: usize) -> Result<Self, EngineError> {
        NonZeroUsize::new(k)
            .map(ClusterCount)
            .ok_or(EngineError::InvalidClusterCount(k))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for ClusterCount {
    type Error = EngineError;

    fn try_from(k: usize) -> Result<Self, Self::Error> {
        ClusterCount::new(k)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeedPoint {
    pub x: u32,
    pub y: u32,
}

impl SeedPoint {
    #[inline(always)]
    fn distance_squared(self, x: u32, y: u32) -> u64 {
        let dx = self.x.abs_diff(x) as u64;
        let dy = self.y.abs_diff(y) as u64;
        dx * dx + dy * dy
    }
}

/// K seed points and the pixel colors assigned to each of them.
#[derive(Clone, Debug)]
pub struct Partition {
    seeds: Vec<SeedPoint>,
    clusters: Vec<Vec<Srgb<u8>>>,
}

impl Partition {
    pub fn seeds(&self) -> &[SeedPoint] {
        &self.seeds
    }

    pub fn clusters(&self) -> &[Vec<Srgb<u8>>] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<Vec<Srgb<u8>>> {
        self.clusters
    }

    /// Always equal to the requested cluster count.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn pixel_count(&self) -> usize {
        self.clusters.iter().map(Vec::len).sum()
    }
}

/// Draw `k` seed points uniformly inside a `width` x `height` grid.
pub fn seed_points<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    k: ClusterCount,
    rng: &mut R,
) -> Result<Vec<SeedPoint>, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::EmptyImage { width, height });
    }
    Ok((0..k.get())
        .map(|_| SeedPoint {
            x: rng.random_range(0..width),
            y: rng.random_range(0..height),
        })
        .collect())
}

/// Index of the seed closest to `(x, y)`; ties go to the lowest index.
#[inline(always)]
fn nearest_seed(seeds: &[SeedPoint], x: u32, y: u32) -> usize {
    let mut best_idx = 0;
    let mut best_dist = u64::MAX;
    for (idx, seed) in seeds.iter().enumerate() {
        let dist = seed.distance_squared(x, y);
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx;
        }
    }
    best_idx
}

/// Assign every pixel to the seed it is closest to, scanning row-major.
pub fn assign<G: PixelGrid + ?Sized>(image: &G, seeds: &[SeedPoint]) -> Vec<Vec<Srgb<u8>>> {
    let mut clusters: Vec<Vec<Srgb<u8>>> = vec![Vec::new(); seeds.len()];
    if seeds.is_empty() {
        return clusters;
    }
    for y in 0..image.height() {
        for x in 0..image.width() {
            clusters[nearest_seed(seeds, x, y)].push(image.pixel_at(x, y));
        }
    }
    clusters
}

/// Partition `image` into `k` clusters around freshly drawn seed points.
pub fn partition<G, R>(image: &G, k: ClusterCount, rng: &mut R) -> Result<Partition, EngineError>
where
    G: PixelGrid + ?Sized,
    R: Rng + ?Sized,
{
    let (width, height) = (image.width(), image.height());
    let seeds = seed_points(width, height, k, rng)?;
    let clusters = assign(image, &seeds);
    debug!(
        width,
        height,
        k = k.get(),
        empty = clusters.iter().filter(|c| c.is_empty()).count(),
        "partitioned image"
    );
    Ok(Partition { seeds, clusters })
}
