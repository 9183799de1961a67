use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use colortag::{AnalysisConfig, ClusterCount, ColorEngine, ProductInput, ProductRecord, parse_listing};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Name the dominant colors of product photos against a reference color table.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["inputs", "listing"])))]
struct Args {
    /// Input image paths; each file stem is used as the SKU
    inputs: Vec<PathBuf>,

    /// Product listing with a header line and `sku,imageUrl` rows; image
    /// paths are resolved against the listing's directory
    #[arg(short, long, conflicts_with = "inputs")]
    listing: Option<PathBuf>,

    /// JSON file with the cluster count and reference color table
    #[arg(short, long)]
    config: PathBuf,

    /// Number of clusters (overrides the config file)
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// Seed for seed-point placement; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Centre crop, as a percentage of width and height (overrides the config file)
    #[arg(long)]
    crop_percentage: Option<f32>,

    /// Width to resize to before analysis (overrides the config file)
    #[arg(long)]
    resize_width: Option<u32>,

    /// Print the `SKU, imageUrl, Gen. Color i, Matches for i` header first
    #[arg(long)]
    header: bool,
}

/// Keep the centre `percentage` of each dimension.
fn crop_center(img: &DynamicImage, percentage: f32) -> DynamicImage {
    let (w, h) = img.dimensions();
    let ratio = (percentage.clamp(0.0, 100.0) * 0.01) as f64;
    let crop_w = ((w as f64 * ratio) as u32).max(1).min(w);
    let crop_h = ((h as f64 * ratio) as u32).max(1).min(h);
    img.crop_imm((w - crop_w) / 2, (h - crop_h) / 2, crop_w, crop_h)
}

/// Scale to `width`, keeping the aspect ratio. The height is truncated.
fn resize_to_width(img: &DynamicImage, width: u32) -> RgbaImage {
    let width = width.max(1);
    imageops::resize(img, width, scaled_height(img.dimensions(), width), FilterType::Lanczos3)
}

fn scaled_height((w, h): (u32, u32), width: u32) -> u32 {
    let ratio = width as f64 / w as f64;
    ((h as f64 * ratio) as u32).max(1)
}

/// Products named on the command line, or read from the listing file.
fn products(args: &Args) -> Result<(Vec<ProductInput>, PathBuf)> {
    match &args.listing {
        Some(listing) => {
            let text = fs::read_to_string(listing)
                .with_context(|| format!("reading {}", listing.display()))?;
            let products = parse_listing(&text).with_context(|| format!("parsing {}", listing.display()))?;
            let base = listing.parent().map(Path::to_path_buf).unwrap_or_default();
            Ok((products, base))
        }
        None => {
            let products = args
                .inputs
                .iter()
                .map(|path| ProductInput {
                    sku: path
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    image_url: path.display().to_string(),
                })
                .collect();
            Ok((products, PathBuf::new()))
        }
    }
}

fn load_image(path: &Path, crop_percentage: f32, resize_width: u32) -> Result<RgbaImage> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("decoding {}", path.display()))?;
    anyhow::ensure!(
        img.width() > 0 && img.height() > 0,
        "{} has no pixels",
        path.display()
    );
    let cropped = crop_center(&img, crop_percentage);
    Ok(resize_to_width(&cropped, resize_width))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colortag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = AnalysisConfig::from_json_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(k) = args.clusters {
        config.k = k;
    }
    let crop_percentage = args.crop_percentage.unwrap_or(config.crop_percentage);
    let resize_width = args.resize_width.unwrap_or(config.resize_width);

    let engine = ColorEngine::from_config(&config).context("invalid configuration")?;
    let k: ClusterCount = engine.cluster_count();
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        k = k.get(),
        seed,
        strategy = ?engine.classifier().strategy(),
        colors = engine.classifier().len(),
        "configuration loaded"
    );

    let (listed, base) = products(&args)?;

    // Unreadable images are skipped, the rest of the batch still runs.
    let mut inputs = Vec::new();
    let mut images = Vec::new();
    for product in listed {
        let path = base.join(&product.image_url);
        match load_image(&path, crop_percentage, resize_width) {
            Ok(img) => {
                inputs.push(product);
                images.push(img);
            }
            Err(e) => warn!(sku = %product.sku, "skipping {}: {e:#}", path.display()),
        }
    }

    if args.header {
        println!("{}", serde_json::to_string(&ProductRecord::header(k.get()))?);
    }

    let results = engine.analyze_batch(&images, seed);
    let mut written = 0;
    for (product, result) in inputs.into_iter().zip(results) {
        match result {
            Ok(result) => {
                let record = product.into_record(result);
                println!("{}", serde_json::to_string(&record.to_row())?);
                written += 1;
            }
            Err(e) => warn!(sku = %product.sku, "skipping {}: {e}", product.image_url),
        }
    }

    info!(products = written, colors = written * k.get(), "done");
    Ok(())
}
