//! End-to-end checks through the public API.

use colortag::{
    AnalysisConfig, ClassifierConfig, ClusterCount, ColorEngine, EngineError, PerceptualSpace, ProductRecord,
    batch_rng, build_row, color, partition,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use palette::Srgb;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const CONFIG: &str = include_str!("../config.example.json");

fn four_quadrants() -> RgbImage {
    RgbImage::from_fn(60, 40, |x, y| match (x < 30, y < 20) {
        (true, true) => Rgb([0, 0, 0]),
        (false, true) => Rgb([255, 255, 255]),
        (true, false) => Rgb([220, 30, 20]),
        (false, false) => Rgb([20, 40, 200]),
    })
}

#[test]
fn example_config_builds_an_engine() {
    let config = AnalysisConfig::from_json_str(CONFIG).unwrap();
    let engine = ColorEngine::from_config(&config).unwrap();
    assert_eq!(engine.cluster_count().get(), config.k);
    assert!(!engine.classifier().is_empty());
}

#[test]
fn partition_covers_image_exactly_once() {
    let img = four_quadrants();
    for k in [1, 2, 5, 17] {
        let mut rng = ChaCha8Rng::seed_from_u64(k as u64);
        let part = partition(&img, ClusterCount::new(k).unwrap(), &mut rng).unwrap();
        assert_eq!(part.len(), k);
        assert_eq!(part.pixel_count(), 60 * 40);
    }
}

#[test]
fn same_seed_same_row() {
    let config = AnalysisConfig::from_json_str(CONFIG).unwrap();
    let engine = ColorEngine::from_config(&config).unwrap();
    let img = four_quadrants();
    let a = engine.analyze(&img, &mut batch_rng(2024, 0)).unwrap();
    let b = engine.analyze(&img, &mut batch_rng(2024, 0)).unwrap();
    assert_eq!(build_row(&a), build_row(&b));
    assert_eq!(build_row(&a).len(), 2 * config.k);
}

#[test]
fn all_black_image_is_black() {
    let config = AnalysisConfig::from_json_str(CONFIG).unwrap();
    let engine = ColorEngine::from_config(&config).unwrap();
    let img = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
    let results = engine.analyze(&img, &mut batch_rng(1, 0)).unwrap();
    assert!(results.iter().any(|r| !r.is_empty()));
    for r in results.iter().filter(|r| !r.is_empty()) {
        assert_eq!(r.hex, "#000000");
        assert!(r.names.iter().any(|n| n == "black"));
    }
}

#[test]
fn all_white_image_is_white() {
    let config = AnalysisConfig::from_json_str(CONFIG).unwrap();
    let engine = ColorEngine::from_config(&config).unwrap();
    let img = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
    for r in engine.analyze(&img, &mut batch_rng(3, 0)).unwrap() {
        if r.is_empty() {
            continue;
        }
        assert_eq!(r.hex, "#FFFFFF");
        let hsv = color::to_hsv(color::parse_hex(&r.hex).unwrap().into_format());
        assert_eq!(hsv.saturation, 0.0);
        assert!((hsv.value - 1.0).abs() < 1e-6);
        assert!(r.names.iter().any(|n| n == "white"));
    }
}

#[test]
fn nearest_table_always_names_each_cluster() {
    let table = r##"{ "strategy": "nearest", "colors": [
        { "name": "black", "hex": "#191818" },
        { "name": "white", "hex": "#FFFDF7" },
        { "name": "red", "hex": "#FF260C" },
        { "name": "blue", "hex": "#3F4AFF" } ] }"##;
    let classifier = ClassifierConfig::from_json_str(table).unwrap().build().unwrap();
    let engine = ColorEngine::new(classifier, ClusterCount::new(6).unwrap());
    for r in engine.analyze(&four_quadrants(), &mut batch_rng(8, 0)).unwrap() {
        if !r.is_empty() {
            assert_eq!(r.names.len(), 1);
        }
    }
}

#[test]
fn threshold_table_matches_within_window_only() {
    let reference: Srgb<f32> = color::parse_hex("#191818").unwrap().into_format();
    let sample: Srgb<f32> = color::parse_hex("#141414").unwrap().into_format();
    let d = PerceptualSpace::Luv.distance(reference, sample);
    let table = format!(
        r##"{{ "strategy": "threshold", "colors": [
            {{ "name": "black", "hex": "#191818", "minDistance": 0.0, "maxDistance": {hi} }},
            {{ "name": "charcoal", "hex": "#191818", "minDistance": {lo}, "maxDistance": 1.0 }} ] }}"##,
        hi = d + 0.001,
        lo = d + 0.01,
    );
    let classifier = ClassifierConfig::from_json_str(&table).unwrap().build().unwrap();
    assert_eq!(classifier.classify(sample), vec!["black"]);
}

#[test]
fn zero_clusters_never_reach_the_engine() {
    let json = CONFIG.replacen("\"k\": 5", "\"k\": 0", 1);
    let config = AnalysisConfig::from_json_str(&json).unwrap();
    match ColorEngine::from_config(&config) {
        Err(colortag::Error::Engine(EngineError::InvalidClusterCount(0))) => {}
        other => panic!("expected InvalidClusterCount, got {other:?}"),
    }
}

#[test]
fn product_record_prefixes_identifiers() {
    let config = AnalysisConfig::from_json_str(CONFIG).unwrap();
    let engine = ColorEngine::from_config(&config).unwrap();
    let results = engine.analyze(&four_quadrants(), &mut batch_rng(4, 0)).unwrap();
    let record = ProductRecord {
        sku: "2745465".to_string(),
        image_url: "http://example.com/2745465_1.jpg".to_string(),
        results,
    };
    let row = record.to_row();
    assert_eq!(row.len(), ProductRecord::header(config.k).len());
    assert_eq!(&row[..2], &["2745465".to_string(), "http://example.com/2745465_1.jpg".to_string()]);
}

#[test]
fn nearest_example_config_names_black_and_white() {
    let config = AnalysisConfig::from_json_str(include_str!("../config.nearest.example.json")).unwrap();
    let engine = ColorEngine::from_config(&config).unwrap();
    let classifier = engine.classifier();
    assert_eq!(classifier.classify(Srgb::new(0.0, 0.0, 0.0)), vec!["black"]);
    assert_eq!(classifier.classify(Srgb::new(1.0, 1.0, 1.0)), vec!["white"]);
}

#[test]
fn transparent_pixels_count_as_black() {
    let table = r##"{ "strategy": "nearest", "colors": [
        { "name": "black", "hex": "#000000" },
        { "name": "white", "hex": "#FFFFFF" } ] }"##;
    let classifier = ClassifierConfig::from_json_str(table).unwrap().build().unwrap();
    let engine = ColorEngine::new(classifier, ClusterCount::new(1).unwrap());
    let img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
    let results = engine.analyze(&img, &mut batch_rng(6, 0)).unwrap();
    assert_eq!(results[0].hex, "#000000");
    assert_eq!(results[0].names, vec!["black".to_string()]);
}

#[test]
fn threshold_overlaps_keep_table_order() {
    let table = r##"{ "strategy": "threshold", "colors": [
        { "name": "b", "hex": "#7D7C7A", "minDistance": 0.0, "maxDistance": 0.5 },
        { "name": "a", "hex": "#7D7C7A", "minDistance": 0.0, "maxDistance": 1.0 },
        { "name": "c", "hex": "#7D7C7A", "minDistance": 0.9, "maxDistance": 1.0 } ] }"##;
    let classifier = ClassifierConfig::from_json_str(table).unwrap().build().unwrap();
    assert_eq!(classifier.classify(Srgb::new(0.5, 0.5, 0.5)), vec!["b", "a"]);
}
