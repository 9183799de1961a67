use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::engine::{ColorEngine, batch_rng};
use crate::partition::ClusterCount;
use crate::record::build_row;
use crate::table::ClassifierConfig;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn string_array<'a>(items: impl IntoIterator<Item = &'a str>) -> Array {
    let array = Array::new();
    for item in items {
        array.push(&JsValue::from_str(item));
    }
    array
}

/// Classify the dominant colors of an encoded image.
///
/// `config_json` holds the reference table (`{"strategy": ..., "colors": [...]}`).
/// When `seed` is omitted a random one is drawn.
///
/// Returns `{ colors: string[], matches: string[][], row: string[] }`.
#[wasm_bindgen]
pub fn classify_image(
    input: Vec<u8>,
    k: usize,
    config_json: &str,
    seed: Option<u64>,
) -> Result<Object, JsValue> {
    let k = ClusterCount::new(k).map_err(js_err)?;
    let classifier = ClassifierConfig::from_json_str(config_json)
        .and_then(|config| config.build())
        .map_err(js_err)?;
    let img = image::load_from_memory(&input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;

    let engine = ColorEngine::new(classifier, k);
    let seed = seed.unwrap_or_else(rand::random);
    let results = engine.analyze(&img, &mut batch_rng(seed, 0)).map_err(js_err)?;

    let colors = string_array(results.iter().map(|r| r.hex.as_str()));
    let matches = Array::new();
    for r in &results {
        matches.push(&string_array(r.names.iter().map(String::as_str)));
    }
    let row = build_row(&results);
    let row_js = string_array(row.iter().map(String::as_str));

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("colors"), &colors)?;
    Reflect::set(&result, &JsValue::from_str("matches"), &matches)?;
    Reflect::set(&result, &JsValue::from_str("row"), &row_js)?;
    Ok(result)
}
