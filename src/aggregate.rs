use palette::Srgb;

/// Channel-wise arithmetic mean of a cluster, normalized to `[0, 1]`.
///
/// Returns `None` for an empty cluster.
pub fn mean_color(cluster: &[Srgb<u8>]) -> Option<Srgb<f32>> {
    if cluster.is_empty() {
        return None;
    }
    let (r, g, b) = cluster.iter().fold((0u64, 0u64, 0u64), |(r, g, b), px| {
        (r + px.red as u64, g + px.green as u64, b + px.blue as u64)
    });
    let n = cluster.len() as f64;
    let channel = |total: u64| ((total as f64 / n) / 255.0) as f32;
    Some(Srgb::new(channel(r), channel(g), channel(b)))
}
