//! Flattening per-image results into output rows.

use serde::{Deserialize, Serialize};

use crate::error::ListingError;

/// Hex string of a representative color and the reference names it matched.
///
/// An empty cluster yields an empty `hex` and no names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub hex: String,
    pub names: Vec<String>,
}

impl ClassificationResult {
    pub fn new(hex: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            hex: hex.into(),
            names,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hex.is_empty()
    }

    /// Matched names joined with `,`, in match order.
    pub fn joined_names(&self) -> String {
        self.names.join(",")
    }
}

/// `hex0, names0, hex1, names1, ...` in cluster order.
pub fn build_row(results: &[ClassificationResult]) -> Vec<String> {
    results
        .iter()
        .flat_map(|r| [r.hex.clone(), r.joined_names()])
        .collect()
}

/// Header cells matching [`build_row`] for `k` clusters.
pub fn header_row(k: usize) -> Vec<String> {
    (0..k)
        .flat_map(|i| [format!("Gen. Color {i}"), format!("Matches for {i}")])
        .collect()
}

/// One output line: product identifiers followed by the classified colors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    pub image_url: String,
    pub results: Vec<ClassificationResult>,
}

impl ProductRecord {
    pub fn header(k: usize) -> Vec<String> {
        let mut header = vec!["SKU".to_string(), "imageUrl".to_string()];
        header.extend(header_row(k));
        header
    }

    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![self.sku.clone(), self.image_url.clone()];
        row.extend(build_row(&self.results));
        row
    }
}

/// One product to analyze: its SKU and where its image lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub sku: String,
    pub image_url: String,
}

impl ProductInput {
    pub fn into_record(self, results: Vec<ClassificationResult>) -> ProductRecord {
        ProductRecord {
            sku: self.sku,
            image_url: self.image_url,
            results,
        }
    }
}

/// Parse a `sku,imageUrl` listing. The first line is a header and is skipped,
/// as are blank lines. Columns past the second are ignored.
pub fn parse_listing(text: &str) -> Result<Vec<ProductInput>, ListingError> {
    text.lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let line_no = idx + 1;
            let mut columns = line.split(',').map(str::trim);
            let (Some(sku), Some(image_url)) = (columns.next(), columns.next()) else {
                return Err(ListingError::MissingColumn {
                    line: line_no,
                    content: line.to_string(),
                });
            };
            if sku.is_empty() {
                return Err(ListingError::EmptyColumn { line: line_no, column: "SKU" });
            }
            if image_url.is_empty() {
                return Err(ListingError::EmptyColumn { line: line_no, column: "imageUrl" });
            }
            Ok(ProductInput {
                sku: sku.to_string(),
                image_url: image_url.to_string(),
            })
        })
        .collect()
}
