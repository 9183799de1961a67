use thiserror::Error;

/// Failures raised at the engine boundary, before any pixel is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cluster count must be at least 1, got {0}")]
    InvalidClusterCount(usize),

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Hex parsing failures for reference colors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("hex color must be 6 characters, got {0:?}")]
    InvalidLength(String),

    #[error("invalid hex color {0:?}")]
    InvalidHex(String),
}

/// Reference table rejected at load time.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("unable to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse reference table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("reference color #{index} ({name:?}): {reason}")]
    Malformed {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("reference color #{index} ({name:?}): {source}")]
    Color {
        index: usize,
        name: String,
        #[source]
        source: ColorError,
    },
}

impl TableError {
    pub(crate) fn malformed(index: usize, name: &str, reason: impl Into<String>) -> Self {
        TableError::Malformed {
            index,
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// A product listing line that does not hold `sku,imageUrl`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("listing line {line}: expected `sku,imageUrl`, got {content:?}")]
    MissingColumn { line: usize, content: String },

    #[error("listing line {line}: empty {column}")]
    EmptyColumn { line: usize, column: &'static str },
}

/// Anything that can go wrong while turning configuration into a ready engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Table(#[from] TableError),
}
