//! Error taxonomy for the generation core.

use thiserror::Error;

/// Why a candidate occupation record was not placed.
///
/// These are expected and frequent during packing. The packer counts them and moves on to
/// the next candidate; they never abort a pass.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("span [{x}, {xend}) x [{z}, {zend}) leaves the {width}x{depth} grid")]
    OutOfBounds {
        x: i32,
        xend: i32,
        z: i32,
        zend: i32,
        width: usize,
        depth: usize,
    },
    #[error("cell ({x}, {z}) is already reserved")]
    Overlap { x: i32, z: i32 },
    #[error("span {width}x{depth} is below the 2x2 floor")]
    TooSmall { width: i32, depth: i32 },
}

/// Failures while emitting geometry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenError {
    /// Zero-width or zero-depth record reached the fill stage. Skipped, never fatal.
    #[error("degenerate span [{x}, {xend}) x [{z}, {zend})")]
    DegenerateSpan { x: i32, xend: i32, z: i32, zend: i32 },
    /// Buffer sequencing bug. Aborts the whole pass.
    #[error("invalid buffer state: {0}")]
    InvalidState(String),
}
