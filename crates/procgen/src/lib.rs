//! Procedural building generation: extruded towers and packed building clusters.
//!
//! - [`geometry`]: append-only vertex/index buffers and finalized meshes
//! - [`extrude`]: trapezoid walls between stacked footprints
//! - [`tower`]: randomized and authored single towers
//! - [`occupation`]: reservation grid and the cluster packer
//! - [`multi_building`]: boxes and greebles for every packed record
//! - [`interfaces`]: mesh consumer, material resolver, and placement grid seams

pub mod error;
pub mod extrude;
pub mod geometry;
pub mod interfaces;
pub mod multi_building;
pub mod occupation;
pub mod tower;

pub use error::*;
pub use extrude::*;
pub use geometry::*;
pub use interfaces::*;
pub use multi_building::*;
pub use occupation::*;
pub use tower::*;

/// Seed for the `index`-th instance derived from a base seed.
pub fn instance_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add((index as u64 + 1) * 104729)
}
