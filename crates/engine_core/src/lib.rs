//! Core types shared by the Skyline crates.
//!
//! This crate provides the foundational types used when instancing generated buildings:
//! - Transform for placing instances in the world
//! - ECS components tagging building instances

pub mod components;
pub mod transform;

pub use components::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec3};
pub use hecs::{Entity, World};
