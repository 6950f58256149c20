// Layer System
// This module implements the layer tree structure walked once to preroll
// (bounds, culling, mutators) and once to paint every frame.

pub mod canvas;
pub mod clip_layer;
pub mod container_layer;
pub mod geometry;
pub mod layer;
pub mod mutators;
pub mod picture_layer;
// Test doubles, public so the integration tests can build trees with them.
#[doc(hidden)]
pub mod testing;
pub mod transform_layer;

// Re-export all layer types
pub use canvas::*;
pub use clip_layer::*;
pub use container_layer::*;
pub use geometry::{Affine, BezPath, Point, Rect, RoundedRect, Size, Vec2};
pub use layer::*;
pub use mutators::*;
pub use picture_layer::*;
pub use transform_layer::*;

// Architecture:
// - Layer: Base trait for all layer types
// - ContainerLayer: Holds child layers, unions their bounds
// - PictureLayer: Replays recorded drawing commands
// - TransformLayer: Applies an affine matrix
// - ClipLayer: Clips children to a rect, rounded rect or path
//
// Preroll runs to completion over the whole tree before paint starts.
// Paint is only valid on layers prerolled for the same frame.
