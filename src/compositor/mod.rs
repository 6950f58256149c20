// Compositor
// Layer tree construction, the preroll/paint passes and the raster hand-off.

pub mod index;
pub mod layer_tree;
pub mod layers;
pub mod rasterizer;
pub mod scene_builder;

pub use index::SpatialIndex;
pub use layer_tree::{next_frame_number, LayerTree, PrerolledFrame};
pub use rasterizer::{RasterOutput, Rasterizer};
pub use scene_builder::{test_scene, LayerGroup, SceneBuilder};
