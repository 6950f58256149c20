// Layer Tree Library Entry Point
// This file exposes the public API of the compositor: layers, the
// preroll/paint passes, scene building and the raster hand-off.

pub mod compositor;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use compositor::layers::{
    Affine, Canvas, ClipBehavior, ClipPathLayer, ClipRRectLayer, ClipRectLayer, ContainerLayer,
    DrawCommand, Layer, Mutator, MutatorsStack, Paint, PaintContext, Picture, PictureLayer,
    PrerollContext, Rect, RecordingCanvas, TransformLayer,
};
pub use compositor::{LayerTree, PrerolledFrame, Rasterizer, SceneBuilder, SpatialIndex};
pub use config::Settings;
pub use error::{LayerError, LayerResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> String {
    format!("layer-tree v{}", VERSION)
}
