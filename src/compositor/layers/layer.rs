// Core Layer trait and the per-frame contexts threaded through preroll and paint.
// Every layer kind embeds a LayerBase that caches the bounds computed by the last preroll.

use super::canvas::{Canvas, Paint};
use super::geometry::{self, Affine, Rect};
use super::mutators::MutatorsStack;
use crate::error::{LayerError, LayerResult};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Whether paint precondition failures are reported as errors by default.
pub const CHECKED_BY_DEFAULT: bool = cfg!(debug_assertions) || cfg!(feature = "checked-paint");

/// State threaded through the preroll pass.
#[derive(Debug, Clone)]
pub struct PrerollContext {
    /// Area outside of which content is invisible, in the coordinate space
    /// of the layer currently being prerolled.
    pub cull_rect: Rect,
    /// Ancestor effects of the layer currently being prerolled.
    pub mutators: MutatorsStack,
    /// Number of enclosing offscreen groups. Mirrors paint's save-layer nesting.
    pub save_layer_depth: usize,
    /// Frame this preroll belongs to.
    pub frame: u64,
    leaf_bounds: Vec<(Rect, u64)>,
}

impl PrerollContext {
    pub fn new(frame: u64) -> Self {
        Self {
            cull_rect: geometry::UNBOUNDED,
            mutators: MutatorsStack::new(),
            save_layer_depth: 0,
            frame,
            leaf_bounds: Vec::new(),
        }
    }

    pub fn with_cull_rect(mut self, cull_rect: Rect) -> Self {
        self.cull_rect = cull_rect;
        self
    }

    /// Records a leaf's bounds in device space for the spatial index feed.
    pub fn record_leaf_bounds(&mut self, id: u64, matrix: &Affine, local_bounds: Rect) {
        if geometry::is_empty(&local_bounds) {
            return;
        }
        self.leaf_bounds
            .push((geometry::map_rect(matrix, &local_bounds), id));
    }

    pub fn leaf_bounds(&self) -> &[(Rect, u64)] {
        &self.leaf_bounds
    }

    pub fn take_leaf_bounds(&mut self) -> Vec<(Rect, u64)> {
        std::mem::take(&mut self.leaf_bounds)
    }
}

impl Default for PrerollContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// State threaded through the paint pass.
pub struct PaintContext<'a> {
    pub canvas: &'a mut dyn Canvas,
    /// Draw a diagnostic fill over every offscreen group.
    pub checkerboard_offscreen_layers: bool,
    /// Report paint precondition failures as errors instead of skipping.
    pub checked: bool,
    /// Frame being painted; layers must have been prerolled for it.
    pub frame: u64,
}

impl<'a> PaintContext<'a> {
    pub fn new(canvas: &'a mut dyn Canvas, frame: u64) -> Self {
        Self {
            canvas,
            checkerboard_offscreen_layers: false,
            checked: CHECKED_BY_DEFAULT,
            frame,
        }
    }

    pub fn with_checkerboard(mut self, enabled: bool) -> Self {
        self.checkerboard_offscreen_layers = enabled;
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Emits the checkerboard fill for an offscreen group, if enabled.
    ///
    /// Must be called after the group's content and before its restore.
    pub fn checkerboard_group(&mut self, bounds: Rect) {
        if self.checkerboard_offscreen_layers {
            self.canvas.draw_rect(bounds, &Paint::checkerboard());
        }
    }
}

impl Debug for PaintContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintContext")
            .field("save_count", &self.canvas.save_count())
            .field("checkerboard_offscreen_layers", &self.checkerboard_offscreen_layers)
            .field("checked", &self.checked)
            .field("frame", &self.frame)
            .finish()
    }
}

/// Core trait for all layer types in the rendering pipeline
pub trait Layer: Send + Sync + Debug {
    /// Computes paint bounds for this frame and propagates cull state to children.
    ///
    /// `matrix` maps this layer's coordinate space to device space.
    fn preroll(&mut self, context: &mut PrerollContext, matrix: &Affine);

    /// Emits drawing operations. Only valid after a preroll for `context.frame`
    /// and when [`needs_painting`](Layer::needs_painting) is true.
    fn paint(&self, context: &mut PaintContext<'_>) -> LayerResult;

    fn base(&self) -> &LayerBase;

    /// Get the layer's type name for debugging
    fn layer_type(&self) -> &'static str;

    fn id(&self) -> u64 {
        self.base().id()
    }

    /// Bounds computed by the last preroll, in the parent's coordinate space.
    fn paint_bounds(&self) -> Rect {
        self.base().paint_bounds()
    }

    fn needs_painting(&self) -> bool {
        self.base().needs_painting()
    }
}

/// Per-node cache shared by every layer kind.
#[derive(Debug)]
pub struct LayerBase {
    id: u64,
    paint_bounds: Rect,
    prerolled_frame: Option<u64>,
}

impl LayerBase {
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            paint_bounds: Rect::ZERO,
            prerolled_frame: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn paint_bounds(&self) -> Rect {
        self.paint_bounds
    }

    pub fn needs_painting(&self) -> bool {
        !geometry::is_empty(&self.paint_bounds)
    }

    pub fn prerolled_frame(&self) -> Option<u64> {
        self.prerolled_frame
    }

    /// Resets the cached bounds and stamps the frame. Call first in every preroll.
    pub fn begin_preroll(&mut self, context: &PrerollContext) {
        self.paint_bounds = Rect::ZERO;
        self.prerolled_frame = Some(context.frame);
    }

    pub fn set_paint_bounds(&mut self, bounds: Rect) {
        self.paint_bounds = if geometry::is_empty(&bounds) {
            Rect::ZERO
        } else {
            bounds
        };
    }

    /// Paint precondition check.
    ///
    /// Returns `Ok(true)` when the layer may paint. A violation is an error in
    /// checked mode and `Ok(false)` (paint nothing) otherwise.
    pub fn check_paint(&self, layer_type: &'static str, context: &PaintContext<'_>) -> LayerResult<bool> {
        let violation = if self.prerolled_frame != Some(context.frame) {
            LayerError::NotPrerolled {
                layer_type,
                id: self.id,
                frame: context.frame,
            }
        } else if !self.needs_painting() {
            LayerError::EmptyPaintBounds {
                layer_type,
                id: self.id,
            }
        } else {
            return Ok(true);
        };

        if context.checked {
            Err(violation)
        } else {
            log::trace!("skipping paint: {violation}");
            Ok(false)
        }
    }
}

impl Default for LayerBase {
    fn default() -> Self {
        Self::new()
    }
}
