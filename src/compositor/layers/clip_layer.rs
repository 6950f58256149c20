// ClipLayer implementations for rectangles, rounded rectangles and paths.
// The three variants share one generic layer parameterized by the clip shape.

use super::canvas::{Canvas, ClipOp};
use super::container_layer::ContainerLayer;
use super::geometry::{self, Affine, BezPath, Rect, RoundedRect, Shape};
use super::mutators::MutatorsStack;
use super::{Layer, LayerBase, PaintContext, PrerollContext};
use crate::error::LayerResult;
use std::fmt::Debug;

/// Clip behavior options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipBehavior {
    /// No clipping; the layer acts as a plain container.
    None,
    /// Hard clip without anti-aliasing
    HardEdge,
    /// Anti-aliased clip
    #[default]
    AntiAlias,
    /// Anti-aliased clip whose content is composited through an offscreen group
    AntiAliasWithSaveLayer,
}

impl ClipBehavior {
    pub fn anti_alias(self) -> bool {
        matches!(
            self,
            ClipBehavior::AntiAlias | ClipBehavior::AntiAliasWithSaveLayer
        )
    }
}

/// A shape a [`ClipLayer`] can clip to.
pub trait ClipShape: Clone + Debug + PartialEq + Send + Sync {
    const LAYER_TYPE: &'static str;

    /// Axis-aligned bounds of the shape in the layer's coordinate space.
    fn clip_bounds(&self) -> Rect;

    fn push_mutator(&self, mutators: &mut MutatorsStack);

    fn apply_clip(&self, canvas: &mut dyn Canvas, anti_alias: bool);
}

impl ClipShape for Rect {
    const LAYER_TYPE: &'static str = "ClipRectLayer";

    fn clip_bounds(&self) -> Rect {
        *self
    }

    fn push_mutator(&self, mutators: &mut MutatorsStack) {
        mutators.push_clip_rect(*self);
    }

    fn apply_clip(&self, canvas: &mut dyn Canvas, anti_alias: bool) {
        canvas.clip_rect(*self, ClipOp::Intersect, anti_alias);
    }
}

impl ClipShape for RoundedRect {
    const LAYER_TYPE: &'static str = "ClipRRectLayer";

    fn clip_bounds(&self) -> Rect {
        self.rect()
    }

    fn push_mutator(&self, mutators: &mut MutatorsStack) {
        mutators.push_clip_rrect(*self);
    }

    fn apply_clip(&self, canvas: &mut dyn Canvas, anti_alias: bool) {
        canvas.clip_rrect(*self, ClipOp::Intersect, anti_alias);
    }
}

impl ClipShape for BezPath {
    const LAYER_TYPE: &'static str = "ClipPathLayer";

    fn clip_bounds(&self) -> Rect {
        if self.elements().is_empty() {
            Rect::ZERO
        } else {
            self.bounding_box()
        }
    }

    fn push_mutator(&self, mutators: &mut MutatorsStack) {
        mutators.push_clip_path(self.clone());
    }

    fn apply_clip(&self, canvas: &mut dyn Canvas, anti_alias: bool) {
        canvas.clip_path(self, ClipOp::Intersect, anti_alias);
    }
}

/// A layer that clips its children to a shape
pub struct ClipLayer<S: ClipShape> {
    container: ContainerLayer,
    clip: S,
    clip_behavior: ClipBehavior,
}

pub type ClipRectLayer = ClipLayer<Rect>;
pub type ClipRRectLayer = ClipLayer<RoundedRect>;
pub type ClipPathLayer = ClipLayer<BezPath>;

impl<S: ClipShape> ClipLayer<S> {
    pub fn new(clip: S) -> Self {
        Self::with_behavior(clip, ClipBehavior::default())
    }

    pub fn with_behavior(clip: S, clip_behavior: ClipBehavior) -> Self {
        Self {
            container: ContainerLayer::new(),
            clip,
            clip_behavior,
        }
    }

    pub fn clip(&self) -> &S {
        &self.clip
    }

    pub fn set_clip(&mut self, clip: S) {
        self.clip = clip;
    }

    pub fn clip_behavior(&self) -> ClipBehavior {
        self.clip_behavior
    }

    pub fn set_clip_behavior(&mut self, clip_behavior: ClipBehavior) {
        self.clip_behavior = clip_behavior;
    }

    /// Whether painting this layer composites its children through an offscreen group.
    pub fn uses_save_layer(&self) -> bool {
        self.clip_behavior == ClipBehavior::AntiAliasWithSaveLayer
    }

    pub fn add_child(&mut self, child: Box<dyn Layer>) {
        self.container.add_child(child);
    }

    pub fn child_count(&self) -> usize {
        self.container.child_count()
    }

    pub fn children(&self) -> &[Box<dyn Layer>] {
        self.container.children()
    }
}

impl<S: ClipShape> Layer for ClipLayer<S> {
    fn preroll(&mut self, context: &mut PrerollContext, matrix: &Affine) {
        if self.clip_behavior == ClipBehavior::None {
            self.container.preroll(context, matrix);
            return;
        }

        self.container.base_mut().begin_preroll(context);
        let clip_bounds = self.clip.clip_bounds();
        let previous_cull_rect = context.cull_rect;
        let Some(cull_rect) = geometry::intersection(&previous_cull_rect, &clip_bounds) else {
            log::trace!(
                "{} #{} culled: clip {:?} outside cull rect {:?}",
                S::LAYER_TYPE,
                self.id(),
                clip_bounds,
                previous_cull_rect
            );
            return;
        };

        let save_layer = self.uses_save_layer();
        context.cull_rect = cull_rect;
        self.clip.push_mutator(&mut context.mutators);
        if save_layer {
            context.save_layer_depth += 1;
        }

        let child_bounds = self.container.preroll_children(context, matrix);

        if save_layer {
            context.save_layer_depth -= 1;
        }
        context.mutators.pop();
        context.cull_rect = previous_cull_rect;

        // The group bounds double as the save layer bounds, so keep them tight.
        let paint_bounds = if save_layer {
            geometry::intersection(&child_bounds, &clip_bounds).unwrap_or(Rect::ZERO)
        } else {
            child_bounds
        };
        self.container.base_mut().set_paint_bounds(paint_bounds);
    }

    fn paint(&self, context: &mut PaintContext<'_>) -> LayerResult {
        if !self.container.base().check_paint(S::LAYER_TYPE, context)? {
            return Ok(());
        }
        if self.clip_behavior == ClipBehavior::None {
            return self.container.paint_children(context);
        }

        let save_layer = self.uses_save_layer();
        let bounds = self.paint_bounds();

        context.canvas.save();
        self.clip
            .apply_clip(&mut *context.canvas, self.clip_behavior.anti_alias());
        if save_layer {
            context.canvas.save_layer(Some(bounds), None);
        }

        let result = self.container.paint_children(context);

        if save_layer {
            context.checkerboard_group(bounds);
            context.canvas.restore();
        }
        context.canvas.restore();
        result
    }

    fn base(&self) -> &LayerBase {
        self.container.base()
    }

    fn layer_type(&self) -> &'static str {
        S::LAYER_TYPE
    }
}

impl<S: ClipShape> Debug for ClipLayer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(S::LAYER_TYPE)
            .field("id", &self.id())
            .field("clip", &self.clip)
            .field("clip_behavior", &self.clip_behavior)
            .field("paint_bounds", &self.paint_bounds())
            .field("children", &self.container.children())
            .finish()
    }
}
