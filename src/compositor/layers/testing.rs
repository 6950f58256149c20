// Test double for leaf layers.
// MockLayer records what it observed during preroll and draws a single path when painted.

use super::canvas::{DrawCommand, Paint};
use super::geometry::{Affine, BezPath, Rect, Shape};
use super::layer::{Layer, LayerBase, PaintContext, PrerollContext};
use super::mutators::MutatorsStack;
use crate::error::LayerResult;
use std::sync::{Arc, Mutex, PoisonError};

/// What a [`MockLayer`] saw during its last preroll.
#[derive(Debug, Clone, PartialEq)]
pub struct PrerollObservation {
    pub parent_matrix: Affine,
    pub parent_cull_rect: Rect,
    pub parent_mutators: MutatorsStack,
    pub save_layer_depth: usize,
    pub frame: u64,
}

/// Shared handle to a [`MockLayer`]'s observations, usable after the layer
/// has been moved into a tree.
#[derive(Debug, Clone, Default)]
pub struct MockObserver {
    observation: Arc<Mutex<Option<PrerollObservation>>>,
    preroll_count: Arc<Mutex<usize>>,
}

impl MockObserver {
    /// `None` until the layer has been prerolled.
    pub fn observation(&self) -> Option<PrerollObservation> {
        self.observation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn preroll_count(&self) -> usize {
        *self
            .preroll_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn parent_matrix(&self) -> Affine {
        self.observation()
            .map_or(Affine::IDENTITY, |o| o.parent_matrix)
    }

    pub fn parent_cull_rect(&self) -> Rect {
        self.observation().map_or(Rect::ZERO, |o| o.parent_cull_rect)
    }

    pub fn parent_mutators(&self) -> MutatorsStack {
        self.observation()
            .map(|o| o.parent_mutators)
            .unwrap_or_default()
    }

    pub fn save_layer_depth(&self) -> usize {
        self.observation().map_or(0, |o| o.save_layer_depth)
    }

    fn record(&self, observation: PrerollObservation) {
        *self
            .observation
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(observation);
        *self
            .preroll_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

/// A leaf that paints one path and reports its bounds unchanged.
#[derive(Debug)]
pub struct MockLayer {
    base: LayerBase,
    path: BezPath,
    paint: Paint,
    observer: MockObserver,
}

impl MockLayer {
    /// A mock whose path is the given rectangle.
    pub fn new(bounds: Rect) -> Self {
        Self::with_path(bounds.to_path(0.1), Paint::new())
    }

    pub fn with_path(path: BezPath, paint: Paint) -> Self {
        Self {
            base: LayerBase::new(),
            path,
            paint,
            observer: MockObserver::default(),
        }
    }

    pub fn observer(&self) -> MockObserver {
        self.observer.clone()
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// The single command this layer emits when painted.
    pub fn expected_draw(&self) -> DrawCommand {
        DrawCommand::DrawPath(self.path.clone(), self.paint.clone())
    }
}

impl Layer for MockLayer {
    fn preroll(&mut self, context: &mut PrerollContext, matrix: &Affine) {
        self.base.begin_preroll(context);
        self.observer.record(PrerollObservation {
            parent_matrix: *matrix,
            parent_cull_rect: context.cull_rect,
            parent_mutators: context.mutators.clone(),
            save_layer_depth: context.save_layer_depth,
            frame: context.frame,
        });
        let bounds = if self.path.elements().is_empty() {
            Rect::ZERO
        } else {
            self.path.bounding_box()
        };
        self.base.set_paint_bounds(bounds);
        context.record_leaf_bounds(self.base.id(), matrix, bounds);
    }

    fn paint(&self, context: &mut PaintContext<'_>) -> LayerResult {
        if !self.base.check_paint(self.layer_type(), context)? {
            return Ok(());
        }
        context.canvas.draw_path(&self.path, &self.paint);
        Ok(())
    }

    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn layer_type(&self) -> &'static str {
        "MockLayer"
    }
}
