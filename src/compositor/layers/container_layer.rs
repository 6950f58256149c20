// Container layer that can hold multiple child layers
// Clip and transform layers build on it; on its own it has no canvas effect.

use super::geometry::{self, Affine, Rect};
use super::layer::*;
use crate::error::LayerResult;
use std::fmt::Debug;

/// A layer that contains multiple child layers
pub struct ContainerLayer {
    base: LayerBase,
    children: Vec<Box<dyn Layer>>,
}

impl ContainerLayer {
    /// Create a new empty container layer
    pub fn new() -> Self {
        Self {
            base: LayerBase::new(),
            children: Vec::new(),
        }
    }

    /// Add a child layer to this container
    pub fn add_child(&mut self, child: Box<dyn Layer>) {
        self.children.push(child);
    }

    /// Remove a child layer by its ID
    pub fn remove_child(&mut self, child_id: u64) -> Option<Box<dyn Layer>> {
        let index = self.children.iter().position(|c| c.id() == child_id)?;
        Some(self.children.remove(index))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> &[Box<dyn Layer>] {
        &self.children
    }

    /// Find a child by ID
    pub fn find_child(&self, child_id: u64) -> Option<&dyn Layer> {
        self.children
            .iter()
            .find(|c| c.id() == child_id)
            .map(|c| c.as_ref())
    }

    pub(crate) fn base_mut(&mut self) -> &mut LayerBase {
        &mut self.base
    }

    /// Prerolls every child in insertion order and returns the union of their
    /// paint bounds. Does not touch this layer's own cache.
    pub fn preroll_children(&mut self, context: &mut PrerollContext, matrix: &Affine) -> Rect {
        let mut child_bounds = Rect::ZERO;
        for child in &mut self.children {
            child.preroll(context, matrix);
            child_bounds = geometry::join(child_bounds, child.paint_bounds());
        }
        child_bounds
    }

    /// Paints every child that has something to paint, in preroll order.
    pub fn paint_children(&self, context: &mut PaintContext<'_>) -> LayerResult {
        for child in &self.children {
            if child.needs_painting() {
                child.paint(context)?;
            }
        }
        Ok(())
    }
}

impl Layer for ContainerLayer {
    fn preroll(&mut self, context: &mut PrerollContext, matrix: &Affine) {
        self.base.begin_preroll(context);
        let child_bounds = self.preroll_children(context, matrix);
        self.base.set_paint_bounds(child_bounds);
    }

    fn paint(&self, context: &mut PaintContext<'_>) -> LayerResult {
        if !self.base.check_paint(self.layer_type(), context)? {
            return Ok(());
        }
        self.paint_children(context)
    }

    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn layer_type(&self) -> &'static str {
        "ContainerLayer"
    }
}

impl Default for ContainerLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ContainerLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerLayer")
            .field("id", &self.base.id())
            .field("paint_bounds", &self.base.paint_bounds())
            .field("children", &self.children)
            .finish()
    }
}
