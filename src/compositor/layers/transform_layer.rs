// TransformLayer - A layer that applies transformations to its children
// Children see the combined matrix and a cull rect mapped back into their local space.

use super::container_layer::ContainerLayer;
use super::geometry::{self, Affine, Rect};
use super::{Layer, LayerBase, PaintContext, PrerollContext};
use crate::error::LayerResult;
use std::fmt::Debug;

/// A layer that applies a transformation matrix to its children
pub struct TransformLayer {
    container: ContainerLayer,
    transform: Affine,
}

impl TransformLayer {
    /// Create a new transform layer with the given transformation matrix.
    ///
    /// A matrix with non-finite entries is replaced by the identity.
    pub fn new(transform: Affine) -> Self {
        Self {
            container: ContainerLayer::new(),
            transform: sanitize(transform),
        }
    }

    /// Create a translation transform layer
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(Affine::translate((dx, dy)))
    }

    /// Create a scale transform layer
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(Affine::scale_non_uniform(sx, sy))
    }

    /// Create a rotation transform layer (in radians)
    pub fn rotation(radians: f64) -> Self {
        Self::new(Affine::rotate(radians))
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = sanitize(transform);
    }

    pub fn transform(&self) -> &Affine {
        &self.transform
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

    /// Cull rect for the children, in their local space.
    fn child_cull_rect(&self, cull_rect: &Rect) -> Rect {
        if geometry::is_unbounded(cull_rect) {
            return geometry::UNBOUNDED;
        }
        match geometry::invert(&self.transform) {
            Some(inverse) => geometry::map_rect(&inverse, cull_rect),
            None => geometry::UNBOUNDED,
        }
    }
}

fn sanitize(transform: Affine) -> Affine {
    if transform.is_finite() {
        transform
    } else {
        log::error!("non-finite transform {transform:?}, using identity");
        Affine::IDENTITY
    }
}

impl Layer for TransformLayer {
    fn preroll(&mut self, context: &mut PrerollContext, matrix: &Affine) {
        self.container.base_mut().begin_preroll(context);

        let child_matrix = *matrix * self.transform;
        let previous_cull_rect = context.cull_rect;
        context.cull_rect = self.child_cull_rect(&previous_cull_rect);
        context.mutators.push_transform(self.transform);

        let child_bounds = self.container.preroll_children(context, &child_matrix);

        context.mutators.pop();
        context.cull_rect = previous_cull_rect;

        let paint_bounds = geometry::map_rect(&self.transform, &child_bounds);
        self.container.base_mut().set_paint_bounds(paint_bounds);
    }

    fn paint(&self, context: &mut PaintContext<'_>) -> LayerResult {
        if !self.container.base().check_paint(self.layer_type(), context)? {
            return Ok(());
        }

        context.canvas.save();
        context.canvas.concat(&self.transform);
        let result = self.container.paint_children(context);
        context.canvas.restore();
        result
    }

    fn base(&self) -> &LayerBase {
        self.container.base()
    }

    fn layer_type(&self) -> &'static str {
        "TransformLayer"
    }
}

impl Debug for TransformLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformLayer")
            .field("id", &self.id())
            .field("transform", &self.transform)
            .field("paint_bounds", &self.paint_bounds())
            .field("children", &self.container.children())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::layers::canvas::{Canvas, DrawCommand, RecordingCanvas};
    use crate::compositor::layers::mutators::Mutator;
    use crate::compositor::layers::testing::MockLayer;

    fn assert_rect_eq(actual: Rect, expected: Rect) {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(
            close(actual.x0, expected.x0)
                && close(actual.y0, expected.y0)
                && close(actual.x1, expected.x1)
                && close(actual.y1, expected.y1),
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn test_transform_layer_creation() {
        let transform = Affine::translate((10.0, 20.0));
        let layer = TransformLayer::new(transform);

        assert_eq!(layer.transform(), &transform);
        assert_eq!(layer.child_count(), 0);
        assert_eq!(layer.paint_bounds(), Rect::ZERO);
    }

    #[test]
    fn non_finite_matrix_becomes_identity() {
        let layer = TransformLayer::new(Affine::new([f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0]));
        assert_eq!(layer.transform(), &Affine::IDENTITY);
        let mut layer = TransformLayer::translation(f64::INFINITY, 0.0);
        assert_eq!(layer.transform(), &Affine::IDENTITY);
        layer.set_transform(Affine::scale(2.0));
        assert_eq!(layer.transform(), &Affine::scale(2.0));
        layer.set_transform(Affine::scale(f64::NAN));
        assert_eq!(layer.transform(), &Affine::IDENTITY);
    }

    #[test]
    fn test_transform_layer_scale() {
        let child = MockLayer::new(Rect::new(10.0, 10.0, 60.0, 60.0));
        let observer = child.observer();
        let mut layer = TransformLayer::scale(2.0, 2.0);
        layer.add_child(Box::new(child));

        let cull = Rect::new(0.0, 0.0, 800.0, 600.0);
        let initial = Affine::translate((1.0, 1.0));
        let mut context = PrerollContext::new(0).with_cull_rect(cull);
        layer.preroll(&mut context, &initial);

        assert_eq!(layer.paint_bounds(), Rect::new(20.0, 20.0, 120.0, 120.0));
        assert_eq!(observer.parent_matrix(), initial * Affine::scale(2.0));
        assert_rect_eq(observer.parent_cull_rect(), Rect::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(
            observer.parent_mutators().to_vec(),
            vec![Mutator::Transform(Affine::scale_non_uniform(2.0, 2.0))]
        );
        assert_eq!(context.cull_rect, cull);
        assert!(context.mutators.is_empty());
    }

    #[test]
    fn rotation_bounds_are_axis_aligned() {
        let mut layer = TransformLayer::rotation(std::f64::consts::FRAC_PI_2);
        layer.add_child(Box::new(MockLayer::new(Rect::new(0.0, 0.0, 10.0, 5.0))));
        layer.preroll(&mut PrerollContext::new(0), &Affine::IDENTITY);
        assert_rect_eq(layer.paint_bounds(), Rect::new(-5.0, 0.0, 0.0, 10.0));
    }

    #[test]
    fn singular_matrix_passes_cull_rect_unbounded() {
        let child = MockLayer::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let observer = child.observer();
        let mut layer = TransformLayer::scale(0.0, 1.0);
        layer.add_child(Box::new(child));

        let mut context = PrerollContext::new(0).with_cull_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
        layer.preroll(&mut context, &Affine::IDENTITY);

        assert_eq!(observer.preroll_count(), 1);
        assert!(geometry::is_unbounded(&observer.parent_cull_rect()));
        assert!(!layer.needs_painting());
    }

    #[test]
    fn nested_transforms_concatenate() {
        let leaf_bounds = Rect::new(5.0, 6.0, 20.5, 21.5);
        let leaf = MockLayer::new(leaf_bounds);
        let observer = leaf.observer();
        let inner_transform = Affine::translate((2.5, 2.5));
        let mut inner = TransformLayer::new(inner_transform);
        inner.add_child(Box::new(leaf));
        let outer_transform = Affine::translate((2.5, 2.5));
        let mut outer = TransformLayer::new(outer_transform);
        outer.add_child(Box::new(inner));

        let initial = Affine::translate((-0.5, -0.5));
        outer.preroll(&mut PrerollContext::new(0), &initial);

        assert_eq!(observer.parent_matrix(), Affine::translate((4.5, 4.5)));
        assert_eq!(
            observer.parent_mutators().to_vec(),
            vec![
                Mutator::Transform(inner_transform),
                Mutator::Transform(outer_transform),
            ]
        );
        let inner_bounds = inner_transform.transform_rect_bbox(leaf_bounds);
        assert_eq!(
            outer.paint_bounds(),
            outer_transform.transform_rect_bbox(inner_bounds)
        );
    }

    #[test]
    fn paint_wraps_children_in_save_concat_restore() {
        let child = MockLayer::new(Rect::new(0.0, 0.0, 4.0, 4.0));
        let child_draw = child.expected_draw();
        let transform = Affine::translate((3.0, 4.0));
        let mut layer = TransformLayer::new(transform);
        layer.add_child(Box::new(child));
        layer.preroll(&mut PrerollContext::new(0), &Affine::IDENTITY);

        let mut canvas = RecordingCanvas::new();
        let mut context = PaintContext::new(&mut canvas, 0).with_checked(true);
        layer.paint(&mut context).unwrap();

        assert_eq!(
            canvas.commands(),
            &[
                DrawCommand::Save,
                DrawCommand::Concat(transform),
                child_draw,
                DrawCommand::Restore,
            ]
        );
        assert_eq!(canvas.save_count(), 0);
    }
}
