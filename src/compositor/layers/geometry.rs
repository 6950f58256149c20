// Rectangle and matrix helpers shared by the layer implementations.
// Geometry types come from kurbo; this file adds the bounds semantics layers rely on.

pub use kurbo::{Affine, BezPath, Circle, Point, Rect, RoundedRect, Shape, Size, Vec2};

/// Cull rect used when nothing narrows the visible area.
pub const UNBOUNDED: Rect = Rect::new(
    f64::NEG_INFINITY,
    f64::NEG_INFINITY,
    f64::INFINITY,
    f64::INFINITY,
);

const INVERTIBLE_EPSILON: f64 = 1e-12;

/// A rect is empty when it has no positive area. NaN edges count as empty.
pub fn is_empty(rect: &Rect) -> bool {
    !(rect.x1 > rect.x0 && rect.y1 > rect.y0)
}

pub fn is_unbounded(rect: &Rect) -> bool {
    !rect.is_finite()
}

/// Union that ignores empty operands.
pub fn join(a: Rect, b: Rect) -> Rect {
    match (is_empty(&a), is_empty(&b)) {
        (true, true) => Rect::ZERO,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a.union(b),
    }
}

/// Intersection, or `None` when the two rects share no area.
pub fn intersection(a: &Rect, b: &Rect) -> Option<Rect> {
    let rect = Rect::new(
        a.x0.max(b.x0),
        a.y0.max(b.y0),
        a.x1.min(b.x1),
        a.y1.min(b.y1),
    );
    if is_empty(&rect) {
        None
    } else {
        Some(rect)
    }
}

pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    intersection(a, b).is_some()
}

/// Axis-aligned bounds of `rect` under `matrix`.
///
/// Unbounded input stays unbounded; `transform_rect_bbox` would otherwise
/// produce NaN edges from `0 * inf`.
pub fn map_rect(matrix: &Affine, rect: &Rect) -> Rect {
    if is_unbounded(rect) {
        return UNBOUNDED;
    }
    if is_empty(rect) {
        return Rect::ZERO;
    }
    matrix.transform_rect_bbox(*rect)
}

/// Inverse of `matrix`, or `None` if it is singular or not finite.
pub fn invert(matrix: &Affine) -> Option<Affine> {
    if !matrix.is_finite() || matrix.determinant().abs() < INVERTIBLE_EPSILON {
        return None;
    }
    let inverse = matrix.inverse();
    inverse.is_finite().then_some(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_empty_rects() {
        let a = Rect::new(1.0, 1.0, 2.0, 2.0);
        assert_eq!(join(Rect::ZERO, a), a);
        assert_eq!(join(a, Rect::new(5.0, 5.0, 5.0, 9.0)), a);
        assert_eq!(
            join(a, Rect::new(3.0, 0.0, 4.0, 1.5)),
            Rect::new(1.0, 0.0, 4.0, 2.0)
        );
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0, 0.0, 2.0, 1.0);
        assert!(intersection(&a, &b).is_none());
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn unbounded_survives_mapping() {
        let scale = Affine::scale_non_uniform(2.0, 0.5);
        assert!(is_unbounded(&map_rect(&scale, &UNBOUNDED)));
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(map_rect(&scale, &r), Rect::new(2.0, 1.0, 6.0, 2.0));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(invert(&Affine::scale_non_uniform(0.0, 1.0)).is_none());
        assert!(invert(&Affine::new([f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0])).is_none());
        let inv = invert(&Affine::translate((2.0, 3.0))).unwrap();
        assert_eq!(inv * Point::new(2.0, 3.0), Point::ZERO);
    }
}
