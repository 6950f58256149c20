// Mutator stack: the chain of ancestor transforms and clips seen by a layer.
// Embedders of platform content read it to reproduce the accumulated effects.

use super::geometry::{Affine, BezPath, Rect, RoundedRect};

/// A single ancestor effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutator {
    Transform(Affine),
    ClipRect(Rect),
    ClipRoundedRect(RoundedRect),
    ClipPath(BezPath),
}

impl Mutator {
    pub fn is_clip(&self) -> bool {
        !matches!(self, Mutator::Transform(_))
    }
}

/// Stack of [`Mutator`]s, pushed on descent and popped on return.
///
/// Entries are stored in push order (outermost at the bottom). Iteration
/// yields the nearest ancestor first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutatorsStack {
    entries: Vec<Mutator>,
}

impl MutatorsStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_transform(&mut self, matrix: Affine) {
        self.entries.push(Mutator::Transform(matrix));
    }

    pub fn push_clip_rect(&mut self, rect: Rect) {
        self.entries.push(Mutator::ClipRect(rect));
    }

    pub fn push_clip_rrect(&mut self, rrect: RoundedRect) {
        self.entries.push(Mutator::ClipRoundedRect(rrect));
    }

    pub fn push_clip_path(&mut self, path: BezPath) {
        self.entries.push(Mutator::ClipPath(path));
    }

    pub fn push(&mut self, mutator: Mutator) {
        self.entries.push(mutator);
    }

    pub fn pop(&mut self) -> Option<Mutator> {
        self.entries.pop()
    }

    /// The nearest ancestor effect.
    pub fn top(&self) -> Option<&Mutator> {
        self.entries.last()
    }

    /// The outermost ancestor effect.
    pub fn bottom(&self) -> Option<&Mutator> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest ancestor first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Mutator> + '_ {
        self.entries.iter().rev()
    }

    /// Outermost ancestor first, i.e. the order in which to apply them.
    pub fn iter_root_first(&self) -> impl DoubleEndedIterator<Item = &Mutator> + '_ {
        self.entries.iter()
    }

    /// Snapshot, nearest ancestor first.
    pub fn to_vec(&self) -> Vec<Mutator> {
        self.iter().cloned().collect()
    }

    /// Product of every transform entry, root first.
    pub fn total_transform(&self) -> Affine {
        self.iter_root_first()
            .fold(Affine::IDENTITY, |acc, mutator| match mutator {
                Mutator::Transform(matrix) => acc * *matrix,
                _ => acc,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_is_nearest_first() {
        let outer = Affine::translate((1.0, 0.0));
        let inner = Affine::scale(2.0);
        let clip = Rect::new(0.0, 0.0, 4.0, 4.0);

        let mut stack = MutatorsStack::new();
        stack.push_transform(outer);
        stack.push_clip_rect(clip);
        stack.push_transform(inner);

        assert_eq!(
            stack.to_vec(),
            vec![
                Mutator::Transform(inner),
                Mutator::ClipRect(clip),
                Mutator::Transform(outer),
            ]
        );
        assert_eq!(stack.top(), Some(&Mutator::Transform(inner)));
        assert_eq!(stack.bottom(), Some(&Mutator::Transform(outer)));
        assert_eq!(stack.total_transform(), outer * inner);
    }

    #[test]
    fn pop_restores_previous_state() {
        let mut stack = MutatorsStack::new();
        stack.push_clip_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        let snapshot = stack.clone();
        stack.push_transform(Affine::IDENTITY);
        assert_eq!(stack.pop(), Some(Mutator::Transform(Affine::IDENTITY)));
        assert_eq!(stack, snapshot);
        assert!(stack.top().map_or(false, Mutator::is_clip));
    }
}
