// LayerTree - a root layer plus the frame parameters it is rendered with.
// Prerolling consumes the tree and yields a PrerolledFrame, the only thing that can be painted.

use super::index::SpatialIndex;
use super::layers::geometry::{self, Affine, Point, Rect, Size};
use super::layers::{Canvas, Layer, PaintContext, PrerollContext};
use crate::config::Settings;
use crate::error::{LayerError, LayerResult};
use std::sync::atomic::{AtomicU64, Ordering};

/// Returns a process-wide increasing frame number.
pub fn next_frame_number() -> u64 {
    static FRAME_COUNTER: AtomicU64 = AtomicU64::new(1);
    FRAME_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A complete layer tree ready to be prerolled
#[derive(Debug)]
pub struct LayerTree {
    root: Box<dyn Layer>,
    frame_size: Size,
    device_pixel_ratio: f64,
    checkerboard_offscreen_layers: bool,
    checked: bool,
}

impl LayerTree {
    pub fn new(root: Box<dyn Layer>, settings: &Settings) -> Self {
        Self {
            root,
            frame_size: Size::new(settings.frame.width, settings.frame.height),
            device_pixel_ratio: settings.frame.device_pixel_ratio,
            checkerboard_offscreen_layers: settings.debug.checkerboard_offscreen_layers,
            checked: settings.checked_paint(),
        }
    }

    pub fn root(&self) -> &dyn Layer {
        self.root.as_ref()
    }

    /// Mutable access for editing the tree between frames.
    pub fn root_mut(&mut self) -> &mut Box<dyn Layer> {
        &mut self.root
    }

    /// Frame size in physical pixels.
    pub fn frame_size(&self) -> Size {
        self.frame_size
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn set_checkerboard_offscreen_layers(&mut self, enabled: bool) {
        self.checkerboard_offscreen_layers = enabled;
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    /// Matrix from root layer space to device space.
    pub fn root_matrix(&self) -> Affine {
        Affine::scale(self.device_pixel_ratio)
    }

    /// Runs preroll over the whole tree for `frame_number`.
    pub fn preroll(mut self, frame_number: u64) -> PrerolledFrame {
        let root_matrix = self.root_matrix();
        let frame_rect = Rect::from_origin_size(Point::ORIGIN, self.frame_size);
        let cull_rect = match geometry::invert(&root_matrix) {
            Some(inverse) => geometry::map_rect(&inverse, &frame_rect),
            None => geometry::UNBOUNDED,
        };

        let mut context = PrerollContext::new(frame_number).with_cull_rect(cull_rect);
        self.root.preroll(&mut context, &root_matrix);
        let leaf_bounds = context.take_leaf_bounds();

        log::debug!(
            "frame {frame_number}: prerolled {}, paint bounds {:?}, {} leaves",
            self.root.layer_type(),
            self.root.paint_bounds(),
            leaf_bounds.len()
        );

        PrerolledFrame {
            tree: self,
            frame_number,
            root_matrix,
            leaf_bounds,
        }
    }
}

/// A tree after preroll. Immutable until painted or turned back into a tree.
#[derive(Debug)]
pub struct PrerolledFrame {
    tree: LayerTree,
    frame_number: u64,
    root_matrix: Affine,
    leaf_bounds: Vec<(Rect, u64)>,
}

impl PrerolledFrame {
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Root paint bounds, in root layer space.
    pub fn paint_bounds(&self) -> Rect {
        self.tree.root.paint_bounds()
    }

    /// Device-space bounds of every leaf reached by preroll, paired with its layer id.
    pub fn leaf_bounds(&self) -> &[(Rect, u64)] {
        &self.leaf_bounds
    }

    pub fn feed_index<I: SpatialIndex + ?Sized>(&self, index: &mut I) {
        index.insert(&self.leaf_bounds);
    }

    pub fn tree(&self) -> &LayerTree {
        &self.tree
    }

    /// Gives the tree back for the next frame. It must be prerolled again.
    pub fn into_tree(self) -> LayerTree {
        self.tree
    }

    /// Paints the frame and checks the canvas ends at the save depth it started at.
    pub fn paint(&self, canvas: &mut dyn Canvas) -> LayerResult {
        let root = self.tree.root.as_ref();
        if !root.needs_painting() {
            log::debug!("frame {}: nothing to paint", self.frame_number);
            return Ok(());
        }

        let expected = canvas.save_count();
        let mut context = PaintContext::new(canvas, self.frame_number)
            .with_checkerboard(self.tree.checkerboard_offscreen_layers)
            .with_checked(self.tree.checked);

        let scaled = self.root_matrix != Affine::IDENTITY;
        if scaled {
            context.canvas.save();
            context.canvas.concat(&self.root_matrix);
        }
        let result = root.paint(&mut context);
        if scaled {
            context.canvas.restore();
        }
        result?;

        let found = context.canvas.save_count();
        if found != expected {
            log::warn!("frame {}: save count {found}, expected {expected}", self.frame_number);
            return Err(LayerError::UnbalancedSaveCount { expected, found });
        }
        log::debug!("frame {}: painted", self.frame_number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::layers::testing::MockLayer;
    use crate::compositor::layers::{ContainerLayer, DrawCommand, RecordingCanvas};

    fn settings(device_pixel_ratio: f64) -> Settings {
        let mut settings = Settings::default();
        settings.frame.width = 200.0;
        settings.frame.height = 100.0;
        settings.frame.device_pixel_ratio = device_pixel_ratio;
        settings.debug.checked_paint = Some(true);
        settings
    }

    #[test]
    fn root_sees_frame_in_logical_space() {
        let leaf = MockLayer::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let observer = leaf.observer();
        let mut root = ContainerLayer::new();
        root.add_child(Box::new(leaf));

        let frame = LayerTree::new(Box::new(root), &settings(2.0)).preroll(7);

        assert_eq!(frame.frame_number(), 7);
        assert_eq!(observer.parent_matrix(), Affine::scale(2.0));
        assert_eq!(observer.parent_cull_rect(), Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(frame.leaf_bounds()[0].0, Rect::new(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn paint_scales_to_device() {
        let leaf = MockLayer::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let draw = leaf.expected_draw();
        let frame = LayerTree::new(Box::new(leaf), &settings(2.0)).preroll(1);

        let mut canvas = RecordingCanvas::new();
        frame.paint(&mut canvas).unwrap();
        assert_eq!(
            canvas.commands(),
            &[
                DrawCommand::Save,
                DrawCommand::Concat(Affine::scale(2.0)),
                draw,
                DrawCommand::Restore,
            ]
        );
    }

    #[test]
    fn empty_tree_paints_nothing() {
        let frame = LayerTree::new(Box::new(ContainerLayer::new()), &settings(1.0)).preroll(1);
        let mut canvas = RecordingCanvas::new();
        assert_eq!(frame.paint(&mut canvas), Ok(()));
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn reused_tree_must_be_prerolled_for_the_new_frame() {
        let leaf = MockLayer::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let observer = leaf.observer();
        let tree = LayerTree::new(Box::new(leaf), &settings(1.0));

        let first = tree.preroll(1);
        let second = first.into_tree().preroll(2);
        assert_eq!(observer.preroll_count(), 2);
        assert_eq!(observer.observation().map(|o| o.frame), Some(2));

        let mut canvas = RecordingCanvas::new();
        second.paint(&mut canvas).unwrap();
        assert_eq!(canvas.commands().len(), 1);
    }

    #[test]
    fn frame_numbers_increase() {
        let a = next_frame_number();
        let b = next_frame_number();
        assert!(b > a);
    }
}
