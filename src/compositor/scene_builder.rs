// SceneBuilder API
// Builds a layer tree imperatively: push a transform or clip, add content, pop.

use super::layer_tree::LayerTree;
use super::layers::*;
use crate::config::Settings;

/// A layer that can collect children while a scene is being built.
pub trait LayerGroup: Send {
    fn add_child(&mut self, child: Box<dyn Layer>);

    fn into_layer(self: Box<Self>) -> Box<dyn Layer>;
}

impl LayerGroup for ContainerLayer {
    fn add_child(&mut self, child: Box<dyn Layer>) {
        ContainerLayer::add_child(self, child);
    }

    fn into_layer(self: Box<Self>) -> Box<dyn Layer> {
        self
    }
}

impl LayerGroup for TransformLayer {
    fn add_child(&mut self, child: Box<dyn Layer>) {
        TransformLayer::add_child(self, child);
    }

    fn into_layer(self: Box<Self>) -> Box<dyn Layer> {
        self
    }
}

impl<S: ClipShape + 'static> LayerGroup for ClipLayer<S> {
    fn add_child(&mut self, child: Box<dyn Layer>) {
        ClipLayer::add_child(self, child);
    }

    fn into_layer(self: Box<Self>) -> Box<dyn Layer> {
        self
    }
}

/// Builder for constructing a layer tree
pub struct SceneBuilder {
    root: ContainerLayer,
    /// Groups opened by `push_*` and not yet popped, innermost last.
    stack: Vec<Box<dyn LayerGroup>>,
    settings: Settings,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// A builder whose tree is rendered with `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            root: ContainerLayer::new(),
            stack: Vec::new(),
            settings,
        }
    }

    /// Number of groups currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn current(&mut self) -> &mut dyn LayerGroup {
        match self.stack.last_mut() {
            Some(group) => group.as_mut(),
            None => &mut self.root,
        }
    }

    fn push_group(&mut self, group: Box<dyn LayerGroup>) -> &mut Self {
        self.stack.push(group);
        self
    }

    // ========================================
    // Transform Operations
    // ========================================

    pub fn push_transform(&mut self, matrix: Affine) -> &mut Self {
        self.push_group(Box::new(TransformLayer::new(matrix)))
    }

    pub fn push_translate(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.push_group(Box::new(TransformLayer::translation(dx, dy)))
    }

    pub fn push_scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.push_group(Box::new(TransformLayer::scale(sx, sy)))
    }

    /// Push a rotation transformation (in radians)
    pub fn push_rotate(&mut self, radians: f64) -> &mut Self {
        self.push_group(Box::new(TransformLayer::rotation(radians)))
    }

    // ========================================
    // Clipping Operations
    // ========================================

    pub fn push_clip_rect(&mut self, rect: Rect, clip_behavior: ClipBehavior) -> &mut Self {
        self.push_group(Box::new(ClipRectLayer::with_behavior(rect, clip_behavior)))
    }

    pub fn push_clip_rrect(&mut self, rrect: RoundedRect, clip_behavior: ClipBehavior) -> &mut Self {
        self.push_group(Box::new(ClipRRectLayer::with_behavior(rrect, clip_behavior)))
    }

    pub fn push_clip_path(&mut self, path: BezPath, clip_behavior: ClipBehavior) -> &mut Self {
        self.push_group(Box::new(ClipPathLayer::with_behavior(path, clip_behavior)))
    }

    // ========================================
    // Drawing Operations
    // ========================================

    pub fn add_picture(&mut self, offset: Vec2, picture: Picture) -> &mut Self {
        self.add_layer(Box::new(PictureLayer::new(offset, picture)))
    }

    /// Add a solid color rectangle
    pub fn add_rect(&mut self, rect: Rect, paint: Paint) -> &mut Self {
        let mut picture = Picture::new();
        picture.draw_rect(rect, paint);
        self.add_picture(Vec2::ZERO, picture)
    }

    pub fn add_circle(&mut self, center: Point, radius: f64, paint: Paint) -> &mut Self {
        let mut picture = Picture::new();
        picture.draw_circle(center, radius, paint);
        self.add_picture(Vec2::ZERO, picture)
    }

    /// Add a pre-built layer
    pub fn add_layer(&mut self, layer: Box<dyn Layer>) -> &mut Self {
        self.current().add_child(layer);
        self
    }

    /// Closes the innermost open group and adds it to its parent.
    pub fn pop(&mut self) -> &mut Self {
        match self.stack.pop() {
            Some(group) => {
                let layer = group.into_layer();
                self.current().add_child(layer);
            }
            None => log::warn!("SceneBuilder: pop with no open group ignored"),
        }
        self
    }

    /// Closes any open groups and returns the finished tree.
    pub fn build(mut self) -> LayerTree {
        while !self.stack.is_empty() {
            self.pop();
        }
        LayerTree::new(Box::new(self.root), &self.settings)
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A small scene touching every layer kind.
pub fn test_scene(settings: Settings) -> LayerTree {
    let mut builder = SceneBuilder::with_settings(settings);

    builder.add_rect(
        Rect::new(0.0, 0.0, 800.0, 600.0),
        Paint::from_color(Color::from_rgb(240, 240, 240)),
    );

    builder
        .push_translate(400.0, 300.0)
        .push_rotate(0.5)
        .add_rect(
            Rect::new(-50.0, -50.0, 50.0, 50.0),
            Paint::from_color(Color::from_rgb(100, 150, 200)),
        )
        .pop()
        .pop();

    builder
        .push_clip_rect(
            Rect::new(500.0, 100.0, 700.0, 300.0),
            ClipBehavior::AntiAliasWithSaveLayer,
        )
        .add_rect(
            Rect::new(450.0, 50.0, 750.0, 350.0),
            Paint::from_color(Color::from_rgb(100, 200, 100)),
        )
        .pop();

    builder
        .push_clip_rrect(
            RoundedRect::from_rect(Rect::new(100.0, 350.0, 300.0, 550.0), 24.0),
            ClipBehavior::AntiAlias,
        )
        .add_circle(
            Point::new(200.0, 450.0),
            120.0,
            Paint::from_color(Color::from_rgb(200, 100, 100)),
        )
        .pop();

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_builder_transform() {
        let mut builder = SceneBuilder::new();
        builder
            .push_translate(50.0, 50.0)
            .push_scale(2.0, 2.0)
            .add_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Paint::new());
        assert_eq!(builder.depth(), 2);
        builder.pop().pop();
        assert_eq!(builder.depth(), 0);

        let frame = builder.build().preroll(1);
        assert_eq!(frame.paint_bounds(), Rect::new(50.0, 50.0, 70.0, 70.0));
    }

    #[test]
    fn build_closes_open_groups() {
        let mut builder = SceneBuilder::new();
        builder
            .push_clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0), ClipBehavior::HardEdge)
            .push_translate(1.0, 1.0)
            .add_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Paint::new());

        let frame = builder.build().preroll(1);
        assert_eq!(frame.paint_bounds(), Rect::new(1.0, 1.0, 11.0, 11.0));
        assert_eq!(frame.leaf_bounds().len(), 1);
    }

    #[test]
    fn unbalanced_pop_is_ignored() {
        let mut builder = SceneBuilder::new();
        builder.pop();
        builder.add_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Paint::new());
        let tree = builder.build();
        assert_eq!(tree.root().layer_type(), "ContainerLayer");
        assert_eq!(tree.preroll(1).leaf_bounds().len(), 1);
    }

    #[test]
    fn test_scene_paints_balanced() {
        let mut settings = Settings::default();
        settings.debug.checkerboard_offscreen_layers = true;
        let frame = test_scene(settings).preroll(1);

        let mut canvas = RecordingCanvas::new();
        frame.paint(&mut canvas).unwrap();
        let checkerboards = canvas
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawRect(_, paint) if *paint == Paint::checkerboard()))
            .count();
        assert_eq!(checkerboards, 1);
        assert_eq!(canvas.save_count(), 0);
    }
}
