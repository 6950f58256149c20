// PictureLayer - A layer that contains drawing commands
// This layer represents a recorded sequence of drawing operations that can be replayed

use super::canvas::{DrawCommand, Paint, PaintStyle, RecordingCanvas};
use super::geometry::{self, Affine, BezPath, Point, Rect, RoundedRect, Shape, Vec2};
use super::{Layer, LayerBase, PaintContext, PrerollContext};
use crate::error::LayerResult;
use std::fmt::Debug;

/// A recorded sequence of drawing operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Picture {
    commands: Vec<DrawCommand>,
    bounds: Rect,
}

impl Picture {
    /// Create a new empty picture
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a picture from draw commands
    pub fn from_commands(commands: Vec<DrawCommand>) -> Self {
        let bounds = Self::calculate_bounds(&commands);
        Self { commands, bounds }
    }

    /// Records a picture by running `draw` against a fresh canvas.
    pub fn record(draw: impl FnOnce(&mut RecordingCanvas)) -> Self {
        let mut canvas = RecordingCanvas::new();
        draw(&mut canvas);
        Self::from_commands(canvas.take_commands())
    }

    pub fn draw_rect(&mut self, rect: Rect, paint: Paint) {
        self.update_bounds(stroke_outset(rect, &paint));
        self.commands.push(DrawCommand::DrawRect(rect, paint));
    }

    pub fn draw_rrect(&mut self, rrect: RoundedRect, paint: Paint) {
        self.update_bounds(stroke_outset(rrect.rect(), &paint));
        self.commands.push(DrawCommand::DrawRRect(rrect, paint));
    }

    pub fn draw_circle(&mut self, center: Point, radius: f64, paint: Paint) {
        self.update_bounds(stroke_outset(circle_bounds(center, radius), &paint));
        self.commands
            .push(DrawCommand::DrawCircle(center, radius, paint));
    }

    pub fn draw_line(&mut self, from: Point, to: Point, paint: Paint) {
        self.update_bounds(line_bounds(from, to, &paint));
        self.commands.push(DrawCommand::DrawLine(from, to, paint));
    }

    pub fn draw_path(&mut self, path: BezPath, paint: Paint) {
        if let Some(bounds) = path_bounds(&path) {
            self.update_bounds(stroke_outset(bounds, &paint));
        }
        self.commands.push(DrawCommand::DrawPath(path, paint));
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Union of everything the picture draws, in its own coordinate space.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.bounds = Rect::ZERO;
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn update_bounds(&mut self, rect: Rect) {
        self.bounds = geometry::join(self.bounds, rect);
    }

    /// Bounds of every draw command, following the save/concat/restore
    /// structure so transformed draws are mapped correctly.
    fn calculate_bounds(commands: &[DrawCommand]) -> Rect {
        let mut bounds = Rect::ZERO;
        let mut matrix = Affine::IDENTITY;
        let mut saved = Vec::new();

        for command in commands {
            let local = match command {
                DrawCommand::Save | DrawCommand::SaveLayer { .. } => {
                    saved.push(matrix);
                    continue;
                }
                DrawCommand::Restore => {
                    if let Some(previous) = saved.pop() {
                        matrix = previous;
                    }
                    continue;
                }
                DrawCommand::Concat(transform) => {
                    matrix = matrix * *transform;
                    continue;
                }
                DrawCommand::ClipRect { .. }
                | DrawCommand::ClipRRect { .. }
                | DrawCommand::ClipPath { .. } => continue,
                DrawCommand::DrawRect(rect, paint) => stroke_outset(*rect, paint),
                DrawCommand::DrawRRect(rrect, paint) => stroke_outset(rrect.rect(), paint),
                DrawCommand::DrawCircle(center, radius, paint) => {
                    stroke_outset(circle_bounds(*center, *radius), paint)
                }
                DrawCommand::DrawLine(from, to, paint) => line_bounds(*from, *to, paint),
                DrawCommand::DrawPath(path, paint) => match path_bounds(path) {
                    Some(rect) => stroke_outset(rect, paint),
                    None => continue,
                },
            };
            bounds = geometry::join(bounds, geometry::map_rect(&matrix, &local));
        }

        bounds
    }
}

fn stroke_outset(rect: Rect, paint: &Paint) -> Rect {
    match paint.style {
        PaintStyle::Stroke => rect.inflate(paint.stroke_width / 2.0, paint.stroke_width / 2.0),
        PaintStyle::Fill => rect,
    }
}

fn circle_bounds(center: Point, radius: f64) -> Rect {
    Rect::from_center_size(center, (radius * 2.0, radius * 2.0))
}

// A line has no area of its own; its stroke width always widens it.
fn line_bounds(from: Point, to: Point, paint: &Paint) -> Rect {
    let half = paint.stroke_width.max(1.0) / 2.0;
    Rect::from_points(from, to).inflate(half, half)
}

fn path_bounds(path: &BezPath) -> Option<Rect> {
    (!path.elements().is_empty()).then(|| path.bounding_box())
}

/// A layer that draws a recorded picture
pub struct PictureLayer {
    base: LayerBase,
    offset: Vec2,
    picture: Picture,
}

impl PictureLayer {
    pub fn new(offset: Vec2, picture: Picture) -> Self {
        Self {
            base: LayerBase::new(),
            offset,
            picture,
        }
    }

    /// Create an empty picture layer
    pub fn empty() -> Self {
        Self::new(Vec2::ZERO, Picture::new())
    }

    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}

impl Layer for PictureLayer {
    fn preroll(&mut self, context: &mut PrerollContext, matrix: &Affine) {
        self.base.begin_preroll(context);
        let picture_bounds = self.picture.bounds();
        if geometry::is_empty(&picture_bounds) {
            return;
        }
        let bounds = picture_bounds + self.offset;
        self.base.set_paint_bounds(bounds);
        context.record_leaf_bounds(self.base.id(), matrix, bounds);
    }

    fn paint(&self, context: &mut PaintContext<'_>) -> LayerResult {
        if !self.base.check_paint(self.layer_type(), context)? {
            return Ok(());
        }

        let translated = self.offset != Vec2::ZERO;
        if translated {
            context.canvas.save();
            context.canvas.translate(self.offset.x, self.offset.y);
        }
        for command in self.picture.commands() {
            command.apply(&mut *context.canvas);
        }
        if translated {
            context.canvas.restore();
        }
        Ok(())
    }

    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn layer_type(&self) -> &'static str {
        "PictureLayer"
    }
}

impl Debug for PictureLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PictureLayer")
            .field("id", &self.base.id())
            .field("offset", &self.offset)
            .field("paint_bounds", &self.base.paint_bounds())
            .field("command_count", &self.picture.commands().len())
            .finish()
    }
}
