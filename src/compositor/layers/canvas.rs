// Canvas capability set consumed by the paint pass.
// RecordingCanvas is the in-crate implementation: a command buffer that also tracks save state.

use super::geometry::{self, Affine, BezPath, Point, Rect, RoundedRect, Shape};

/// Color representation in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 255)
    }

    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: ((argb >> 24) & 0xFF) as u8,
            r: ((argb >> 16) & 0xFF) as u8,
            g: ((argb >> 8) & 0xFF) as u8,
            b: (argb & 0xFF) as u8,
        }
    }

    pub fn to_argb(&self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub const fn black() -> Self {
        Self::from_rgb(0, 0, 0)
    }

    pub const fn red() -> Self {
        Self::from_rgb(255, 0, 0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Paint style for drawing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

/// Paint configuration for drawing operations
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub style: PaintStyle,
    pub stroke_width: f64,
    pub anti_alias: bool,
}

/// Fixed overlay color for offscreen-group checkerboarding.
pub const CHECKERBOARD_COLOR: Color = Color::from_argb(0x64FF_00FF);

impl Paint {
    pub fn new() -> Self {
        Self {
            color: Color::black(),
            style: PaintStyle::Fill,
            stroke_width: 1.0,
            anti_alias: true,
        }
    }

    pub fn from_color(color: Color) -> Self {
        Self {
            color,
            ..Self::new()
        }
    }

    /// The diagnostic fill drawn over offscreen groups when checkerboarding.
    pub fn checkerboard() -> Self {
        Self {
            color: CHECKERBOARD_COLOR,
            anti_alias: false,
            ..Self::new()
        }
    }

    pub fn with_style(mut self, style: PaintStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self::new()
    }
}

/// How a clip combines with the current clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipOp {
    #[default]
    Intersect,
    Difference,
}

/// The drawing target of the paint pass.
///
/// Layers only ever talk to this trait, so a rasterizer, a recording buffer
/// and a test double are interchangeable.
pub trait Canvas {
    fn save(&mut self);
    fn save_layer(&mut self, bounds: Option<Rect>, paint: Option<&Paint>);
    fn restore(&mut self);
    /// Number of saves (including save layers) not yet restored.
    fn save_count(&self) -> usize;

    fn concat(&mut self, matrix: &Affine);
    fn translate(&mut self, dx: f64, dy: f64) {
        self.concat(&Affine::translate((dx, dy)));
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp, anti_alias: bool);
    fn clip_rrect(&mut self, rrect: RoundedRect, op: ClipOp, anti_alias: bool);
    fn clip_path(&mut self, path: &BezPath, op: ClipOp, anti_alias: bool);

    fn draw_rect(&mut self, rect: Rect, paint: &Paint);
    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint);
    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint);
    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint);
    fn draw_path(&mut self, path: &BezPath, paint: &Paint);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    SaveLayer {
        bounds: Option<Rect>,
        paint: Option<Paint>,
    },
    Restore,
    Concat(Affine),
    ClipRect {
        rect: Rect,
        op: ClipOp,
        anti_alias: bool,
    },
    ClipRRect {
        rrect: RoundedRect,
        op: ClipOp,
        anti_alias: bool,
    },
    ClipPath {
        path: BezPath,
        op: ClipOp,
        anti_alias: bool,
    },
    DrawRect(Rect, Paint),
    DrawRRect(RoundedRect, Paint),
    DrawCircle(Point, f64, Paint),
    DrawLine(Point, Point, Paint),
    DrawPath(BezPath, Paint),
}

impl DrawCommand {
    /// Replays this command onto another canvas.
    pub fn apply(&self, canvas: &mut dyn Canvas) {
        match self {
            DrawCommand::Save => canvas.save(),
            DrawCommand::SaveLayer { bounds, paint } => canvas.save_layer(*bounds, paint.as_ref()),
            DrawCommand::Restore => canvas.restore(),
            DrawCommand::Concat(matrix) => canvas.concat(matrix),
            DrawCommand::ClipRect { rect, op, anti_alias } => canvas.clip_rect(*rect, *op, *anti_alias),
            DrawCommand::ClipRRect {
                rrect,
                op,
                anti_alias,
            } => canvas.clip_rrect(*rrect, *op, *anti_alias),
            DrawCommand::ClipPath {
                path,
                op,
                anti_alias,
            } => canvas.clip_path(path, *op, *anti_alias),
            DrawCommand::DrawRect(rect, paint) => canvas.draw_rect(*rect, paint),
            DrawCommand::DrawRRect(rrect, paint) => canvas.draw_rrect(*rrect, paint),
            DrawCommand::DrawCircle(center, radius, paint) => {
                canvas.draw_circle(*center, *radius, paint)
            }
            DrawCommand::DrawLine(from, to, paint) => canvas.draw_line(*from, *to, paint),
            DrawCommand::DrawPath(path, paint) => canvas.draw_path(path, paint),
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            DrawCommand::DrawRect(..)
                | DrawCommand::DrawRRect(..)
                | DrawCommand::DrawCircle(..)
                | DrawCommand::DrawLine(..)
                | DrawCommand::DrawPath(..)
        )
    }
}

/// Canvas save/restore state
#[derive(Debug, Clone, Copy)]
struct CanvasState {
    transform: Affine,
    /// Conservative device-space clip bounds.
    clip_bounds: Rect,
}

/// A canvas that records every call as a [`DrawCommand`].
#[derive(Debug)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    state_stack: Vec<CanvasState>,
    current_state: CanvasState,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            state_stack: Vec::new(),
            current_state: CanvasState {
                transform: Affine::IDENTITY,
                clip_bounds: geometry::UNBOUNDED,
            },
        }
    }

    /// A canvas whose initial clip is the given device rect.
    pub fn with_bounds(bounds: Rect) -> Self {
        let mut canvas = Self::new();
        canvas.current_state.clip_bounds = bounds;
        canvas
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn total_matrix(&self) -> Affine {
        self.current_state.transform
    }

    pub fn device_clip_bounds(&self) -> Rect {
        self.current_state.clip_bounds
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn push_state(&mut self) {
        self.state_stack.push(self.current_state);
    }

    fn intersect_clip(&mut self, local_bounds: Rect, op: ClipOp) {
        // Difference clips can only shrink the clip, so the bounds stay conservative.
        if op == ClipOp::Intersect {
            let device = geometry::map_rect(&self.current_state.transform, &local_bounds);
            self.current_state.clip_bounds =
                geometry::intersection(&self.current_state.clip_bounds, &device)
                    .unwrap_or(Rect::ZERO);
        }
    }
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.push_state();
        self.commands.push(DrawCommand::Save);
    }

    fn save_layer(&mut self, bounds: Option<Rect>, paint: Option<&Paint>) {
        self.push_state();
        self.commands.push(DrawCommand::SaveLayer {
            bounds,
            paint: paint.cloned(),
        });
    }

    fn restore(&mut self) {
        match self.state_stack.pop() {
            Some(state) => {
                self.current_state = state;
                self.commands.push(DrawCommand::Restore);
            }
            None => log::warn!("RecordingCanvas: restore without a matching save ignored"),
        }
    }

    fn save_count(&self) -> usize {
        self.state_stack.len()
    }

    fn concat(&mut self, matrix: &Affine) {
        self.current_state.transform = self.current_state.transform * *matrix;
        self.commands.push(DrawCommand::Concat(*matrix));
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp, anti_alias: bool) {
        self.intersect_clip(rect, op);
        self.commands.push(DrawCommand::ClipRect {
            rect,
            op,
            anti_alias,
        });
    }

    fn clip_rrect(&mut self, rrect: RoundedRect, op: ClipOp, anti_alias: bool) {
        self.intersect_clip(rrect.rect(), op);
        self.commands.push(DrawCommand::ClipRRect {
            rrect,
            op,
            anti_alias,
        });
    }

    fn clip_path(&mut self, path: &BezPath, op: ClipOp, anti_alias: bool) {
        self.intersect_clip(path.bounding_box(), op);
        self.commands.push(DrawCommand::ClipPath {
            path: path.clone(),
            op,
            anti_alias,
        });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::DrawRect(rect, paint.clone()));
    }

    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint) {
        self.commands.push(DrawCommand::DrawRRect(rrect, paint.clone()));
    }

    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        self.commands
            .push(DrawCommand::DrawCircle(center, radius, paint.clone()));
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) {
        self.commands
            .push(DrawCommand::DrawLine(from, to, paint.clone()));
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        self.commands
            .push(DrawCommand::DrawPath(path.clone(), paint.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_restore_is_ignored() {
        let mut canvas = RecordingCanvas::new();
        canvas.restore();
        assert!(canvas.commands().is_empty());
        assert_eq!(canvas.save_count(), 0);
    }

    #[test]
    fn restore_pops_matrix_and_clip() {
        let mut canvas = RecordingCanvas::with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        canvas.save();
        canvas.translate(10.0, 10.0);
        canvas.clip_rect(Rect::new(0.0, 0.0, 20.0, 20.0), ClipOp::Intersect, true);
        assert_eq!(canvas.total_matrix(), Affine::translate((10.0, 10.0)));
        assert_eq!(canvas.device_clip_bounds(), Rect::new(10.0, 10.0, 30.0, 30.0));
        assert_eq!(canvas.save_count(), 1);

        canvas.restore();
        assert_eq!(canvas.total_matrix(), Affine::IDENTITY);
        assert_eq!(canvas.device_clip_bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(canvas.save_count(), 0);
    }

    #[test]
    fn replay_reproduces_commands() {
        let mut source = RecordingCanvas::new();
        source.save_layer(Some(Rect::new(0.0, 0.0, 5.0, 5.0)), None);
        source.draw_circle(Point::new(2.0, 2.0), 1.0, &Paint::from_color(Color::red()));
        source.restore();

        let mut target = RecordingCanvas::new();
        for command in source.commands() {
            command.apply(&mut target);
        }
        assert_eq!(source.commands(), target.commands());
    }

    #[test]
    fn color_argb_round_trip() {
        let color = Color::from_argb(0x80112233);
        assert_eq!(color, Color::from_rgba(0x11, 0x22, 0x33, 0x80));
        assert_eq!(color.to_argb(), 0x80112233);
        assert_eq!(CHECKERBOARD_COLOR.a, 0x64);
    }
}
