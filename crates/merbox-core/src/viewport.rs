//! Preview pan/zoom and pane-divider state, owned by whoever drives the preview.

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;
pub const BUTTON_ZOOM_STEP: f64 = 0.2;
pub const WHEEL_ZOOM_STEP: f64 = 0.03;
/// Share of the container a fitted diagram occupies.
pub const FIT_PADDING: f64 = 0.95;
pub const MIN_DIVIDER_PERCENT: f64 = 30.0;
pub const MAX_DIVIDER_PERCENT: f64 = 70.0;
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub position: Point,
    drag_offset: Option<Point>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position: Point::default(),
            drag_offset: None,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes the scale by `delta`, clamped, scaling the position with it so the diagram keeps
    /// its place relative to the origin.
    pub fn zoom_by(&mut self, delta: f64) {
        let new_scale = (self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;
        self.scale = new_scale;
        self.position.x *= ratio;
        self.position.y *= ratio;
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(BUTTON_ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-BUTTON_ZOOM_STEP);
    }

    /// Wheel scrolling down (positive `delta_y`) zooms out.
    pub fn wheel(&mut self, delta_y: f64) {
        let delta = if delta_y > 0.0 {
            -WHEEL_ZOOM_STEP
        } else {
            WHEEL_ZOOM_STEP
        };
        self.zoom_by(delta);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Scales and centers `content` inside `container`.
    ///
    /// Degenerate sizes leave the viewport unchanged.
    pub fn fit(&mut self, container: Size, content: Size) {
        if !(content.width > 0.0 && content.height > 0.0) {
            return;
        }
        let scale =
            (container.width / content.width).min(container.height / content.height) * FIT_PADDING;
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }
        self.scale = scale;
        self.position = Point::new(
            (container.width - content.width * scale) / 2.0,
            (container.height - content.height * scale) / 2.0,
        );
    }

    pub fn begin_drag(&mut self, pointer: Point) {
        self.drag_offset = Some(Point::new(
            pointer.x - self.position.x,
            pointer.y - self.position.y,
        ));
    }

    pub fn drag_to(&mut self, pointer: Point) {
        if let Some(offset) = self.drag_offset {
            self.position = Point::new(pointer.x - offset.x, pointer.y - offset.y);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_offset = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }
}

pub fn clamp_divider(percent: f64) -> f64 {
    percent.clamp(MIN_DIVIDER_PERCENT, MAX_DIVIDER_PERCENT)
}

/// Divider position after dragging `delta_px` across a container `container_px` wide.
pub fn drag_divider(start_percent: f64, delta_px: f64, container_px: f64) -> f64 {
    if container_px <= 0.0 {
        return clamp_divider(start_percent);
    }
    clamp_divider(start_percent + delta_px / container_px * 100.0)
}
