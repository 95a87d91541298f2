#![forbid(unsafe_code)]

//! View transform: zoom/pan state and coordinate mapping.
//!
//! [`Camera`] owns the zoom level and pan offset of the canvas viewport and
//! converts between screen pixels and canvas units. Pan is a screen-space
//! offset applied after zoom, so panning feels 1:1 with the pointer at any
//! zoom level.
//!
//! [`MinimapProjection`] maps canvas space into a small overview panel.

use crate::geometry::{Point, Rect, Size, Vec2};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;
/// Multiplier for one wheel notch of zoom-in.
pub const WHEEL_ZOOM_IN: f64 = 1.1;
/// Multiplier for one wheel notch of zoom-out.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;
/// Multiplier for button/shortcut zoom steps.
pub const ZOOM_STEP: f64 = 1.2;

/// Margin kept around content when fitting, in canvas units per side.
const FIT_CONTENT_MARGIN: f64 = 50.0;
/// Margin kept at the viewport edges when fitting, in screen pixels.
const FIT_VIEWPORT_MARGIN: f64 = 40.0;

/// Zoom/pan state for the canvas viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Zoom factor, clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    pub zoom: f64,
    /// Screen-space pan offset.
    pub pan: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::default(),
        }
    }
}

impl Camera {
    /// Create a camera from persisted view settings.
    #[must_use]
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pan: Vec2::new(pan_x, pan_y),
        }
    }

    /// Convert a screen point to canvas coordinates.
    #[must_use]
    pub fn to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.dx) / self.zoom,
            (screen.y - self.pan.dy) / self.zoom,
        )
    }

    /// Convert a canvas point to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.pan.dx,
            canvas.y * self.zoom + self.pan.dy,
        )
    }

    /// Convert a screen-space displacement into canvas units.
    #[must_use]
    pub fn delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        Vec2::new(delta.dx / self.zoom, delta.dy / self.zoom)
    }

    /// Pan by a screen-space displacement (not scaled by zoom).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan.dx += delta.dx;
        self.pan.dy += delta.dy;
    }

    /// Multiply zoom by `factor`, keeping the canvas point under `anchor`
    /// (a screen position) stationary. Returns `true` if the zoom changed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        let old = self.zoom;
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if self.zoom == old {
            return false;
        }
        let ratio = self.zoom / old;
        self.pan.dx = anchor.x - (anchor.x - self.pan.dx) * ratio;
        self.pan.dy = anchor.y - (anchor.y - self.pan.dy) * ratio;
        true
    }

    /// One zoom-in step (pan unchanged).
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    /// One zoom-out step (pan unchanged).
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Reset zoom to 100% (pan unchanged).
    pub fn zoom_to_100(&mut self) {
        self.zoom = 1.0;
    }

    /// Fit `content` (canvas-space bounds) inside `viewport`, never zooming
    /// past 100%, and center it.
    pub fn zoom_to_fit(&mut self, content: Rect, viewport: Size) {
        let padded = content.inflated(FIT_CONTENT_MARGIN);
        self.zoom = ((viewport.width - FIT_VIEWPORT_MARGIN) / padded.width)
            .min((viewport.height - FIT_VIEWPORT_MARGIN) / padded.height)
            .min(1.0)
            .max(MIN_ZOOM);
        self.center_on(content.center(), viewport);
    }

    /// Pan so that the canvas point `target` lands at the viewport center.
    pub fn center_on(&mut self, target: Point, viewport: Size) {
        self.pan.dx = viewport.width / 2.0 - target.x * self.zoom;
        self.pan.dy = viewport.height / 2.0 - target.y * self.zoom;
    }

    /// Canvas-space rectangle currently visible in a viewport of `size`.
    #[must_use]
    pub fn visible_rect(&self, size: Size) -> Rect {
        let origin = self.to_canvas(Point::new(0.0, 0.0));
        Rect::new(
            origin.x,
            origin.y,
            size.width / self.zoom,
            size.height / self.zoom,
        )
    }
}

/// Mapping from canvas space into a minimap panel.
///
/// Scales the content bounds (plus a fixed margin) uniformly to fit the
/// panel's inner area and centers it. The engine only computes coordinates;
/// drawing the panel is the host's concern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjection {
    scale: f64,
    offset: Point,
    content_min: Point,
}

/// Inner border of the minimap panel, in panel pixels per side.
const PANEL_INSET: f64 = 4.0;
/// Margin added around content bounds, in canvas units per side.
const CONTENT_MARGIN: f64 = 50.0;

impl MinimapProjection {
    /// Build a projection of `content` (canvas bounds) into `panel`
    /// (screen-space panel rectangle).
    #[must_use]
    pub fn new(content: Rect, panel: Rect) -> Self {
        let inner_w = panel.width - PANEL_INSET * 2.0;
        let inner_h = panel.height - PANEL_INSET * 2.0;
        let map_w = content.width + CONTENT_MARGIN * 2.0;
        let map_h = content.height + CONTENT_MARGIN * 2.0;
        let scale = (inner_w / map_w).min(inner_h / map_h);
        let offset = Point::new(
            panel.x + PANEL_INSET + (inner_w - map_w * scale) / 2.0,
            panel.y + PANEL_INSET + (inner_h - map_h * scale) / 2.0,
        );
        Self {
            scale,
            offset,
            content_min: content.origin(),
        }
    }

    /// Uniform canvas-to-panel scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Project a canvas point into panel coordinates.
    #[must_use]
    pub fn to_panel(&self, p: Point) -> Point {
        Point::new(
            self.offset.x + (p.x - self.content_min.x + CONTENT_MARGIN) * self.scale,
            self.offset.y + (p.y - self.content_min.y + CONTENT_MARGIN) * self.scale,
        )
    }

    /// Project a canvas rectangle into panel coordinates.
    #[must_use]
    pub fn rect_to_panel(&self, r: Rect) -> Rect {
        let origin = self.to_panel(r.origin());
        Rect::new(
            origin.x,
            origin.y,
            r.width * self.scale,
            r.height * self.scale,
        )
    }

    /// Panel rectangle of the camera's current viewport.
    #[must_use]
    pub fn viewport_indicator(&self, camera: &Camera, viewport: Size) -> Rect {
        self.rect_to_panel(camera.visible_rect(viewport))
    }
}
