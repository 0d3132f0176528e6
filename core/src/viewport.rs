use serde::{Deserialize, Serialize};

use crate::config::{Rules, ZOOM_MAX_DEFAULT, ZOOM_MIN_DEFAULT};
use crate::geometry::Point;

/// Pan and zoom of the world inside the canvas:
/// `screen = world * zoom + view`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    view_x: f32,
    view_y: f32,
    zoom: f32,
    zoom_min: f32,
    zoom_max: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::with_limits(ZOOM_MIN_DEFAULT, ZOOM_MAX_DEFAULT)
    }
}

impl Viewport {
    pub fn with_limits(zoom_min: f32, zoom_max: f32) -> Self {
        Self {
            view_x: 0.0,
            view_y: 0.0,
            zoom: 1.0,
            zoom_min,
            zoom_max: zoom_max.max(zoom_min),
        }
    }

    pub fn from_rules(rules: &Rules) -> Self {
        Self::with_limits(rules.zoom_min, rules.zoom_max)
    }

    pub fn offset(&self) -> Point {
        (self.view_x, self.view_y)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_identity(&self) -> bool {
        self.view_x == 0.0 && self.view_y == 0.0 && self.zoom == 1.0
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        (
            (screen.0 - self.view_x) / self.zoom,
            (screen.1 - self.view_y) / self.zoom,
        )
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        (
            world.0 * self.zoom + self.view_x,
            world.1 * self.zoom + self.view_y,
        )
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.view_x = offset.0;
        self.view_y = offset.1;
    }

    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.zoom_min, self.zoom_max)
    }

    /// Multiplies the zoom by `factor`, keeping the world point under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, factor: f32, anchor: Point) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let old_zoom = self.zoom.max(1.0e-4);
        let new_zoom = self.clamp_zoom(old_zoom * factor);
        if (new_zoom - old_zoom).abs() <= f32::EPSILON {
            return;
        }
        let world = self.screen_to_world(anchor);
        self.zoom = new_zoom;
        self.view_x = anchor.0 - world.0 * new_zoom;
        self.view_y = anchor.1 - world.1 * new_zoom;
    }

    pub fn reset(&mut self) {
        self.view_x = 0.0;
        self.view_y = 0.0;
        self.zoom = 1.0;
    }
}
