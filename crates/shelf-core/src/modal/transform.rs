//! Lift transform
//!
//! Computes the translate+scale that makes the centered detail panel sit
//! exactly on top of the card it was opened from. The panel's cover is its
//! left half, so the cover's center is a quarter of the panel width in from
//! the left edge.

use super::geometry::{OriginPosition, Rect, Viewport};

/// Maximum panel width in pixels
pub const PANEL_MAX_WIDTH: f64 = 700.0;
/// Maximum panel height in pixels
pub const PANEL_MAX_HEIGHT: f64 = 600.0;
/// Horizontal margin kept free around the panel
pub const PANEL_MARGIN: f64 = 64.0;
/// Fraction of viewport height the panel may use
pub const PANEL_HEIGHT_RATIO: f64 = 0.8;
/// Scale used when there is no origin to align with
pub const DEFAULT_SCALE: f64 = 0.4;
/// Upper bound on the lift scale
pub const MAX_SCALE: f64 = 0.85;

/// Size of the detail panel at scale 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

impl PanelSize {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            width: PANEL_MAX_WIDTH.min(viewport.width - PANEL_MARGIN),
            height: PANEL_MAX_HEIGHT.min(viewport.height * PANEL_HEIGHT_RATIO),
        }
    }

    /// Width of the cover half
    pub fn cover_width(&self) -> f64 {
        self.width * 0.5
    }

    /// Panel rectangle centered in the viewport
    pub fn centered_in(&self, viewport: Viewport) -> Rect {
        Rect::new(
            viewport.center_x() - self.width / 2.0,
            viewport.center_y() - self.height / 2.0,
            self.width,
            self.height,
        )
    }
}

/// Translate+scale applied to the centered panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Transform {
    /// No movement, full size
    pub const IDENTITY: Transform = Transform {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
    };

    /// Centered shrink used when no origin is known
    pub const CENTERED: Transform = Transform {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: DEFAULT_SCALE,
    };

    /// Map a rectangle through this transform, scaling about its center
    pub fn apply(&self, rect: Rect) -> Rect {
        let width = rect.width * self.scale;
        let height = rect.height * self.scale;
        Rect::new(
            rect.center_x() + self.offset_x - width / 2.0,
            rect.center_y() + self.offset_y - height / 2.0,
            width,
            height,
        )
    }

    /// Linear blend towards `other`; `t` is clamped to [0, 1]
    pub fn lerp(&self, other: &Transform, t: f64) -> Transform {
        let t = t.clamp(0.0, 1.0);
        Transform {
            offset_x: self.offset_x + (other.offset_x - self.offset_x) * t,
            offset_y: self.offset_y + (other.offset_y - self.offset_y) * t,
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }
}

/// Compute the lift transform for an origin
pub fn compute(origin: Option<&OriginPosition>, viewport: Viewport) -> Transform {
    let Some(origin) = origin else {
        return Transform::CENTERED;
    };
    let panel = PanelSize::for_viewport(viewport);

    let scale = (origin.width / panel.cover_width()).min(MAX_SCALE);

    let cover_center_offset = panel.width * 0.25 * scale;
    let offset_x = origin.x - viewport.center_x() + cover_center_offset;

    let height_diff = panel.height * scale - origin.cover_height;
    let offset_y = origin.y - viewport.center_y() + height_diff / 2.0;

    Transform {
        offset_x,
        offset_y,
        scale,
    }
}
