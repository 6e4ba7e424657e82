//! Cover spread placement geometry
//!
//! All coordinates are PDF points with the origin at the bottom-left of the
//! template page.

use crate::config::SpreadConfig;

/// Millimetre to point factor used for the bleed
pub const POINTS_PER_MM: f32 = 2.83465;

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f32);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f32) -> Self {
        Length(mm)
    }

    /// Get the value in points
    pub fn pt(&self) -> f32 {
        self.0 * POINTS_PER_MM
    }
}

/// Axis-aligned rectangle in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Where the two source pages land on the template page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadLayout {
    pub left: Rect,
    pub right: Rect,
}

impl SpreadLayout {
    /// Compute both placements from the configured constants.
    ///
    /// The left image starts at `bleed + left_inset`; the right image follows
    /// it after `horizontal_gap`. Both share `bleed + vertical_offset` as their
    /// baseline and are scaled to an `image_size` square.
    pub fn from_config(config: &SpreadConfig) -> Self {
        let bleed = Length::from_mm(config.bleed_mm).pt();
        let size = config.image_size;
        let y = bleed + config.vertical_offset;

        let left = Rect {
            x: bleed + config.left_inset,
            y,
            width: size,
            height: size,
        };
        let right = Rect {
            x: left.right() + config.horizontal_gap,
            y,
            width: size,
            height: size,
        };

        Self { left, right }
    }

    /// True when both placements lie inside a `width` x `height` page
    pub fn fits_within(&self, width: f32, height: f32) -> bool {
        [self.left, self.right]
            .iter()
            .all(|r| r.x >= 0.0 && r.y >= 0.0 && r.right() <= width && r.top() <= height)
    }
}
