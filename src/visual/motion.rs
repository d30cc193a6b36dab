//! Named pan/zoom paths and the crop states they resolve to.
//!
//! All geometry lives in canvas space: the animated image has already been normalized to the
//! canvas size, so a crop of `canvas / zoom` centered anywhere in the valid band stays inside it.

use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Canvas, Point, Rect, Size};
use crate::foundation::error::{HerodoError, HerodoResult};

/// Zoom reached by the zoom-in/zoom-out paths.
pub const ZOOM_PEAK: f64 = 1.3;
/// Constant zoom held by pan paths so the crop has room to travel.
pub const PAN_ZOOM: f64 = 1.2;

/// A named Ken Burns motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPath {
    ZoomInCenter,
    ZoomOutCenter,
    /// Starts zoomed into the top-left corner and pulls back to the full frame.
    ZoomOutCorner,
    PanLeftToRight,
    PanRightToLeft,
    PanTopToBottom,
    PanBottomToTop,
}

impl MotionPath {
    pub const ALL: [MotionPath; 7] = [
        MotionPath::ZoomInCenter,
        MotionPath::ZoomOutCenter,
        MotionPath::ZoomOutCorner,
        MotionPath::PanLeftToRight,
        MotionPath::PanRightToLeft,
        MotionPath::PanTopToBottom,
        MotionPath::PanBottomToTop,
    ];

    /// Cycle used when no motion set is configured.
    pub fn default_cycle() -> Vec<MotionPath> {
        vec![
            MotionPath::ZoomInCenter,
            MotionPath::PanLeftToRight,
            MotionPath::ZoomOutCorner,
            MotionPath::PanRightToLeft,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ZoomInCenter => "zoom_in_center",
            Self::ZoomOutCenter => "zoom_out_center",
            Self::ZoomOutCorner => "zoom_out_corner",
            Self::PanLeftToRight => "pan_left_to_right",
            Self::PanRightToLeft => "pan_right_to_left",
            Self::PanTopToBottom => "pan_top_to_bottom",
            Self::PanBottomToTop => "pan_bottom_to_top",
        }
    }

    /// Resolve the path into start/end crop states over a canvas-sized image.
    pub fn keys(self, canvas: Canvas) -> MotionKeys {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let center = Point::new(w / 2.0, h / 2.0);
        // Center coordinate that pins a crop of `zoom` against the low edge of `extent`.
        let near = |extent: f64, zoom: f64| extent / (2.0 * zoom);
        let far = |extent: f64, zoom: f64| extent - extent / (2.0 * zoom);

        let (start, end) = match self {
            Self::ZoomInCenter => ((1.0, center), (ZOOM_PEAK, center)),
            Self::ZoomOutCenter => ((ZOOM_PEAK, center), (1.0, center)),
            Self::ZoomOutCorner => (
                (
                    ZOOM_PEAK,
                    Point::new(near(w, ZOOM_PEAK), near(h, ZOOM_PEAK)),
                ),
                (1.0, center),
            ),
            Self::PanLeftToRight => (
                (PAN_ZOOM, Point::new(near(w, PAN_ZOOM), center.y)),
                (PAN_ZOOM, Point::new(far(w, PAN_ZOOM), center.y)),
            ),
            Self::PanRightToLeft => (
                (PAN_ZOOM, Point::new(far(w, PAN_ZOOM), center.y)),
                (PAN_ZOOM, Point::new(near(w, PAN_ZOOM), center.y)),
            ),
            Self::PanTopToBottom => (
                (PAN_ZOOM, Point::new(center.x, near(h, PAN_ZOOM))),
                (PAN_ZOOM, Point::new(center.x, far(h, PAN_ZOOM))),
            ),
            Self::PanBottomToTop => (
                (PAN_ZOOM, Point::new(center.x, far(h, PAN_ZOOM))),
                (PAN_ZOOM, Point::new(center.x, near(h, PAN_ZOOM))),
            ),
        };

        MotionKeys {
            start: CropState::new(canvas, start.0, start.1),
            end: CropState::new(canvas, end.0, end.1),
        }
    }
}

impl fmt::Display for MotionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MotionPath {
    type Err = HerodoError;

    fn from_str(s: &str) -> HerodoResult<Self> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                HerodoError::validation(format!(
                    "unknown motion path '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// One end of a motion: a zoom factor and the crop rectangle it implies.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropState {
    pub zoom: f64,
    pub rect: Rect,
}

impl CropState {
    fn new(canvas: Canvas, zoom: f64, center: Point) -> Self {
        let size = Size::new(
            f64::from(canvas.width) / zoom,
            f64::from(canvas.height) / zoom,
        );
        Self {
            zoom,
            rect: Rect::from_center_size(center, size),
        }
    }
}

/// Start and end crop states of one segment.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionKeys {
    pub start: CropState,
    pub end: CropState,
}

impl MotionKeys {
    /// Crop state at eased progress `p` in `[0, 1]`.
    ///
    /// Zoom and crop center are interpolated linearly; the rectangle follows from both.
    pub fn at(&self, p: f64) -> CropState {
        let p = p.clamp(0.0, 1.0);
        let zoom = self.start.zoom + (self.end.zoom - self.start.zoom) * p;
        let center = self.start.rect.center().lerp(self.end.rect.center(), p);
        let size = Size::new(
            self.start.rect.width() * self.start.zoom / zoom,
            self.start.rect.height() * self.start.zoom / zoom,
        );
        CropState {
            zoom,
            rect: Rect::from_center_size(center, size),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visual/motion.rs"]
mod tests;
