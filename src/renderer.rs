//! Viewport-clipped rendering of a breadcrumb path
//!
//! This module converts the raw point buffer of a [`BreadcrumbPath`] into a
//! short list of move/line drawing instructions for the currently visible map
//! region. Rather than handing every stored point to the drawing backend and
//! letting it clip and flatten, the renderer elides points that are too close
//! together to distinguish at the current zoom and skips segments that lie
//! entirely outside the visible rect. For a long trail this is the difference
//! between a few dozen instructions per frame and tens of thousands.

use crate::{BreadcrumbPath, Config, utils};
use geo::{Point, Rect};
use std::sync::{Arc, Weak};

/// A single drawing instruction in Web Mercator space
///
/// The consumer maps these to screen space with whatever projected-to-screen
/// transform its map surface provides and strokes the resulting path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathOp {
    /// Lift the pen and start a new subpath at the point
    MoveTo(Point<f64>),
    /// Draw a segment from the current position to the point
    LineTo(Point<f64>),
}

/// Capability interface for overlays that can render themselves
///
/// The map surface resolves this once when the overlay is attached, instead of
/// inspecting concrete overlay types on every frame.
pub trait Drawable {
    /// Produce drawing instructions for the given visible region and zoom
    fn draw(&self, visible_rect: Rect<f64>, zoom_scale: f64) -> Vec<PathOp>;
}

/// Stateless renderer for one [`BreadcrumbPath`]
///
/// Holds a revocable reference to the path it draws; if the owning controller
/// tears the path down, subsequent draws yield no instructions. Each draw is a
/// pure function of the point snapshot, the visible rect and the zoom scale,
/// so identical inputs always produce identical instruction sequences.
#[derive(Debug, Clone)]
pub struct PathRenderer {
    path: Weak<BreadcrumbPath>,
    config: Config,
}

impl PathRenderer {
    /// Create a renderer for the given path, inheriting its configuration
    pub fn new(path: &Arc<BreadcrumbPath>) -> Self {
        Self::with_config(path, path.config().clone())
    }

    /// Create a renderer with its own rendering configuration
    pub fn with_config(path: &Arc<BreadcrumbPath>, config: Config) -> Self {
        Self {
            path: Arc::downgrade(path),
            config,
        }
    }

    /// Projected line width of the trail at the given zoom scale
    #[inline]
    pub fn line_width(&self, zoom_scale: f64) -> f64 {
        self.config.line_width(zoom_scale)
    }

    /// Stroke color the trail should be painted with, as RGBA
    #[inline]
    pub fn stroke_color(&self) -> [f32; 4] {
        self.config.stroke_color
    }

    /// Simplify and clip a point snapshot into drawing instructions
    ///
    /// Single forward pass: a point closer than `min_delta_sq` (squared
    /// projected units) to the last emitted position is collapsed into it, a
    /// surviving segment is emitted only if it touches `clip_rect`, and an
    /// off-screen segment lifts the pen so excursions outside the viewport do
    /// not draw spurious connecting lines when the trail comes back. The final
    /// point skips the distance filter so the trail always reaches its true
    /// endpoint.
    fn ops_for_points(points: &[Point<f64>], clip_rect: Rect<f64>, min_delta_sq: f64) -> Vec<PathOp> {
        if points.len() < 2 {
            return Vec::new();
        }

        let mut ops = Vec::new();
        let mut needs_move = true;
        let mut last_point = points[0];

        for &point in &points[1..points.len() - 1] {
            let dx = point.x() - last_point.x();
            let dy = point.y() - last_point.y();
            if dx * dx + dy * dy >= min_delta_sq {
                if segment_touches_rect(last_point, point, &clip_rect) {
                    if needs_move {
                        ops.push(PathOp::MoveTo(last_point));
                    }
                    ops.push(PathOp::LineTo(point));
                    needs_move = false;
                } else {
                    // discontinuity, lift the pen
                    needs_move = true;
                }
                last_point = point;
            }
        }

        // The last segment is added unconditionally if it is visible at all
        let point = points[points.len() - 1];
        if segment_touches_rect(last_point, point, &clip_rect) {
            if needs_move {
                ops.push(PathOp::MoveTo(last_point));
            }
            ops.push(PathOp::LineTo(point));
        }

        ops
    }
}

impl Drawable for PathRenderer {
    fn draw(&self, visible_rect: Rect<f64>, zoom_scale: f64) -> Vec<PathOp> {
        #[cfg(feature = "profiling")]
        profiling::scope!("renderer::draw");

        // A degenerate viewport or zoom cannot be drawn into
        if !zoom_scale.is_finite() || zoom_scale <= 0.0 {
            return Vec::new();
        }
        if !(visible_rect.width() > 0.0 && visible_rect.height() > 0.0) {
            return Vec::new();
        }

        let Some(path) = self.path.upgrade() else {
            // The owning controller tore the path down
            return Vec::new();
        };

        // Outset the visible rect by the line width so segments just outside
        // it still contribute their on-screen stroke.
        let clip_rect = utils::outset(&visible_rect, self.line_width(zoom_scale));

        // How many projected units MIN_POINT_DELTA screen pixels cover at this
        // zoom; compared squared to avoid a square root per point.
        let min_delta = self.config.min_point_delta_px / zoom_scale;
        let min_delta_sq = min_delta * min_delta;

        path.read_points(|points| Self::ops_for_points(points, clip_rect, min_delta_sq))
    }
}

/// Conservative visibility test for the segment between two points
///
/// Uses the segment's bounding rect against the clip rect, exactly as cheap
/// as the per-point work around it. This can keep a segment whose bounding
/// rect overlaps the clip rect even though the segment itself misses it; the
/// drawing backend clips those precisely.
#[inline]
fn segment_touches_rect(p0: Point<f64>, p1: Point<f64>, rect: &Rect<f64>) -> bool {
    utils::rects_overlap(&utils::point_pair_rect(p0, p1), rect)
}
