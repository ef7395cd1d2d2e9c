//! Breadcrumb path storage
//!
//! This module provides the `BreadcrumbPath` struct, an append-only buffer of
//! Web Mercator points fed by a stream of location samples, together with the
//! bounding rectangle the map surface attaches the overlay with. The bounding
//! rectangle grows with hysteresis so that a trail heading steadily in one
//! direction forces as few overlay re-attachments as possible.

use crate::{Result, TrailError, utils};
use geo::{Coord, Point, Rect};
use std::sync::{Arc, RwLock};

/// Configuration for path filtering and rendering
///
/// These are the knobs the surrounding application's settings screen exposes.
/// The path itself only consumes `min_move_meters`; the rendering fields are
/// carried here so one value can configure both halves of the pipeline.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Minimum ground distance in meters a sample must move from the last
    /// accepted point before it is appended. Default: 10.0
    pub min_move_meters: f64,
    /// Minimum on-screen distance in pixels below which neighbouring points
    /// are collapsed during rendering. Default: 5.0
    pub min_point_delta_px: f64,
    /// Stroke width of the trail in pixels at zoom scale 1.0. The projected
    /// line width at any zoom is `road_width_px / zoom_scale`. Default: 8.0
    pub road_width_px: f64,
    /// Stroke color as RGBA in the 0..=1 range. Default: translucent blue
    pub stroke_color: [f32; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_move_meters: 10.0,
            min_point_delta_px: 5.0,
            road_width_px: 8.0,
            stroke_color: [0.0, 0.0, 1.0, 0.5],
        }
    }
}

impl Config {
    /// Check that all thresholds are finite and positive
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_move_meters", self.min_move_meters),
            ("min_point_delta_px", self.min_point_delta_px),
            ("road_width_px", self.road_width_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrailError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Projected line width of the trail at the given zoom scale
    #[inline]
    pub fn line_width(&self, zoom_scale: f64) -> f64 {
        self.road_width_px / zoom_scale
    }
}

/// Result of feeding one location sample to [`BreadcrumbPath::add_coordinate`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinateUpdate {
    /// The rectangle covering the newly appended point and its predecessor,
    /// or `None` if the sample was dropped by the minimum-distance filter.
    pub update_rect: Option<Rect<f64>>,
    /// Whether the bounding rectangle had to grow. When true, the map surface
    /// must detach and re-attach the overlay, since it treats an attached
    /// overlay's bounds as immutable.
    pub bounding_changed: bool,
}

impl CoordinateUpdate {
    /// Whether the sample was accepted into the path
    #[inline]
    pub fn accepted(&self) -> bool {
        self.update_rect.is_some()
    }

    /// Region to invalidate for a partial redraw at the given zoom scale
    ///
    /// The update rect is grown by the trail's line width so the stroked edges
    /// of the new segment are repainted too. Returns `None` when the sample
    /// was dropped or the zoom scale is degenerate.
    pub fn redraw_region(&self, zoom_scale: f64, config: &Config) -> Option<Rect<f64>> {
        if !zoom_scale.is_finite() || zoom_scale <= 0.0 {
            return None;
        }
        self.update_rect
            .map(|rect| utils::outset(&rect, config.line_width(zoom_scale)))
    }

    #[inline]
    fn dropped() -> Self {
        Self {
            update_rect: None,
            bounding_changed: false,
        }
    }
}

/// Point buffer and bounding rect, mutated together under one lock
#[derive(Debug)]
struct PathState {
    points: Vec<Point<f64>>,
    bounding_rect: Rect<f64>,
}

/// An append-only trail of location samples in Web Mercator space
///
/// The path is seeded with one point at construction and only ever grows.
/// Samples closer than [`Config::min_move_meters`] to the last accepted point
/// are dropped, so consecutive stored points are always farther apart than the
/// threshold and near-duplicate GPS fixes never bloat the buffer.
///
/// # Locking
///
/// All access, reads included, goes through the write half of an `RwLock`:
/// reads and writes are mutually exclusive and never run concurrently,
/// trading read throughput for simple, obviously-consistent snapshots. With a
/// location fix every few seconds and a redraw per pan/zoom the lock is never
/// contended in practice. Splitting reads onto the shared half would be an
/// optional enhancement, not something callers may rely on.
#[derive(Debug)]
pub struct BreadcrumbPath {
    state: RwLock<PathState>,
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl BreadcrumbPath {
    /// Create a path seeded with the given WGS84 coordinate
    ///
    /// The initial bounding rect is a square of roughly one square kilometer
    /// anchored at the seed point, clipped to the world extent.
    pub fn new(lat: f64, lon: f64) -> Arc<Self> {
        // Default config is statically valid, so this cannot fail
        match Self::with_config(lat, lon, Config::default()) {
            Ok(path) => path,
            Err(_) => unreachable!("default config is valid"),
        }
    }

    /// Create a path with a custom configuration
    ///
    /// Fails only if the configuration is malformed.
    pub fn with_config(lat: f64, lon: f64, config: Config) -> Result<Arc<Self>> {
        config.validate()?;

        if lat.abs() > utils::MAX_LATITUDE {
            tracing::warn!("Seed latitude {} outside Web Mercator bounds, clamping", lat);
        }
        let origin = utils::wgs84_to_mercator(lat, lon);

        // One kilometer of projected units at the seed's latitude. The
        // meters-per-unit factor varies with latitude, but a one-time
        // conversion at the seed is accurate enough for a starting bound.
        let one_kilometer = 1000.0 * utils::units_per_meter(lat);
        let bounding_rect = utils::clip_to_world(Rect::new(
            Coord {
                x: origin.x(),
                y: origin.y(),
            },
            Coord {
                x: origin.x() + one_kilometer,
                y: origin.y() + one_kilometer,
            },
        ));

        let mut points = Vec::with_capacity(1000);
        points.push(origin);

        Ok(Arc::new(Self {
            state: RwLock::new(PathState {
                points,
                bounding_rect,
            }),
            config,
        }))
    }

    /// Add a location sample to the path
    ///
    /// Projects the coordinate, drops it if it has not moved more than the
    /// configured minimum distance from the last accepted point, and otherwise
    /// appends it, growing the bounding rect if the new segment falls outside.
    /// The whole operation holds the exclusive lock, so it never interleaves
    /// with another add or with a snapshot read.
    pub fn add_coordinate(&self, lat: f64, lon: f64) -> CoordinateUpdate {
        if lat.abs() > utils::MAX_LATITUDE {
            tracing::warn!(
                "Sample latitude {} outside Web Mercator bounds, clamping",
                lat
            );
        }
        let new_point = utils::wgs84_to_mercator(lat, lon);

        let mut state = self.state.write().unwrap();

        let prev_point = *state
            .points
            .last()
            .expect("path is seeded with at least one point");

        // Dominant no-op path: the device has not moved far enough.
        let meters_apart = utils::mercator_meters_between(new_point, prev_point);
        if meters_apart <= self.config.min_move_meters {
            return CoordinateUpdate::dropped();
        }

        state.points.push(new_point);

        let update_rect = utils::point_pair_rect(new_point, prev_point);

        let mut bounding_changed = false;
        if !utils::rect_contains(&state.bounding_rect, &update_rect) {
            state.bounding_rect = grow_bounds(state.bounding_rect, update_rect);
            bounding_changed = true;
            tracing::debug!(
                "Bounding rect grew to {:?} after {} points",
                state.bounding_rect,
                state.points.len()
            );
        }

        CoordinateUpdate {
            update_rect: Some(update_rect),
            bounding_changed,
        }
    }

    /// Synchronously evaluate a visitor over the current point buffer
    ///
    /// The visitor runs under the same exclusive lock as `add_coordinate` and
    /// must not stash the slice away; clone what needs to outlive the call.
    pub fn read_points<R>(&self, visitor: impl FnOnce(&[Point<f64>]) -> R) -> R {
        // Write lock on purpose, see the type-level locking notes
        let state = self.state.write().unwrap();
        visitor(&state.points)
    }

    /// WGS84 coordinate of the path's first point, as (lat, lon)
    pub fn center(&self) -> (f64, f64) {
        self.read_points(|points| {
            let origin = points[0];
            utils::mercator_to_wgs84(origin.x(), origin.y())
        })
    }

    /// Current bounding rectangle in Web Mercator space
    pub fn bounding_rect(&self) -> Rect<f64> {
        self.state.write().unwrap().bounding_rect
    }

    /// Number of points currently stored
    pub fn total_points(&self) -> usize {
        self.read_points(|points| points.len())
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Grow `bounds` to cover `other`, padding the overrun sides by a kilometer
///
/// A trail usually keeps moving the way it was already going, so each side the
/// update rect ran past gets an extra kilometer of slack to keep re-growth
/// rare without ballooning the bounds off-trail. The kilometer is converted at
/// the latitude of `other`'s origin; exactness does not matter here.
///
/// The overrun branches are intentionally asymmetric: a max-x overrun pads
/// the height as well as the width, and a pure max-y overrun gets no padding
/// beyond the union itself. Callers must not rely on the symmetric form.
fn grow_bounds(bounds: Rect<f64>, other: Rect<f64>) -> Rect<f64> {
    let grown = utils::rect_union(&bounds, &other);
    let mut min = grown.min();
    let mut max = grown.max();

    let (origin_lat, _) = utils::mercator_to_wgs84(other.min().x, other.min().y);
    let one_kilometer = 1000.0 * utils::units_per_meter(origin_lat);

    if other.min().y < bounds.min().y {
        min.y -= one_kilometer;
    }
    if other.max().x > bounds.max().x {
        max.y += one_kilometer;
    }
    if other.min().x < bounds.min().x {
        min.x -= one_kilometer;
    }
    if other.max().x > bounds.max().x {
        max.x += one_kilometer;
    }

    utils::clip_to_world(Rect::new(min, max))
}
