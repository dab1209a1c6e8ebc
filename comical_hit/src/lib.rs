// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Precise hit testing for the shapes a bubble overlay draws.
//!
//! A bubble overlay draws three kinds of things: filled bubble bodies (rectangles, ellipses,
//! circles or arbitrary paths), stroked tails (quadratic curves with a width), and small round
//! drag handles. This crate answers "does this point hit that shape?" for each of them in the
//! shape's own coordinate space, built on [`kurbo`].
//!
//! - [`HitParams`] carries per-query tolerances.
//! - [`HitScore`] reports how close the hit was and what [`HitKind`] of thing was hit. Callers
//!   use it only for ranking; which item owns the shape is their business.
//! - [`PreciseHitTest`] is implemented for [`Rect`], [`RoundedRect`], [`Circle`], [`Ellipse`],
//!   [`BezPath`] (fill only), [`HandleDisc`], and the stroke primitives in [`stroke`].
//!
//! ```rust
//! use comical_hit::{HitKind, HitParams, PreciseHitTest};
//! use kurbo::{Ellipse, Point, Rect};
//!
//! let body = Ellipse::from_rect(Rect::new(0.0, 0.0, 40.0, 20.0));
//! let hit = body.hit_test_local(Point::new(20.0, 10.0), &HitParams::default());
//! assert_eq!(hit.map(|h| h.kind), Some(HitKind::Fill));
//!
//! // The corner of the bounding box is outside the ellipse.
//! assert!(body.hit_test_local(Point::new(1.0, 1.0), &HitParams::default()).is_none());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use core::cmp::Ordering;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{BezPath, Circle, Ellipse, Point, Rect, RoundedRect, Shape};

/// Stroke primitives: straight and curved tails with a width.
pub mod stroke;

/// What a precise test hit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HitKind {
    /// The inside of a filled body.
    Fill,
    /// A stroked curve such as a tail.
    Stroke,
    /// A drag handle.
    Handle,
    /// Anything else.
    Other,
}

/// Tolerances applied by precise tests.
#[derive(Clone, Copy, Debug)]
pub struct HitParams {
    /// Extra reach, in local units, around filled bodies.
    pub fill_tolerance: f64,
    /// Extra reach, in local units, on either side of a stroke.
    pub stroke_tolerance: f64,
    /// Extra reach, in local units, around drag handles.
    ///
    /// Handles are small, so pointer input usually wants them easier to grab than bodies.
    pub handle_tolerance: f64,
}

impl Default for HitParams {
    fn default() -> Self {
        Self {
            fill_tolerance: 0.0,
            stroke_tolerance: 0.0,
            handle_tolerance: 0.0,
        }
    }
}

/// Ranking record for a precise hit. Lower distance is a better hit.
#[derive(Clone, Copy, Debug)]
pub struct HitScore {
    /// Distance from the shape in local units; `0.0` for points inside.
    pub distance: f64,
    /// What was hit.
    pub kind: HitKind,
}

impl HitScore {
    /// A direct hit on a filled body.
    pub const fn filled() -> Self {
        Self {
            distance: 0.0,
            kind: HitKind::Fill,
        }
    }

    /// Compare two scores, preferring smaller distance.
    pub fn cmp_distance(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Shapes that can tell whether a point in their local space hits them.
pub trait PreciseHitTest {
    /// Test `pt`, given in the shape's local coordinates.
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore>;
}

/// Distance from `pt` to the nearest point of `rect`; zero inside.
fn distance_to_rect(rect: Rect, pt: Point) -> f64 {
    let dx = (rect.x0 - pt.x).max(pt.x - rect.x1).max(0.0);
    let dy = (rect.y0 - pt.y).max(pt.y - rect.y1).max(0.0);
    (dx * dx + dy * dy).sqrt()
}

/// Shared fill test: exact containment, otherwise a near miss within the tolerated bounds.
///
/// Near misses are scored at the tolerance itself since curved edges have no cheap exact
/// distance.
fn fill_hit(bounds: Rect, contains: bool, pt: Point, params: &HitParams) -> Option<HitScore> {
    if contains {
        return Some(HitScore::filled());
    }
    let tol = params.fill_tolerance;
    if tol > 0.0 && bounds.inflate(tol, tol).contains(pt) {
        Some(HitScore {
            distance: tol,
            kind: HitKind::Fill,
        })
    } else {
        None
    }
}

/// Caption-style bodies. Edges count as inside and near misses report their real distance.
impl PreciseHitTest for Rect {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let distance = distance_to_rect(*self, pt);
        (distance <= params.fill_tolerance).then_some(HitScore {
            distance,
            kind: HitKind::Fill,
        })
    }
}

impl PreciseHitTest for RoundedRect {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        fill_hit(self.bounding_box(), self.contains(pt), pt, params)
    }
}

/// Round bodies, scored by how far outside the radius the point lies.
impl PreciseHitTest for Circle {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let dist = (pt - self.center).hypot();
        if dist > self.radius + params.fill_tolerance {
            return None;
        }
        Some(HitScore {
            distance: (dist - self.radius).max(0.0),
            kind: HitKind::Fill,
        })
    }
}

impl PreciseHitTest for Ellipse {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        fill_hit(self.bounding_box(), self.contains(pt), pt, params)
    }
}

/// Fill-only test using the path's own winding rule.
impl PreciseHitTest for BezPath {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let bounds = self.bounding_box();
        let tol = params.fill_tolerance;
        if !bounds.inflate(tol, tol).contains(pt) {
            return None;
        }
        fill_hit(bounds, self.contains(pt), pt, params)
    }
}

/// Fallback fill test for any [`kurbo::Shape`] without a dedicated implementation.
pub fn hit_test_shape<S: Shape>(shape: &S, pt: Point, params: &HitParams) -> Option<HitScore> {
    fill_hit(shape.bounding_box(), shape.contains(pt), pt, params)
}

/// A round drag handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleDisc {
    /// Handle center.
    pub center: Point,
    /// Visible radius.
    pub radius: f64,
}

impl HandleDisc {
    /// A handle of `radius` centered on `center`.
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// The drawn disc.
    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }
}

impl PreciseHitTest for HandleDisc {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let dist = (pt - self.center).hypot();
        (dist <= self.radius + params.handle_tolerance).then_some(HitScore {
            distance: dist,
            kind: HitKind::Handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{BezPath, Rect, RoundedRect};

    #[test]
    fn rect_edges_are_inside() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let score = r
            .hit_test_local(Point::new(10.0, 10.0), &HitParams::default())
            .expect("corner should hit");
        assert_eq!(score.distance, 0.0);
        assert!(
            r.hit_test_local(Point::new(10.5, 5.0), &HitParams::default())
                .is_none()
        );
    }

    #[test]
    fn rect_near_miss_reports_distance() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let params = HitParams {
            fill_tolerance: 2.0,
            ..HitParams::default()
        };
        let score = r
            .hit_test_local(Point::new(11.5, 5.0), &params)
            .expect("within tolerance");
        assert!((score.distance - 1.5).abs() < 1e-9, "got {}", score.distance);
    }

    #[test]
    fn circle_distance_outside_radius() {
        let c = Circle::new((0.0, 0.0), 5.0);
        let params = HitParams {
            fill_tolerance: 2.0,
            ..HitParams::default()
        };
        let inside = c.hit_test_local(Point::new(1.0, 1.0), &params).unwrap();
        assert_eq!(inside.distance, 0.0);
        let near = c.hit_test_local(Point::new(6.0, 0.0), &params).unwrap();
        assert!((near.distance - 1.0).abs() < 1e-9, "got {}", near.distance);
        assert!(c.hit_test_local(Point::new(8.0, 0.0), &params).is_none());
    }

    #[test]
    fn ellipse_excludes_bounding_box_corners() {
        let e = Ellipse::from_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert!(
            e.hit_test_local(Point::new(50.0, 25.0), &HitParams::default())
                .is_some()
        );
        assert!(
            e.hit_test_local(Point::new(2.0, 2.0), &HitParams::default())
                .is_none()
        );
        let tolerant = HitParams {
            fill_tolerance: 1.0,
            ..HitParams::default()
        };
        let near = e
            .hit_test_local(Point::new(2.0, 2.0), &tolerant)
            .expect("inside inflated bounds");
        assert_eq!(near.distance, 1.0);
    }

    #[test]
    fn rounded_rect_and_path() {
        let rr = RoundedRect::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 4.0);
        assert!(rr.hit_test_local(Point::new(5.0, 5.0), &HitParams::default()).is_some());
        assert!(rr.hit_test_local(Point::new(0.2, 0.2), &HitParams::default()).is_none());

        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((0.0, 10.0));
        path.close_path();
        assert!(path.hit_test_local(Point::new(2.0, 2.0), &HitParams::default()).is_some());
        assert!(path.hit_test_local(Point::new(9.0, 9.0), &HitParams::default()).is_none());
    }

    #[test]
    fn handle_tolerance_is_separate() {
        let h = HandleDisc::new(Point::new(10.0, 10.0), 3.0);
        let p = Point::new(14.0, 10.0);
        assert!(h.hit_test_local(p, &HitParams::default()).is_none());
        let params = HitParams {
            handle_tolerance: 2.0,
            fill_tolerance: 0.0,
            stroke_tolerance: 0.0,
        };
        let hit = h.hit_test_local(p, &params).expect("grab zone");
        assert_eq!(hit.kind, HitKind::Handle);
    }

    #[test]
    fn generic_shape_fallback() {
        let c = Circle::new((0.0, 0.0), 5.0);
        assert!(hit_test_shape(&c, Point::new(0.0, 4.0), &HitParams::default()).is_some());
        assert!(hit_test_shape(&c, Point::new(4.5, 4.5), &HitParams::default()).is_none());
    }
}
