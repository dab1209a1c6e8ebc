// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroked centerlines with a half-width: straight connectors and curved tails.
//!
//! Neither primitive models caps or joins; a point hits when its distance to the centerline is
//! within the half-width plus [`HitParams::stroke_tolerance`].

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Line, ParamCurveNearest, Point, QuadBez};

use crate::{HitKind, HitParams, HitScore, PreciseHitTest};

/// Accuracy used when projecting onto curved centerlines.
const NEAREST_ACCURACY: f64 = 1e-3;

fn stroke_score(dist: f64, half_width: f64, params: &HitParams) -> Option<HitScore> {
    (dist <= half_width + params.stroke_tolerance).then_some(HitScore {
        distance: dist,
        kind: HitKind::Stroke,
    })
}

/// A straight stroked segment.
#[derive(Clone, Copy, Debug)]
pub struct StrokedLine {
    /// Centerline.
    pub line: Line,
    /// Half of the stroke width.
    pub half_width: f64,
}

impl PreciseHitTest for StrokedLine {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let v = self.line.p1 - self.line.p0;
        let len2 = v.hypot2();
        let t = if len2 > 0.0 {
            ((pt - self.line.p0).dot(v) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let dist = (pt - (self.line.p0 + v * t)).hypot();
        stroke_score(dist, self.half_width, params)
    }
}

/// A tail: a quadratic curve from the bubble anchor, bending through a control midpoint, to the
/// tip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokedQuad {
    /// Centerline.
    pub curve: QuadBez,
    /// Half of the stroke width.
    pub half_width: f64,
}

impl StrokedQuad {
    /// A curve from `root` to `tip` that passes through `midpoint` at its halfway parameter.
    ///
    /// Tail descriptions store a point the curve passes through rather than the Bezier control
    /// point, so the control point is solved for here.
    pub fn through(root: Point, midpoint: Point, tip: Point, half_width: f64) -> Self {
        let control = Point::new(
            2.0 * midpoint.x - 0.5 * (root.x + tip.x),
            2.0 * midpoint.y - 0.5 * (root.y + tip.y),
        );
        Self {
            curve: QuadBez::new(root, control, tip),
            half_width,
        }
    }
}

impl PreciseHitTest for StrokedQuad {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let nearest = self.curve.nearest(pt, NEAREST_ACCURACY);
        stroke_score(nearest.distance_sq.sqrt(), self.half_width, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::ParamCurve;

    #[test]
    fn stroked_line_hit_and_miss() {
        let stroked = StrokedLine {
            line: Line::new((0.0, 0.0), (10.0, 0.0)),
            half_width: 1.0,
        };
        let params = HitParams::default();
        assert!(stroked.hit_test_local(Point::new(5.0, 0.0), &params).is_some());
        assert!(stroked.hit_test_local(Point::new(5.0, 0.5), &params).is_some());
        assert!(stroked.hit_test_local(Point::new(5.0, 5.0), &params).is_none());
        // Beyond the end cap.
        assert!(stroked.hit_test_local(Point::new(12.0, 0.0), &params).is_none());
    }

    #[test]
    fn quad_passes_through_midpoint() {
        let tail = StrokedQuad::through(
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 0.0),
            1.0,
        );
        let half = tail.curve.eval(0.5);
        assert!((half - Point::new(5.0, 5.0)).hypot() < 1e-9, "got {half:?}");
        let params = HitParams::default();
        assert!(tail.hit_test_local(Point::new(5.0, 5.5), &params).is_some());
        // The straight chord is far from the bent curve.
        assert!(tail.hit_test_local(Point::new(5.0, 0.0), &params).is_none());
    }

    #[test]
    fn stroke_tolerance_widens_tail() {
        let tail = StrokedQuad::through(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            1.0,
        );
        let p = Point::new(5.0, 2.5);
        assert!(tail.hit_test_local(p, &HitParams::default()).is_none());
        let params = HitParams {
            stroke_tolerance: 2.0,
            ..HitParams::default()
        };
        let hit = tail.hit_test_local(p, &params).expect("within widened stroke");
        assert_eq!(hit.kind, HitKind::Stroke);
    }
}
