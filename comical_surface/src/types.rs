// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the surface: handles, flags, shapes and paint.

use comical_hit::stroke::StrokedQuad;
use comical_hit::{HandleDisc, HitParams, HitScore, PreciseHitTest};
use kurbo::{BezPath, Circle, Ellipse, ParamCurveExtrema, Point, Rect, RoundedRect, Shape};

/// Flattening tolerance used when turning curved primitives into SVG path data.
const PATH_TOLERANCE: f64 = 0.1;

/// Identifier for a layer (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LayerId(pub(crate) u32, pub(crate) u32);

/// Identifier for an item (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ItemId(pub(crate) u32, pub(crate) u32);

bitflags::bitflags! {
    /// Item flags controlling painting, picking and export.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// Item is painted and exported.
        const VISIBLE  = 0b0000_0001;
        /// Item participates in hit testing.
        const PICKABLE = 0b0000_0010;
        /// Item is an interactive handle; handles are never exported.
        const HANDLE   = 0b0000_0100;
    }
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Geometry of an item, in surface coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemShape {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Rounded rectangle.
    RoundedRect(RoundedRect),
    /// Circle.
    Circle(Circle),
    /// Ellipse.
    Ellipse(Ellipse),
    /// Arbitrary closed path, filled.
    Path(BezPath),
    /// Stroked curve.
    Tail(StrokedQuad),
    /// Round drag handle.
    Handle(HandleDisc),
}

impl ItemShape {
    /// Conservative bounds of everything the shape paints.
    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::RoundedRect(r) => r.bounding_box(),
            Self::Circle(c) => c.bounding_box(),
            Self::Ellipse(e) => e.bounding_box(),
            Self::Path(p) => p.bounding_box(),
            Self::Tail(t) => {
                let hw = t.half_width;
                ParamCurveExtrema::bounding_box(&t.curve).inflate(hw, hw)
            }
            Self::Handle(h) => h.circle().bounding_box(),
        }
    }

    /// Outline as a path, for export.
    pub fn to_path(&self) -> BezPath {
        match self {
            Self::Rect(r) => r.to_path(PATH_TOLERANCE),
            Self::RoundedRect(r) => r.to_path(PATH_TOLERANCE),
            Self::Circle(c) => c.to_path(PATH_TOLERANCE),
            Self::Ellipse(e) => e.to_path(PATH_TOLERANCE),
            Self::Path(p) => p.clone(),
            Self::Tail(t) => {
                let mut path = BezPath::new();
                path.move_to(t.curve.p0);
                path.quad_to(t.curve.p1, t.curve.p2);
                path
            }
            Self::Handle(h) => h.circle().to_path(PATH_TOLERANCE),
        }
    }

    /// Stroke width implied by the geometry itself, for stroked primitives.
    pub fn intrinsic_stroke_width(&self) -> Option<f64> {
        match self {
            Self::Tail(t) => Some(2.0 * t.half_width),
            _ => None,
        }
    }
}

impl PreciseHitTest for ItemShape {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        match self {
            Self::Rect(r) => r.hit_test_local(pt, params),
            Self::RoundedRect(r) => r.hit_test_local(pt, params),
            Self::Circle(c) => c.hit_test_local(pt, params),
            Self::Ellipse(e) => e.hit_test_local(pt, params),
            Self::Path(p) => p.hit_test_local(pt, params),
            Self::Tail(t) => t.hit_test_local(pt, params),
            Self::Handle(h) => h.hit_test_local(pt, params),
        }
    }
}

/// How an item is painted. Colors are CSS color strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paint {
    /// Fill color; `None` leaves the interior unpainted.
    pub fill: Option<String>,
    /// Stroke color; `None` draws no outline.
    pub stroke: Option<String>,
    /// Stroke width, ignored without a stroke color.
    pub stroke_width: f64,
}

impl Paint {
    /// Fill only.
    pub fn fill(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Self::default()
        }
    }

    /// Stroke only.
    pub fn stroke(color: impl Into<String>, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color.into()),
            stroke_width: width,
        }
    }
}

/// A shaped, painted item carrying caller metadata `M`.
#[derive(Clone, Debug)]
pub struct Item<M> {
    /// Geometry.
    pub shape: ItemShape,
    /// Paint.
    pub paint: Paint,
    /// Painting, picking and export flags.
    pub flags: ItemFlags,
    /// Caller payload, such as the owner of the item.
    pub meta: M,
}

impl<M> Item<M> {
    /// A visible, pickable item with default paint.
    pub fn new(shape: ItemShape, meta: M) -> Self {
        Self {
            shape,
            paint: Paint::default(),
            flags: ItemFlags::default(),
            meta,
        }
    }

    /// Replace the paint.
    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.paint = paint;
        self
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }
}
