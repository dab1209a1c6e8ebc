// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One bubble: a content element, its persisted description, and the shapes drawn for it.

use comical_hit::PreciseHitTest;
use comical_hit::stroke::StrokedQuad;
use comical_spec::{BubbleSpec, TailSpec};
use comical_surface::{Item, ItemShape, LayerId, Paint, Surface};
use kurbo::{Circle, Ellipse, Point, Rect, Vec2};

use crate::config::SessionConfig;
use crate::container::{ItemMeta, ItemRole};
use crate::host::ElementId;

const OUTLINE_COLOR: &str = "black";
const BODY_COLOR: &str = "white";

/// The layers a bubble draws into.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BubbleLayers {
    /// Outlines: painted under every body of the same level, so joined family members merge.
    pub lower: LayerId,
    /// Bodies and tail interiors.
    pub upper: LayerId,
    /// Drag handles, shared by the whole container.
    pub handles: LayerId,
}

/// Runtime pairing of a content element with its [`BubbleSpec`].
#[derive(Clone, Debug)]
pub struct Bubble {
    content: ElementId,
    spec: BubbleSpec,
    content_rect: Rect,
    layers: Option<BubbleLayers>,
}

impl Bubble {
    /// A detached bubble; `content_rect` is container-relative.
    pub fn new(content: ElementId, spec: BubbleSpec, content_rect: Rect) -> Self {
        Self {
            content,
            spec,
            content_rect,
            layers: None,
        }
    }

    /// The content element.
    pub fn content(&self) -> ElementId {
        self.content
    }

    /// The persisted description.
    pub fn spec(&self) -> &BubbleSpec {
        &self.spec
    }

    pub(crate) fn spec_mut(&mut self) -> &mut BubbleSpec {
        &mut self.spec
    }

    pub(crate) fn set_spec(&mut self, spec: BubbleSpec) {
        self.spec = spec;
    }

    /// Level, `0` when absent.
    pub fn level(&self) -> i32 {
        self.spec.effective_level()
    }

    /// Family order, `None` when not in a family.
    pub fn order(&self) -> Option<i32> {
        self.spec.family_order()
    }

    /// Bounding box of the content element, container-relative.
    pub fn content_rect(&self) -> Rect {
        self.content_rect
    }

    /// Whether `point` lies in the content box. Edges count as inside.
    pub fn content_contains(&self, point: Point) -> bool {
        let r = self.content_rect;
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }

    /// Point tails grow from.
    pub fn anchor(&self) -> Point {
        self.content_rect.center()
    }

    /// Layers assigned by the last rebuild.
    pub fn layers(&self) -> Option<BubbleLayers> {
        self.layers
    }

    pub(crate) fn attach(&mut self, layers: BubbleLayers) {
        self.layers = Some(layers);
    }

    /// Outline for the bubble's style, or `None` for the `none` style.
    pub fn outline(&self, config: &SessionConfig) -> Option<ItemShape> {
        let margin = config.content_margin;
        let rect = self.content_rect;
        match self.spec.style.as_str() {
            "none" => None,
            "caption" => Some(ItemShape::Rect(rect.inflate(margin, margin))),
            "circle" => {
                let radius = 0.5 * rect.width().hypot(rect.height()) + margin;
                Some(ItemShape::Circle(Circle::new(rect.center(), radius)))
            }
            _ => {
                // Smallest axis-aligned ellipse of this aspect through the box corners.
                let radii = Vec2::new(
                    rect.width() * core::f64::consts::FRAC_1_SQRT_2 + margin,
                    rect.height() * core::f64::consts::FRAC_1_SQRT_2 + margin,
                );
                Some(ItemShape::Ellipse(Ellipse::new(rect.center(), radii, 0.0)))
            }
        }
    }

    /// Centerline of a tail, widened by `extra` on each side.
    pub fn tail_shape(&self, tail: &TailSpec, config: &SessionConfig, extra: f64) -> ItemShape {
        ItemShape::Tail(StrokedQuad::through(
            self.anchor(),
            tail.midpoint(),
            tail.tip(),
            config.tail_half_width + extra,
        ))
    }

    /// Whether the drawn outline or body contains `point`.
    pub fn is_hit_by(&self, point: Point, config: &SessionConfig) -> bool {
        self.outline(config)
            .is_some_and(|shape| shape.hit_test_local(point, &config.hit_params).is_some())
    }

    /// Draw the bubble into its attached layers. Does nothing for a detached bubble.
    pub(crate) fn build_shapes(&self, surface: &mut Surface<ItemMeta>, config: &SessionConfig) {
        let Some(layers) = self.layers else {
            return;
        };
        let meta = |role| ItemMeta {
            element: self.content,
            role,
        };
        let outline_color = self
            .spec
            .outer_border_color
            .clone()
            .unwrap_or_else(|| OUTLINE_COLOR.into());
        let body_color = self
            .spec
            .background_colors
            .as_ref()
            .and_then(|colors| colors.first().cloned())
            .unwrap_or_else(|| BODY_COLOR.into());
        let border = config.outline_width;

        if let Some(shape) = self.outline(config) {
            surface.insert(
                layers.lower,
                Item::new(shape.clone(), meta(ItemRole::Outline))
                    .with_paint(Paint::stroke(outline_color.clone(), 2.0 * border)),
            );
            surface.insert(
                layers.upper,
                Item::new(shape, meta(ItemRole::Body)).with_paint(Paint::fill(body_color.clone())),
            );
        }
        for (index, tail) in self.spec.tails.iter().enumerate() {
            surface.insert(
                layers.lower,
                Item::new(
                    self.tail_shape(tail, config, border),
                    meta(ItemRole::Tail(index)),
                )
                .with_paint(Paint::stroke(outline_color.clone(), 0.0)),
            );
            surface.insert(
                layers.upper,
                Item::new(self.tail_shape(tail, config, 0.0), meta(ItemRole::Tail(index)))
                    .with_paint(Paint::stroke(body_color.clone(), 0.0)),
            );
        }
    }

    /// Description for a brand-new bubble around `content_rect` with one tail pointing
    /// down and to the left.
    pub fn default_spec(style: &str, content_rect: Rect) -> BubbleSpec {
        let mut spec = BubbleSpec::new(style);
        let root = content_rect.center();
        let tip = Point::new(
            content_rect.x0 - 0.25 * content_rect.width(),
            content_rect.y1 + 0.5 * content_rect.height(),
        );
        spec.tails
            .push(TailSpec::new(tip, default_mid(root, tip), false));
        spec
    }
}

/// Midpoint used for new tails between `start` and `end`.
///
/// The straight midpoint pushed sideways by a tenth of the segment length, so fresh tails bend
/// slightly instead of lying flat. The offset is `(end - start)` rotated a quarter turn
/// counterclockwise on screen (y pointing down).
pub fn default_mid(start: Point, end: Point) -> Point {
    let delta = end - start;
    start.midpoint(end) + Vec2::new(delta.y, -delta.x) / 10.0
}
