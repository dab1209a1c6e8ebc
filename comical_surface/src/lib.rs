// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Comical Surface: an ordered stack of layers holding shaped, painted items.
//!
//! This is the drawing target of a bubble overlay. It knows nothing about bubbles; it keeps
//! layers in paint order, keeps items in insertion order inside each layer, and answers two
//! questions about them:
//!
//! - which item is on top at a point ([`Surface::hit_test_point`]), and
//! - what the visible items look like as a static SVG document ([`Surface::to_svg`]).
//!
//! Layers and items are addressed by generational handles ([`LayerId`], [`ItemId`]). Removing a
//! layer removes its items, and stale handles are rejected rather than aliasing new entries.
//!
//! ```rust
//! use comical_hit::HitParams;
//! use comical_surface::{Item, ItemShape, QueryFilter, Surface};
//! use kurbo::{Circle, Point};
//!
//! let mut surface: Surface<&str> = Surface::new();
//! let below = surface.add_layer();
//! let above = surface.add_layer();
//! surface.insert(below, Item::new(ItemShape::Circle(Circle::new((10.0, 10.0), 8.0)), "a"));
//! let top = surface
//!     .insert(above, Item::new(ItemShape::Circle(Circle::new((14.0, 10.0), 8.0)), "b"))
//!     .unwrap();
//!
//! // Where both overlap, the later layer wins.
//! let hit = surface
//!     .hit_test_point(Point::new(12.0, 10.0), QueryFilter::new(), &HitParams::default())
//!     .unwrap();
//! assert_eq!(hit.item, top);
//! ```

mod slots;
mod surface;
mod svg;
mod types;

pub use surface::{Hit, QueryFilter, Surface};
pub use types::{Item, ItemFlags, ItemId, ItemShape, LayerId, Paint};
