// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core surface implementation: layer stack, item storage, queries.

use comical_hit::{HitParams, HitScore, PreciseHitTest};
use kurbo::{Point, Rect};

use crate::slots::Slots;
use crate::types::{Item, ItemFlags, ItemId, LayerId};

/// An ordered stack of layers.
///
/// Layers paint bottom to top in the order they were added; items paint in insertion order
/// within their layer. The type parameter `M` is the per-item payload callers use to map hits
/// back to their own objects.
pub struct Surface<M> {
    layers: Slots<Layer>,
    /// Paint order, bottom first.
    order: Vec<LayerId>,
    items: Slots<ItemSlot<M>>,
}

impl<M> core::fmt::Debug for Surface<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Surface")
            .field("layers", &self.order.len())
            .field("items", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl<M> Default for Surface<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default)]
struct Layer {
    items: Vec<ItemId>,
}

#[derive(Clone, Debug)]
struct ItemSlot<M> {
    item: Item<M>,
    layer: LayerId,
    /// Cached broad-phase bounds.
    bounds: Rect,
}

/// Result of a hit test.
#[derive(Clone, Copy, Debug)]
pub struct Hit {
    /// The topmost matching item.
    pub item: ItemId,
    /// The layer holding it.
    pub layer: LayerId,
    /// Score from the precise test.
    pub score: HitScore,
}

/// Restricts which items take part in a hit test.
#[derive(Clone, Copy, Debug)]
pub struct QueryFilter {
    /// Items must carry all of these flags.
    pub required_flags: ItemFlags,
    /// Items must carry none of these flags.
    pub excluded_flags: ItemFlags,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            required_flags: ItemFlags::empty(),
            excluded_flags: ItemFlags::empty(),
        }
    }
}

impl QueryFilter {
    /// A filter admitting every item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only pickable items.
    pub fn pickable(mut self) -> Self {
        self.required_flags |= ItemFlags::PICKABLE;
        self
    }

    /// Only handles.
    pub fn handles(mut self) -> Self {
        self.required_flags |= ItemFlags::HANDLE;
        self
    }

    /// Everything except handles.
    pub fn without_handles(mut self) -> Self {
        self.excluded_flags |= ItemFlags::HANDLE;
        self
    }

    /// Check whether flags satisfy this filter.
    pub fn matches(&self, flags: ItemFlags) -> bool {
        flags.contains(self.required_flags) && !flags.intersects(self.excluded_flags)
    }
}

impl<M> Surface<M> {
    /// An empty surface.
    pub fn new() -> Self {
        Self {
            layers: Slots::default(),
            order: Vec::new(),
            items: Slots::default(),
        }
    }

    /// Add a layer above every existing layer.
    pub fn add_layer(&mut self) -> LayerId {
        let (idx, generation) = self.layers.insert(Layer::default());
        let id = LayerId(idx, generation);
        self.order.push(id);
        id
    }

    /// Remove a layer and all of its items.
    pub fn remove_layer(&mut self, id: LayerId) {
        let Some(layer) = self.layers.remove(id.0, id.1) else {
            return;
        };
        for item in layer.items {
            self.items.remove(item.0, item.1);
        }
        self.order.retain(|l| *l != id);
    }

    /// Remove every layer and item. All outstanding handles go stale.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.items.clear();
        self.order.clear();
    }

    /// Remove every item of a layer, keeping the layer in place.
    pub fn clear_layer(&mut self, id: LayerId) {
        let Some(layer) = self.layers.get_mut(id.0, id.1) else {
            return;
        };
        for item in core::mem::take(&mut layer.items) {
            self.items.remove(item.0, item.1);
        }
    }

    /// Number of live layers.
    pub fn layer_count(&self) -> usize {
        self.order.len()
    }

    /// Number of live items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Layers in paint order, bottom first.
    pub fn layers(&self) -> &[LayerId] {
        &self.order
    }

    /// Position of a layer in paint order, `0` being the bottom.
    pub fn paint_index(&self, id: LayerId) -> Option<usize> {
        self.order.iter().position(|l| *l == id)
    }

    /// Returns true if `id` refers to a live layer.
    pub fn is_layer_alive(&self, id: LayerId) -> bool {
        self.layers.is_alive(id.0, id.1)
    }

    /// Returns true if `id` refers to a live item.
    pub fn is_item_alive(&self, id: ItemId) -> bool {
        self.items.is_alive(id.0, id.1)
    }

    /// Append an item on top of a layer. Returns `None` for a stale layer.
    pub fn insert(&mut self, layer: LayerId, item: Item<M>) -> Option<ItemId> {
        if !self.is_layer_alive(layer) {
            return None;
        }
        let bounds = item.shape.bounding_box();
        let (idx, generation) = self.items.insert(ItemSlot {
            item,
            layer,
            bounds,
        });
        let id = ItemId(idx, generation);
        if let Some(l) = self.layers.get_mut(layer.0, layer.1) {
            l.items.push(id);
        }
        Some(id)
    }

    /// Remove an item, returning it.
    pub fn remove(&mut self, id: ItemId) -> Option<Item<M>> {
        let slot = self.items.remove(id.0, id.1)?;
        if let Some(l) = self.layers.get_mut(slot.layer.0, slot.layer.1) {
            l.items.retain(|i| *i != id);
        }
        Some(slot.item)
    }

    /// Keep only the items for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Item<M>) -> bool) {
        let doomed: Vec<ItemId> = self
            .order
            .iter()
            .filter_map(|l| self.layers.get(l.0, l.1))
            .flat_map(|l| l.items.iter().copied())
            .filter(|id| {
                self.items
                    .get(id.0, id.1)
                    .is_some_and(|slot| !keep(&slot.item))
            })
            .collect();
        for id in doomed {
            self.remove(id);
        }
    }

    /// Look up a live item.
    pub fn item(&self, id: ItemId) -> Option<&Item<M>> {
        self.items.get(id.0, id.1).map(|slot| &slot.item)
    }

    /// Mutable access to a live item.
    ///
    /// Call [`Surface::refresh_bounds`] after changing its shape, or use
    /// [`Surface::replace_shape`] instead.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item<M>> {
        self.items.get_mut(id.0, id.1).map(|slot| &mut slot.item)
    }

    /// Swap the geometry of a live item, keeping its place in paint order.
    pub fn replace_shape(&mut self, id: ItemId, shape: crate::ItemShape) -> bool {
        let Some(slot) = self.items.get_mut(id.0, id.1) else {
            return false;
        };
        slot.bounds = shape.bounding_box();
        slot.item.shape = shape;
        true
    }

    /// Recompute the cached bounds of an item after editing it through [`Surface::item_mut`].
    pub fn refresh_bounds(&mut self, id: ItemId) {
        if let Some(slot) = self.items.get_mut(id.0, id.1) {
            slot.bounds = slot.item.shape.bounding_box();
        }
    }

    /// Items of a layer in paint order. Empty for a stale layer.
    pub fn items_in(&self, layer: LayerId) -> impl Iterator<Item = (ItemId, &Item<M>)> + '_ {
        self.layers
            .get(layer.0, layer.1)
            .into_iter()
            .flat_map(|l| l.items.iter())
            .filter_map(|id| self.item(*id).map(|item| (*id, item)))
    }

    /// Every item in paint order, bottom first, with its layer.
    pub fn paint_order(&self) -> impl Iterator<Item = (LayerId, ItemId, &Item<M>)> + '_ {
        self.order.iter().flat_map(move |layer| {
            self.items_in(*layer)
                .map(move |(id, item)| (*layer, id, item))
        })
    }

    /// Find the topmost item at `point`.
    ///
    /// Layers are searched top to bottom and items within a layer last-inserted first, so the
    /// result is the item that paints over every other candidate at that point. A cheap bounds
    /// check (inflated by the largest tolerance) precedes the precise test.
    pub fn hit_test_point(
        &self,
        point: Point,
        filter: QueryFilter,
        params: &HitParams,
    ) -> Option<Hit> {
        let slack = params
            .fill_tolerance
            .max(params.stroke_tolerance)
            .max(params.handle_tolerance);
        for &layer_id in self.order.iter().rev() {
            let Some(layer) = self.layers.get(layer_id.0, layer_id.1) else {
                continue;
            };
            for &id in layer.items.iter().rev() {
                let Some(slot) = self.items.get(id.0, id.1) else {
                    continue;
                };
                if !filter.matches(slot.item.flags) {
                    continue;
                }
                if !contains_inclusive(slot.bounds.inflate(slack, slack), point) {
                    continue;
                }
                if let Some(score) = slot.item.shape.hit_test_local(point, params) {
                    return Some(Hit {
                        item: id,
                        layer: layer_id,
                        score,
                    });
                }
            }
        }
        None
    }
}

/// Like [`Rect::contains`] but with the far edges included.
fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemShape, Paint};
    use comical_hit::HandleDisc;
    use kurbo::Circle;

    fn disc(x: f64, y: f64, r: f64) -> ItemShape {
        ItemShape::Circle(Circle::new((x, y), r))
    }

    #[test]
    fn layers_paint_in_insertion_order() {
        let mut surface: Surface<u32> = Surface::new();
        let a = surface.add_layer();
        let b = surface.add_layer();
        let c = surface.add_layer();
        assert_eq!(surface.layers(), &[a, b, c]);
        assert_eq!(surface.paint_index(c), Some(2));

        surface.remove_layer(b);
        assert_eq!(surface.layers(), &[a, c]);
        assert!(!surface.is_layer_alive(b));
        assert_eq!(surface.paint_index(b), None);
    }

    #[test]
    fn topmost_layer_wins_then_latest_item() {
        let mut surface: Surface<u32> = Surface::new();
        let low = surface.add_layer();
        let high = surface.add_layer();
        let first = surface.insert(low, Item::new(disc(0.0, 0.0, 10.0), 1)).unwrap();
        let second = surface.insert(low, Item::new(disc(0.0, 0.0, 10.0), 2)).unwrap();

        let params = HitParams::default();
        let hit = surface
            .hit_test_point(Point::ZERO, QueryFilter::new(), &params)
            .unwrap();
        assert_eq!(hit.item, second, "later item in a layer paints on top");
        assert_eq!(hit.layer, low);

        let top = surface.insert(high, Item::new(disc(0.0, 0.0, 10.0), 3)).unwrap();
        let hit = surface
            .hit_test_point(Point::ZERO, QueryFilter::new(), &params)
            .unwrap();
        assert_eq!(hit.item, top);

        surface.remove(top);
        surface.remove(second);
        let hit = surface
            .hit_test_point(Point::ZERO, QueryFilter::new(), &params)
            .unwrap();
        assert_eq!(hit.item, first);
    }

    #[test]
    fn filters_select_handles() {
        let mut surface: Surface<&str> = Surface::new();
        let body = surface.add_layer();
        let handles = surface.add_layer();
        surface.insert(body, Item::new(disc(0.0, 0.0, 20.0), "body"));
        let handle = surface
            .insert(
                handles,
                Item::new(
                    ItemShape::Handle(HandleDisc::new(Point::new(5.0, 5.0), 3.0)),
                    "handle",
                )
                .with_flags(ItemFlags::default() | ItemFlags::HANDLE),
            )
            .unwrap();

        let params = HitParams::default();
        let p = Point::new(5.0, 5.0);
        let hit = surface
            .hit_test_point(p, QueryFilter::new().handles(), &params)
            .unwrap();
        assert_eq!(hit.item, handle);
        let hit = surface
            .hit_test_point(p, QueryFilter::new().without_handles(), &params)
            .unwrap();
        assert_eq!(surface.item(hit.item).unwrap().meta, "body");
    }

    #[test]
    fn unpickable_items_are_skipped() {
        let mut surface: Surface<u8> = Surface::new();
        let layer = surface.add_layer();
        surface.insert(
            layer,
            Item::new(disc(0.0, 0.0, 5.0), 0).with_flags(ItemFlags::VISIBLE),
        );
        let params = HitParams::default();
        assert!(
            surface
                .hit_test_point(Point::ZERO, QueryFilter::new().pickable(), &params)
                .is_none()
        );
        assert!(
            surface
                .hit_test_point(Point::ZERO, QueryFilter::new(), &params)
                .is_some()
        );
    }

    #[test]
    fn clear_and_retain() {
        let mut surface: Surface<u8> = Surface::new();
        let layer = surface.add_layer();
        for i in 0..4 {
            surface.insert(
                layer,
                Item::new(disc(f64::from(i), 0.0, 1.0), i).with_paint(Paint::fill("white")),
            );
        }
        surface.retain(|item| item.meta % 2 == 0);
        let kept: Vec<u8> = surface.items_in(layer).map(|(_, item)| item.meta).collect();
        assert_eq!(kept, [0, 2]);

        surface.clear_layer(layer);
        assert_eq!(surface.item_count(), 0);
        assert!(surface.is_layer_alive(layer));

        surface.clear();
        assert_eq!(surface.layer_count(), 0);
        assert!(!surface.is_layer_alive(layer));
        assert!(surface.insert(layer, Item::new(disc(0.0, 0.0, 1.0), 9)).is_none());
    }

    #[test]
    fn replace_shape_updates_broad_phase() {
        let mut surface: Surface<()> = Surface::new();
        let layer = surface.add_layer();
        let id = surface.insert(layer, Item::new(disc(0.0, 0.0, 1.0), ())).unwrap();
        let far = Point::new(50.0, 50.0);
        let params = HitParams::default();
        assert!(surface.hit_test_point(far, QueryFilter::new(), &params).is_none());
        assert!(surface.replace_shape(id, disc(50.0, 50.0, 1.0)));
        assert_eq!(
            surface
                .hit_test_point(far, QueryFilter::new(), &params)
                .map(|h| h.item),
            Some(id)
        );
    }
}
