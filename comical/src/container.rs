// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container editing state.

use comical_hit::HandleDisc;
use comical_surface::{Item, ItemFlags, ItemShape, LayerId, Paint, Surface};
use hashbrown::HashMap;
use kurbo::{Point, Rect, Size};

use crate::bubble::Bubble;
use crate::config::SessionConfig;
use crate::host::{ElementId, Host, ObserverToken, read_spec};
use crate::layering::{LayerPair, rebuild_layers};

/// What a surface item belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ItemMeta {
    /// Content element of the owning bubble.
    pub element: ElementId,
    /// Part of the bubble the item draws.
    pub role: ItemRole,
}

/// Part of a bubble an item draws.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ItemRole {
    /// Outline stroke, in the lower layer.
    Outline,
    /// Body fill, in the upper layer.
    Body,
    /// Tail with the given index into the bubble's tails.
    Tail(usize),
    /// Handle dragging the tip of a tail.
    TipHandle(usize),
    /// Handle dragging the midpoint of a tail.
    MidHandle(usize),
}

/// Editing state of one container element.
///
/// The bubble list and all layers are rebuilt wholesale by every refresh; nothing is patched
/// incrementally.
pub struct ContainerData {
    element: ElementId,
    pub(crate) surface: Surface<ItemMeta>,
    pub(crate) bubbles: Vec<Bubble>,
    /// Distinct levels, ascending, each with its layer pair.
    pub(crate) levels: Vec<(i32, LayerPair)>,
    pub(crate) level_layers: HashMap<i32, LayerPair>,
    pub(crate) handle_layer: Option<LayerId>,
    observers: Vec<ObserverToken>,
    size: Size,
}

impl core::fmt::Debug for ContainerData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContainerData")
            .field("element", &self.element)
            .field("bubbles", &self.bubbles.len())
            .field("levels", &self.levels)
            .field("surface", &self.surface)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl ContainerData {
    pub(crate) fn new(element: ElementId) -> Self {
        Self {
            element,
            surface: Surface::new(),
            bubbles: Vec::new(),
            levels: Vec::new(),
            level_layers: HashMap::new(),
            handle_layer: None,
            observers: Vec::new(),
            size: Size::ZERO,
        }
    }

    /// The container element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Bubbles in document order.
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    /// The bubble whose content is `element`.
    pub fn bubble(&self, element: ElementId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.content() == element)
    }

    pub(crate) fn bubble_mut(&mut self, element: ElementId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.content() == element)
    }

    /// The rendering surface.
    pub fn surface(&self) -> &Surface<ItemMeta> {
        &self.surface
    }

    /// Layer pair of a level present among the current bubbles.
    pub fn level_layers(&self, level: i32) -> Option<LayerPair> {
        self.level_layers.get(&level).copied()
    }

    /// Distinct levels in paint order with their layer pairs.
    pub fn levels(&self) -> &[(i32, LayerPair)] {
        &self.levels
    }

    /// The handle layer, always topmost.
    pub fn handle_layer(&self) -> Option<LayerId> {
        self.handle_layer
    }

    /// Number of layers on the surface.
    pub fn layer_count(&self) -> usize {
        self.surface.layer_count()
    }

    /// Client area in container coordinates.
    pub fn client_bounds(&self) -> Rect {
        self.size.to_rect()
    }

    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Whether `point` lies in the client area. Edges count as inside.
    pub fn client_contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.size.width && point.y <= self.size.height
    }

    /// Number of live mutation subscriptions held for this container.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Re-scan the host for bubble elements and rebuild everything derived from them.
    pub(crate) fn refresh<H: Host + ?Sized>(&mut self, host: &mut H, config: &SessionConfig) {
        self.release_observers(host);

        let origin = host
            .bounding_rect(self.element)
            .map(|r| r.origin())
            .unwrap_or(Point::ZERO);
        self.set_size(host.client_size(self.element));

        let mut bubbles = Vec::new();
        for element in host.bubble_elements(self.element) {
            let spec = match read_spec(&*host, element) {
                Ok(Some(spec)) => spec,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(?element, %err, "skipping bubble with unreadable description");
                    continue;
                }
            };
            let rect = host
                .bounding_rect(element)
                .map(|r| r - origin.to_vec2())
                .unwrap_or(Rect::ZERO);
            bubbles.push(Bubble::new(element, spec, rect));
        }
        self.bubbles = bubbles;

        self.observers = self
            .bubbles
            .iter()
            .map(|b| host.observe(b.content()))
            .collect();

        rebuild_layers(self, config);
    }

    /// Redraw the handle layer for the active bubble, if it lives here.
    pub(crate) fn rebuild_handles(&mut self, active: Option<ElementId>, config: &SessionConfig) {
        let Some(layer) = self.handle_layer else {
            return;
        };
        self.surface.clear_layer(layer);
        let Some(bubble) = active.and_then(|e| self.bubble(e)) else {
            return;
        };
        let element = bubble.content();
        let mut handles = Vec::new();
        for (index, tail) in bubble.spec().speech_tails() {
            handles.push((tail.midpoint(), ItemRole::MidHandle(index)));
            handles.push((tail.tip(), ItemRole::TipHandle(index)));
        }
        for (center, role) in handles {
            self.surface.insert(
                layer,
                Item::new(
                    ItemShape::Handle(HandleDisc::new(center, config.handle_radius)),
                    ItemMeta { element, role },
                )
                .with_paint(Paint {
                    fill: Some("white".into()),
                    stroke: Some("black".into()),
                    stroke_width: 1.0,
                })
                .with_flags(ItemFlags::default() | ItemFlags::HANDLE),
            );
        }
    }

    /// Hand every subscription back to the host.
    pub(crate) fn release_observers<H: Host + ?Sized>(&mut self, host: &mut H) {
        for token in self.observers.drain(..) {
            host.unobserve(token);
        }
    }
}

impl Drop for ContainerData {
    fn drop(&mut self) {
        if !self.observers.is_empty() {
            tracing::warn!(
                container = ?self.element,
                leaked = self.observers.len(),
                "container state dropped with live observers"
            );
        }
    }
}
