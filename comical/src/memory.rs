// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Host`] for tests, demos and headless tools.
//!
//! Elements form a flat tree of rectangles in page coordinates. Attribute and layout changes to
//! observed elements are queued and can be fed back into
//! [`Session::handle_mutations`](crate::Session::handle_mutations).

use comical_spec::BubbleSpec;
use hashbrown::{HashMap, HashSet};
use kurbo::{Rect, Size};

use crate::host::{ElementId, Host, ObserverToken};

#[derive(Clone, Debug)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    rect: Rect,
    attribute: Option<String>,
}

/// A toy document.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    nodes: HashMap<ElementId, Node>,
    next_element: u64,
    observers: HashMap<ObserverToken, ElementId>,
    next_token: u64,
    mutations: Vec<ElementId>,
    ids_in_use: HashSet<String>,
    static_images: HashMap<ElementId, String>,
}

impl MemoryHost {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element under `parent` with the given page-space border box.
    pub fn add_element(&mut self, parent: Option<ElementId>, rect: Rect) -> ElementId {
        self.next_element += 1;
        let id = ElementId(self.next_element);
        self.nodes.insert(
            id,
            Node {
                parent,
                children: Vec::new(),
                rect,
                attribute: None,
            },
        );
        if let Some(node) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            node.children.push(id);
        }
        id
    }

    /// Store `spec` in the element's bubble attribute.
    pub fn set_spec(&mut self, element: ElementId, spec: &BubbleSpec) {
        self.write_attribute(element, Some(spec.to_attribute()));
    }

    /// Set or clear the raw bubble attribute.
    pub fn write_attribute(&mut self, element: ElementId, value: Option<String>) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.attribute = value;
            self.record(element);
        }
    }

    /// Move or resize an element.
    pub fn set_bounds(&mut self, element: ElementId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.rect = rect;
            self.record(element);
        }
    }

    /// Raw bubble attribute.
    pub fn attribute(&self, element: ElementId) -> Option<&str> {
        self.nodes.get(&element)?.attribute.as_deref()
    }

    /// Parsed bubble attribute.
    pub fn spec(&self, element: ElementId) -> Option<BubbleSpec> {
        BubbleSpec::from_attribute(self.attribute(element)?).ok()
    }

    /// Drain the observed elements changed since the last call, oldest first.
    pub fn take_mutations(&mut self) -> Vec<ElementId> {
        core::mem::take(&mut self.mutations)
    }

    /// Number of live subscriptions.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Whether any subscription watches `element`.
    pub fn is_observed(&self, element: ElementId) -> bool {
        self.observers.values().any(|e| *e == element)
    }

    /// Static image installed in `container`, if any.
    pub fn static_image(&self, container: ElementId) -> Option<&str> {
        self.static_images.get(&container).map(String::as_str)
    }

    /// Mark a document id as taken.
    pub fn reserve_id(&mut self, id: impl Into<String>) {
        self.ids_in_use.insert(id.into());
    }

    fn record(&mut self, element: ElementId) {
        if self.is_observed(element) && !self.mutations.contains(&element) {
            self.mutations.push(element);
        }
    }

    fn image_ids(svg: &str) -> impl Iterator<Item = &str> {
        svg.split(" id=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
    }
}

impl Host for MemoryHost {
    fn parent_of(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(&element)?.parent
    }

    fn bubble_elements(&self, container: ElementId) -> Vec<ElementId> {
        let Some(node) = self.nodes.get(&container) else {
            return Vec::new();
        };
        node.children
            .iter()
            .copied()
            .filter(|c| self.nodes.get(c).is_some_and(|n| n.attribute.is_some()))
            .collect()
    }

    fn bubble_attribute(&self, element: ElementId) -> Option<String> {
        self.nodes.get(&element)?.attribute.clone()
    }

    fn set_bubble_attribute(&mut self, element: ElementId, value: String) {
        self.write_attribute(element, Some(value));
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.nodes.get(&element).map(|n| n.rect)
    }

    fn client_size(&self, container: ElementId) -> Size {
        self.nodes
            .get(&container)
            .map(|n| n.rect.size())
            .unwrap_or(Size::ZERO)
    }

    fn observe(&mut self, element: ElementId) -> ObserverToken {
        self.next_token += 1;
        let token = ObserverToken(self.next_token);
        self.observers.insert(token, element);
        token
    }

    fn unobserve(&mut self, token: ObserverToken) {
        if self.observers.remove(&token).is_none() {
            tracing::warn!(?token, "unobserve of unknown subscription");
        }
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.ids_in_use.contains(id)
    }

    fn install_static_image(&mut self, container: ElementId, svg: String) {
        let ids: Vec<String> = Self::image_ids(&svg).map(str::to_owned).collect();
        self.ids_in_use.extend(ids);
        self.static_images.insert(container, svg);
    }

    fn remove_static_image(&mut self, container: ElementId) {
        if let Some(svg) = self.static_images.remove(&container) {
            for id in Self::image_ids(&svg) {
                self.ids_in_use.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_observed_changes_are_queued() {
        let mut host = MemoryHost::new();
        let page = host.add_element(None, Rect::new(0.0, 0.0, 100.0, 100.0));
        let a = host.add_element(Some(page), Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = host.add_element(Some(page), Rect::new(20.0, 0.0, 30.0, 10.0));
        let token = host.observe(a);

        host.write_attribute(a, Some("{}".into()));
        host.write_attribute(a, Some("{}".into()));
        host.set_bounds(b, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(host.take_mutations(), vec![a]);
        assert!(host.take_mutations().is_empty());

        host.unobserve(token);
        assert_eq!(host.observer_count(), 0);
    }

    #[test]
    fn bubble_elements_follow_document_order() {
        let mut host = MemoryHost::new();
        let page = host.add_element(None, Rect::new(0.0, 0.0, 100.0, 100.0));
        let a = host.add_element(Some(page), Rect::ZERO);
        let plain = host.add_element(Some(page), Rect::ZERO);
        let c = host.add_element(Some(page), Rect::ZERO);
        host.set_spec(c, &BubbleSpec::new("speech"));
        host.set_spec(a, &BubbleSpec::new("speech"));
        assert_eq!(host.bubble_elements(page), vec![a, c]);
        assert!(!host.bubble_elements(page).contains(&plain));
    }

    #[test]
    fn static_image_ids_are_reserved_until_removed() {
        let mut host = MemoryHost::new();
        let page = host.add_element(None, Rect::new(0.0, 0.0, 100.0, 100.0));
        host.install_static_image(page, r#"<svg><g id="comical-1"><path id="comical-2"/></g></svg>"#.into());
        assert!(host.id_in_use("comical-1"));
        assert!(host.id_in_use("comical-2"));
        host.remove_static_image(page);
        assert!(!host.id_in_use("comical-1"));
        assert!(host.static_image(page).is_none());
    }
}
