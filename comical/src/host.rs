// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document the overlay is drawn over.

use comical_spec::BubbleSpec;
use kurbo::{Rect, Size};

use crate::Error;

/// Opaque handle to a host document element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Handle to one active mutation subscription.
///
/// Every token handed out by [`Host::observe`] must eventually be passed back to
/// [`Host::unobserve`]; the engine does so whenever a container is rebuilt or torn down.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObserverToken(pub u64);

/// Access to the host document.
///
/// Rectangles are in page coordinates; the engine converts them into container-relative
/// coordinates itself.
pub trait Host {
    /// Parent element, if any.
    fn parent_of(&self, element: ElementId) -> Option<ElementId>;

    /// Children of `container` that carry the bubble attribute, in document order.
    fn bubble_elements(&self, container: ElementId) -> Vec<ElementId>;

    /// Raw value of the bubble attribute.
    fn bubble_attribute(&self, element: ElementId) -> Option<String>;

    /// Overwrite the bubble attribute.
    fn set_bubble_attribute(&mut self, element: ElementId, value: String);

    /// Border box of an element in page coordinates.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// Size of the container's client area.
    fn client_size(&self, container: ElementId) -> Size;

    /// Start reporting changes to `element`.
    fn observe(&mut self, element: ElementId) -> ObserverToken;

    /// Stop a subscription started by [`Host::observe`].
    fn unobserve(&mut self, token: ObserverToken);

    /// Whether an element id is already used anywhere in the document.
    fn id_in_use(&self, id: &str) -> bool;

    /// Replace the editable surface of `container` with a static SVG image.
    fn install_static_image(&mut self, container: ElementId, svg: String);

    /// Remove a static image previously installed in `container`, if any.
    fn remove_static_image(&mut self, container: ElementId);
}

/// Read and parse an element's bubble attribute. `Ok(None)` when it has none.
pub fn read_spec<H: Host + ?Sized>(host: &H, element: ElementId) -> Result<Option<BubbleSpec>, Error> {
    match host.bubble_attribute(element) {
        Some(value) => Ok(Some(BubbleSpec::from_attribute(&value)?)),
        None => Ok(None),
    }
}

/// Persist a spec into an element's bubble attribute.
pub fn write_spec<H: Host + ?Sized>(host: &mut H, element: ElementId, spec: &BubbleSpec) {
    host.set_bubble_attribute(element, spec.to_attribute());
}
