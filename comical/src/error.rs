// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use comical_spec::SpecError;

use crate::host::ElementId;

/// Failed preconditions of engine operations.
///
/// An operation that returns an error has changed nothing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The container was never passed to [`Session::start_editing`](crate::Session::start_editing),
    /// or editing already stopped.
    #[error("container {0:?} is not being edited")]
    ContainerNotActive(ElementId),
    /// No bubble for this element exists in any edited container.
    #[error("element {0:?} has no active bubble")]
    NoBubble(ElementId),
    /// The two elements do not share a container.
    #[error("element {0:?} is not in the same container as {1:?}")]
    DifferentContainer(ElementId, ElementId),
    /// A bubble cannot be chained after itself.
    #[error("element {0:?} cannot be its own family parent")]
    SelfLink(ElementId),
    /// The host could not report a layout box for the element.
    #[error("element {0:?} has no layout box")]
    NoLayout(ElementId),
    /// The element's family already uses the highest representable level or order.
    #[error("no level or order left above the family of {0:?}")]
    Overflow(ElementId),
    /// The element's bubble attribute could not be read.
    #[error(transparent)]
    Spec(#[from] SpecError),
}
