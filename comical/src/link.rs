// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chaining a new child bubble onto a family.

use comical_spec::{BubbleSpec, CURRENT_VERSION, TailSpec};
use kurbo::Point;

use crate::bubble::{Bubble, default_mid};
use crate::container::ContainerData;
use crate::host::{ElementId, Host, write_spec};
use crate::{Error, query};

/// Make `child`'s bubble the newest member of `parent`'s family.
///
/// A parent without a level is moved onto a fresh level above every other bubble, and a parent
/// without an order becomes the family root with order `1`; both changes are persisted. The
/// child's description is replaced outright: parent's style and level, the next free order, and
/// a single joiner tail reaching to the current last member of the family. The new order is one
/// past the highest in the family, stepping over `0`.
///
/// Fails with [`Error::Overflow`] when no level or order is left above the existing ones.
///
/// Shapes are not regenerated here. Callers rebuild the container afterwards.
pub(crate) fn initialize_child<H: Host + ?Sized>(
    container: &mut ContainerData,
    host: &mut H,
    child: ElementId,
    parent: ElementId,
) -> Result<(), Error> {
    let parent_index = container
        .bubbles
        .iter()
        .position(|b| b.content() == parent)
        .ok_or(Error::NoBubble(parent))?;
    if child == parent {
        return Err(Error::SelfLink(child));
    }
    let child_index = container.bubbles.iter().position(|b| b.content() == child);
    let child_rect = match child_index {
        Some(index) => container.bubbles[index].content_rect(),
        None => {
            if host.parent_of(child) != Some(container.element()) {
                return Err(Error::DifferentContainer(child, parent));
            }
            let origin = host
                .bounding_rect(container.element())
                .map(|r| r.origin())
                .unwrap_or(Point::ZERO);
            host.bounding_rect(child)
                .ok_or(Error::NoLayout(child))?
                - origin.to_vec2()
        }
    };

    // Resolve every new value before anything is written.
    let parent_bubble = &container.bubbles[parent_index];
    let level = match parent_bubble.level() {
        0 => query::max_level(&container.bubbles)
            .checked_add(1)
            .ok_or(Error::Overflow(parent))?,
        level => level,
    };
    let parent_order = parent_bubble.order().unwrap_or(1);
    let parent_changed = level != parent_bubble.level() || parent_bubble.order().is_none();
    let style = parent_bubble.spec().style.clone();

    // The family as it stands once the parent is settled, without the child's old entry.
    let mut members: Vec<(i32, usize)> = container
        .bubbles
        .iter()
        .enumerate()
        .filter(|(_, b)| b.content() != child)
        .filter_map(|(index, b)| {
            if index == parent_index {
                Some((parent_order, index))
            } else {
                b.order().filter(|_| b.level() == level).map(|o| (o, index))
            }
        })
        .collect();
    members.sort_by_key(|(order, _)| *order);
    let (last_order, last_index) = members.last().copied().unwrap_or((parent_order, parent_index));
    let next_order = match last_order.checked_add(1).ok_or(Error::Overflow(parent))? {
        0 => 1,
        order => order,
    };
    let target = container.bubbles[last_index].anchor();

    // Every precondition holds; from here on the call succeeds.
    if parent_changed {
        let spec = container.bubbles[parent_index].spec_mut();
        spec.level = Some(level);
        spec.order = Some(parent_order);
        write_spec(host, parent, container.bubbles[parent_index].spec());
    }

    let child_index = child_index.unwrap_or_else(|| {
        container
            .bubbles
            .push(Bubble::new(child, BubbleSpec::new(style.clone()), child_rect));
        container.bubbles.len() - 1
    });

    let root = child_rect.center();
    let spec = BubbleSpec {
        version: CURRENT_VERSION.into(),
        style,
        level: Some(level),
        order: Some(next_order),
        tails: vec![TailSpec::new(target, default_mid(root, target), true)],
        background_colors: None,
        outer_border_color: None,
    };
    write_spec(host, child, &spec);
    container.bubbles[child_index].set_spec(spec);

    tracing::debug!(?child, ?parent, level, order = next_order, "linked child bubble");
    Ok(())
}
