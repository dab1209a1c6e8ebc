// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint-order layering of a container's bubbles.
//!
//! Each distinct level gets a `(lower, upper)` layer pair; pairs are stacked in ascending level
//! order and a single handle layer goes on top. Within a level, bubbles draw in document order.

use comical_surface::LayerId;

use crate::bubble::BubbleLayers;
use crate::config::SessionConfig;
use crate::container::ContainerData;

/// The two layers shared by every bubble of one level.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LayerPair {
    /// Outlines.
    pub lower: LayerId,
    /// Bodies.
    pub upper: LayerId,
}

/// Throw away every layer of the container and rebuild them from its current bubble list.
pub(crate) fn rebuild_layers(container: &mut ContainerData, config: &SessionConfig) {
    container.surface.clear();
    container.level_layers.clear();
    container.levels.clear();

    let mut levels: Vec<i32> = container.bubbles.iter().map(|b| b.level()).collect();
    levels.sort_unstable();
    levels.dedup();

    for level in levels {
        let lower = container.surface.add_layer();
        let upper = container.surface.add_layer();
        let pair = LayerPair { lower, upper };
        container.levels.push((level, pair));
        container.level_layers.insert(level, pair);
    }
    let handles = container.surface.add_layer();
    container.handle_layer = Some(handles);

    let ContainerData {
        surface,
        bubbles,
        level_layers,
        ..
    } = container;
    for bubble in bubbles.iter_mut() {
        let Some(pair) = level_layers.get(&bubble.level()).copied() else {
            continue;
        };
        bubble.attach(BubbleLayers {
            lower: pair.lower,
            upper: pair.upper,
            handles,
        });
        bubble.build_shapes(surface, config);
    }

    tracing::debug!(
        container = ?container.element(),
        bubbles = container.bubbles.len(),
        levels = container.levels.len(),
        layers = container.surface.layer_count(),
        "rebuilt layers"
    );
}
