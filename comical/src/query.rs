// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only spatial queries over one container.
//!
//! Points are container-relative.

use comical_surface::QueryFilter;
use kurbo::Point;

use crate::bubble::Bubble;
use crate::config::SessionConfig;
use crate::container::ContainerData;

/// Whether anything drawn in the container (outline, body, tail or handle) is at `point`.
pub fn something_hit(container: &ContainerData, point: Point, config: &SessionConfig) -> bool {
    container
        .surface()
        .hit_test_point(point, QueryFilter::new().pickable(), &config.hit_params)
        .is_some()
}

/// The bubble whose drawn shape contains `point`.
///
/// Higher levels paint on top, so they are tested first; bubbles sharing a level are tested in
/// document order.
pub fn get_bubble_hit<'a>(
    container: &'a ContainerData,
    point: Point,
    config: &SessionConfig,
) -> Option<&'a Bubble> {
    let mut by_level: Vec<&Bubble> = container.bubbles().iter().collect();
    by_level.sort_by_key(|b| core::cmp::Reverse(b.level()));
    by_level.into_iter().find(|b| b.is_hit_by(point, config))
}

/// The first bubble, in document order, whose content box contains `point`.
///
/// This looks at the rectangular content element, not the drawn outline.
pub fn bubble_with_content_at_point(container: &ContainerData, point: Point) -> Option<&Bubble> {
    container.bubbles().iter().find(|b| b.content_contains(point))
}

/// Highest level among `bubbles`, `0` when there are none.
pub fn max_level(bubbles: &[Bubble]) -> i32 {
    bubbles.iter().map(Bubble::level).max().unwrap_or(0)
}
