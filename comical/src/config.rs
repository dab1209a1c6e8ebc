// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use comical_hit::HitParams;

/// Tunables for an editing [`Session`](crate::Session).
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Upper bound on relocation steps when moving a point out of bubble content.
    pub max_avoid_iterations: usize,
    /// Gap between a bubble's content box and its outline.
    pub content_margin: f64,
    /// Width of bubble outlines.
    pub outline_width: f64,
    /// Half of the painted width of a tail.
    pub tail_half_width: f64,
    /// Radius of drag handles.
    pub handle_radius: f64,
    /// Tolerances for pointer hit tests.
    pub hit_params: HitParams,
    /// Distance a handle must travel before a drag is persisted.
    pub drag_threshold: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_avoid_iterations: 32,
            content_margin: 8.0,
            outline_width: 1.5,
            tail_half_width: 3.0,
            handle_radius: 5.0,
            hit_params: HitParams {
                fill_tolerance: 0.0,
                stroke_tolerance: 2.0,
                handle_tolerance: 3.0,
            },
            drag_threshold: 3.0,
        }
    }
}
