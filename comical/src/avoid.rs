// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keeping points (tail tips, handles) off bubble content.

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::container::ContainerData;
use crate::query::bubble_with_content_at_point;

/// Move `point` out of every bubble's content box, staying inside the container.
///
/// Points that are not on any content box come back unchanged. Otherwise each step escapes the
/// content box under the point through its nearest legal edge, one unit past it. An escape is
/// legal when it lands outside every content box and inside the client area. The bottom edge is
/// the starting choice; up, left and right replace it in turn when they are legal and either
/// shorter or the current choice is not legal.
///
/// The search stops after `max_iterations` steps or when it would revisit a point. Either way
/// the last computed point is returned, which may still be on content when the point is boxed
/// in.
pub fn move_point_outside_bubble_content(
    container: &ContainerData,
    point: Point,
    max_iterations: usize,
) -> Point {
    let mut current = point;
    let mut visited: SmallVec<[Point; 8]> = SmallVec::new();
    for _ in 0..max_iterations {
        let Some(bubble) = bubble_with_content_at_point(container, current) else {
            return current;
        };
        let rect = bubble.content_rect();
        let down = Vec2::new(0.0, rect.y1 - current.y + 1.0);
        let up = Vec2::new(0.0, rect.y0 - current.y - 1.0);
        let left = Vec2::new(rect.x0 - current.x - 1.0, 0.0);
        let right = Vec2::new(rect.x1 - current.x + 1.0, 0.0);

        let mut delta = down;
        for candidate in [up, left, right] {
            delta = choose_better_delta(container, current, delta, candidate);
        }

        visited.push(current);
        current += delta;
        if visited.contains(&current) {
            break;
        }
    }
    if bubble_with_content_at_point(container, current).is_some() {
        tracing::warn!(
            container = ?container.element(),
            ?point,
            last = ?current,
            "no escape from bubble content found"
        );
    } else {
        tracing::debug!(?point, moved_to = ?current, "moved point off bubble content");
    }
    current
}

/// Whether `point` is off every content box and inside the client area.
fn is_legal(container: &ContainerData, point: Point) -> bool {
    container.client_contains(point) && bubble_with_content_at_point(container, point).is_none()
}

fn choose_better_delta(container: &ContainerData, from: Point, best: Vec2, candidate: Vec2) -> Vec2 {
    if !is_legal(container, from + candidate) {
        return best;
    }
    if candidate.hypot() < best.hypot() || !is_legal(container, from + best) {
        candidate
    } else {
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubble::Bubble;
    use crate::host::ElementId;
    use comical_spec::BubbleSpec;
    use kurbo::{Rect, Size};

    fn container(size: Size, rects: &[Rect]) -> ContainerData {
        let mut data = ContainerData::new(ElementId(0));
        data.set_size(size);
        for (i, r) in rects.iter().enumerate() {
            data.bubbles.push(Bubble::new(
                ElementId(i as u64 + 1),
                BubbleSpec::new("speech"),
                *r,
            ));
        }
        data
    }

    #[test]
    fn point_off_content_is_unchanged() {
        let data = container(Size::new(100.0, 100.0), &[Rect::new(10.0, 10.0, 20.0, 20.0)]);
        let p = Point::new(50.0, 50.0);
        assert_eq!(move_point_outside_bubble_content(&data, p, 32), p);
    }

    #[test]
    fn ties_go_down() {
        let data = container(Size::new(200.0, 200.0), &[Rect::new(40.0, 40.0, 60.0, 60.0)]);
        let moved = move_point_outside_bubble_content(&data, Point::new(50.0, 50.0), 32);
        assert_eq!(moved, Point::new(50.0, 61.0));
    }

    #[test]
    fn shortest_legal_edge_wins() {
        let data = container(Size::new(200.0, 200.0), &[Rect::new(40.0, 40.0, 60.0, 60.0)]);
        let moved = move_point_outside_bubble_content(&data, Point::new(57.0, 45.0), 32);
        assert_eq!(moved, Point::new(61.0, 45.0), "right edge is 4 away, top edge 6");
        let moved = move_point_outside_bubble_content(&data, Point::new(50.0, 42.0), 32);
        assert_eq!(moved, Point::new(50.0, 39.0));
    }

    #[test]
    fn off_canvas_escape_is_rejected() {
        // Content touching the top of the container: going up would leave the client area.
        let data = container(Size::new(200.0, 200.0), &[Rect::new(40.0, 0.0, 60.0, 60.0)]);
        let moved = move_point_outside_bubble_content(&data, Point::new(50.0, 2.0), 32);
        assert_eq!(moved, Point::new(39.0, 2.0), "left is the shortest legal escape");
    }

    #[test]
    fn escape_into_a_neighbour_is_rejected() {
        // A second box sits right below the first, so escaping down lands on content.
        let data = container(
            Size::new(300.0, 300.0),
            &[
                Rect::new(100.0, 100.0, 200.0, 120.0),
                Rect::new(100.0, 121.0, 200.0, 200.0),
            ],
        );
        let moved = move_point_outside_bubble_content(&data, Point::new(150.0, 115.0), 32);
        assert_eq!(moved, Point::new(150.0, 99.0));
    }

    #[test]
    fn boxed_in_point_terminates() {
        // The content fills the whole client area: no legal escape exists.
        let data = container(Size::new(50.0, 50.0), &[Rect::new(0.0, 0.0, 50.0, 50.0)]);
        let moved = move_point_outside_bubble_content(&data, Point::new(25.0, 25.0), 32);
        assert_eq!(moved, Point::new(25.0, 51.0), "illegal default move is still applied");

        // Two overlapping boxes that bounce the point between them.
        let data = container(
            Size::new(10.0, 10.0),
            &[Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 11.0, 10.0, 30.0)],
        );
        let moved = move_point_outside_bubble_content(&data, Point::new(5.0, 5.0), 4);
        assert!(moved.y > 10.0, "the search must stop with the last computed point");
    }

    #[test]
    fn result_is_legal_when_reachable() {
        let data = container(
            Size::new(400.0, 400.0),
            &[
                Rect::new(50.0, 50.0, 150.0, 100.0),
                Rect::new(140.0, 90.0, 260.0, 160.0),
                Rect::new(20.0, 98.0, 100.0, 300.0),
            ],
        );
        for p in [
            Point::new(60.0, 95.0),
            Point::new(145.0, 95.0),
            Point::new(200.0, 150.0),
            Point::new(30.0, 290.0),
        ] {
            let moved = move_point_outside_bubble_content(&data, p, 32);
            assert!(is_legal(&data, moved), "{p:?} moved to illegal {moved:?}");
        }
    }
}
