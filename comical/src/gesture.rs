// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press-move-release tracking for handle drags.
//!
//! A drag starts on pointer down over a handle. Every move is applied live, but only a drag
//! whose pointer travelled farther than the threshold from the press position counts as an
//! edit on release; shorter ones are treated as a click on the handle.
//!
//! ```
//! use comical::gesture::{DragResult, DragState};
//! use kurbo::Point;
//!
//! let mut drag: DragState<u32> = DragState::new(3.0);
//! drag.on_down(7, Point::new(10.0, 10.0));
//! assert_eq!(drag.on_move(Point::new(11.0, 10.0)), Some(7));
//! assert_eq!(drag.on_up(Point::new(11.0, 10.0)), DragResult::Click(7));
//!
//! drag.on_down(7, Point::new(10.0, 10.0));
//! drag.on_move(Point::new(30.0, 10.0));
//! assert_eq!(drag.on_up(Point::new(30.0, 10.0)), DragResult::Moved(7));
//! ```

use kurbo::Point;

/// State of the current press, if any.
#[derive(Clone, Debug)]
pub struct DragState<K> {
    press: Option<Press<K>>,
    /// Distance the pointer must travel before the drag counts as an edit.
    pub threshold: f64,
}

/// An active press.
#[derive(Clone, Debug)]
pub struct Press<K> {
    /// What is being dragged.
    pub target: K,
    /// Pointer position at press time.
    pub down_position: Point,
    /// Most recent pointer position.
    pub last_position: Point,
    /// True once the pointer has gone past the threshold.
    pub exceeded: bool,
}

/// Outcome of releasing a press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragResult<K> {
    /// The target was dragged past the threshold.
    Moved(K),
    /// The target was pressed and released in place.
    Click(K),
    /// There was no active press.
    Idle,
}

impl<K: Clone> DragState<K> {
    /// No active press.
    pub fn new(threshold: f64) -> Self {
        Self {
            press: None,
            threshold,
        }
    }

    /// Start a press on `target`, replacing any press in progress.
    pub fn on_down(&mut self, target: K, position: Point) {
        self.press = Some(Press {
            target,
            down_position: position,
            last_position: position,
            exceeded: false,
        });
    }

    /// Track a move. Returns the target while a press is active.
    pub fn on_move(&mut self, position: Point) -> Option<K> {
        let press = self.press.as_mut()?;
        press.last_position = position;
        if press.down_position.distance(position) > self.threshold {
            press.exceeded = true;
        }
        Some(press.target.clone())
    }

    /// Finish the press.
    pub fn on_up(&mut self, position: Point) -> DragResult<K> {
        let Some(press) = self.press.take() else {
            return DragResult::Idle;
        };
        if press.exceeded || press.down_position.distance(position) > self.threshold {
            DragResult::Moved(press.target)
        } else {
            DragResult::Click(press.target)
        }
    }

    /// Drop the active press. Returns true if there was one.
    pub fn cancel(&mut self) -> bool {
        self.press.take().is_some()
    }

    /// Whether a press is active.
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// The active press.
    pub fn press(&self) -> Option<&Press<K>> {
        self.press.as_ref()
    }
}
