// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Comical Spec: the persisted description of a speech bubble.
//!
//! Every HTML element acting as bubble content carries a [`BubbleSpec`] serialized as JSON in
//! its [`BUBBLE_ATTRIBUTE`] attribute. A spec records the bubble's style, its tails, and the two
//! integers that drive relationships between bubbles sharing a container:
//!
//! - `level` groups bubbles into a pair of paint layers. Higher levels paint on top. Absent and
//!   `0` both mean "base layer".
//! - `order` positions a bubble inside its family (the bubbles sharing its level). Absent and `0`
//!   both mean "not part of a family".
//!
//! ```rust
//! use comical_spec::BubbleSpec;
//!
//! let spec = BubbleSpec::from_attribute(
//!     r#"{"version":"1.0","style":"speech","level":2,"order":1,"tails":[]}"#,
//! )
//! .unwrap();
//! assert_eq!(spec.effective_level(), 2);
//! assert_eq!(spec.family_order(), Some(1));
//!
//! // Attribute values written by hand often use single quotes.
//! let legacy = BubbleSpec::from_attribute("{'version':'1.0','style':'caption','tails':[]}").unwrap();
//! assert_eq!(legacy.effective_level(), 0);
//! assert_eq!(legacy.family_order(), None);
//! ```

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Name of the attribute holding a serialized [`BubbleSpec`].
pub const BUBBLE_ATTRIBUTE: &str = "data-bubble";

/// Version string written into every new [`BubbleSpec`].
pub const CURRENT_VERSION: &str = "1.0";

/// Style used when nothing else is known about a bubble.
pub const DEFAULT_STYLE: &str = "speech";

/// Errors produced while reading a persisted bubble description.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The attribute value is not a valid bubble description.
    #[error("malformed bubble description: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Persisted description of one bubble.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleSpec {
    /// Format version, currently [`CURRENT_VERSION`].
    pub version: String,
    /// Shape style name (`speech`, `caption`, `circle`, `none`, ...).
    pub style: String,
    /// Paint-layer grouping; see [`BubbleSpec::effective_level`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    /// Position inside the family; see [`BubbleSpec::family_order`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    /// Tails in drawing order.
    #[serde(default)]
    pub tails: Vec<TailSpec>,
    /// Fill colors, first one used for the bubble body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_colors: Option<Vec<String>>,
    /// Color of the outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_border_color: Option<String>,
}

/// Persisted description of one tail, in container-relative coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailSpec {
    /// Tip x coordinate.
    pub tip_x: f64,
    /// Tip y coordinate.
    pub tip_y: f64,
    /// Control midpoint x coordinate.
    pub midpoint_x: f64,
    /// Control midpoint y coordinate.
    pub midpoint_y: f64,
    /// The tail only links two family members and is not a speech tail.
    #[serde(default, skip_serializing_if = "is_false")]
    pub joiner: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl TailSpec {
    /// A tail ending at `tip`, bending through `midpoint`.
    pub fn new(tip: Point, midpoint: Point, joiner: bool) -> Self {
        Self {
            tip_x: tip.x,
            tip_y: tip.y,
            midpoint_x: midpoint.x,
            midpoint_y: midpoint.y,
            joiner,
        }
    }

    /// Tip of the tail.
    pub fn tip(&self) -> Point {
        Point::new(self.tip_x, self.tip_y)
    }

    /// Control midpoint of the tail.
    pub fn midpoint(&self) -> Point {
        Point::new(self.midpoint_x, self.midpoint_y)
    }

    /// Move the tip.
    pub fn set_tip(&mut self, tip: Point) {
        self.tip_x = tip.x;
        self.tip_y = tip.y;
    }

    /// Move the control midpoint.
    pub fn set_midpoint(&mut self, midpoint: Point) {
        self.midpoint_x = midpoint.x;
        self.midpoint_y = midpoint.y;
    }
}

impl BubbleSpec {
    /// A fresh spec with the current version, the given style and no tails.
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            version: CURRENT_VERSION.into(),
            style: style.into(),
            level: None,
            order: None,
            tails: Vec::new(),
            background_colors: None,
            outer_border_color: None,
        }
    }

    /// Parse an attribute value.
    ///
    /// Values using `'` in place of `"` are accepted, since that is how the attribute is
    /// usually written inside double-quoted HTML.
    pub fn from_attribute(value: &str) -> Result<Self, SpecError> {
        let spec: Self = match serde_json::from_str(value) {
            Ok(spec) => spec,
            Err(first) => {
                if !value.contains('\'') {
                    return Err(first.into());
                }
                serde_json::from_str(&value.replace('\'', "\""))?
            }
        };
        if spec.is_newer_than_supported() {
            tracing::warn!(
                version = %spec.version,
                supported = CURRENT_VERSION,
                "bubble description is newer than this reader"
            );
        }
        Ok(spec)
    }

    /// Serialize for storage in [`BUBBLE_ATTRIBUTE`].
    pub fn to_attribute(&self) -> String {
        // Plain data with string keys only.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Level with the absent sentinel folded into `0`.
    pub fn effective_level(&self) -> i32 {
        self.level.unwrap_or(0)
    }

    /// Family order, or `None` when the bubble is not part of a family.
    pub fn family_order(&self) -> Option<i32> {
        self.order.filter(|&o| o != 0)
    }

    /// Tails that are real speech tails rather than family joiners.
    pub fn speech_tails(&self) -> impl Iterator<Item = (usize, &TailSpec)> {
        self.tails.iter().enumerate().filter(|(_, t)| !t.joiner)
    }

    fn is_newer_than_supported(&self) -> bool {
        let parse = |v: &str| -> Option<(u32, u32)> {
            let (major, minor) = v.split_once('.')?;
            Some((major.parse().ok()?, minor.parse().ok()?))
        };
        match (parse(&self.version), parse(CURRENT_VERSION)) {
            (Some(found), Some(supported)) => found > supported,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_zero_are_sentinels() {
        let mut spec = BubbleSpec::new("speech");
        assert_eq!(spec.effective_level(), 0);
        assert_eq!(spec.family_order(), None);

        spec.level = Some(0);
        spec.order = Some(0);
        assert_eq!(spec.effective_level(), 0);
        assert_eq!(spec.family_order(), None, "order 0 is not a family position");

        spec.level = Some(3);
        spec.order = Some(-2);
        assert_eq!(spec.effective_level(), 3);
        assert_eq!(spec.family_order(), Some(-2));
    }

    #[test]
    fn attribute_omits_absent_fields() {
        let mut spec = BubbleSpec::new("caption");
        spec.tails.push(TailSpec::new(
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            false,
        ));
        let text = spec.to_attribute();
        assert!(!text.contains("level"), "absent level must not be written: {text}");
        assert!(!text.contains("order"), "absent order must not be written: {text}");
        assert!(!text.contains("joiner"), "false joiner must not be written: {text}");
        assert!(text.contains("\"tipX\":1.0"), "camelCase keys expected: {text}");
        assert_eq!(BubbleSpec::from_attribute(&text).unwrap(), spec);
    }

    #[test]
    fn reads_joiner_tails() {
        let spec = BubbleSpec::from_attribute(
            r#"{"version":"1.0","style":"speech","level":1,"order":2,
               "tails":[{"tipX":10,"tipY":20,"midpointX":5,"midpointY":5,"joiner":true},
                        {"tipX":0,"tipY":0,"midpointX":1,"midpointY":1}]}"#,
        )
        .unwrap();
        assert!(spec.tails[0].joiner);
        assert!(!spec.tails[1].joiner);
        assert_eq!(spec.tails[0].tip(), Point::new(10.0, 20.0));
        let speech: Vec<usize> = spec.speech_tails().map(|(i, _)| i).collect();
        assert_eq!(speech, [1]);
    }

    #[test]
    fn malformed_is_an_error() {
        assert!(BubbleSpec::from_attribute("not json").is_err());
        assert!(BubbleSpec::from_attribute("{'style': 3}").is_err());
    }

    #[test]
    fn newer_versions_still_parse() {
        let spec =
            BubbleSpec::from_attribute(r#"{"version":"7.2","style":"speech","tails":[]}"#).unwrap();
        assert!(spec.is_newer_than_supported());
        assert!(!BubbleSpec::new("speech").is_newer_than_supported());
    }
}
