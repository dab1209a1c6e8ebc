// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Family relationships between bubbles.
//!
//! A family is every bubble of one container that shares a nonzero level and has a nonzero
//! order. Relationships are never stored as links; they are read off a sorted index over the
//! flat bubble list each time they are needed:
//!
//! - ancestors: members with a lower order, ascending;
//! - parent: the closest ancestor;
//! - child: the closest member with a higher order;
//! - relatives: every member except the bubble itself.
//!
//! Orders may have gaps and may start anywhere. Members with equal orders (a malformed family)
//! keep document order among themselves and are neither ancestors nor children of each other.

use smallvec::SmallVec;

use crate::bubble::Bubble;

/// Sorted view of the members of one family.
#[derive(Clone, Debug)]
pub struct Family<'a> {
    level: i32,
    /// Members sorted by ascending order, ties in document order.
    members: SmallVec<[&'a Bubble; 8]>,
}

impl<'a> Family<'a> {
    /// The family at `level`. Level `0` is the unordered base layer and never forms a family.
    pub fn at_level(bubbles: &'a [Bubble], level: i32) -> Self {
        let mut members: SmallVec<[&'a Bubble; 8]> = if level == 0 {
            SmallVec::new()
        } else {
            bubbles
                .iter()
                .filter(|b| b.level() == level && b.order().is_some())
                .collect()
        };
        members.sort_by_key(|b| b.order());
        Self { level, members }
    }

    /// The family sharing `bubble`'s level, whether or not `bubble` itself is a member.
    pub fn of(bubbles: &'a [Bubble], bubble: &Bubble) -> Self {
        Self::at_level(bubbles, bubble.level())
    }

    /// The level this family lives on.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Members in ascending order.
    pub fn members(&self) -> &[&'a Bubble] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the family has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members ordered before `bubble`, ascending. Empty when `bubble` has no order.
    pub fn ancestors_of(&self, bubble: &Bubble) -> &[&'a Bubble] {
        let Some(order) = bubble.order() else {
            return &[];
        };
        let end = self
            .members
            .partition_point(|m| m.order().is_some_and(|o| o < order));
        &self.members[..end]
    }

    /// The closest ancestor of `bubble`.
    pub fn parent_of(&self, bubble: &Bubble) -> Option<&'a Bubble> {
        self.ancestors_of(bubble).last().copied()
    }

    /// The closest member ordered after `bubble`.
    pub fn child_of(&self, bubble: &Bubble) -> Option<&'a Bubble> {
        let order = bubble.order()?;
        let start = self
            .members
            .partition_point(|m| m.order().is_some_and(|o| o <= order));
        self.members.get(start).copied()
    }

    /// Every member except `bubble`, ascending.
    pub fn relatives_of(&self, bubble: &Bubble) -> Vec<&'a Bubble> {
        self.members
            .iter()
            .filter(|m| m.content() != bubble.content())
            .copied()
            .collect()
    }

    /// The member with the highest order.
    pub fn last(&self) -> Option<&'a Bubble> {
        self.members.last().copied()
    }
}

/// Family members ordered before `bubble`, ascending.
pub fn find_ancestors<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Vec<&'a Bubble> {
    Family::of(bubbles, bubble).ancestors_of(bubble).to_vec()
}

/// The immediate predecessor of `bubble` in its family.
pub fn find_parent<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Option<&'a Bubble> {
    Family::of(bubbles, bubble).parent_of(bubble)
}

/// The immediate successor of `bubble` in its family.
pub fn find_child<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Option<&'a Bubble> {
    Family::of(bubbles, bubble).child_of(bubble)
}

/// Every member of `bubble`'s family except `bubble`, ascending.
pub fn find_relatives<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Vec<&'a Bubble> {
    Family::of(bubbles, bubble).relatives_of(bubble)
}

/// The member of `bubble`'s family with the highest order, which new children are chained after.
pub fn last_in_family<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Option<&'a Bubble> {
    Family::of(bubbles, bubble).last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ElementId;
    use comical_spec::BubbleSpec;
    use kurbo::Rect;

    fn bubble(id: u64, level: Option<i32>, order: Option<i32>) -> Bubble {
        let mut spec = BubbleSpec::new("speech");
        spec.level = level;
        spec.order = order;
        Bubble::new(ElementId(id), spec, Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    fn ids(bubbles: &[&Bubble]) -> Vec<u64> {
        bubbles.iter().map(|b| b.content().0).collect()
    }

    /// Level 1 family with orders 7, 2, 5 (gaps, unsorted document order), a level 1 bubble
    /// without order, and an unrelated level 2 family member.
    fn sample() -> Vec<Bubble> {
        vec![
            bubble(1, Some(1), Some(7)),
            bubble(2, Some(1), Some(2)),
            bubble(3, Some(1), None),
            bubble(4, Some(1), Some(5)),
            bubble(5, Some(2), Some(3)),
        ]
    }

    #[test]
    fn ancestors_parent_child() {
        let bubbles = sample();
        let last = &bubbles[0];
        assert_eq!(ids(&find_ancestors(&bubbles, last)), [2, 4]);
        assert_eq!(find_parent(&bubbles, last).map(|b| b.content().0), Some(4));
        assert!(find_child(&bubbles, last).is_none());

        let first = &bubbles[1];
        assert!(find_ancestors(&bubbles, first).is_empty());
        assert!(find_parent(&bubbles, first).is_none());
        assert_eq!(find_child(&bubbles, first).map(|b| b.content().0), Some(4));

        let middle = &bubbles[3];
        assert_eq!(find_child(&bubbles, middle).map(|b| b.content().0), Some(1));
        assert_eq!(find_parent(&bubbles, middle).map(|b| b.content().0), Some(2));
    }

    #[test]
    fn unordered_bubble_has_no_lineage_but_sees_relatives() {
        let bubbles = sample();
        let loner = &bubbles[2];
        assert!(find_ancestors(&bubbles, loner).is_empty());
        assert!(find_parent(&bubbles, loner).is_none());
        assert!(find_child(&bubbles, loner).is_none());
        assert_eq!(ids(&find_relatives(&bubbles, loner)), [2, 4, 1]);
    }

    #[test]
    fn relatives_exclude_self_and_other_levels() {
        let bubbles = sample();
        assert_eq!(ids(&find_relatives(&bubbles, &bubbles[3])), [2, 1]);
        assert!(find_relatives(&bubbles, &bubbles[4]).is_empty());
        assert_eq!(
            last_in_family(&bubbles, &bubbles[2]).map(|b| b.content().0),
            Some(1)
        );
    }

    #[test]
    fn base_level_never_forms_a_family() {
        let bubbles = vec![bubble(1, None, Some(1)), bubble(2, Some(0), Some(2))];
        let family = Family::of(&bubbles, &bubbles[0]);
        assert!(family.is_empty());
        assert!(find_parent(&bubbles, &bubbles[1]).is_none());
        assert!(last_in_family(&bubbles, &bubbles[1]).is_none());
    }

    #[test]
    fn lineage_partitions_the_family() {
        let bubbles = sample();
        for b in bubbles.iter().filter(|b| b.order().is_some() && b.level() == 1) {
            let family = Family::of(&bubbles, b);
            let ancestors = ids(family.ancestors_of(b));
            let child: Vec<u64> = family.child_of(b).map(|c| c.content().0).into_iter().collect();
            let relatives = ids(&family.relatives_of(b));

            let mut union: Vec<u64> = ancestors.iter().chain(&child).copied().collect();
            for id in &relatives {
                if !union.contains(id) {
                    union.push(*id);
                }
            }
            union.push(b.content().0);
            union.sort_unstable();
            let mut everyone = relatives.clone();
            everyone.push(b.content().0);
            everyone.sort_unstable();
            assert_eq!(union, everyone, "lineage of {:?} must cover the family", b.content());

            for a in &ancestors {
                assert!(!child.contains(a), "ancestor and child overlap for {:?}", b.content());
            }
            assert!(!relatives.contains(&b.content().0), "a bubble is not its own relative");
        }
    }

    #[test]
    fn equal_orders_are_not_related() {
        let bubbles = vec![bubble(1, Some(1), Some(4)), bubble(2, Some(1), Some(4))];
        assert!(find_parent(&bubbles, &bubbles[1]).is_none());
        assert!(find_child(&bubbles, &bubbles[0]).is_none());
        assert_eq!(ids(&find_relatives(&bubbles, &bubbles[0])), [2]);
    }
}
