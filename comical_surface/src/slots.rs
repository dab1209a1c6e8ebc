// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot storage shared by layers and items.

/// Slots with per-slot generations that persist across frees, so a handle to a freed slot
/// never matches whatever reuses it.
#[derive(Clone, Debug)]
pub(crate) struct Slots<T> {
    entries: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }
}

impl<T> Slots<T> {
    /// Store `value`, returning its `(index, generation)`.
    pub(crate) fn insert(&mut self, value: T) -> (u32, u32) {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some(value);
            (idx, generation)
        } else {
            self.entries.push(Some(value));
            self.generations.push(1);
            (self.entries.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Handles use 32-bit indices by design."
        )]
        let idx = idx as u32;
        (idx, generation)
    }

    pub(crate) fn is_alive(&self, idx: u32, generation: u32) -> bool {
        self.get(idx, generation).is_some()
    }

    pub(crate) fn get(&self, idx: u32, generation: u32) -> Option<&T> {
        let idx = idx as usize;
        if self.generations.get(idx) != Some(&generation) {
            return None;
        }
        self.entries.get(idx)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, idx: u32, generation: u32) -> Option<&mut T> {
        let idx = idx as usize;
        if self.generations.get(idx) != Some(&generation) {
            return None;
        }
        self.entries.get_mut(idx)?.as_mut()
    }

    pub(crate) fn remove(&mut self, idx: u32, generation: u32) -> Option<T> {
        let i = idx as usize;
        if self.generations.get(i) != Some(&generation) {
            return None;
        }
        let value = self.entries.get_mut(i)?.take()?;
        self.free_list.push(i);
        Some(value)
    }

    /// Free every slot. Generations are kept so outstanding handles go stale.
    pub(crate) fn clear(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.take().is_some() {
                self.free_list.push(i);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuse_bumps_generation() {
        let mut slots = Slots::default();
        let (a, ga) = slots.insert("a");
        assert!(slots.is_alive(a, ga));
        assert_eq!(slots.remove(a, ga), Some("a"));
        assert!(!slots.is_alive(a, ga));

        let (b, gb) = slots.insert("b");
        assert_eq!(a, b, "freed slot should be reused");
        assert!(gb > ga, "generation must increase on reuse");
        assert_eq!(slots.get(a, ga), None);
        assert_eq!(slots.get(b, gb), Some(&"b"));
    }

    #[test]
    fn clear_stales_every_handle() {
        let mut slots = Slots::default();
        let handles: Vec<_> = (0..3).map(|i| slots.insert(i)).collect();
        slots.clear();
        assert_eq!(slots.len(), 0);
        for (idx, generation) in handles {
            assert!(!slots.is_alive(idx, generation));
        }
        let (idx, generation) = slots.insert(9);
        assert!(generation > 1, "cleared slots are reused with a new generation");
        assert_eq!(slots.get_mut(idx, generation).copied(), Some(9));
    }
}
