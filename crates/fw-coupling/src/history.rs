//! Committed snapshot history.
//!
//! A bounded ring of committed snapshots addressed by absolute step index.
//! [`SnapshotHistory::commit`] is the only way to extend it; the oldest
//! entry is recycled once capacity is reached. Step 0 is the initial state.

use std::collections::VecDeque;

use fw_aero::AeroTimeStepInfo;
use fw_structure::StructuralTimeStep;

/// Structural and aerodynamic state at one step.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingSnapshot {
    pub structure: StructuralTimeStep,
    pub aero: AeroTimeStepInfo,
}

#[derive(Debug, Clone)]
pub struct SnapshotHistory<T> {
    initial: T,
    entries: VecDeque<T>,
    first_step: usize,
    capacity: usize,
}

impl<T: Clone> SnapshotHistory<T> {
    pub fn new(initial: T, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity);
        entries.push_back(initial.clone());
        Self {
            initial,
            entries,
            first_step: 0,
            capacity,
        }
    }

    /// Append a snapshot as the next step and return its step index.
    pub fn commit(&mut self, snapshot: T) -> usize {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.first_step += 1;
        }
        self.entries.push_back(snapshot);
        self.latest_step()
    }

    pub fn latest(&self) -> &T {
        self.entries.back().unwrap_or(&self.initial)
    }

    pub fn latest_step(&self) -> usize {
        self.first_step + self.entries.len() - 1
    }

    pub fn oldest_step(&self) -> usize {
        self.first_step
    }

    /// Snapshot at an absolute step, if still retained.
    pub fn get(&self, step: usize) -> Option<&T> {
        step.checked_sub(self.first_step)
            .and_then(|i| self.entries.get(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn initial(&self) -> &T {
        &self.initial
    }

    /// Drop every committed step and return to step 0.
    pub fn reset_to_initial(&mut self) {
        self.entries.clear();
        self.entries.push_back(self.initial.clone());
        self.first_step = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(move |(i, e)| (self.first_step + i, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_advances_step_index() {
        let mut h = SnapshotHistory::new(0_i32, 4);
        assert_eq!(h.latest_step(), 0);
        assert_eq!(h.commit(10), 1);
        assert_eq!(h.commit(20), 2);
        assert_eq!(*h.latest(), 20);
        assert_eq!(h.get(1), Some(&10));
    }

    #[test]
    fn oldest_entries_are_recycled() {
        let mut h = SnapshotHistory::new(0_i32, 3);
        for v in 1..=5 {
            h.commit(v);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.oldest_step(), 3);
        assert_eq!(h.latest_step(), 5);
        assert_eq!(h.get(2), None);
        assert_eq!(h.get(4), Some(&4));
        let steps: Vec<usize> = h.iter().map(|(s, _)| s).collect();
        assert_eq!(steps, vec![3, 4, 5]);
    }

    #[test]
    fn reset_restores_step_zero() {
        let mut h = SnapshotHistory::new(7_i32, 2);
        h.commit(1);
        h.commit(2);
        h.reset_to_initial();
        assert_eq!(h.latest_step(), 0);
        assert_eq!(*h.latest(), 7);
        assert_eq!(h.len(), 1);
    }
}
