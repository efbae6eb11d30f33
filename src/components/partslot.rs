//! The seven fixed attachment roles of a pet and a slot-indexed container.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::components::frame::PartType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartSlot {
    Mouth,
    Leg1,
    Leg2,
    Arm1,
    Arm2,
    Eye1,
    Eye2,
}

impl PartSlot {
    pub const ALL: [PartSlot; 7] = [
        PartSlot::Mouth,
        PartSlot::Leg1,
        PartSlot::Leg2,
        PartSlot::Arm1,
        PartSlot::Arm2,
        PartSlot::Eye1,
        PartSlot::Eye2,
    ];

    /// Drawn on top of the body fill.
    pub const INNER: [PartSlot; 3] = [PartSlot::Mouth, PartSlot::Eye1, PartSlot::Eye2];

    /// Drawn behind the body through the cutout.
    pub const OUTER: [PartSlot; 4] = [PartSlot::Leg1, PartSlot::Leg2, PartSlot::Arm1, PartSlot::Arm2];

    pub const EYES: [PartSlot; 2] = [PartSlot::Eye1, PartSlot::Eye2];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Anchor type this slot attaches to.
    pub fn part_type(self) -> PartType {
        match self {
            PartSlot::Mouth => PartType::Mouth,
            PartSlot::Leg1 => PartType::Leg1,
            PartSlot::Leg2 => PartType::Leg2,
            PartSlot::Arm1 => PartType::Arm1,
            PartSlot::Arm2 => PartType::Arm2,
            PartSlot::Eye1 | PartSlot::Eye2 => PartType::Eye,
        }
    }

    pub fn is_inner(self) -> bool {
        matches!(self, PartSlot::Mouth | PartSlot::Eye1 | PartSlot::Eye2)
    }
}

/// One value per [`PartSlot`], indexed by the slot itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PartSlots<T> {
    items: [T; 7],
}

impl<T> PartSlots<T> {
    pub fn from_fn(mut f: impl FnMut(PartSlot) -> T) -> Self {
        Self {
            items: PartSlot::ALL.map(&mut f),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartSlot, &T)> {
        PartSlot::ALL.into_iter().zip(self.items.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(PartSlot, &T) -> U) -> PartSlots<U> {
        PartSlots::from_fn(|slot| f(slot, &self.items[slot.index()]))
    }
}

impl<T: Default> Default for PartSlots<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<PartSlot> for PartSlots<T> {
    type Output = T;

    fn index(&self, slot: PartSlot) -> &T {
        &self.items[slot.index()]
    }
}

impl<T> IndexMut<PartSlot> for PartSlots<T> {
    fn index_mut(&mut self, slot: PartSlot) -> &mut T {
        &mut self.items[slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_partition_all_slots() {
        let mut seen: Vec<PartSlot> = PartSlot::INNER.iter().chain(PartSlot::OUTER.iter()).copied().collect();
        seen.sort_by_key(|s| s.index());
        assert_eq!(seen, PartSlot::ALL.to_vec());
        assert!(PartSlot::INNER.iter().all(|s| s.is_inner()));
        assert!(PartSlot::OUTER.iter().all(|s| !s.is_inner()));
    }

    #[test]
    fn test_both_eyes_use_eye_type() {
        assert_eq!(PartSlot::Eye1.part_type(), PartType::Eye);
        assert_eq!(PartSlot::Eye2.part_type(), PartType::Eye);
        assert_eq!(PartSlot::Arm2.part_type(), PartType::Arm2);
    }

    #[test]
    fn test_part_slots_index_by_slot() {
        let mut slots: PartSlots<u32> = PartSlots::default();
        slots[PartSlot::Arm1] = 7;
        assert_eq!(slots[PartSlot::Arm1], 7);
        assert_eq!(slots.iter().filter(|(_, v)| **v == 7).count(), 1);
        let doubled = slots.map(|_, v| v * 2);
        assert_eq!(doubled[PartSlot::Arm1], 14);
    }
}
