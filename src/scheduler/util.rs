use crate::model::{Assignment, AssignmentId, DutySlot, SlotId};
use std::collections::HashMap;

pub(super) fn slot_lookup(slots: &[DutySlot]) -> HashMap<&SlotId, &DutySlot> {
    slots.iter().map(|s| (&s.id, s)).collect()
}

pub(super) fn find_slot_index(slots: &[DutySlot], slot_id: &SlotId) -> Option<usize> {
    slots.iter().position(|s| &s.id == slot_id)
}

pub(super) fn find_assignment_index(
    assignments: &[Assignment],
    id: &AssignmentId,
) -> Option<usize> {
    assignments.iter().position(|a| &a.id == id)
}
