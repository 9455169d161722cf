use super::{util, Conflict, ConflictKind, Scheduler};
use crate::calendar;
use crate::model::{Assignment, Role};

/// Contrôle le roster courant : dates bloquées, sièges en double,
/// dépassement d'effectif, références orphelines.
pub(super) fn audit(scheduler: &Scheduler) -> Vec<Conflict> {
    let roster = &scheduler.roster;
    let slots = util::slot_lookup(&roster.slots);
    let mut out = Vec::new();

    let conflict = |a: &Assignment, kind: ConflictKind| Conflict {
        assignment: a.id.clone(),
        slot: a.slot_id.clone(),
        person: a.person_id.clone(),
        kind,
    };

    for (idx, a) in roster.assignments.iter().enumerate() {
        let (Some(slot), Some(person)) =
            (slots.get(&a.slot_id), roster.find_person_by_id(&a.person_id))
        else {
            out.push(conflict(a, ConflictKind::UnknownReference));
            continue;
        };

        if calendar::is_blocked(&person.blocked_dates, slot.date, slot.is_weekend()) {
            out.push(conflict(a, ConflictKind::BlockedDate));
        }

        if roster
            .assignments
            .iter()
            .skip(idx + 1)
            .any(|b| a.same_seat(b))
        {
            out.push(conflict(a, ConflictKind::DuplicateSeat));
        }
    }

    for slot in &roster.slots {
        for role in Role::ALL {
            for is_reserve in [false, true] {
                let held: Vec<&Assignment> = roster
                    .assignments_for_slot(&slot.id)
                    .filter(|a| a.role == role && a.is_reserve == is_reserve)
                    .collect();
                if held.len() > slot.needed(role) as usize {
                    out.extend(
                        held.into_iter()
                            .skip(slot.needed(role) as usize)
                            .map(|a| conflict(a, ConflictKind::OverCapacity)),
                    );
                }
            }
        }
    }

    out
}
