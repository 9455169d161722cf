use super::types::{ClearFilter, SchedError, SwapRejection};
use super::{util, Scheduler};
use crate::model::{Assignment, AssignmentId, Person, PersonId, Role, SlotId};
use tracing::debug;

/// Vérifie qu'on peut échanger les titulaires de deux affectations.
///
/// Même rôle, même type (principal/réserve), aucune des deux verrouillée, et
/// les deux personnes connues. Les dates bloquées ne sont pas revérifiées :
/// `audit` les signale après coup.
pub fn can_swap(a: &Assignment, b: &Assignment, people: &[Person]) -> Result<(), SwapRejection> {
    if a.role != b.role {
        return Err(SwapRejection::RoleMismatch);
    }
    if a.is_reserve != b.is_reserve {
        return Err(SwapRejection::ReserveMismatch);
    }
    if a.is_locked || b.is_locked {
        return Err(SwapRejection::Locked);
    }
    let known = |x: &Assignment| people.iter().any(|p| p.id == x.person_id);
    if !known(a) || !known(b) {
        return Err(SwapRejection::PersonNotFound);
    }
    Ok(())
}

pub(super) fn swap(
    scheduler: &mut Scheduler,
    a: &AssignmentId,
    b: &AssignmentId,
) -> Result<(), SchedError> {
    let assignments = &scheduler.roster.assignments;
    let Some(pos_a) = util::find_assignment_index(assignments, a) else {
        return Err(SchedError::UnknownAssignment(a.as_str().to_string()));
    };
    let Some(pos_b) = util::find_assignment_index(assignments, b) else {
        return Err(SchedError::UnknownAssignment(b.as_str().to_string()));
    };

    can_swap(
        &assignments[pos_a],
        &assignments[pos_b],
        &scheduler.roster.people,
    )?;

    let person_a = assignments[pos_a].person_id.clone();
    let person_b = assignments[pos_b].person_id.clone();
    let assignments = &mut scheduler.roster.assignments;
    assignments[pos_a].person_id = person_b;
    assignments[pos_b].person_id = person_a;
    Ok(())
}

/// Affectation manuelle ; refuse un siège déjà occupé par la même personne.
pub(super) fn assign(
    scheduler: &mut Scheduler,
    slot: &SlotId,
    person: &PersonId,
    role: Role,
    is_reserve: bool,
) -> Result<AssignmentId, SchedError> {
    let roster = &mut scheduler.roster;
    if roster.find_slot(slot).is_none() {
        return Err(SchedError::UnknownSlot(slot.as_str().to_string()));
    }
    if roster.find_person_by_id(person).is_none() {
        return Err(SchedError::UnknownPerson(person.as_str().to_string()));
    }
    let assignment = Assignment::new(slot.clone(), person.clone(), role, is_reserve);
    if roster.assignments.iter().any(|a| a.same_seat(&assignment)) {
        return Err(SchedError::DuplicateSeat(person.as_str().to_string(), role));
    }
    let id = assignment.id.clone();
    debug!(slot = slot.as_str(), person = person.as_str(), %role, is_reserve, "manual assignment");
    roster.assignments.push(assignment);
    Ok(id)
}

pub(super) fn unassign(
    scheduler: &mut Scheduler,
    id: &AssignmentId,
) -> Result<Assignment, SchedError> {
    let assignments = &mut scheduler.roster.assignments;
    let Some(pos) = util::find_assignment_index(assignments, id) else {
        return Err(SchedError::UnknownAssignment(id.as_str().to_string()));
    };
    Ok(assignments.remove(pos))
}

/// Supprime les affectations retenues par le filtre ; renvoie leur nombre.
pub(super) fn clear(scheduler: &mut Scheduler, filter: &ClearFilter) -> usize {
    let assignments = &mut scheduler.roster.assignments;
    let before = assignments.len();
    assignments.retain(|a| !filter.matches(a));
    let removed = before - assignments.len();
    debug!(removed, "assignments cleared");
    removed
}
