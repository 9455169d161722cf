use super::assignment::{assign_slot_in, RunLedger};
use super::types::{
    GenerateReport, GenerateRequest, Notice, SchedError, Schedule, SlotFilter, SlotOutcome,
};
use super::Scheduler;
use crate::calendar;
use crate::model::{AlgorithmWeights, Assignment, AssignmentId, DutySlot, Person, Role, SlotId};
use std::collections::HashSet;
use tracing::{debug, info};

/// Génère tous les créneaux non verrouillés de `slots`, par date croissante.
///
/// Chaque choix est ajouté à l'état cumulé avant de passer au créneau suivant :
/// l'équité du créneau N voit tous les choix des créneaux précédents.
pub fn generate_full_schedule(
    slots: &[DutySlot],
    people: &[Person],
    existing: &[Assignment],
    weights: &AlgorithmWeights,
) -> Schedule {
    generate_schedule(slots, slots, people, existing, weights)
}

/// Comme [`generate_full_schedule`], mais l'historique est résolu sur
/// `known_slots` (typiquement tous les créneaux du roster) tandis que seuls
/// ceux de `to_process` reçoivent des affectations.
pub fn generate_schedule(
    to_process: &[DutySlot],
    known_slots: &[DutySlot],
    people: &[Person],
    existing: &[Assignment],
    weights: &AlgorithmWeights,
) -> Schedule {
    let mut ordered: Vec<&DutySlot> = to_process.iter().collect();
    ordered.sort_by_key(|s| s.date);

    let mut ledger = RunLedger::new(existing);
    let mut schedule = Schedule::default();

    for slot in ordered {
        if slot.is_locked {
            debug!(slot = slot.id.as_str(), "slot locked, skipped");
            continue;
        }
        let results = assign_slot_in(&mut ledger, slot, people, known_slots, weights);
        schedule.outcomes.push(SlotOutcome {
            slot_id: slot.id.clone(),
            date: slot.date,
            kind: slot.kind,
            results,
        });
    }

    schedule
}

fn selected(filter: &SlotFilter, slot: &DutySlot) -> bool {
    match filter {
        SlotFilter::All => true,
        SlotFilter::Month { year, month } => calendar::month_bounds(*year, *month)
            .map(|(first, last)| first <= slot.date && slot.date <= last)
            .unwrap_or(false),
        SlotFilter::Ids(ids) => ids.contains(&slot.id),
    }
}

/// Au moins un siège principal manque, toutes affectations confondues.
fn needs_main_seats(slot: &DutySlot, assignments: &[Assignment]) -> bool {
    Role::ALL.into_iter().any(|role| {
        let held = assignments
            .iter()
            .filter(|a| a.slot_id == slot.id && a.role == role && !a.is_reserve)
            .count();
        held < slot.needed(role) as usize
    })
}

pub(super) fn generate(
    scheduler: &mut Scheduler,
    request: &GenerateRequest,
) -> Result<GenerateReport, SchedError> {
    let roster = &mut scheduler.roster;
    let weights = request.weights.unwrap_or(roster.settings.weights);

    let scope: HashSet<SlotId> = roster
        .slots
        .iter()
        .filter(|s| selected(&request.filter, s))
        .map(|s| s.id.clone())
        .collect();

    if let SlotFilter::Ids(ids) = &request.filter {
        if let Some(missing) = ids.iter().find(|id| !scope.contains(*id)) {
            return Err(SchedError::UnknownSlot(missing.as_str().to_string()));
        }
    }

    if request.regenerate {
        // un créneau verrouillé garde toutes ses affectations
        let clearable: HashSet<&SlotId> = roster
            .slots
            .iter()
            .filter(|s| !s.is_locked && scope.contains(&s.id))
            .map(|s| &s.id)
            .collect();
        let before = roster.assignments.len();
        roster
            .assignments
            .retain(|a| a.is_locked || !clearable.contains(&a.slot_id));
        info!(
            removed = before - roster.assignments.len(),
            "unlocked assignments cleared"
        );
    }

    let to_process: Vec<DutySlot> = roster
        .slots
        .iter()
        .filter(|s| scope.contains(&s.id) && !s.is_locked)
        .filter(|s| needs_main_seats(s, &roster.assignments))
        .cloned()
        .collect();

    // Les affectations déjà posées sur un créneau à compléter sont figées
    // le temps de la génération : seuls les sièges manquants sont pourvus.
    let pending: HashSet<&SlotId> = to_process.iter().map(|s| &s.id).collect();
    let existing: Vec<Assignment> = roster
        .assignments
        .iter()
        .map(|a| {
            let mut a = a.clone();
            if pending.contains(&a.slot_id) {
                a.is_locked = true;
            }
            a
        })
        .collect();

    let people: Vec<Person> = roster
        .people
        .iter()
        .filter(|p| p.is_active)
        .cloned()
        .collect();

    let schedule = generate_schedule(&to_process, &roster.slots, &people, &existing, &weights);

    let mut report = GenerateReport {
        processed_slots: schedule.len(),
        ..GenerateReport::default()
    };

    for outcome in schedule.iter() {
        for result in &outcome.results {
            if !result.warnings.is_empty() {
                report.notices.push(Notice {
                    slot_id: outcome.slot_id.clone(),
                    date: outcome.date,
                    person_id: result.person_id.clone(),
                    role: result.role,
                    is_reserve: result.is_reserve,
                    warnings: result.warnings.clone(),
                });
            }
            let Some(person_id) = &result.person_id else {
                continue;
            };

            let assignment = Assignment {
                id: AssignmentId::random(),
                slot_id: outcome.slot_id.clone(),
                person_id: person_id.clone(),
                role: result.role,
                is_reserve: result.is_reserve,
                is_locked: false,
                warnings: result.warnings.clone(),
            };
            if roster.assignments.iter().any(|a| a.same_seat(&assignment)) {
                debug!(
                    slot = outcome.slot_id.as_str(),
                    person = person_id.as_str(),
                    "duplicate assignment skipped"
                );
                report.skipped_duplicates += 1;
                continue;
            }
            report.created.push(assignment.id.clone());
            roster.assignments.push(assignment);
        }
    }

    info!(
        processed = report.processed_slots,
        created = report.created.len(),
        unfilled = report.unfilled().count(),
        "schedule generated"
    );

    Ok(report)
}
