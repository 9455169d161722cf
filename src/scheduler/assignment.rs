use super::cost;
use super::stats::{compute_stats, Averages, StatsMap};
use super::types::{AssignmentResult, Candidate};
use crate::calendar;
use crate::model::{AlgorithmWeights, Assignment, AssignmentId, DutySlot, Person, PersonId, Role};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

/// Meilleur candidat : coût minimal, les coûts infinis étant écartés.
/// À coût égal, le premier dans l'ordre d'entrée l'emporte.
pub fn select_best(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates
        .into_iter()
        .filter(|c| !c.is_excluded())
        .min_by(|a, b| a.cost.partial_cmp(&b.cost).unwrap_or(Ordering::Equal))
}

/// Affectations d'une génération en cours : l'existant plus chaque choix,
/// identifié par un compteur local.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunLedger {
    assignments: Vec<Assignment>,
    next_seq: u64,
}

impl RunLedger {
    pub(crate) fn new(existing: &[Assignment]) -> Self {
        Self {
            assignments: existing.to_vec(),
            next_seq: 0,
        }
    }

    pub(crate) fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Ajoute les sièges pourvus de `results` sur `slot`.
    pub(crate) fn record(&mut self, slot: &DutySlot, results: &[AssignmentResult]) {
        for result in results {
            let Some(person_id) = &result.person_id else {
                continue;
            };
            self.next_seq += 1;
            self.assignments.push(Assignment {
                id: AssignmentId::provisional(self.next_seq),
                slot_id: slot.id.clone(),
                person_id: person_id.clone(),
                role: result.role,
                is_reserve: result.is_reserve,
                is_locked: false,
                warnings: result.warnings.clone(),
            });
        }
    }
}

/// Pourvoit `needed` sièges principaux (puis autant de réserves si
/// `include_reserve`) pour `role` sur `slot`.
///
/// Les sièges verrouillés existants sont conservés et décomptés. Les
/// statistiques sont mises à jour après chaque choix, si bien qu'un siège
/// voit l'effet des précédents.
#[allow(clippy::too_many_arguments)]
pub fn assign_role(
    slot: &DutySlot,
    role: Role,
    needed: u32,
    include_reserve: bool,
    people: &[Person],
    existing: &[Assignment],
    all_slots: &[DutySlot],
    weights: &AlgorithmWeights,
) -> Vec<AssignmentResult> {
    let mut pass = RolePass {
        slot,
        role,
        weights,
        pool: people
            .iter()
            .filter(|p| p.eligible_for(role))
            .filter(|p| !calendar::is_blocked(&p.blocked_dates, slot.date, slot.is_weekend()))
            .collect(),
        stats: compute_stats(people, existing, all_slots, role),
        filled: BTreeSet::new(),
        results: Vec::new(),
    };

    let locked_main = locked_seats(existing, slot, role, false);
    pass.filled.extend(locked_main.iter().map(|id| (*id).clone()));
    pass.fill(false, needed.saturating_sub(locked_main.len() as u32));

    if include_reserve {
        let locked_reserve = locked_seats(existing, slot, role, true);
        pass.filled.extend(locked_reserve.iter().map(|id| (*id).clone()));
        pass.fill(true, needed.saturating_sub(locked_reserve.len() as u32));
    }

    pass.results
}

fn locked_seats<'a>(
    existing: &'a [Assignment],
    slot: &DutySlot,
    role: Role,
    is_reserve: bool,
) -> Vec<&'a PersonId> {
    existing
        .iter()
        .filter(|a| a.slot_id == slot.id && a.role == role && a.is_reserve == is_reserve)
        .filter(|a| a.is_locked)
        .map(|a| &a.person_id)
        .collect()
}

/// État d'une passe pour un rôle sur un créneau.
struct RolePass<'a> {
    slot: &'a DutySlot,
    role: Role,
    weights: &'a AlgorithmWeights,
    pool: Vec<&'a Person>,
    stats: StatsMap,
    /// Personnes déjà assises sur ce créneau pour ce rôle.
    filled: BTreeSet<PersonId>,
    results: Vec<AssignmentResult>,
}

impl RolePass<'_> {
    fn fill(&mut self, is_reserve: bool, seats: u32) {
        for _ in 0..seats {
            let Some(best) = self.pick(is_reserve) else {
                warn!(
                    slot = self.slot.id.as_str(),
                    date = %self.slot.date,
                    role = %self.role,
                    reserve = is_reserve,
                    "no candidate available"
                );
                self.results.push(AssignmentResult::unfilled(self.role, is_reserve));
                continue;
            };

            debug!(
                slot = self.slot.id.as_str(),
                date = %self.slot.date,
                role = %self.role,
                reserve = is_reserve,
                person = best.person_id.as_str(),
                cost = best.cost,
                "seat filled"
            );
            self.filled.insert(best.person_id.clone());
            if let Some(entry) = self.stats.get_mut(&best.person_id) {
                entry.record(self.slot, is_reserve);
            }
            self.results.push(AssignmentResult::picked(best, self.role, is_reserve));
        }
    }

    fn pick(&self, is_reserve: bool) -> Option<Candidate> {
        let averages = Averages::of(&self.stats);
        let candidates: Vec<Candidate> = self
            .pool
            .iter()
            .filter(|p| !self.filled.contains(&p.id))
            .filter_map(|p| self.stats.get(&p.id))
            .map(|s| {
                cost::evaluate(s, self.slot, is_reserve, averages, self.weights, &self.filled)
            })
            .collect();

        for c in &candidates {
            trace!(
                slot = self.slot.id.as_str(),
                role = %self.role,
                reserve = is_reserve,
                person = c.person_id.as_str(),
                cost = c.cost,
                "candidate"
            );
        }

        select_best(candidates)
    }
}

/// Pourvoit tous les rôles d'un créneau : soldats, commandants, officiers.
pub fn assign_slot(
    slot: &DutySlot,
    people: &[Person],
    existing: &[Assignment],
    all_slots: &[DutySlot],
    weights: &AlgorithmWeights,
) -> Vec<AssignmentResult> {
    let mut ledger = RunLedger::new(existing);
    assign_slot_in(&mut ledger, slot, people, all_slots, weights)
}

/// Variante sur un registre partagé : chaque rôle voit les choix des rôles
/// précédents, et tous les choix restent dans `ledger` pour la suite.
pub(crate) fn assign_slot_in(
    ledger: &mut RunLedger,
    slot: &DutySlot,
    people: &[Person],
    all_slots: &[DutySlot],
    weights: &AlgorithmWeights,
) -> Vec<AssignmentResult> {
    let mut results = Vec::new();
    for role in Role::ALL {
        let needed = slot.needed(role);
        if needed == 0 {
            continue;
        }
        let picks = assign_role(
            slot,
            role,
            needed,
            true,
            people,
            ledger.assignments(),
            all_slots,
            weights,
        );
        ledger.record(slot, &picks);
        results.extend(picks);
    }
    results
}
