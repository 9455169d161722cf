mod assignment;
mod conflicts;
mod cost;
mod fairness;
mod generate;
mod mutate;
mod stats;
mod types;
mod util;

pub use assignment::{assign_role, assign_slot, select_best};
pub use cost::{evaluate, MAX_EXPECTED_GAP_DAYS};
pub use fairness::{justice_table, JusticeRow, JusticeTable, RoleJustice};
pub use generate::{generate_full_schedule, generate_schedule};
pub use mutate::can_swap;
pub use stats::{compute_stats, Averages, PersonStats, StatsMap};
pub use types::{
    AssignmentResult, Candidate, ClearFilter, Conflict, ConflictKind, GenerateReport, GenerateRequest, Notice,
    SchedError, Schedule, SlotFilter, SlotImport, SlotOutcome, SwapRejection,
};

use crate::model::{
    AlgorithmWeights, Assignment, AssignmentId, DutySlot, DutyType, Headcount, Person, PersonId,
    Role, Roster, SlotId,
};
use chrono::NaiveDate;

/// Scheduler : encapsule un Roster et applique les résultats du moteur.
#[derive(Debug, Default)]
pub struct Scheduler {
    roster: Roster,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            roster: Roster::default(),
        }
    }

    pub fn with_roster(roster: Roster) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }
    pub fn into_roster(self) -> Roster {
        self.roster
    }

    pub fn add_people(&mut self, people: Vec<Person>) {
        self.roster.people.extend(people);
    }

    pub fn find_person_by_name(&self, name: &str) -> Option<&Person> {
        self.roster.find_person_by_name(name)
    }

    fn person_mut(&mut self, person: &PersonId) -> Result<&mut Person, SchedError> {
        self.roster
            .find_person_mut_by_id(person)
            .ok_or_else(|| SchedError::UnknownPerson(person.as_str().to_string()))
    }

    pub fn set_active(&mut self, person: &PersonId, active: bool) -> Result<(), SchedError> {
        self.person_mut(person)?.is_active = active;
        Ok(())
    }

    pub fn set_role(
        &mut self,
        person: &PersonId,
        role: Role,
        held: bool,
    ) -> Result<(), SchedError> {
        self.person_mut(person)?.set_role(role, held);
        Ok(())
    }

    /// Retire une personne et toutes ses affectations.
    pub fn remove_person(&mut self, person: &PersonId) -> Result<Person, SchedError> {
        let Some(pos) = self.roster.people.iter().position(|p| &p.id == person) else {
            return Err(SchedError::UnknownPerson(person.as_str().to_string()));
        };
        self.roster.assignments.retain(|a| &a.person_id != person);
        Ok(self.roster.people.remove(pos))
    }

    pub fn weights(&self) -> AlgorithmWeights {
        self.roster.settings.weights
    }
    pub fn set_weights(&mut self, weights: AlgorithmWeights) {
        self.roster.settings.weights = weights;
    }

    /// Ajoute des dates bloquées à une personne.
    pub fn block_dates(
        &mut self,
        person: &PersonId,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Result<(), SchedError> {
        self.person_mut(person)?.blocked_dates.extend(dates);
        Ok(())
    }

    /// Débloque des dates ; renvoie le nombre de dates effectivement retirées.
    pub fn unblock_dates(
        &mut self,
        person: &PersonId,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Result<usize, SchedError> {
        let p = self.person_mut(person)?;
        Ok(dates
            .into_iter()
            .filter(|d| p.blocked_dates.remove(d))
            .count())
    }

    /// Crée un créneau ; un seul créneau par (date, type).
    pub fn create_slot(
        &mut self,
        date: NaiveDate,
        kind: DutyType,
        headcount: Headcount,
    ) -> Result<SlotId, SchedError> {
        if self.slot_exists(date, kind) {
            return Err(SchedError::DuplicateSlot(date, kind));
        }
        let slot = DutySlot::new(date, kind, headcount);
        let id = slot.id.clone();
        self.roster.slots.push(slot);
        Ok(id)
    }

    /// Ajout en lot : les doublons (date, type) sont ignorés et rapportés.
    pub fn add_slots(&mut self, slots: Vec<DutySlot>) -> SlotImport {
        let mut report = SlotImport::default();
        for slot in slots {
            if self.slot_exists(slot.date, slot.kind) {
                report.skipped.push((slot.date, slot.kind));
                continue;
            }
            report.created.push(slot.id.clone());
            self.roster.slots.push(slot);
        }
        self.roster.slots.sort_by_key(|s| s.date);
        report
    }

    fn slot_exists(&self, date: NaiveDate, kind: DutyType) -> bool {
        self.roster
            .slots
            .iter()
            .any(|s| s.date == date && s.kind == kind)
    }

    pub fn set_slot_locked(&mut self, slot: &SlotId, locked: bool) -> Result<(), SchedError> {
        let Some(pos) = util::find_slot_index(&self.roster.slots, slot) else {
            return Err(SchedError::UnknownSlot(slot.as_str().to_string()));
        };
        self.roster.slots[pos].is_locked = locked;
        Ok(())
    }

    /// Modifie les effectifs requis ; les affectations existantes restent en place.
    pub fn update_headcount(
        &mut self,
        slot: &SlotId,
        headcount: Headcount,
    ) -> Result<(), SchedError> {
        let s = self
            .roster
            .find_slot_mut(slot)
            .ok_or_else(|| SchedError::UnknownSlot(slot.as_str().to_string()))?;
        s.soldiers_needed = headcount.soldiers;
        s.commanders_needed = headcount.commanders;
        s.officers_needed = headcount.officers;
        Ok(())
    }

    /// Supprime un créneau et ses affectations ; renvoie le nombre d'affectations supprimées.
    pub fn remove_slot(&mut self, slot: &SlotId) -> Result<usize, SchedError> {
        let Some(pos) = util::find_slot_index(&self.roster.slots, slot) else {
            return Err(SchedError::UnknownSlot(slot.as_str().to_string()));
        };
        self.roster.slots.remove(pos);
        Ok(mutate::clear(
            self,
            &ClearFilter {
                slot: Some(slot.clone()),
                ..ClearFilter::default()
            },
        ))
    }

    pub fn set_assignment_locked(
        &mut self,
        id: &AssignmentId,
        locked: bool,
    ) -> Result<(), SchedError> {
        let a = self
            .roster
            .find_assignment_mut(id)
            .ok_or_else(|| SchedError::UnknownAssignment(id.as_str().to_string()))?;
        a.is_locked = locked;
        Ok(())
    }

    /// Génère et enregistre les affectations des créneaux sélectionnés.
    pub fn generate(&mut self, request: &GenerateRequest) -> Result<GenerateReport, SchedError> {
        generate::generate(self, request)
    }

    /// Affecte une personne à un siège à la main.
    pub fn assign(
        &mut self,
        slot: &SlotId,
        person: &PersonId,
        role: Role,
        is_reserve: bool,
    ) -> Result<AssignmentId, SchedError> {
        mutate::assign(self, slot, person, role, is_reserve)
    }

    pub fn unassign(&mut self, id: &AssignmentId) -> Result<Assignment, SchedError> {
        mutate::unassign(self, id)
    }

    pub fn clear_assignments(&mut self, filter: &ClearFilter) -> usize {
        mutate::clear(self, filter)
    }

    /// Échange les titulaires de deux affectations.
    pub fn swap(&mut self, a: &AssignmentId, b: &AssignmentId) -> Result<(), SchedError> {
        mutate::swap(self, a, b)
    }

    pub fn justice(&self) -> JusticeTable {
        justice_table(&self.roster)
    }

    pub fn audit(&self) -> Vec<Conflict> {
        conflicts::audit(self)
    }
}
