use super::util;
use crate::calendar;
use crate::model::{Assignment, DutySlot, DutyType, Person, PersonId, Role};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Compteurs d'une personne pour un rôle, reconstruits à chaque passe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonStats {
    pub person_id: PersonId,
    pub role: Role,
    pub days_count: u32,
    pub weekends_count: u32,
    pub reserve_days_count: u32,
    pub reserve_weekends_count: u32,
    /// Dernière garde principale (les réserves ne comptent pas).
    pub last_assigned_date: Option<NaiveDate>,
    pub last_weekend_date: Option<NaiveDate>,
    pub occupied_dates: BTreeSet<NaiveDate>,
    /// Dimanches des semaines où la personne tient déjà un siège.
    pub occupied_weeks: BTreeSet<NaiveDate>,
}

impl PersonStats {
    pub fn new(person_id: PersonId, role: Role) -> Self {
        Self {
            person_id,
            role,
            days_count: 0,
            weekends_count: 0,
            reserve_days_count: 0,
            reserve_weekends_count: 0,
            last_assigned_date: None,
            last_weekend_date: None,
            occupied_dates: BTreeSet::new(),
            occupied_weeks: BTreeSet::new(),
        }
    }

    /// Nombre de gardes principales du type donné.
    pub fn main_count(&self, kind: DutyType) -> u32 {
        match kind {
            DutyType::Regular => self.days_count,
            DutyType::Weekend => self.weekends_count,
        }
    }

    /// Prend en compte un siège tenu sur `slot`.
    pub fn record(&mut self, slot: &DutySlot, is_reserve: bool) {
        let weekend = slot.is_weekend();
        if is_reserve {
            if weekend {
                self.reserve_weekends_count += 1;
            } else {
                self.reserve_days_count += 1;
            }
        } else {
            if weekend {
                self.weekends_count += 1;
                self.last_weekend_date = latest(self.last_weekend_date, slot.date);
            } else {
                self.days_count += 1;
            }
            self.last_assigned_date = latest(self.last_assigned_date, slot.date);
        }

        self.occupied_dates.extend(calendar::covered_dates(slot.date, slot.kind));
        self.occupied_weeks.insert(calendar::week_start(slot.date));
    }
}

fn latest(current: Option<NaiveDate>, candidate: NaiveDate) -> Option<NaiveDate> {
    Some(current.map_or(candidate, |c| c.max(candidate)))
}

pub type StatsMap = BTreeMap<PersonId, PersonStats>;

/// Statistiques par personne pour `role`, à partir des affectations existantes.
///
/// Une entrée par personne active titulaire du rôle, même sans historique.
/// Les affectations d'autres rôles sont ignorées ; celles dont le créneau est
/// absent de `slots` sont sautées.
pub fn compute_stats(
    people: &[Person],
    assignments: &[Assignment],
    slots: &[DutySlot],
    role: Role,
) -> StatsMap {
    let mut stats: StatsMap = people
        .iter()
        .filter(|p| p.eligible_for(role))
        .map(|p| (p.id.clone(), PersonStats::new(p.id.clone(), role)))
        .collect();

    let by_id = util::slot_lookup(slots);

    for assignment in assignments.iter().filter(|a| a.role == role) {
        let Some(entry) = stats.get_mut(&assignment.person_id) else {
            continue;
        };
        let Some(slot) = by_id.get(&assignment.slot_id) else {
            debug!(
                assignment = assignment.id.as_str(),
                slot = assignment.slot_id.as_str(),
                "assignment references unknown slot, skipped"
            );
            continue;
        };
        entry.record(slot, assignment.is_reserve);
    }

    stats
}

/// Moyennes de gardes principales sur les personnes éligibles d'un rôle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Averages {
    pub days: f64,
    pub weekends: f64,
}

impl Averages {
    pub fn of(stats: &StatsMap) -> Self {
        if stats.is_empty() {
            return Self::default();
        }
        let n = stats.len() as f64;
        let days: u32 = stats.values().map(|s| s.days_count).sum();
        let weekends: u32 = stats.values().map(|s| s.weekends_count).sum();
        Self {
            days: f64::from(days) / n,
            weekends: f64::from(weekends) / n,
        }
    }

    pub fn for_kind(&self, kind: DutyType) -> f64 {
        match kind {
            DutyType::Regular => self.days,
            DutyType::Weekend => self.weekends,
        }
    }
}
