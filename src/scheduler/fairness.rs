use super::stats::{compute_stats, Averages};
use crate::model::{PersonId, Role, Roster};
use chrono::NaiveDate;
use serde::Serialize;

/// Ligne du tableau d'équité pour une personne et un rôle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JusticeRow {
    pub person_id: PersonId,
    pub name: String,
    pub role: Role,
    pub days_count: u32,
    pub weekends_count: u32,
    pub reserve_days_count: u32,
    pub reserve_weekends_count: u32,
    pub last_assigned_date: Option<NaiveDate>,
    pub days_gap_from_avg: f64,
    pub weekends_gap_from_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleJustice {
    pub role: Role,
    pub averages: Averages,
    pub rows: Vec<JusticeRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JusticeTable {
    pub roles: Vec<RoleJustice>,
}

impl JusticeTable {
    pub fn for_role(&self, role: Role) -> Option<&RoleJustice> {
        self.roles.iter().find(|r| r.role == role)
    }
}

/// Charge de chaque personne active par rôle, et son écart à la moyenne.
/// Lignes triées par charge principale décroissante.
pub fn justice_table(roster: &Roster) -> JusticeTable {
    let roles = Role::ALL
        .into_iter()
        .map(|role| role_justice(roster, role))
        .collect();
    JusticeTable { roles }
}

fn role_justice(roster: &Roster, role: Role) -> RoleJustice {
    let stats = compute_stats(&roster.people, &roster.assignments, &roster.slots, role);
    let averages = Averages::of(&stats);

    let mut rows: Vec<JusticeRow> = roster
        .people
        .iter()
        .filter_map(|p| stats.get(&p.id).map(|s| (p, s)))
        .map(|(p, s)| JusticeRow {
            person_id: p.id.clone(),
            name: p.name.clone(),
            role,
            days_count: s.days_count,
            weekends_count: s.weekends_count,
            reserve_days_count: s.reserve_days_count,
            reserve_weekends_count: s.reserve_weekends_count,
            last_assigned_date: s.last_assigned_date,
            days_gap_from_avg: f64::from(s.days_count) - averages.days,
            weekends_gap_from_avg: f64::from(s.weekends_count) - averages.weekends,
        })
        .collect();
    rows.sort_by_key(|r| std::cmp::Reverse(r.days_count + r.weekends_count));

    RoleJustice {
        role,
        averages,
        rows,
    }
}
