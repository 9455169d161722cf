use super::stats::{Averages, PersonStats};
use super::types::Candidate;
use crate::calendar;
use crate::model::{AlgorithmWeights, DutySlot, PersonId, Severity, Warning, WarningKind};
use std::collections::BTreeSet;

/// Au-delà de cet écart (en jours) depuis la dernière garde, plus de pénalité.
pub const MAX_EXPECTED_GAP_DAYS: i64 = 14;
const SHORT_GAP_DAYS: i64 = 3;
const CONSECUTIVE_WEEKEND_DAYS: i64 = 7;
const RESERVE_RECENCY_FACTOR: f64 = 0.5;
const NEVER_ASSIGNED_RESERVE_BONUS: f64 = 100.0;

/// Coût d'affectation de `stats` sur un siège de `slot` ; plus bas = meilleur.
///
/// Les termes s'additionnent :
/// 1. écart à la moyenne du rôle (par type de jour), pondéré par `fairness_weight` ;
/// 2. écart trop court depuis la dernière garde principale ;
/// 3. week-ends consécutifs ;
/// 4. pour une réserve : semaine déjà occupée, et bonus d'ancienneté.
///
/// Une personne déjà présente dans `excluded` reçoit un coût infini.
pub fn evaluate(
    stats: &PersonStats,
    slot: &DutySlot,
    is_reserve: bool,
    averages: Averages,
    weights: &AlgorithmWeights,
    excluded: &BTreeSet<PersonId>,
) -> Candidate {
    if excluded.contains(&stats.person_id) {
        return Candidate {
            person_id: stats.person_id.clone(),
            cost: f64::INFINITY,
            warnings: Vec::new(),
        };
    }

    let mut cost = 0.0;
    let mut warnings = Vec::new();

    let deviation = f64::from(stats.main_count(slot.kind)) - averages.for_kind(slot.kind);
    cost += deviation * weights.fairness_weight;
    if deviation > 1.0 {
        let severity = if deviation > 2.0 {
            Severity::High
        } else {
            Severity::Medium
        };
        warnings.push(Warning::new(
            WarningKind::FairnessDeviation,
            format!("deviation from average: +{deviation:.1}"),
            severity,
        ));
    }

    let days_since_last = stats
        .last_assigned_date
        .map(|last| calendar::days_between(last, slot.date));

    if let Some(days) = days_since_last {
        let gap_penalty = (MAX_EXPECTED_GAP_DAYS - days).max(0);
        cost += gap_penalty as f64 * weights.gap_weight;
        if days < SHORT_GAP_DAYS {
            let severity = if days < 2 {
                Severity::High
            } else {
                Severity::Medium
            };
            warnings.push(Warning::new(
                WarningKind::ShortGap,
                format!("short gap: only {days} day(s) since last duty"),
                severity,
            ));
        }
    }

    if slot.is_weekend() {
        if let Some(last_weekend) = stats.last_weekend_date {
            if calendar::days_between(last_weekend, slot.date) <= CONSECUTIVE_WEEKEND_DAYS {
                cost += weights.consecutive_weekend_penalty;
                warnings.push(Warning::new(
                    WarningKind::ConsecutiveWeekend,
                    "consecutive weekend",
                    Severity::High,
                ));
            }
        }
    }

    if is_reserve {
        if stats
            .occupied_weeks
            .contains(&calendar::week_start(slot.date))
        {
            cost += weights.same_week_reserve_penalty;
            warnings.push(Warning::new(
                WarningKind::SameWeekReserve,
                "already on duty this week",
                Severity::High,
            ));
        }

        cost -= match days_since_last {
            Some(days) => days as f64 * RESERVE_RECENCY_FACTOR,
            None => NEVER_ASSIGNED_RESERVE_BONUS,
        };
    }

    Candidate {
        person_id: stats.person_id.clone(),
        cost,
        warnings,
    }
}
