//! Fonctions de calendrier pures (pas d'I/O, pas de fuseau horaire).
//!
//! Les week-ends sont des blocs jeudi–samedi ancrés sur le jeudi ; les
//! semaines commencent le dimanche.

use crate::model::DutyType;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeSet;

/// Les trois jours couverts par un bloc week-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekendSpan {
    pub thursday: NaiveDate,
    pub friday: NaiveDate,
    pub saturday: NaiveDate,
}

impl WeekendSpan {
    pub fn days(&self) -> [NaiveDate; 3] {
        [self.thursday, self.friday, self.saturday]
    }
}

pub fn weekend_span(thursday: NaiveDate) -> WeekendSpan {
    WeekendSpan {
        thursday,
        friday: add_days(thursday, 1),
        saturday: add_days(thursday, 2),
    }
}

/// Dimanche précédent (ou le jour même), utilisé comme identifiant de semaine.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days().abs()
}

/// Jours occupés par un créneau : la date seule, ou les trois jours du week-end.
pub fn covered_dates(date: NaiveDate, kind: DutyType) -> Vec<NaiveDate> {
    match kind {
        DutyType::Regular => vec![date],
        DutyType::Weekend => weekend_span(date).days().to_vec(),
    }
}

pub fn is_blocked(blocked: &BTreeSet<NaiveDate>, date: NaiveDate, is_weekend: bool) -> bool {
    if !is_weekend {
        return blocked.contains(&date);
    }
    weekend_span(date).days().iter().any(|d| blocked.contains(d))
}

/// Parse strict `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parse `YYYY-MM` en (année, mois).
pub fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    month_bounds(year, month).map(|_| (year, month))
}

/// Premier et dernier jour d'un mois.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

fn add_days(date: NaiveDate, n: u64) -> NaiveDate {
    date.checked_add_days(Days::new(n)).unwrap_or(NaiveDate::MAX)
}
