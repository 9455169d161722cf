use crate::calendar;
use crate::model::{DutySlot, DutyType, Headcount, Person, Role, Roster};
use crate::scheduler::JusticeTable;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Import de personnes depuis CSV: header `name,roles[,active][,blocked_dates]`
///
/// `roles` : liste séparée par `;` (`soldier;commander`) ;
/// `blocked_dates` : dates `YYYY-MM-DD` séparées par `;`.
pub fn import_people_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Person>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid people row (empty name)");
        }
        let mut person = Person::new(name);
        for raw in field(&rec, 1).split(';').filter(|r| !r.trim().is_empty()) {
            let role: Role = raw
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid roles for {name}"))?;
            person.set_role(role, true);
        }
        let active = field(&rec, 2);
        if !active.is_empty() {
            person.is_active = parse_bool(active)
                .with_context(|| format!("invalid active value for {name}"))?;
        }
        let blocked = field(&rec, 3);
        if !blocked.is_empty() {
            person.blocked_dates = parse_dates_strict(blocked)
                .with_context(|| format!("invalid blocked_dates for {name}"))?
                .into_iter()
                .collect();
        }
        out.push(person);
    }
    Ok(out)
}

fn field<'a>(rec: &'a StringRecord, idx: usize) -> &'a str {
    rec.get(idx).map(str::trim).unwrap_or("")
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn parse_dates_strict(raw: &str) -> anyhow::Result<Vec<chrono::NaiveDate>> {
    raw.split(';')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            calendar::parse_date(chunk).with_context(|| format!("invalid date: {chunk}"))
        })
        .collect()
}

fn parse_count(raw: &str, default: u32) -> anyhow::Result<u32> {
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse().with_context(|| format!("invalid headcount: {raw}"))
}

/// Import de créneaux: header `date,type[,soldiers,commanders,officers[,locked]]`
///
/// Effectifs absents : 1 par rôle.
pub fn import_slots_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<DutySlot>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let defaults = Headcount::default();
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let date = field(&rec, 0);
        let date = calendar::parse_date(date).with_context(|| format!("invalid date: {date}"))?;
        let kind: DutyType = field(&rec, 1).parse().map_err(anyhow::Error::msg)?;
        let headcount = Headcount {
            soldiers: parse_count(field(&rec, 2), defaults.soldiers)?,
            commanders: parse_count(field(&rec, 3), defaults.commanders)?,
            officers: parse_count(field(&rec, 4), defaults.officers)?,
        };
        let mut slot = DutySlot::new(date, kind, headcount);
        let locked = field(&rec, 5);
        if !locked.is_empty() {
            slot.is_locked = parse_bool(locked)
                .with_context(|| format!("invalid locked value for {date}"))?;
        }
        out.push(slot);
    }
    Ok(out)
}

/// Export JSON du roster (jolie mise en forme)
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// CSV des affectations, par date de créneau puis rôle:
/// header `assignment_id,slot_id,date,type,role,reserve,person,locked,warnings`
pub fn write_assignments_csv<W: Write>(writer: W, roster: &Roster) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record([
        "assignment_id",
        "slot_id",
        "date",
        "type",
        "role",
        "reserve",
        "person",
        "locked",
        "warnings",
    ])?;

    let mut rows: Vec<_> = roster
        .assignments
        .iter()
        .filter_map(|a| roster.find_slot(&a.slot_id).map(|s| (s, a)))
        .collect();
    rows.sort_by_key(|(s, a)| (s.date, s.kind, a.role, a.is_reserve));

    for (slot, a) in rows {
        let person = roster
            .find_person_by_id(&a.person_id)
            .map(|p| p.name.as_str())
            .unwrap_or("");
        let date = slot.date.to_string();
        let warnings = a
            .warnings
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        w.write_record([
            a.id.as_str(),
            a.slot_id.as_str(),
            date.as_str(),
            slot.kind.as_str(),
            a.role.as_str(),
            bool_str(a.is_reserve),
            person,
            bool_str(a.is_locked),
            warnings.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_assignments_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_assignments_csv(file, roster)
}

/// CSV du tableau d'équité: une ligne par (rôle, personne).
pub fn write_justice_csv<W: Write>(writer: W, table: &JusticeTable) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record([
        "role",
        "person",
        "days",
        "weekends",
        "reserve_days",
        "reserve_weekends",
        "last_assigned",
        "days_gap",
        "weekends_gap",
    ])?;
    for role in &table.roles {
        for row in &role.rows {
            let last = row
                .last_assigned_date
                .map(|d| d.to_string())
                .unwrap_or_default();
            w.write_record(&[
                row.role.to_string(),
                row.name.clone(),
                row.days_count.to_string(),
                row.weekends_count.to_string(),
                row.reserve_days_count.to_string(),
                row.reserve_weekends_count.to_string(),
                last,
                format!("{:.2}", row.days_gap_from_avg),
                format!("{:.2}", row.weekends_gap_from_avg),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

pub fn export_justice_csv<P: AsRef<Path>>(path: P, table: &JusticeTable) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_justice_csv(file, table)
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}
