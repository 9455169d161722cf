use crate::model::{DutySlot, DutyType, Headcount};
use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_regular_weekdays() -> Vec<u8> {
    // dimanche → mercredi ; jeudi–samedi relèvent du bloc week-end
    vec![0, 1, 2, 3]
}

fn default_true() -> bool {
    true
}

fn default_weekend_headcount() -> Headcount {
    Headcount {
        soldiers: 2,
        commanders: 1,
        officers: 1,
    }
}

/// Gabarit de calendrier : quels jours ouvrent un créneau, avec quels effectifs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Jours de semaine (0 = dimanche … 6 = samedi) ouvrant un créneau simple.
    #[serde(default = "default_regular_weekdays")]
    pub regular_weekdays: Vec<u8>,
    /// Un bloc week-end par jeudi.
    #[serde(default = "default_true")]
    pub weekend: bool,
    #[serde(default)]
    pub regular: Headcount,
    #[serde(default = "default_weekend_headcount")]
    pub weekend_headcount: Headcount,
}

impl Default for SlotTemplate {
    fn default() -> Self {
        Self {
            id: "default".into(),
            name: "Semaine standard".into(),
            description: None,
            regular_weekdays: default_regular_weekdays(),
            weekend: true,
            regular: Headcount::default(),
            weekend_headcount: default_weekend_headcount(),
        }
    }
}

impl SlotTemplate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            bail!("template id cannot be empty");
        }
        if self.name.trim().is_empty() {
            bail!("template name cannot be empty");
        }
        if self.regular_weekdays.is_empty() && !self.weekend {
            bail!("template must open at least one slot per week");
        }
        if let Some(day) = self.regular_weekdays.iter().find(|d| **d > 6) {
            bail!("invalid weekday {day} (expected 0 = Sunday .. 6 = Saturday)");
        }
        if self.weekend && self.regular_weekdays.iter().any(|d| (4..=6).contains(d)) {
            bail!("regular weekdays overlap the Thursday–Saturday weekend block");
        }
        Ok(())
    }
}

/// Créneaux de `start` à `end` inclus selon le gabarit, triés par date.
pub fn plan_slots(
    template: &SlotTemplate,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DutySlot>> {
    template.validate()?;
    if end < start {
        bail!("end date must be after start date");
    }

    let mut slots = Vec::new();
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        let day = weekday.num_days_from_sunday() as u8;

        if template.regular_weekdays.contains(&day) {
            slots.push(DutySlot::new(current, DutyType::Regular, template.regular));
        }
        if template.weekend && weekday == Weekday::Thu {
            slots.push(DutySlot::new(
                current,
                DutyType::Weekend,
                template.weekend_headcount,
            ));
        }
        current = current.succ_opt().context("date overflow")?;
    }

    Ok(slots)
}

pub fn export_template_json<P: AsRef<Path>>(path: P, template: &SlotTemplate) -> Result<()> {
    let json = serde_json::to_string_pretty(template)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_template_from_file<P: AsRef<Path>>(path: P) -> Result<SlotTemplate> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading template {}", path.display()))?;
    let template: SlotTemplate = serde_json::from_slice(&data)
        .with_context(|| format!("parsing template {}", path.display()))?;
    template.validate()?;
    Ok(template)
}
