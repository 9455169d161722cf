use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifiant fort pour Person
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(String);

impl PersonId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour DutySlot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(String);

impl SlotId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Assignment
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentId(String);

impl AssignmentId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    /// Identifiant local à une génération, jamais persisté.
    pub fn provisional(seq: u64) -> Self {
        Self(format!("run-{seq}"))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Niveau de rôle. L'ordre de `ALL` est l'ordre de traitement d'une slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Soldier,
    Commander,
    Officer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Soldier, Role::Commander, Role::Officer];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Soldier => "soldier",
            Role::Commander => "commander",
            Role::Officer => "officer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soldier" => Ok(Role::Soldier),
            "commander" => Ok(Role::Commander),
            "officer" => Ok(Role::Officer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Type de tour : un jour simple, ou un bloc week-end ancré sur le jeudi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DutyType {
    Regular,
    Weekend,
}

impl DutyType {
    pub fn is_weekend(self) -> bool {
        matches!(self, DutyType::Weekend)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DutyType::Regular => "regular",
            DutyType::Weekend => "weekend",
        }
    }
}

impl fmt::Display for DutyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DutyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(DutyType::Regular),
            "weekend" => Ok(DutyType::Weekend),
            other => Err(format!("unknown duty type: {other}")),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Personne (membre du tableau de garde)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub is_soldier: bool,
    #[serde(default)]
    pub is_commander: bool,
    #[serde(default)]
    pub is_officer: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub blocked_dates: BTreeSet<NaiveDate>,
}

impl Person {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self::with_id(PersonId::random(), name)
    }

    pub fn with_id<N: Into<String>>(id: PersonId, name: N) -> Self {
        Self {
            id,
            name: name.into(),
            is_soldier: false,
            is_commander: false,
            is_officer: false,
            is_active: true,
            notes: None,
            blocked_dates: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.set_role(role, true);
        self
    }

    pub fn blocked_on(mut self, date: NaiveDate) -> Self {
        self.blocked_dates.insert(date);
        self
    }

    pub fn holds(&self, role: Role) -> bool {
        match role {
            Role::Soldier => self.is_soldier,
            Role::Commander => self.is_commander,
            Role::Officer => self.is_officer,
        }
    }

    pub fn set_role(&mut self, role: Role, value: bool) {
        match role {
            Role::Soldier => self.is_soldier = value,
            Role::Commander => self.is_commander = value,
            Role::Officer => self.is_officer = value,
        }
    }

    /// Actif et titulaire du rôle.
    pub fn eligible_for(&self, role: Role) -> bool {
        self.is_active && self.holds(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.holds(*r))
    }
}

/// Effectifs requis par rôle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headcount {
    pub soldiers: u32,
    pub commanders: u32,
    pub officers: u32,
}

impl Default for Headcount {
    fn default() -> Self {
        Self {
            soldiers: 1,
            commanders: 1,
            officers: 1,
        }
    }
}

/// Créneau de garde
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutySlot {
    pub id: SlotId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: DutyType,
    pub soldiers_needed: u32,
    pub commanders_needed: u32,
    pub officers_needed: u32,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DutySlot {
    pub fn new(date: NaiveDate, kind: DutyType, headcount: Headcount) -> Self {
        Self::with_id(SlotId::random(), date, kind, headcount)
    }

    pub fn with_id(id: SlotId, date: NaiveDate, kind: DutyType, headcount: Headcount) -> Self {
        Self {
            id,
            date,
            kind,
            soldiers_needed: headcount.soldiers,
            commanders_needed: headcount.commanders,
            officers_needed: headcount.officers,
            is_locked: false,
            notes: None,
        }
    }

    pub fn needed(&self, role: Role) -> u32 {
        match role {
            Role::Soldier => self.soldiers_needed,
            Role::Commander => self.commanders_needed,
            Role::Officer => self.officers_needed,
        }
    }

    pub fn is_weekend(&self) -> bool {
        self.kind.is_weekend()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    FairnessDeviation,
    ShortGap,
    ConsecutiveWeekend,
    SameWeekReserve,
    NoAlternatives,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::FairnessDeviation => "fairness_deviation",
            WarningKind::ShortGap => "short_gap",
            WarningKind::ConsecutiveWeekend => "consecutive_weekend",
            WarningKind::SameWeekReserve => "same_week_reserve",
            WarningKind::NoAlternatives => "no_alternatives",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Annotation attachée à un choix du moteur. Purement indicative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub severity: Severity,
}

impl Warning {
    pub fn new<M: Into<String>>(kind: WarningKind, message: M, severity: Severity) -> Self {
        Self {
            kind,
            message: message.into(),
            severity,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// Affectation d'une personne à un créneau pour un rôle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub slot_id: SlotId,
    pub person_id: PersonId,
    pub role: Role,
    #[serde(default)]
    pub is_reserve: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl Assignment {
    pub fn new(slot_id: SlotId, person_id: PersonId, role: Role, is_reserve: bool) -> Self {
        Self {
            id: AssignmentId::random(),
            slot_id,
            person_id,
            role,
            is_reserve,
            is_locked: false,
            warnings: Vec::new(),
        }
    }

    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    /// Même siège : (slot, personne, rôle, réserve).
    pub fn same_seat(&self, other: &Assignment) -> bool {
        self.slot_id == other.slot_id
            && self.person_id == other.person_id
            && self.role == other.role
            && self.is_reserve == other.is_reserve
    }
}

/// Poids de la fonction de coût. Aucune validation : appliqués tels quels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmWeights {
    pub fairness_weight: f64,
    pub gap_weight: f64,
    pub consecutive_weekend_penalty: f64,
    pub same_week_reserve_penalty: f64,
}

impl Default for AlgorithmWeights {
    fn default() -> Self {
        Self {
            fairness_weight: 10.0,
            gap_weight: 5.0,
            consecutive_weekend_penalty: 20.0,
            same_week_reserve_penalty: 50.0,
        }
    }
}

/// Réglages persistés avec le roster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub weights: AlgorithmWeights,
}

/// Roster complet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub slots: Vec<DutySlot>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub settings: Settings,
}

impl Roster {
    pub fn find_person_by_name<'a>(&'a self, name: &str) -> Option<&'a Person> {
        self.people.iter().find(|p| p.name == name)
    }
    pub fn find_person_by_id<'a>(&'a self, id: &PersonId) -> Option<&'a Person> {
        self.people.iter().find(|p| &p.id == id)
    }
    pub fn find_person_mut_by_id(&mut self, id: &PersonId) -> Option<&mut Person> {
        self.people.iter_mut().find(|p| &p.id == id)
    }
    pub fn find_slot<'a>(&'a self, id: &SlotId) -> Option<&'a DutySlot> {
        self.slots.iter().find(|s| &s.id == id)
    }
    pub fn find_slot_mut(&mut self, id: &SlotId) -> Option<&mut DutySlot> {
        self.slots.iter_mut().find(|s| &s.id == id)
    }
    pub fn find_assignment<'a>(&'a self, id: &AssignmentId) -> Option<&'a Assignment> {
        self.assignments.iter().find(|a| &a.id == id)
    }
    pub fn find_assignment_mut(&mut self, id: &AssignmentId) -> Option<&mut Assignment> {
        self.assignments.iter_mut().find(|a| &a.id == id)
    }
    pub fn assignments_for_slot<'a>(
        &'a self,
        id: &'a SlotId,
    ) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments.iter().filter(move |a| &a.slot_id == id)
    }
}
