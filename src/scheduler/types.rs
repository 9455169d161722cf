use crate::model::{
    AlgorithmWeights, Assignment, AssignmentId, DutyType, PersonId, Role, Severity, SlotId, Warning,
    WarningKind,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Coût d'un candidat pour un siège donné.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub person_id: PersonId,
    pub cost: f64,
    pub warnings: Vec<Warning>,
}

impl Candidate {
    /// Coût infini (déjà assis) ou indéfini : jamais retenu.
    pub fn is_excluded(&self) -> bool {
        self.cost.is_nan() || self.cost == f64::INFINITY
    }
}

/// Résultat du moteur pour un siège. `person_id == None` : siège non pourvu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentResult {
    pub person_id: Option<PersonId>,
    pub role: Role,
    pub is_reserve: bool,
    pub cost: f64,
    pub warnings: Vec<Warning>,
}

impl AssignmentResult {
    pub(crate) fn picked(candidate: Candidate, role: Role, is_reserve: bool) -> Self {
        Self {
            person_id: Some(candidate.person_id),
            role,
            is_reserve,
            cost: candidate.cost,
            warnings: candidate.warnings,
        }
    }

    pub(crate) fn unfilled(role: Role, is_reserve: bool) -> Self {
        let message = if is_reserve {
            "no reserve available"
        } else {
            "no candidates available"
        };
        Self {
            person_id: None,
            role,
            is_reserve,
            cost: f64::INFINITY,
            warnings: vec![Warning::new(
                WarningKind::NoAlternatives,
                message,
                Severity::High,
            )],
        }
    }

    pub fn is_filled(&self) -> bool {
        self.person_id.is_some()
    }
}

/// Résultats d'un créneau, dans l'ordre soldats → commandants → officiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotOutcome {
    pub slot_id: SlotId,
    pub date: NaiveDate,
    pub kind: DutyType,
    pub results: Vec<AssignmentResult>,
}

/// Sortie de la génération : un `SlotOutcome` par créneau traité, par date croissante.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schedule {
    pub(crate) outcomes: Vec<SlotOutcome>,
}

impl Schedule {
    pub fn get(&self, slot_id: &SlotId) -> Option<&[AssignmentResult]> {
        self.outcomes
            .iter()
            .find(|o| &o.slot_id == slot_id)
            .map(|o| o.results.as_slice())
    }

    pub fn contains(&self, slot_id: &SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotOutcome> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Sièges restés vides, avec leur créneau.
    pub fn unfilled(&self) -> impl Iterator<Item = (&SlotOutcome, &AssignmentResult)> {
        self.outcomes
            .iter()
            .flat_map(|o| o.results.iter().map(move |r| (o, r)))
            .filter(|(_, r)| !r.is_filled())
    }
}

/// Sélection des créneaux à générer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotFilter {
    #[default]
    All,
    Month { year: i32, month: u32 },
    Ids(Vec<SlotId>),
}

/// Paramètres d'une génération via `Scheduler::generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub filter: SlotFilter,
    /// Supprime d'abord les affectations non verrouillées des créneaux sélectionnés.
    pub regenerate: bool,
    /// Remplace les poids enregistrés dans les réglages du roster.
    pub weights: Option<AlgorithmWeights>,
}

/// Avertissement remonté à l'appelant (siège vide ou choix annoté).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub slot_id: SlotId,
    pub date: NaiveDate,
    pub person_id: Option<PersonId>,
    pub role: Role,
    pub is_reserve: bool,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerateReport {
    pub processed_slots: usize,
    pub created: Vec<AssignmentId>,
    pub skipped_duplicates: usize,
    pub notices: Vec<Notice>,
}

impl GenerateReport {
    pub fn unfilled(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.person_id.is_none())
    }
}

/// Bilan d'un ajout de créneaux en lot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotImport {
    pub created: Vec<SlotId>,
    pub skipped: Vec<(NaiveDate, DutyType)>,
}

/// Critères d'effacement en lot ; `None` = pas de filtre sur ce champ.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearFilter {
    pub slot: Option<SlotId>,
    pub role: Option<Role>,
    pub is_reserve: Option<bool>,
    /// Épargne les affectations verrouillées.
    pub unlocked_only: bool,
}

impl ClearFilter {
    pub(crate) fn matches(&self, a: &Assignment) -> bool {
        self.slot.as_ref().map_or(true, |s| &a.slot_id == s)
            && self.role.map_or(true, |r| a.role == r)
            && self.is_reserve.map_or(true, |r| a.is_reserve == r)
            && !(self.unlocked_only && a.is_locked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    BlockedDate,      // affecté un jour bloqué
    DuplicateSeat,    // même (slot, personne, rôle, réserve) deux fois
    OverCapacity,     // plus de titulaires que requis
    UnknownReference, // slot ou personne introuvable
}

impl ConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::BlockedDate => "blocked",
            ConflictKind::DuplicateSeat => "duplicate",
            ConflictKind::OverCapacity => "capacity",
            ConflictKind::UnknownReference => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub assignment: AssignmentId,
    pub slot: SlotId,
    pub person: PersonId,
    pub kind: ConflictKind,
}

/// Motif de refus d'un échange.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRejection {
    #[error("role mismatch")]
    RoleMismatch,
    #[error("reserve mismatch")]
    ReserveMismatch,
    #[error("assignment locked")]
    Locked,
    #[error("person not found")]
    PersonNotFound,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("unknown person: {0}")]
    UnknownPerson(String),
    #[error("unknown slot: {0}")]
    UnknownSlot(String),
    #[error("unknown assignment: {0}")]
    UnknownAssignment(String),
    #[error("slot already exists: {0} ({1})")]
    DuplicateSlot(NaiveDate, DutyType),
    #[error("seat already assigned: {0} as {1}")]
    DuplicateSeat(String, Role),
    #[error("swap invalid: {0}")]
    SwapInvalid(#[from] SwapRejection),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
