#![forbid(unsafe_code)]
//! Toranut — planification locale des tours de garde (sans BD).
//!
//! - Rôles soldat / commandant / officier, sièges principaux et réserves.
//! - Affectation gloutonne par coût (équité, écart, week-ends, réserve).
//! - Stockage fichiers (JSON/CSV), audit et échanges.
//! - Dates calendaires sans fuseau (`NaiveDate`).

pub mod calendar;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;
pub mod template;

pub use model::{
    AlgorithmWeights, Assignment, AssignmentId, DutySlot, DutyType, Headcount, Person, PersonId,
    Role, Roster, Settings, Severity, SlotId, Warning, WarningKind,
};
pub use scheduler::{
    assign_role, assign_slot, can_swap, generate_full_schedule, justice_table, AssignmentResult,
    ClearFilter, Conflict, ConflictKind, GenerateReport, GenerateRequest, SchedError, Schedule, Scheduler,
    SlotFilter, SwapRejection,
};
pub use storage::{JsonStorage, Storage};
pub use template::{export_template_json, load_template_from_file, plan_slots, SlotTemplate};
