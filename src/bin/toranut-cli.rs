#![forbid(unsafe_code)]
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use toranut::{
    calendar, io,
    model::{AlgorithmWeights, AssignmentId, DutyType, Headcount, Person, PersonId, Role, SlotId},
    scheduler::{ClearFilter, GenerateRequest, Scheduler, SlotFilter},
    storage::{JsonStorage, Storage},
    template::{load_template_from_file, plan_slots, SlotTemplate},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des tours de garde (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de roster
    #[arg(long, global = true, default_value = "roster.json")]
    roster: String,

    #[command(subcommand)]
    cmd: Commands,
}

/// Surcharges des poids de la fonction de coût
#[derive(Args, Debug)]
struct WeightArgs {
    #[arg(long)]
    fairness_weight: Option<f64>,
    #[arg(long)]
    gap_weight: Option<f64>,
    #[arg(long)]
    consecutive_weekend_penalty: Option<f64>,
    #[arg(long)]
    same_week_reserve_penalty: Option<f64>,
}

impl WeightArgs {
    fn is_empty(&self) -> bool {
        self.fairness_weight.is_none()
            && self.gap_weight.is_none()
            && self.consecutive_weekend_penalty.is_none()
            && self.same_week_reserve_penalty.is_none()
    }

    fn apply(&self, mut base: AlgorithmWeights) -> AlgorithmWeights {
        if let Some(v) = self.fairness_weight {
            base.fairness_weight = v;
        }
        if let Some(v) = self.gap_weight {
            base.gap_weight = v;
        }
        if let Some(v) = self.consecutive_weekend_penalty {
            base.consecutive_weekend_penalty = v;
        }
        if let Some(v) = self.same_week_reserve_penalty {
            base.same_week_reserve_penalty = v;
        }
        base
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter une personne
    AddPerson {
        #[arg(long)]
        name: String,
        /// liste "soldier,commander,officer"
        #[arg(long)]
        roles: String,
        #[arg(long)]
        inactive: bool,
    },

    /// Importer des personnes depuis un CSV
    ImportPeople {
        #[arg(long)]
        csv: String,
    },

    /// Bloquer des dates pour une personne
    Block {
        #[arg(long)]
        person: String,
        /// liste "YYYY-MM-DD,YYYY-MM-DD,..."
        #[arg(long)]
        dates: String,
    },

    /// Débloquer des dates
    Unblock {
        #[arg(long)]
        person: String,
        #[arg(long)]
        dates: String,
    },

    /// Modifier une personne (activité, rôles)
    EditPerson {
        #[arg(long)]
        name: String,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        add_roles: Option<String>,
        #[arg(long)]
        remove_roles: Option<String>,
    },

    /// Supprimer une personne et ses affectations
    RemovePerson {
        #[arg(long)]
        name: String,
    },

    /// Lister les personnes
    People,

    /// Créer un créneau
    AddSlot {
        /// YYYY-MM-DD (jeudi pour un week-end)
        #[arg(long)]
        date: String,
        /// regular | weekend
        #[arg(long = "type", default_value = "regular")]
        kind: String,
        #[arg(long, default_value_t = 1)]
        soldiers: u32,
        #[arg(long, default_value_t = 1)]
        commanders: u32,
        #[arg(long, default_value_t = 1)]
        officers: u32,
    },

    /// Modifier les effectifs d'un créneau (valeurs absentes inchangées)
    EditSlot {
        #[arg(long)]
        slot: String,
        #[arg(long)]
        soldiers: Option<u32>,
        #[arg(long)]
        commanders: Option<u32>,
        #[arg(long)]
        officers: Option<u32>,
    },

    /// Supprimer un créneau et ses affectations
    RemoveSlot {
        #[arg(long)]
        slot: String,
    },

    /// Importer des créneaux depuis un CSV
    ImportSlots {
        #[arg(long)]
        csv: String,
    },

    /// Créer les créneaux d'une période à partir d'un gabarit
    PlanSlots {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Gabarit JSON (défaut : semaine standard)
        #[arg(long)]
        template: Option<String>,
    },

    /// Verrouiller (ou déverrouiller) un créneau ou une affectation
    Lock {
        #[arg(long, conflicts_with = "assignment")]
        slot: Option<String>,
        #[arg(long)]
        assignment: Option<String>,
        #[arg(long)]
        unlock: bool,
    },

    /// Générer les affectations manquantes
    Generate {
        /// Limiter à un mois "YYYY-MM"
        #[arg(long, conflicts_with = "slot_ids")]
        month: Option<String>,
        /// liste "id1,id2,..."
        #[arg(long)]
        slot_ids: Option<String>,
        /// Supprimer d'abord les affectations non verrouillées
        #[arg(long)]
        regenerate: bool,
        #[command(flatten)]
        weights: WeightArgs,
    },

    /// Affecter une personne à la main
    Assign {
        #[arg(long)]
        slot: String,
        #[arg(long)]
        person: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        reserve: bool,
        #[arg(long)]
        locked: bool,
    },

    /// Supprimer une affectation
    Unassign {
        #[arg(long)]
        assignment: String,
    },

    /// Supprimer des affectations en lot
    Clear {
        #[arg(long)]
        slot: Option<String>,
        #[arg(long)]
        role: Option<String>,
        /// true = réserves seulement, false = principaux seulement
        #[arg(long)]
        reserve: Option<bool>,
        #[arg(long)]
        unlocked_only: bool,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Échanger les titulaires de deux affectations
    Swap {
        #[arg(long)]
        a: String,
        #[arg(long)]
        b: String,
    },

    /// Tableau d'équité par rôle
    Justice {
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Afficher ou modifier les poids enregistrés
    Settings {
        #[command(flatten)]
        weights: WeightArgs,
    },

    /// Vérifier les conflits
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.roster)?;
    let mut scheduler = Scheduler::with_roster(storage.load_or_default()?);

    let code = match cli.cmd {
        Commands::AddPerson {
            name,
            roles,
            inactive,
        } => {
            if scheduler.find_person_by_name(&name).is_some() {
                bail!("person already exists: {}", name);
            }
            let mut person = Person::new(name.trim());
            for role in parse_roles(&roles)? {
                person.set_role(role, true);
            }
            person.is_active = !inactive;
            println!("{}", person.id.as_str());
            scheduler.add_people(vec![person]);
            storage.save(scheduler.roster())?;
            0
        }
        Commands::ImportPeople { csv } => {
            let people = io::import_people_csv(csv)?;
            println!("Imported {} person(s)", people.len());
            scheduler.add_people(people);
            storage.save(scheduler.roster())?;
            0
        }
        Commands::Block { person, dates } => {
            let pid = person_id(&scheduler, &person)?;
            let dates = parse_dates(&dates)?;
            scheduler.block_dates(&pid, dates)?;
            storage.save(scheduler.roster())?;
            0
        }
        Commands::Unblock { person, dates } => {
            let pid = person_id(&scheduler, &person)?;
            let removed = scheduler.unblock_dates(&pid, parse_dates(&dates)?)?;
            println!("Unblocked {} date(s)", removed);
            storage.save(scheduler.roster())?;
            0
        }
        Commands::EditPerson {
            name,
            active,
            add_roles,
            remove_roles,
        } => {
            let pid = person_id(&scheduler, &name)?;
            if let Some(active) = active {
                scheduler.set_active(&pid, active)?;
            }
            for (list, held) in [(add_roles, true), (remove_roles, false)] {
                if let Some(list) = list {
                    for role in parse_roles(&list)? {
                        scheduler.set_role(&pid, role, held)?;
                    }
                }
            }
            storage.save(scheduler.roster())?;
            0
        }
        Commands::RemovePerson { name } => {
            let pid = person_id(&scheduler, &name)?;
            scheduler.remove_person(&pid)?;
            storage.save(scheduler.roster())?;
            0
        }
        Commands::People => {
            for p in &scheduler.roster().people {
                let roles: Vec<&str> = p.roles().map(Role::as_str).collect();
                println!(
                    "{} | {} [{}]{}",
                    p.id.as_str(),
                    p.name,
                    roles.join(","),
                    if p.is_active { "" } else { " (inactive)" }
                );
            }
            0
        }
        Commands::AddSlot {
            date,
            kind,
            soldiers,
            commanders,
            officers,
        } => {
            let date = parse_date(&date)?;
            let kind: DutyType = kind.parse().map_err(|e: String| anyhow!(e))?;
            let headcount = Headcount {
                soldiers,
                commanders,
                officers,
            };
            let id = scheduler.create_slot(date, kind, headcount)?;
            println!("{}", id.as_str());
            storage.save(scheduler.roster())?;
            0
        }
        Commands::EditSlot {
            slot,
            soldiers,
            commanders,
            officers,
        } => {
            let id = SlotId::new(slot);
            let current = scheduler
                .roster()
                .find_slot(&id)
                .ok_or_else(|| anyhow!("unknown slot: {}", id.as_str()))?;
            let headcount = Headcount {
                soldiers: soldiers.unwrap_or(current.soldiers_needed),
                commanders: commanders.unwrap_or(current.commanders_needed),
                officers: officers.unwrap_or(current.officers_needed),
            };
            scheduler.update_headcount(&id, headcount)?;
            storage.save(scheduler.roster())?;
            0
        }
        Commands::RemoveSlot { slot } => {
            let removed = scheduler.remove_slot(&SlotId::new(slot))?;
            println!("Removed slot and {} assignment(s)", removed);
            storage.save(scheduler.roster())?;
            0
        }
        Commands::ImportSlots { csv } => {
            let slots = io::import_slots_csv(csv)?;
            let report = scheduler.add_slots(slots);
            println!(
                "Imported {} slot(s), skipped {} duplicate(s)",
                report.created.len(),
                report.skipped.len()
            );
            storage.save(scheduler.roster())?;
            0
        }
        Commands::PlanSlots {
            start,
            end,
            template,
        } => {
            let template = match template {
                Some(path) => load_template_from_file(path)?,
                None => SlotTemplate::default(),
            };
            let slots = plan_slots(&template, parse_date(&start)?, parse_date(&end)?)?;
            let report = scheduler.add_slots(slots);
            println!(
                "Planned {} slot(s) from '{}', skipped {} existing",
                report.created.len(),
                template.name,
                report.skipped.len()
            );
            storage.save(scheduler.roster())?;
            0
        }
        Commands::Lock {
            slot,
            assignment,
            unlock,
        } => {
            match (slot, assignment) {
                (Some(id), _) => scheduler.set_slot_locked(&SlotId::new(id), !unlock)?,
                (None, Some(id)) => {
                    scheduler.set_assignment_locked(&AssignmentId::new(id), !unlock)?
                }
                (None, None) => bail!("--slot or --assignment is required"),
            }
            storage.save(scheduler.roster())?;
            0
        }
        Commands::Generate {
            month,
            slot_ids,
            regenerate,
            weights,
        } => {
            let filter = if let Some(raw) = month {
                let (year, month) = calendar::parse_month(&raw)
                    .ok_or_else(|| anyhow!("invalid month (expected YYYY-MM): {}", raw))?;
                SlotFilter::Month { year, month }
            } else if let Some(list) = slot_ids {
                SlotFilter::Ids(
                    list.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(SlotId::new)
                        .collect(),
                )
            } else {
                SlotFilter::All
            };
            let request = GenerateRequest {
                filter,
                regenerate,
                weights: (!weights.is_empty()).then(|| weights.apply(scheduler.weights())),
            };
            let report = scheduler.generate(&request)?;
            storage.save(scheduler.roster())?;

            println!(
                "Processed {} slot(s), created {} assignment(s)",
                report.processed_slots,
                report.created.len()
            );
            if report.skipped_duplicates > 0 {
                println!("Skipped {} duplicate seat(s)", report.skipped_duplicates);
            }
            let mut missing_main = 0;
            for notice in report.unfilled() {
                if !notice.is_reserve {
                    missing_main += 1;
                }
                eprintln!(
                    "UNFILLED {} {}{}",
                    notice.date,
                    notice.role,
                    if notice.is_reserve { " (reserve)" } else { "" }
                );
            }
            // Code 2 = WARNING/INCOMPLETE
            if missing_main > 0 {
                2
            } else {
                0
            }
        }
        Commands::Assign {
            slot,
            person,
            role,
            reserve,
            locked,
        } => {
            let pid = person_id(&scheduler, &person)?;
            let role: Role = role.parse().map_err(|e: String| anyhow!(e))?;
            let id = scheduler.assign(&SlotId::new(slot), &pid, role, reserve)?;
            if locked {
                scheduler.set_assignment_locked(&id, true)?;
            }
            println!("{}", id.as_str());
            storage.save(scheduler.roster())?;
            0
        }
        Commands::Unassign { assignment } => {
            scheduler.unassign(&AssignmentId::new(assignment))?;
            storage.save(scheduler.roster())?;
            0
        }
        Commands::Clear {
            slot,
            role,
            reserve,
            unlocked_only,
        } => {
            let filter = ClearFilter {
                slot: slot.map(SlotId::new),
                role: role
                    .map(|r| r.parse::<Role>().map_err(|e| anyhow!(e)))
                    .transpose()?,
                is_reserve: reserve,
                unlocked_only,
            };
            let removed = scheduler.clear_assignments(&filter);
            println!("Removed {} assignment(s)", removed);
            storage.save(scheduler.roster())?;
            0
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_roster_json(path, scheduler.roster())?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, scheduler.roster())?;
            }
            // impression compacte
            let roster = scheduler.roster();
            let mut slots: Vec<_> = roster.slots.iter().collect();
            slots.sort_by_key(|s| (s.date, s.kind));
            for s in slots {
                println!(
                    "{} | {} {}{}",
                    s.id.as_str(),
                    s.date,
                    s.kind,
                    if s.is_locked { " [locked]" } else { "" }
                );
                for a in roster.assignments_for_slot(&s.id) {
                    let name = roster
                        .find_person_by_id(&a.person_id)
                        .map(|p| p.name.as_str())
                        .unwrap_or("-");
                    println!(
                        "    {}{} → {} ({}){}",
                        a.role,
                        if a.is_reserve { " reserve" } else { "" },
                        name,
                        a.id.as_str(),
                        if a.is_locked { " [locked]" } else { "" }
                    );
                }
            }
            0
        }
        Commands::Swap { a, b } => {
            scheduler.swap(&AssignmentId::new(a), &AssignmentId::new(b))?;
            storage.save(scheduler.roster())?;
            0
        }
        Commands::Justice { out_csv } => {
            let table = scheduler.justice();
            if let Some(path) = out_csv {
                io::export_justice_csv(path, &table)?;
            }
            for role in &table.roles {
                println!(
                    "{} (avg days {:.2}, avg weekends {:.2})",
                    role.role, role.averages.days, role.averages.weekends
                );
                for row in &role.rows {
                    println!(
                        "    {} | days {} ({:+.2}) | weekends {} ({:+.2}) | reserve {}/{}",
                        row.name,
                        row.days_count,
                        row.days_gap_from_avg,
                        row.weekends_count,
                        row.weekends_gap_from_avg,
                        row.reserve_days_count,
                        row.reserve_weekends_count
                    );
                }
            }
            0
        }
        Commands::Settings { weights } => {
            if !weights.is_empty() {
                let updated = weights.apply(scheduler.weights());
                scheduler.set_weights(updated);
                storage.save(scheduler.roster())?;
            }
            println!("{}", serde_json::to_string_pretty(&scheduler.weights())?);
            0
        }
        Commands::Check { report } => {
            let conflicts = scheduler.audit();
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    eprintln!(
                        "{} slot={} person={} assignment={}",
                        c.kind.as_str(),
                        c.slot.as_str(),
                        c.person.as_str(),
                        c.assignment.as_str()
                    );
                }
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["assignment_id", "slot_id", "person_id", "kind"])?;
                    for c in &conflicts {
                        w.write_record([
                            c.assignment.as_str(),
                            c.slot.as_str(),
                            c.person.as_str(),
                            c.kind.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
    };

    std::process::exit(code);
}

fn person_id(scheduler: &Scheduler, name: &str) -> Result<PersonId> {
    scheduler
        .find_person_by_name(name)
        .map(|p| p.id.clone())
        .ok_or_else(|| anyhow!("unknown person: {}", name))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    calendar::parse_date(raw).with_context(|| format!("invalid date (expected YYYY-MM-DD): {raw}"))
}

fn parse_dates(raw: &str) -> Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_date)
        .collect()
}

fn parse_roles(raw: &str) -> Result<Vec<Role>> {
    let roles = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Role>().map_err(|e| anyhow!(e)))
        .collect::<Result<Vec<_>>>()?;
    if roles.is_empty() {
        bail!("at least one role is required");
    }
    Ok(roles)
}
