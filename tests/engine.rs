#![forbid(unsafe_code)]
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};
use toranut::scheduler::{compute_stats, evaluate, select_best, Averages, Candidate};
use toranut::{
    assign_role, assign_slot, generate_full_schedule, AlgorithmWeights, Assignment, DutySlot,
    DutyType, Headcount, Person, PersonId, Role, SlotId, WarningKind,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn soldier(id: &str) -> Person {
    Person::with_id(PersonId::new(id), id.to_uppercase()).with_role(Role::Soldier)
}

fn soldiers_only(n: u32) -> Headcount {
    Headcount {
        soldiers: n,
        commanders: 0,
        officers: 0,
    }
}

fn slot(id: &str, date: NaiveDate, kind: DutyType, n: u32) -> DutySlot {
    DutySlot::with_id(SlotId::new(id), date, kind, soldiers_only(n))
}

fn pid(id: &str) -> Option<PersonId> {
    Some(PersonId::new(id))
}

fn main_seat(slot: &DutySlot, person: &str) -> Assignment {
    Assignment::new(slot.id.clone(), PersonId::new(person), Role::Soldier, false)
}

#[test]
fn single_seat_goes_to_first_equal_candidate() {
    let people = vec![soldier("a"), soldier("b"), soldier("c")];
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);
    let weights = AlgorithmWeights::default();

    let results = assign_role(&s, Role::Soldier, 1, false, &people, &[], &[s.clone()], &weights);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].person_id, pid("a"));
    assert_eq!(results[0].cost, 0.0);
    assert!(results[0].warnings.is_empty());
    assert!(!results[0].is_reserve);
}

#[test]
fn main_and_reserve_are_distinct() {
    let people = vec![soldier("a"), soldier("b"), soldier("c")];
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);

    let schedule = generate_full_schedule(
        &[s.clone()],
        &people,
        &[],
        &AlgorithmWeights::default(),
    );
    let results = schedule.get(&s.id).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].person_id, pid("a"));
    assert!(!results[0].is_reserve);
    assert_eq!(results[1].person_id, pid("b"));
    assert!(results[1].is_reserve);
}

#[test]
fn blocked_person_is_never_picked() {
    let people = vec![
        soldier("a").blocked_on(d(2025, 10, 6)),
        soldier("b"),
        soldier("c"),
    ];
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);

    let results = assign_slot(&s, &people, &[], &[s.clone()], &AlgorithmWeights::default());
    let picked: Vec<_> = results.iter().map(|r| r.person_id.clone()).collect();
    assert_eq!(picked, vec![pid("b"), pid("c")]);
}

#[test]
fn weekend_blocked_on_friday_excludes_person() {
    let people = vec![soldier("a").blocked_on(d(2025, 10, 10)), soldier("b")];
    let s = slot("w1", d(2025, 10, 9), DutyType::Weekend, 1);

    let results = assign_slot(&s, &people, &[], &[s.clone()], &AlgorithmWeights::default());
    assert_eq!(results[0].person_id, pid("b"));
    assert!(results.iter().all(|r| r.person_id != pid("a")));
}

#[test]
fn inactive_people_are_ignored() {
    let mut a = soldier("a");
    a.is_active = false;
    let people = vec![a, soldier("b")];
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);

    let results = assign_slot(&s, &people, &[], &[s.clone()], &AlgorithmWeights::default());
    assert_eq!(results[0].person_id, pid("b"));
    assert_eq!(results[1].person_id, None);
}

#[test]
fn consecutive_weekend_adds_penalty() {
    let previous = slot("w1", d(2025, 10, 2), DutyType::Weekend, 1);
    let next = slot("w2", d(2025, 10, 9), DutyType::Weekend, 1);
    let slots = vec![previous.clone(), next.clone()];
    let people = vec![soldier("p")];
    let history = vec![main_seat(&previous, "p")];

    let stats = compute_stats(&people, &history, &slots, Role::Soldier);
    let p = &stats[&PersonId::new("p")];
    assert_eq!(p.last_weekend_date, Some(d(2025, 10, 2)));
    let averages = Averages::of(&stats);

    let weights = AlgorithmWeights::default();
    let c = evaluate(p, &next, false, averages, &weights, &BTreeSet::new());
    // 7 jours d'écart : (14 - 7) * 5 + 20
    assert_eq!(c.cost, 55.0);
    assert!(c
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::ConsecutiveWeekend));

    let relaxed = AlgorithmWeights {
        consecutive_weekend_penalty: 0.0,
        ..weights
    };
    let c0 = evaluate(p, &next, false, averages, &relaxed, &BTreeSet::new());
    assert_eq!(c.cost - c0.cost, 20.0);
}

#[test]
fn same_week_reserve_penalty() {
    let sunday = slot("s1", d(2025, 10, 5), DutyType::Regular, 1);
    let wednesday = slot("s2", d(2025, 10, 8), DutyType::Regular, 1);
    let slots = vec![sunday.clone(), wednesday.clone()];
    let people = vec![soldier("p")];
    let history = vec![main_seat(&sunday, "p")];

    let stats = compute_stats(&people, &history, &slots, Role::Soldier);
    let p = &stats[&PersonId::new("p")];
    let averages = Averages::of(&stats);
    let weights = AlgorithmWeights::default();

    let c = evaluate(p, &wednesday, true, averages, &weights, &BTreeSet::new());
    // écart 3 jours : 11 * 5, semaine occupée : +50, récence : -1.5
    assert_eq!(c.cost, 103.5);
    assert!(c
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::SameWeekReserve));

    let relaxed = AlgorithmWeights {
        same_week_reserve_penalty: 0.0,
        ..weights
    };
    let c0 = evaluate(p, &wednesday, true, averages, &relaxed, &BTreeSet::new());
    assert_eq!(c0.cost, 53.5);

    // un siège principal n'est pas concerné
    let main = evaluate(p, &wednesday, false, averages, &weights, &BTreeSet::new());
    assert_eq!(main.cost, 55.0);
}

#[test]
fn short_gap_and_deviation_warnings() {
    let first = slot("s1", d(2025, 10, 5), DutyType::Regular, 1);
    let second = slot("s2", d(2025, 10, 6), DutyType::Regular, 1);
    let third = slot("s3", d(2025, 10, 7), DutyType::Regular, 1);
    let slots = vec![first.clone(), second.clone(), third.clone()];
    let people: Vec<_> = ["p", "q", "r", "s", "t"].into_iter().map(soldier).collect();
    let history = vec![main_seat(&first, "p"), main_seat(&second, "p"), main_seat(&second, "p")];

    let stats = compute_stats(&people, &history, &slots, Role::Soldier);
    let p = &stats[&PersonId::new("p")];
    assert_eq!(p.days_count, 3);
    let averages = Averages::of(&stats);
    assert_eq!(averages.days, 0.6);

    let c = evaluate(
        p,
        &third,
        false,
        averages,
        &AlgorithmWeights::default(),
        &BTreeSet::new(),
    );
    let gap = c
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::ShortGap)
        .unwrap();
    assert_eq!(gap.message, "short gap: only 1 day(s) since last duty");
    let deviation = c
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::FairnessDeviation)
        .unwrap();
    assert_eq!(deviation.message, "deviation from average: +2.4");
}

#[test]
fn excluded_candidate_costs_infinity() {
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);
    let people = vec![soldier("p")];
    let stats = compute_stats(&people, &[], &[s.clone()], Role::Soldier);
    let excluded: BTreeSet<_> = [PersonId::new("p")].into_iter().collect();

    let c = evaluate(
        &stats[&PersonId::new("p")],
        &s,
        false,
        Averages::of(&stats),
        &AlgorithmWeights::default(),
        &excluded,
    );
    assert!(c.is_excluded());
}

#[test]
fn select_best_prefers_first_on_ties_and_skips_infinity() {
    let c = |id: &str, cost: f64| Candidate {
        person_id: PersonId::new(id),
        cost,
        warnings: Vec::new(),
    };
    let best = select_best(vec![c("x", f64::INFINITY), c("a", 1.0), c("b", 1.0)]).unwrap();
    assert_eq!(best.person_id, PersonId::new("a"));
    assert!(select_best(vec![c("x", f64::INFINITY)]).is_none());
    assert!(select_best(Vec::new()).is_none());
}

#[test]
fn incremental_state_across_slots() {
    let people = vec![soldier("a"), soldier("b"), soldier("c")];
    let slots = vec![
        slot("s1", d(2025, 10, 6), DutyType::Regular, 1),
        slot("s2", d(2025, 10, 7), DutyType::Regular, 1),
    ];

    let schedule = generate_full_schedule(&slots, &people, &[], &AlgorithmWeights::default());
    let first: Vec<_> = schedule
        .get(&SlotId::new("s1"))
        .unwrap()
        .iter()
        .map(|r| r.person_id.clone())
        .collect();
    let second: Vec<_> = schedule
        .get(&SlotId::new("s2"))
        .unwrap()
        .iter()
        .map(|r| r.person_id.clone())
        .collect();
    assert_eq!(first, vec![pid("a"), pid("b")]);
    assert_eq!(second, vec![pid("b"), pid("c")]);
}

#[test]
fn slots_are_processed_in_date_order() {
    let people = vec![soldier("a"), soldier("b"), soldier("c")];
    // ordre d'entrée inversé
    let slots = vec![
        slot("s2", d(2025, 10, 7), DutyType::Regular, 1),
        slot("s1", d(2025, 10, 6), DutyType::Regular, 1),
    ];

    let schedule = generate_full_schedule(&slots, &people, &[], &AlgorithmWeights::default());
    let order: Vec<_> = schedule.iter().map(|o| o.slot_id.clone()).collect();
    assert_eq!(order, vec![SlotId::new("s1"), SlotId::new("s2")]);
    assert_eq!(schedule.get(&SlotId::new("s1")).unwrap()[0].person_id, pid("a"));
}

#[test]
fn generation_is_deterministic() {
    let people: Vec<_> = ["a", "b", "c", "d", "e"].into_iter().map(soldier).collect();
    let mut slots = Vec::new();
    for day in 5..=18 {
        let date = d(2025, 10, day);
        slots.push(slot(&format!("r{day}"), date, DutyType::Regular, 1));
        if day == 9 || day == 16 {
            slots.push(slot(&format!("w{day}"), date, DutyType::Weekend, 2));
        }
    }

    let weights = AlgorithmWeights::default();
    let one = generate_full_schedule(&slots, &people, &[], &weights);
    let two = generate_full_schedule(&slots, &people, &[], &weights);
    assert_eq!(one, two);
}

#[test]
fn capacity_fills_distinct_people_then_reports_missing_reserve() {
    let people = vec![soldier("a"), soldier("b"), soldier("c")];
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 2);

    let results = assign_slot(&s, &people, &[], &[s.clone()], &AlgorithmWeights::default());
    let mains: Vec<_> = results.iter().filter(|r| !r.is_reserve).collect();
    let reserves: Vec<_> = results.iter().filter(|r| r.is_reserve).collect();
    assert_eq!(mains.len(), 2);
    assert_eq!(reserves.len(), 2);

    let seated: HashSet<_> = results.iter().filter_map(|r| r.person_id.clone()).collect();
    assert_eq!(seated.len(), 3);

    let missing = reserves.iter().find(|r| !r.is_filled()).unwrap();
    assert_eq!(missing.cost, f64::INFINITY);
    assert_eq!(missing.warnings[0].kind, WarningKind::NoAlternatives);
    assert_eq!(missing.warnings[0].message, "no reserve available");
}

#[test]
fn unfilled_main_seat_is_reported() {
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);
    let results = assign_slot(&s, &[], &[], &[s.clone()], &AlgorithmWeights::default());
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| !r.is_filled()));
    assert_eq!(results[0].warnings[0].message, "no candidates available");
}

#[test]
fn lighter_load_wins_regardless_of_input_order() {
    let old1 = slot("p1", d(2025, 9, 5), DutyType::Regular, 1);
    let old2 = slot("p2", d(2025, 9, 6), DutyType::Regular, 1);
    let next = slot("n", d(2025, 10, 6), DutyType::Regular, 1);
    let slots = vec![old1.clone(), old2.clone(), next.clone()];
    let history = vec![
        main_seat(&old2, "a"),
        main_seat(&old1, "b"),
        main_seat(&old2, "b"),
    ];
    let people = vec![soldier("b"), soldier("a")];

    let results = assign_role(
        &next,
        Role::Soldier,
        1,
        false,
        &people,
        &history,
        &slots,
        &AlgorithmWeights::default(),
    );
    assert_eq!(results[0].person_id, pid("a"));
}

#[test]
fn locked_seat_is_kept_and_excluded_from_reserve() {
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);
    let people = vec![soldier("x"), soldier("y"), soldier("z")];
    let existing = vec![main_seat(&s, "x").locked()];

    let results = assign_role(
        &s,
        Role::Soldier,
        1,
        true,
        &people,
        &existing,
        &[s.clone()],
        &AlgorithmWeights::default(),
    );
    assert_eq!(results.len(), 1);
    assert!(results[0].is_reserve);
    assert_eq!(results[0].person_id, pid("y"));
}

#[test]
fn locked_slot_is_skipped() {
    let mut s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);
    s.is_locked = true;
    let people = vec![soldier("a")];

    let schedule = generate_full_schedule(&[s.clone()], &people, &[], &AlgorithmWeights::default());
    assert!(schedule.is_empty());
    assert!(!schedule.contains(&s.id));
}

#[test]
fn roles_are_filled_independently() {
    let people = vec![
        Person::with_id(PersonId::new("s"), "S").with_role(Role::Soldier),
        Person::with_id(PersonId::new("c"), "C").with_role(Role::Commander),
        Person::with_id(PersonId::new("o"), "O")
            .with_role(Role::Officer)
            .with_role(Role::Commander),
    ];
    let s = DutySlot::with_id(
        SlotId::new("s1"),
        d(2025, 10, 6),
        DutyType::Regular,
        Headcount::default(),
    );

    let results = assign_slot(&s, &people, &[], &[s.clone()], &AlgorithmWeights::default());
    let seat = |role: Role, reserve: bool| {
        results
            .iter()
            .find(|r| r.role == role && r.is_reserve == reserve)
            .and_then(|r| r.person_id.clone())
    };
    assert_eq!(seat(Role::Soldier, false), pid("s"));
    assert_eq!(seat(Role::Soldier, true), None);
    assert_eq!(seat(Role::Commander, false), pid("c"));
    assert_eq!(seat(Role::Commander, true), pid("o"));
    assert_eq!(seat(Role::Officer, false), pid("o"));
}

#[test]
fn stats_split_main_and_reserve_history() {
    let weekend = slot("w1", d(2025, 10, 9), DutyType::Weekend, 1);
    let monday = slot("s1", d(2025, 10, 13), DutyType::Regular, 1);
    let later = slot("s2", d(2025, 10, 20), DutyType::Regular, 1);
    let slots = vec![weekend.clone(), monday.clone(), later.clone()];
    let people = vec![soldier("p")];
    let history = vec![
        main_seat(&weekend, "p"),
        Assignment::new(monday.id.clone(), PersonId::new("p"), Role::Soldier, true),
        // autre rôle : ignoré
        Assignment::new(later.id.clone(), PersonId::new("p"), Role::Officer, false),
        // créneau disparu : ignoré
        Assignment::new(SlotId::new("gone"), PersonId::new("p"), Role::Soldier, false),
    ];

    let stats = compute_stats(&people, &history, &slots, Role::Soldier);
    let p = &stats[&PersonId::new("p")];
    assert_eq!(p.weekends_count, 1);
    assert_eq!(p.days_count, 0);
    assert_eq!(p.reserve_days_count, 1);
    assert_eq!(p.reserve_weekends_count, 0);
    // la réserve du 13 ne déplace pas la dernière garde
    assert_eq!(p.last_assigned_date, Some(d(2025, 10, 9)));
    assert_eq!(p.last_weekend_date, Some(d(2025, 10, 9)));

    let dates: Vec<_> = p.occupied_dates.iter().copied().collect();
    assert_eq!(
        dates,
        vec![d(2025, 10, 9), d(2025, 10, 10), d(2025, 10, 11), d(2025, 10, 13)]
    );
    let weeks: Vec<_> = p.occupied_weeks.iter().copied().collect();
    assert_eq!(weeks, vec![d(2025, 10, 5), d(2025, 10, 12)]);
}

#[test]
fn stats_only_cover_eligible_people() {
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);
    let mut off = soldier("off");
    off.is_active = false;
    let officer = Person::with_id(PersonId::new("o"), "O").with_role(Role::Officer);
    let people = vec![soldier("p"), off, officer];

    let stats = compute_stats(&people, &[], &[s], Role::Soldier);
    assert_eq!(stats.keys().collect::<Vec<_>>(), vec![&PersonId::new("p")]);
}

#[test]
fn never_assigned_reserve_gets_bonus() {
    let s = slot("s1", d(2025, 10, 6), DutyType::Regular, 1);
    let people = vec![soldier("p")];
    let stats = compute_stats(&people, &[], &[s.clone()], Role::Soldier);
    let p = &stats[&PersonId::new("p")];
    assert_eq!(p.last_assigned_date, None);

    let weights = AlgorithmWeights::default();
    let averages = Averages::of(&stats);
    let reserve = evaluate(p, &s, true, averages, &weights, &BTreeSet::new());
    assert_eq!(reserve.cost, -100.0);
    assert!(reserve.warnings.is_empty());

    let main = evaluate(p, &s, false, averages, &weights, &BTreeSet::new());
    assert_eq!(main.cost, 0.0);
}

#[test]
fn undefined_cost_is_excluded() {
    let c = |id: &str, cost: f64| Candidate {
        person_id: PersonId::new(id),
        cost,
        warnings: Vec::new(),
    };
    assert!(c("x", f64::NAN).is_excluded());
    assert!(!c("x", 1e12).is_excluded());

    let picked = select_best(vec![c("a", f64::NAN), c("b", 3.0)]).unwrap();
    assert_eq!(picked.person_id, PersonId::new("b"));
    assert!(select_best(vec![c("a", f64::NAN), c("b", f64::INFINITY)]).is_none());
}
