//! End-to-end properties of produced schedules.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use duty_roster::config::EngineConfig;
use duty_roster::conflicts::ConflictDetector;
use duty_roster::engine::{
    DomainSnapshot, FailureKind, RunOutcome, SchedulingEngine, SchedulingMode, SchedulingRequest,
};
use duty_roster::feasibility::{ConstraintSet, TensorBuilder};
use duty_roster::fitness::Scorer;
use duty_roster::ga::{GeneticOptimizer, GeneticParams};
use duty_roster::models::{
    ConflictSubtype, DateRange, FixedPositionRule, ManualAssignment, Personnel, Position, TimeSlot,
};
use duty_roster::scheduler::{roster_to_schedule, GreedyAssigner};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
struct Instance {
    /// (has skill, available) per person.
    personnel: Vec<(bool, bool)>,
    /// Requires the skill, per position.
    positions: Vec<bool>,
    days: u64,
    fixed: Option<(usize, usize)>,
    manual: Option<(usize, usize, u8)>,
}

impl Instance {
    fn constraint_set(&self) -> ConstraintSet {
        let personnel = self
            .personnel
            .iter()
            .enumerate()
            .map(|(i, &(skill, available))| {
                let p = Personnel::new(format!("P{i}")).with_available(available);
                if skill {
                    p.with_skill("guard")
                } else {
                    p
                }
            })
            .collect::<Vec<_>>();
        let positions = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, &requires)| {
                let q = Position::new(format!("Q{i}"));
                if requires {
                    q.with_required_skill("guard")
                } else {
                    q
                }
            })
            .collect::<Vec<_>>();
        let horizon = DateRange::new(monday(), monday() + Days::new(self.days - 1));
        let mut set = ConstraintSet::new(horizon, personnel, positions);
        if let Some((p, q)) = self.fixed {
            let p = p % self.personnel.len();
            let q = q % self.positions.len();
            set = set.with_fixed_rule(
                FixedPositionRule::new("R1", format!("P{p}")).with_position(format!("Q{q}")),
            );
        }
        if let Some((p, q, slot)) = self.manual {
            let p = p % self.personnel.len();
            let q = q % self.positions.len();
            set = set.with_manual_assignment(ManualAssignment::new(
                "M1",
                format!("P{p}"),
                format!("Q{q}"),
                monday(),
                TimeSlot::new(slot).unwrap(),
            ));
        }
        set
    }
}

fn instance() -> impl Strategy<Value = Instance> {
    (
        prop::collection::vec((any::<bool>(), prop::bool::weighted(0.85)), 2..6),
        prop::collection::vec(any::<bool>(), 1..4),
        1u64..3,
        prop::option::of((0usize..6, 0usize..4)),
        prop::option::of((0usize..6, 0usize..4, 0u8..12)),
    )
        .prop_map(|(personnel, positions, days, fixed, manual)| Instance {
            personnel,
            positions,
            days,
            fixed,
            manual,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn greedy_never_double_books(inst in instance()) {
        let set = inst.constraint_set();
        let Ok(tensor) = TensorBuilder::new(&set).build() else {
            return Ok(());
        };
        let roster = GreedyAssigner::new(&tensor, &set.personnel).assign().roster;
        let schedule = roster_to_schedule(&tensor, &roster);
        prop_assert!(!schedule.has_double_booking());
        prop_assert_eq!(schedule.shift_count(), tensor.cell_count());
    }

    #[test]
    fn manual_assignments_are_honored(inst in instance()) {
        let set = inst.constraint_set();
        let Ok(tensor) = TensorBuilder::new(&set).build() else {
            return Ok(());
        };
        let roster = GreedyAssigner::new(&tensor, &set.personnel).assign().roster;
        let schedule = roster_to_schedule(&tensor, &roster);
        for m in set.enabled_manual_assignments() {
            let shift = schedule.shift_at(&m.position_id, m.date, m.slot).unwrap();
            prop_assert_eq!(shift.personnel_id.as_deref(), Some(m.personnel_id.as_str()));
        }
    }

    #[test]
    fn greedy_is_deterministic(inst in instance()) {
        let set = inst.constraint_set();
        let Ok(tensor) = TensorBuilder::new(&set).build() else {
            return Ok(());
        };
        let a = GreedyAssigner::new(&tensor, &set.personnel).assign();
        let rebuilt = TensorBuilder::new(&set).build().unwrap();
        let b = GreedyAssigner::new(&rebuilt, &set.personnel).assign();
        prop_assert_eq!(a.roster, b.roster);
        prop_assert_eq!(a.unassigned, b.unassigned);
    }

    #[test]
    fn detection_is_idempotent(inst in instance()) {
        let set = inst.constraint_set();
        let Ok(tensor) = TensorBuilder::new(&set).build() else {
            return Ok(());
        };
        let roster = GreedyAssigner::new(&tensor, &set.personnel).assign().roster;
        let schedule = roster_to_schedule(&tensor, &roster);
        let detector = ConflictDetector::new(&set, &tensor);
        let first = detector.detect(&schedule);
        prop_assert_eq!(&first, &detector.detect(&schedule));
        // A greedy schedule has no hard conflict.
        prop_assert!(first.iter().all(|c| !c.is_hard()), "{:?}", first);
    }

    #[test]
    fn genetic_refinement_never_regresses(inst in instance(), seed in any::<u64>()) {
        let set = inst.constraint_set();
        let Ok(tensor) = TensorBuilder::new(&set).build() else {
            return Ok(());
        };
        let greedy = GreedyAssigner::new(&tensor, &set.personnel).assign().roster;
        let scorer = Scorer::new(&tensor, &set);
        let params = GeneticParams::default()
            .with_population_size(10)
            .with_max_generations(10)
            .with_elite_count(1)
            .with_seed(seed);
        let outcome = GeneticOptimizer::new(&tensor, scorer, &params).run(&greedy).unwrap();
        prop_assert!(outcome.best_fitness() <= scorer.evaluate(&greedy));

        let schedule = roster_to_schedule(&tensor, &outcome.best.decode(&tensor));
        prop_assert!(!schedule.has_double_booking());
        for rule in &set.fixed_rules {
            prop_assert!(schedule
                .shifts_for_personnel(&rule.personnel_id)
                .iter()
                .filter(|s| !s.pinned)
                .all(|s| rule.admits(&s.position_id, s.slot)));
        }
    }
}

fn guard_store(personnel: usize, positions: usize) -> DomainSnapshot {
    let mut store = DomainSnapshot::new();
    for i in 1..=personnel {
        store = store.with_personnel(Personnel::new(format!("P{i}")).with_skill("guard"));
    }
    for i in 1..=positions {
        store = store.with_position(Position::new(format!("Q{i}")).with_required_skill("guard"));
    }
    store
}

fn guard_request(title: &str, personnel: usize, positions: usize, days: u64) -> SchedulingRequest {
    let horizon = DateRange::new(monday(), monday() + Days::new(days - 1));
    let mut request = SchedulingRequest::new(title, horizon);
    for i in 1..=personnel {
        request = request.with_personnel(format!("P{i}"));
    }
    for i in 1..=positions {
        request = request.with_position(format!("Q{i}"));
    }
    request
}

fn relaxed_engine() -> SchedulingEngine {
    SchedulingEngine::new(EngineConfig::default().with_min_rest_slots(0))
}

#[test]
fn scenario_three_posts_fill_in_ascending_order() {
    init_tracing();
    let result = relaxed_engine()
        .run_simple(&guard_request("A", 3, 3, 1), &guard_store(3, 3))
        .unwrap();
    assert!(result.success());
    assert_eq!(result.summary.unassigned(), 0);

    let schedule = result.schedule.unwrap();
    for slot in 0..2u8 {
        let slot = TimeSlot::new(slot).unwrap();
        let staff: Vec<_> = ["Q1", "Q2", "Q3"]
            .iter()
            .map(|q| schedule.shift_at(q, monday(), slot).unwrap().personnel_id.clone().unwrap())
            .collect();
        assert_eq!(staff, vec!["P1", "P2", "P3"]);
    }
}

#[test]
fn scenario_two_staff_three_posts_leaves_cells_unassigned() {
    init_tracing();
    let result = relaxed_engine()
        .run_simple(&guard_request("A2", 2, 3, 1), &guard_store(2, 3))
        .unwrap();
    // Unstaffed cells are not hard conflicts.
    assert!(result.success());
    let schedule = result.schedule.unwrap();
    assert!(!schedule.has_double_booking());
    assert_eq!(schedule.assigned_count(), 24);
    assert_eq!(result.summary.unassigned(), 12);
    assert!(result
        .conflicts
        .iter()
        .filter(|c| c.subtype == ConflictSubtype::Unfilled)
        .all(|c| c.cell.is_some()));
}

#[test]
fn scenario_fixed_rule_confines_personnel() {
    init_tracing();
    let store = guard_store(3, 2).with_fixed_rule(FixedPositionRule::new("R1", "P1").with_position("Q1"));
    let params = GeneticParams::default()
        .with_population_size(20)
        .with_max_generations(20)
        .with_seed(11);
    for mode in [SchedulingMode::GreedyOnly, SchedulingMode::Hybrid(params)] {
        let request = guard_request("B", 3, 2, 3).with_fixed_rule("R1").with_mode(mode);
        let result = relaxed_engine().run_simple(&request, &store).unwrap();
        assert!(result.success());
        let schedule = result.schedule.unwrap();
        let shifts = schedule.shifts_for_personnel("P1");
        assert!(!shifts.is_empty());
        assert!(shifts.iter().all(|s| s.position_id == "Q1"));
    }
}

#[test]
fn scenario_small_hybrid_run_is_feasible() {
    init_tracing();
    let params = GeneticParams::default()
        .with_population_size(20)
        .with_max_generations(10)
        .with_elite_count(2)
        .with_seed(3);
    let request = guard_request("C", 4, 2, 2).with_mode(SchedulingMode::Hybrid(params));
    let result = SchedulingEngine::new(EngineConfig::default())
        .run_simple(&request, &guard_store(4, 2))
        .unwrap();
    assert!(result.success());
    let fitness = result.fitness.unwrap();
    let seed = result.seed_fitness.unwrap();
    assert_eq!(fitness.hard, 0);
    assert!(fitness.hard <= seed.hard);
    assert!(fitness <= seed);
}

#[test]
fn scenario_five_generations_is_out_of_range() {
    let params = GeneticParams::default()
        .with_population_size(20)
        .with_max_generations(5)
        .with_elite_count(2);
    let request = guard_request("C5", 4, 2, 1).with_mode(SchedulingMode::Hybrid(params));
    assert!(relaxed_engine().run_simple(&request, &guard_store(4, 2)).is_err());
}

#[test]
fn scenario_conflicting_manual_assignments_fail_before_tensor() {
    init_tracing();
    let slot = TimeSlot::new(2).unwrap();
    let store = guard_store(3, 2)
        .with_manual_assignment(ManualAssignment::new("M1", "P1", "Q1", monday(), slot))
        .with_manual_assignment(ManualAssignment::new("M2", "P2", "Q1", monday(), slot));
    let request = guard_request("D", 3, 2, 1)
        .with_manual_assignment("M1")
        .with_manual_assignment("M2");
    let result = relaxed_engine().run_simple(&request, &store).unwrap();
    assert_eq!(result.outcome, RunOutcome::Failed(FailureKind::DataIntegrity));
    assert!(result.schedule.is_none());
    assert!(result
        .conflicts
        .iter()
        .any(|c| c.subtype == ConflictSubtype::ConflictingManualAssignments));
}
