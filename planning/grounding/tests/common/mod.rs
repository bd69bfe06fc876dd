#![allow(dead_code)]

use std::collections::BTreeSet;
use std::collections::VecDeque;

use grounding::ground::{GroundProblem, State};
use grounding::Config;
use hashbrown::HashSet;
use lifted::conditions::NumericEffect;
use lifted::{Argument, Axiom, Condition, Operator, Param, Problem, TOTAL_COST};

/// Installs a subscriber printing the logs of the test being run (only shown on failure).
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn config(options: &[(&str, &str)]) -> Config {
    let mut config = Config::default();
    for (name, value) in options {
        config.set_option(name, value).unwrap();
    }
    config
}

pub fn lit(pb: &Problem, predicate: &str, args: &[Argument]) -> Condition {
    pb.literal(predicate, args.to_vec()).unwrap().into()
}

pub fn var(p: &Param) -> Argument {
    p.into()
}

pub fn obj(pb: &Problem, name: &str) -> Argument {
    pb.object(name).unwrap()
}

/// Locations `a` and `b`, a single predicate `at` and `move(from, to)` with precondition
/// `at(from) & !at(to)` and effect `!at(from) & at(to)`.
/// Initially `at(a)`, the goal is `at(b)`.
pub fn move_domain() -> Problem {
    let mut pb = Problem::new();
    pb.add_type("loc", None);
    pb.add_object("a", "loc").unwrap();
    pb.add_object("b", "loc").unwrap();
    pb.add_predicate("at", vec![Param::new("x", "loc")]).unwrap();

    let from = Param::new("from", "loc");
    let to = Param::new("to", "loc");
    let op = Operator::new("move", vec![from.clone(), to.clone()])
        .with_precondition(Condition::And(vec![
            lit(&pb, "at", &[var(&from)]),
            Condition::not(lit(&pb, "at", &[var(&to)])),
        ]))
        .with_effect(Condition::And(vec![
            Condition::not(lit(&pb, "at", &[var(&from)])),
            lit(&pb, "at", &[var(&to)]),
        ]));
    pb.add_operator(op).unwrap();
    pb.add_init(pb.literal("at", vec![obj(&pb, "a")]).unwrap()).unwrap();
    pb.add_goal(lit(&pb, "at", &[obj(&pb, "b")])).unwrap();
    pb
}

/// Same as [`move_domain`], but each move increases `total-cost` by `cost`.
pub fn move_domain_with_cost(cost: i64) -> Problem {
    let mut pb = move_domain();
    pb.add_function(TOTAL_COST, vec![]).unwrap();
    let total_cost = pb.fluent(TOTAL_COST, vec![]).unwrap();
    pb.set_init_value(total_cost.clone(), 0).unwrap();
    let op = &mut pb.operators[0];
    op.effect = Condition::And(vec![op.effect.clone(), NumericEffect::increase(total_cost, cost).into()]);
    pb
}

/// Locations `l1 - l2 - l3 - l4` connected by one-way roads, a truck in `l1` that must reach `l3`.
pub fn roads() -> Problem {
    let mut pb = Problem::new();
    pb.add_type("loc", None);
    for l in ["l1", "l2", "l3", "l4"] {
        pb.add_object(l, "loc").unwrap();
    }
    let from = Param::new("from", "loc");
    let to = Param::new("to", "loc");
    pb.add_predicate("truck-at", vec![from.clone()]).unwrap();
    pb.add_predicate("road", vec![from.clone(), to.clone()]).unwrap();
    for (x, y) in [("l1", "l2"), ("l2", "l3"), ("l3", "l4")] {
        pb.add_init(pb.literal("road", vec![obj(&pb, x), obj(&pb, y)]).unwrap())
            .unwrap();
    }
    pb.add_init(pb.literal("truck-at", vec![obj(&pb, "l1")]).unwrap())
        .unwrap();
    let op = Operator::new("drive", vec![from.clone(), to.clone()])
        .with_precondition(Condition::And(vec![
            lit(&pb, "truck-at", &[var(&from)]),
            lit(&pb, "road", &[var(&from), var(&to)]),
        ]))
        .with_effect(Condition::And(vec![
            Condition::not(lit(&pb, "truck-at", &[var(&from)])),
            lit(&pb, "truck-at", &[var(&to)]),
        ]));
    pb.add_operator(op).unwrap();
    pb.add_goal(lit(&pb, "truck-at", &[obj(&pb, "l3")])).unwrap();
    pb
}

/// A robot carrying balls between two rooms, with a single gripper.
pub fn gripper() -> Problem {
    let mut pb = Problem::new();
    pb.add_type("object", None);
    pb.add_type("room", Some("object"));
    pb.add_type("ball", Some("object"));
    for r in ["r1", "r2"] {
        pb.add_object(r, "room").unwrap();
    }
    for b in ["b1", "b2"] {
        pb.add_object(b, "ball").unwrap();
    }
    let r = Param::new("r", "room");
    let from = Param::new("from", "room");
    let to = Param::new("to", "room");
    let b = Param::new("b", "ball");
    pb.add_predicate("at-robby", vec![r.clone()]).unwrap();
    pb.add_predicate("at", vec![b.clone(), r.clone()]).unwrap();
    pb.add_predicate("carry", vec![b.clone()]).unwrap();
    pb.add_predicate("free", vec![]).unwrap();

    let mv = Operator::new("move", vec![from.clone(), to.clone()])
        .with_precondition(Condition::And(vec![
            lit(&pb, "at-robby", &[var(&from)]),
            Condition::not(lit(&pb, "=", &[var(&from), var(&to)])),
        ]))
        .with_effect(Condition::And(vec![
            Condition::not(lit(&pb, "at-robby", &[var(&from)])),
            lit(&pb, "at-robby", &[var(&to)]),
        ]));
    let pick = Operator::new("pick", vec![b.clone(), r.clone()])
        .with_precondition(Condition::And(vec![
            lit(&pb, "at", &[var(&b), var(&r)]),
            lit(&pb, "at-robby", &[var(&r)]),
            lit(&pb, "free", &[]),
        ]))
        .with_effect(Condition::And(vec![
            lit(&pb, "carry", &[var(&b)]),
            Condition::not(lit(&pb, "at", &[var(&b), var(&r)])),
            Condition::not(lit(&pb, "free", &[])),
        ]));
    let drop = Operator::new("drop", vec![b.clone(), r.clone()])
        .with_precondition(Condition::And(vec![
            lit(&pb, "carry", &[var(&b)]),
            lit(&pb, "at-robby", &[var(&r)]),
        ]))
        .with_effect(Condition::And(vec![
            Condition::not(lit(&pb, "carry", &[var(&b)])),
            lit(&pb, "at", &[var(&b), var(&r)]),
            lit(&pb, "free", &[]),
        ]));
    for op in [mv, pick, drop] {
        pb.add_operator(op).unwrap();
    }

    for init in [
        pb.literal("at-robby", vec![obj(&pb, "r1")]).unwrap(),
        pb.literal("at", vec![obj(&pb, "b1"), obj(&pb, "r1")]).unwrap(),
        pb.literal("at", vec![obj(&pb, "b2"), obj(&pb, "r1")]).unwrap(),
        pb.literal("free", vec![]).unwrap(),
    ] {
        pb.add_init(init).unwrap();
    }
    pb.add_goal(lit(&pb, "at", &[obj(&pb, "b1"), obj(&pb, "r2")])).unwrap();
    pb.add_goal(lit(&pb, "at", &[obj(&pb, "b2"), obj(&pb, "r2")])).unwrap();
    pb
}

/// Lamps in rooms: a room is lit (derived) when one of its lamps is on.
/// Lamp `l1` is in `kitchen`, lamps `l2` and `l3` are in `hall`. The goal is to light the hall.
pub fn lamps() -> Problem {
    let mut pb = Problem::new();
    pb.add_type("lamp", None);
    pb.add_type("room", None);
    for l in ["l1", "l2", "l3"] {
        pb.add_object(l, "lamp").unwrap();
    }
    pb.add_object("kitchen", "room").unwrap();
    pb.add_object("hall", "room").unwrap();
    let l = Param::new("l", "lamp");
    let r = Param::new("r", "room");
    pb.add_predicate("on", vec![l.clone()]).unwrap();
    pb.add_predicate("in", vec![l.clone(), r.clone()]).unwrap();
    let lit_room = pb.add_predicate("lit", vec![r.clone()]).unwrap();
    for (lamp, room) in [("l1", "kitchen"), ("l2", "hall"), ("l3", "hall")] {
        pb.add_init(pb.literal("in", vec![obj(&pb, lamp), obj(&pb, room)]).unwrap())
            .unwrap();
    }

    let switch_on = Operator::new("switch-on", vec![l.clone()])
        .with_precondition(Condition::not(lit(&pb, "on", &[var(&l)])))
        .with_effect(lit(&pb, "on", &[var(&l)]));
    pb.add_operator(switch_on).unwrap();

    let axiom = Axiom::new(
        lit_room,
        Condition::exists(
            vec![l.clone()],
            Condition::And(vec![lit(&pb, "in", &[var(&l), var(&r)]), lit(&pb, "on", &[var(&l)])]),
        ),
    );
    pb.add_axiom(axiom).unwrap();
    pb.add_goal(lit(&pb, "lit", &[obj(&pb, "hall")])).unwrap();
    pb
}

/// Textual form of all actions applicable in at least one state reachable from the initial state.
pub fn reachable_actions(problem: &GroundProblem) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    let mut visited: HashSet<State> = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(problem.initial_state().clone());
    queue.push_back(problem.initial_state().clone());
    while let Some(state) = queue.pop_front() {
        for (_, action) in problem.applicable(&state) {
            used.insert(action.to_string());
            let next = problem.successor(&state, action);
            if visited.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }
    used
}

/// Textual form of all ground actions.
pub fn action_names(problem: &GroundProblem) -> BTreeSet<String> {
    problem.actions.iter().map(|a| a.to_string()).collect()
}
