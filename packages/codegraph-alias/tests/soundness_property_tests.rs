//! Property-based tests for offset alias analysis
//!
//! Tests invariants that should hold for ALL generated programs:
//! - Soundness: a `NoAlias` answer never contradicts an execution. Acyclic
//!   programs are checked against brute-force enumeration of every choice
//!   the merge nodes can make. Cyclic programs are checked against the
//!   `(object, offset)` values each pointer reaches within a bounded number
//!   of loop trips.
//! - Termination: cyclic programs resolve and leave a consistent graph.

mod common;

use codegraph_alias::config::{AnalysisConfig, OffsetDomainKind, Preset};
use codegraph_alias::features::offset_alias::{
    AliasResult, EntityId, EntityKind, InMemoryProgram, OffsetAliasAnalyzer,
};
use common::ProgramBuilder;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Op {
    Alloc { global: bool },
    Derived { base: usize, offset: i64 },
    Cast { source: usize },
    Merge { incoming: Vec<usize> },
    Load,
}

/// Raw step: (kind selector, operand, offset, merge operands)
type Step = (u8, Index, i64, Vec<Index>);

fn step_strategy() -> impl Strategy<Value = Step> {
    (
        0u8..4,
        any::<Index>(),
        -2i64..=4,
        prop::collection::vec(any::<Index>(), 1..=3),
    )
}

/// Operands are drawn from `0..bound(position)`
fn ops_from(allocs: usize, steps: Vec<Step>, bound: impl Fn(usize) -> usize) -> Vec<Op> {
    let mut ops: Vec<Op> = (0..allocs)
        .map(|i| Op::Alloc { global: i % 2 == 1 })
        .collect();
    for (selector, operand, offset, incoming) in steps {
        let n = bound(ops.len());
        let op = match selector {
            0 => Op::Derived {
                base: operand.index(n),
                offset: offset * 4,
            },
            1 => Op::Cast {
                source: operand.index(n),
            },
            2 => Op::Merge {
                incoming: incoming.iter().map(|i| i.index(n)).collect(),
            },
            _ => Op::Load,
        };
        ops.push(op);
    }
    ops
}

/// Every operand refers to an earlier entity
fn acyclic_program() -> impl Strategy<Value = Vec<Op>> {
    (1usize..=3, prop::collection::vec(step_strategy(), 1..=7))
        .prop_map(|(allocs, steps)| ops_from(allocs, steps, |position| position))
}

/// Operands may refer to any entity, loops included
fn cyclic_program() -> impl Strategy<Value = Vec<Op>> {
    (1usize..=2, prop::collection::vec(step_strategy(), 1..=5)).prop_map(|(allocs, steps)| {
        let total = allocs + steps.len();
        ops_from(allocs, steps, move |_| total)
    })
}

fn build(ops: &[Op], config: &AnalysisConfig) -> InMemoryProgram {
    let mut b = ProgramBuilder::for_config(config);
    for (i, op) in ops.iter().enumerate() {
        let name = format!("v{}", i);
        let kind = match op {
            Op::Alloc { global: true } => EntityKind::Global,
            Op::Alloc { global: false } => EntityKind::StackAlloc,
            Op::Derived { base, offset } => EntityKind::Derived {
                base: EntityId(*base as u32),
                offset: b.domain().constant(*offset),
            },
            Op::Cast { source } => EntityKind::Cast {
                source: EntityId(*source as u32),
            },
            Op::Merge { incoming } => EntityKind::Merge {
                incoming: incoming.iter().map(|&i| EntityId(i as u32)).collect(),
            },
            Op::Load => EntityKind::Load,
        };
        b.add(&name, kind);
    }
    b.build()
}

fn config_for(congruence: bool, local_trees: bool) -> AnalysisConfig {
    let domain = if congruence {
        OffsetDomainKind::IntervalCongruence
    } else {
        OffsetDomainKind::Interval
    };
    AnalysisConfig::preset(Preset::Balanced)
        .with_offset_domain(domain)
        .with_local_tree_check(local_trees)
}

// ============================================================================
// Brute force
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Origin {
    Object(usize),
    Loaded(usize),
}

type Value = (Origin, i64);

/// Value of every entity, for every combination of merge choices
fn executions(ops: &[Op]) -> Vec<Vec<Value>> {
    let merges: Vec<(usize, usize)> = ops
        .iter()
        .enumerate()
        .filter_map(|(i, op)| match op {
            Op::Merge { incoming } => Some((i, incoming.len())),
            _ => None,
        })
        .collect();
    let total: usize = merges.iter().map(|&(_, arity)| arity).product();

    (0..total)
        .map(|mut code| {
            let mut choice = vec![0; ops.len()];
            for &(i, arity) in &merges {
                choice[i] = code % arity;
                code /= arity;
            }
            let mut values: Vec<Value> = Vec::with_capacity(ops.len());
            for (i, op) in ops.iter().enumerate() {
                let value = match op {
                    Op::Alloc { .. } => (Origin::Object(i), 0),
                    Op::Load => (Origin::Loaded(i), 0),
                    Op::Derived { base, offset } => {
                        let (origin, at) = values[*base];
                        (origin, at + offset)
                    }
                    Op::Cast { source } => values[*source],
                    Op::Merge { incoming } => values[incoming[choice[i]]],
                };
                values.push(value);
            }
            values
        })
        .collect()
}

/// Loop trips explored for cyclic programs
const FIXPOINT_ROUNDS: usize = 12;

/// Offsets beyond this are not tracked; the reached sets stay finite
const OFFSET_CAP: i64 = 96;

/// Every value each entity takes within `FIXPOINT_ROUNDS` trips around the
/// program's loops. Allocations denote a single object.
fn reachable(ops: &[Op]) -> Vec<BTreeSet<Value>> {
    let mut values: Vec<BTreeSet<Value>> = vec![BTreeSet::new(); ops.len()];
    for _ in 0..FIXPOINT_ROUNDS {
        let mut changed = false;
        for (i, op) in ops.iter().enumerate() {
            let next: BTreeSet<Value> = match op {
                Op::Alloc { .. } => [(Origin::Object(i), 0)].into_iter().collect(),
                Op::Load => [(Origin::Loaded(i), 0)].into_iter().collect(),
                Op::Derived { base, offset } => values[*base]
                    .iter()
                    .map(|&(origin, at)| (origin, at + offset))
                    .filter(|(_, at)| at.abs() <= OFFSET_CAP)
                    .collect(),
                Op::Cast { source } => values[*source].clone(),
                Op::Merge { incoming } => incoming
                    .iter()
                    .flat_map(|&v| values[v].iter().copied())
                    .collect(),
            };
            if !next.is_subset(&values[i]) {
                values[i].extend(next);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    values
}

/// A loaded pointer may hold any address, except that one load is a single value
fn may_coincide(a: Value, b: Value) -> bool {
    match (a.0, b.0) {
        (Origin::Object(x), Origin::Object(y)) => x == y && a.1 == b.1,
        (Origin::Loaded(x), Origin::Loaded(y)) if x == y => a.1 == b.1,
        _ => true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_no_alias_is_sound(
        ops in acyclic_program(),
        congruence in any::<bool>(),
        local_trees in any::<bool>(),
    ) {
        let config = config_for(congruence, local_trees);
        let program = build(&ops, &config);
        let (resolved, _) = OffsetAliasAnalyzer::new(config).run_source(program).unwrap();
        let runs = executions(&ops);

        for i in 0..ops.len() {
            for j in i..ops.len() {
                let (p, q) = (EntityId(i as u32), EntityId(j as u32));
                if resolved.alias(p, q) != AliasResult::NoAlias {
                    continue;
                }
                for values in &runs {
                    prop_assert!(
                        !may_coincide(values[i], values[j]),
                        "v{} and v{} reported disjoint but both are {:?} in {:?}",
                        i, j, values[i], ops
                    );
                }
            }
        }
    }

    #[test]
    fn prop_no_alias_is_sound_on_cycles(
        ops in cyclic_program(),
        congruence in any::<bool>(),
        local_trees in any::<bool>(),
    ) {
        let config = config_for(congruence, local_trees);
        let program = build(&ops, &config);
        let (resolved, _) = OffsetAliasAnalyzer::new(config).run_source(program).unwrap();
        let values = reachable(&ops);

        // Anchored on allocations: their single object is the same on every trip
        for (i, op) in ops.iter().enumerate() {
            if !matches!(op, Op::Alloc { .. }) {
                continue;
            }
            let object = (Origin::Object(i), 0);
            for (j, reached) in values.iter().enumerate() {
                if resolved.alias(EntityId(i as u32), EntityId(j as u32)) != AliasResult::NoAlias {
                    continue;
                }
                for &value in reached {
                    prop_assert!(
                        !may_coincide(object, value),
                        "v{} and v{} reported disjoint but v{} reaches {:?} in {:?}",
                        i, j, j, value, ops
                    );
                }
            }
        }
    }

    #[test]
    fn prop_cyclic_programs_resolve(
        ops in cyclic_program(),
        congruence in any::<bool>(),
    ) {
        let config = config_for(congruence, true);
        let program = build(&ops, &config);
        let (resolved, metrics) = OffsetAliasAnalyzer::new(config).run_source(program).unwrap();

        prop_assert!(resolved.graph().verify().is_ok());
        prop_assert_eq!(metrics.nodes, ops.len());
        // Closure leaves no pointer without an address
        for i in 0..ops.len() {
            prop_assert!(!resolved.addresses_of(EntityId(i as u32)).is_empty());
        }
    }

    #[test]
    fn prop_alias_is_symmetric(
        ops in acyclic_program(),
        congruence in any::<bool>(),
    ) {
        let config = config_for(congruence, true);
        let program = build(&ops, &config);
        let (resolved, _) = OffsetAliasAnalyzer::new(config).run_source(program).unwrap();

        for i in 0..ops.len() as u32 {
            for j in 0..ops.len() as u32 {
                prop_assert_eq!(
                    resolved.alias(EntityId(i), EntityId(j)),
                    resolved.alias(EntityId(j), EntityId(i))
                );
            }
        }
    }
}
