//! Custom assertions for test verification
//!
//! This module provides alias-specific assertions for codegraph-alias testing.

use codegraph_alias::features::offset_alias::{
    AliasResult, EntityId, IntRange, IntervalOffset, ResolvedGraph,
};

/// `(base entity, interval)` of every final address of `entity`, sorted
pub fn ranges_of(resolved: &ResolvedGraph, entity: EntityId) -> Vec<(EntityId, IntRange)> {
    let graph = resolved.graph();
    let mut out: Vec<(EntityId, IntRange)> = resolved
        .addresses_of(entity)
        .into_iter()
        .map(|address| {
            let base = graph.node(address.base).expect("live base").entity;
            let range = address
                .offset
                .representation::<IntervalOffset>()
                .expect("interval representation")
                .range();
            (base, range)
        })
        .collect();
    out.sort_by_key(|(base, range)| (*base, range.to_string()));
    out
}

/// Assert that two pointers are proven disjoint
pub fn assert_no_alias(resolved: &ResolvedGraph, a: EntityId, b: EntityId) {
    let verdict = resolved.explain_alias(a, b);
    assert_eq!(
        verdict.result,
        AliasResult::NoAlias,
        "Expected {a} and {b} to be disjoint, decided by {:?}. {a}: {:?}, {b}: {:?}",
        verdict.decided_by,
        ranges_of(resolved, a),
        ranges_of(resolved, b)
    );
}

/// Assert that two pointers may overlap
pub fn assert_may_alias(resolved: &ResolvedGraph, a: EntityId, b: EntityId) {
    let verdict = resolved.explain_alias(a, b);
    assert_eq!(
        verdict.result,
        AliasResult::MayAlias,
        "Expected {a} and {b} to may-alias, decided by {:?}. {a}: {:?}, {b}: {:?}",
        verdict.decided_by,
        ranges_of(resolved, a),
        ranges_of(resolved, b)
    );
}
