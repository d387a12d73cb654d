//! Property-based tests for the order resolver.

use std::collections::HashSet;

use orimath_plugins::order::resolve;
use proptest::collection::vec;
use proptest::prelude::*;

/// Discovered ids are unique within a pass and arrive in arbitrary order;
/// preferences may repeat and may name ids that were never discovered.
fn discovered_ids() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set("[a-p]", 0..8)
        .prop_flat_map(|set| Just(set.into_iter().collect::<Vec<String>>()).prop_shuffle())
}

fn preferred_ids() -> impl Strategy<Value = Vec<String>> {
    vec("[a-t]", 0..10)
}

fn position(order: &[String], id: &str) -> Option<usize> {
    order.iter().position(|candidate| candidate == id)
}

fn first_positions(preferred: &[String]) -> Vec<(String, usize)> {
    let mut seen = HashSet::new();
    preferred
        .iter()
        .enumerate()
        .filter(|(_, id)| seen.insert(id.as_str()))
        .map(|(index, id)| (id.clone(), index))
        .collect()
}

proptest! {
    // Output is a permutation of the discovered set.
    #[test]
    fn resolved_is_permutation(discovered in discovered_ids(), preferred in preferred_ids()) {
        let order = resolve(discovered.clone(), &preferred).into_vec();
        let mut sorted = order.clone();
        sorted.sort();
        let mut expected = discovered;
        expected.sort();
        prop_assert_eq!(sorted, expected);
    }

    // Two discovered ids named in the preference list keep preference order.
    #[test]
    fn preference_order_is_respected(discovered in discovered_ids(), preferred in preferred_ids()) {
        let order = resolve(discovered.clone(), &preferred).into_vec();
        let firsts = first_positions(&preferred);
        for (a, a_rank) in &firsts {
            for (b, b_rank) in &firsts {
                if a_rank < b_rank {
                    if let (Some(pa), Some(pb)) = (position(&order, a), position(&order, b)) {
                        prop_assert!(pa < pb, "{} should precede {} in {:?}", a, b, order);
                    }
                }
            }
        }
    }

    // Ids absent from the preference list keep discovery order and trail
    // every preferred id.
    #[test]
    fn discovery_order_is_preserved(discovered in discovered_ids(), preferred in preferred_ids()) {
        let order = resolve(discovered.clone(), &preferred).into_vec();
        let unpreferred: Vec<&String> = discovered
            .iter()
            .filter(|id| !preferred.contains(*id))
            .collect();
        let tail: Vec<&String> = order
            .iter()
            .skip(order.len() - unpreferred.len())
            .collect();
        prop_assert_eq!(tail, unpreferred);
    }

    // Same input, same output.
    #[test]
    fn resolution_is_idempotent(discovered in discovered_ids(), preferred in preferred_ids()) {
        let first = resolve(discovered.clone(), &preferred);
        let second = resolve(discovered, &preferred);
        prop_assert_eq!(first, second);
    }

    // Unknown ids in the preference list are inert.
    #[test]
    fn unknown_ids_are_ignored(discovered in discovered_ids(), preferred in preferred_ids()) {
        let known: Vec<String> = preferred
            .iter()
            .filter(|id| discovered.contains(*id))
            .cloned()
            .collect();
        let with_unknown = resolve(discovered.clone(), &preferred);
        let without_unknown = resolve(discovered, &known);
        prop_assert_eq!(with_unknown, without_unknown);
    }
}
