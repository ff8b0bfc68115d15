//! Property-based tests for the dream aggregate

use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    AddKeys(Vec<String>),
    SetFirst(String),
    SetKey(String, String),
    AddActors(Vec<String>),
    Assign(ActorField, String),
}

fn arb_word() -> impl Strategy<Value = String> {
    "[a-d]{1,3}"
}

fn arb_field() -> impl Strategy<Value = ActorField> {
    prop_oneof![
        Just(ActorField::Characteristic),
        Just(ActorField::Context),
        Just(ActorField::Sense),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        proptest::collection::vec(arb_word(), 0..4).prop_map(Op::AddKeys),
        arb_word().prop_map(Op::SetFirst),
        (arb_word(), arb_word()).prop_map(|(k, v)| Op::SetKey(k, v)),
        proptest::collection::vec(arb_word(), 0..3).prop_map(Op::AddActors),
        (arb_field(), arb_word()).prop_map(|(f, v)| Op::Assign(f, v)),
    ]
}

fn apply(dream: &mut Dream, op: Op) {
    match op {
        Op::AddKeys(keys) => dream.add_association_keys(keys),
        Op::SetFirst(value) => {
            if let Some(key) = dream.first_unresolved_association_key().map(str::to_string) {
                dream.set_association(&key, value);
            }
        }
        Op::SetKey(key, value) => {
            dream.set_association(&key, value);
        }
        Op::AddActors(names) => dream.add_actors(names),
        Op::Assign(field, value) => {
            dream.assign_to_next_actor_missing(field, value);
        }
    }
}

/// Every filled field has all earlier fields filled
fn fields_in_order(actor: &Actor) -> bool {
    ActorField::ALL.iter().all(|&field| {
        actor.get(field).is_none()
            || field
                .previous()
                .map_or(true, |prev| actor.get(prev).is_some())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Keys only grow, stay unique, and each value is set at most once
    #[test]
    fn prop_associations_monotonic(ops in proptest::collection::vec(arb_op(), 0..30)) {
        let mut dream = Dream::new();
        for op in ops {
            let before = dream.associations().to_vec();
            apply(&mut dream, op);
            let after = dream.associations();

            prop_assert!(after.len() >= before.len());
            for (old, new) in before.iter().zip(after) {
                prop_assert_eq!(&old.symbol, &new.symbol);
                if old.association.is_some() {
                    prop_assert_eq!(&old.association, &new.association);
                }
            }

            let mut symbols: Vec<_> = after.iter().map(|a| &a.symbol).collect();
            symbols.sort();
            symbols.dedup();
            prop_assert_eq!(symbols.len(), after.len());
        }
    }

    // Actor fields fill strictly characteristic -> context -> sense
    #[test]
    fn prop_actor_fields_in_order(ops in proptest::collection::vec(arb_op(), 0..30)) {
        let mut dream = Dream::new();
        for op in ops {
            let before = dream.actors().to_vec();
            apply(&mut dream, op);

            prop_assert!(dream.actors().len() >= before.len());
            for (old, new) in before.iter().zip(dream.actors()) {
                prop_assert_eq!(old.person(), new.person());
                for field in ActorField::ALL {
                    if old.get(field).is_some() {
                        prop_assert_eq!(old.get(field), new.get(field));
                    }
                }
            }
            for actor in dream.actors() {
                prop_assert!(fields_in_order(actor), "out of order: {:?}", actor);
            }
        }
    }

    // The association cursor always points at the earliest unresolved key
    #[test]
    fn prop_cursor_is_earliest(ops in proptest::collection::vec(arb_op(), 0..30)) {
        let mut dream = Dream::new();
        for op in ops {
            apply(&mut dream, op);
        }
        let expected = dream
            .associations()
            .iter()
            .find(|a| a.association.is_none())
            .map(|a| a.symbol.as_str());
        prop_assert_eq!(dream.first_unresolved_association_key(), expected);
    }
}
