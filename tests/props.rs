mod common;

use common::{action, counter_reducer, reducer_map, todo_reducer};
use proptest::prelude::*;
use statefold::{combine_reducers, compose, ComposeFn, SliceMap};
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Step {
    Add(i64),
    Mul(i64),
    Negate,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-100i64..100).prop_map(Step::Add),
        (-10i64..10).prop_map(Step::Mul),
        Just(Step::Negate),
    ]
}

fn apply_step(step: &Step, x: i64) -> i64 {
    match step {
        Step::Add(k) => x.wrapping_add(*k),
        Step::Mul(k) => x.wrapping_mul(*k),
        Step::Negate => x.wrapping_neg(),
    }
}

fn step_fn(step: Step) -> ComposeFn<i64> {
    Rc::new(move |x| apply_step(&step, x))
}

fn arb_counter_action_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("counter/incremented".to_string()),
        Just("counter/reset".to_string()),
        Just("other/event".to_string()),
    ]
}

// A composed pipeline behaves exactly like folding the stages manually from
// the right.
proptest! {
    #[test]
    fn prop_compose_matches_manual_right_to_left_fold(
        steps in proptest::collection::vec(arb_step(), 0..12),
        x in -1000i64..1000,
    ) {
        let composed = compose(steps.iter().cloned().map(step_fn).collect());
        let expected = steps.iter().rev().fold(x, |acc, step| apply_step(step, acc));
        prop_assert_eq!(composed(x), expected);
    }

    // Feeding actions through the combined reducer one at a time produces the
    // same slice a hand-rolled fold over the same sequence would.
    #[test]
    fn prop_combined_counter_matches_manual_fold(
        types in proptest::collection::vec(arb_counter_action_type(), 0..40),
    ) {
        let combined = combine_reducers(reducer_map(&[("counter", counter_reducer)]));

        let mut state: Option<SliceMap> = None;
        let mut expected = 0i64;
        for action_type in &types {
            match action_type.as_str() {
                "counter/incremented" => expected += 1,
                "counter/reset" => expected = 0,
                _ => {}
            }
            state = Some(combined(state, &action(action_type)).unwrap());
        }

        let final_state = combined(state, &action("final/noop")).unwrap();
        prop_assert_eq!(final_state["counter"].as_i64().unwrap(), expected);
    }

    // Actions no slice responds to always hand back the same state map.
    #[test]
    fn prop_unknown_actions_short_circuit(
        types in proptest::collection::vec("zz[a-z]{1,6}/[a-z]{1,6}", 1..20),
    ) {
        let combined = combine_reducers(reducer_map(&[
            ("counter", counter_reducer),
            ("todos", todo_reducer),
        ]));

        let state = combined(None, &action("seed/seed")).unwrap();
        for action_type in &types {
            let next = combined(Some(Rc::clone(&state)), &action(action_type)).unwrap();
            prop_assert!(Rc::ptr_eq(&state, &next));
        }
    }
}
