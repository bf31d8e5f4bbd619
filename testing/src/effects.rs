//! Run effects in-process, in declaration order.
//!
//! Delays fire immediately and parallel children run one after the other, so
//! the produced actions come back in a deterministic order.

use checklist_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;

fn flatten<A>(effect: Effect<A>, leaves: &mut Vec<Effect<A>>) {
    match effect {
        Effect::None => {},
        Effect::Parallel(effects) | Effect::Sequential(effects) => {
            for effect in effects {
                flatten(effect, leaves);
            }
        },
        leaf @ (Effect::Delay { .. } | Effect::Future(_)) => leaves.push(leaf),
    }
}

/// Await every effect and return the actions they produce
///
/// Effects that finish without an action contribute nothing.
pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut leaves = Vec::new();
    for effect in effects {
        flatten(effect, &mut leaves);
    }

    let mut actions = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        match leaf {
            Effect::Delay { action, .. } => actions.push(*action),
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    actions.push(action);
                }
            },
            Effect::None | Effect::Parallel(_) | Effect::Sequential(_) => {},
        }
    }
    actions
}

/// Reduce an action, then keep feeding produced actions back until no
/// effect is left
///
/// Returns every fed-back action in the order it was reduced (the initial
/// action is not included).
pub async fn run_to_completion<R>(
    reducer: &R,
    state: &mut R::State,
    action: R::Action,
    env: &R::Environment,
) -> Vec<R::Action>
where
    R: Reducer,
    R::Action: Clone,
{
    let mut reduced = Vec::new();
    let mut queue = VecDeque::from([action]);
    let mut first = true;

    while let Some(action) = queue.pop_front() {
        if first {
            first = false;
        } else {
            reduced.push(action.clone());
        }
        let effects = reducer.reduce(state, action, env);
        queue.extend(collect_actions(effects).await);
    }

    reduced
}
